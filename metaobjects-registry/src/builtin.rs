//! Built-in type families.

use crate::ANY;
use crate::builder::RegistryBuilder;
use crate::definition::{TypeDefinition, attribute_node};
use crate::error::RegistryResult;
use crate::provider::TypeProvider;
use metaobjects_types::{
    SUBTYPE_BASE, TYPE_ATTR, TYPE_FIELD, TYPE_KEY, TYPE_METADATA, TYPE_OBJECT, TYPE_VALIDATOR,
    ValueKind,
};

/// The loader root (`metadata.base`).
pub struct CoreTypes;

impl TypeProvider for CoreTypes {
    fn id(&self) -> &'static str {
        "core"
    }

    fn description(&self) -> &'static str {
        "Loader root node"
    }

    fn register(&self, registry: &mut RegistryBuilder) -> RegistryResult<()> {
        registry.register_type(
            TypeDefinition::new(TYPE_METADATA, SUBTYPE_BASE)
                .description("Root of a metadata model")
                .inline_attributes(ValueKind::String.subtype())
                .default_subtype(),
        )
    }
}

/// `object.*`: pojo (default), map and proxy.
pub struct ObjectTypes;

impl TypeProvider for ObjectTypes {
    fn id(&self) -> &'static str {
        "object"
    }

    fn description(&self) -> &'static str {
        "Object type family"
    }

    fn register(&self, registry: &mut RegistryBuilder) -> RegistryResult<()> {
        registry.register_type(
            TypeDefinition::new(TYPE_OBJECT, SUBTYPE_BASE)
                .description("Common contract for all objects")
                .accepts_child(TYPE_FIELD, ANY, ANY)
                .accepts_child(TYPE_ATTR, ANY, ANY)
                .accepts_child(TYPE_KEY, ANY, ANY)
                .accepts_child(TYPE_VALIDATOR, ANY, ANY)
                .optional_attribute("isInterface", ValueKind::Boolean)
                .optional_attribute("implements", ValueKind::StringArray)
                .optional_attribute("description", ValueKind::String)
                .inline_attributes(ValueKind::String.subtype()),
        )?;
        registry.register_type(
            TypeDefinition::new(TYPE_OBJECT, "pojo")
                .description("Plain object with typed fields")
                .extends(TYPE_OBJECT, SUBTYPE_BASE)
                .optional_attribute("object", ValueKind::Class)
                .default_subtype(),
        )?;
        registry.register_type(
            TypeDefinition::new(TYPE_OBJECT, "map")
                .description("Object backed by a key/value map")
                .extends(TYPE_OBJECT, SUBTYPE_BASE),
        )?;
        registry.register_type(
            TypeDefinition::new(TYPE_OBJECT, "proxy")
                .description("Object implemented by a runtime proxy")
                .extends(TYPE_OBJECT, SUBTYPE_BASE)
                .optional_attribute("proxyObject", ValueKind::Class),
        )
    }
}

/// `field.*`: one subtype per value shape, `string` by default.
pub struct FieldTypes;

impl TypeProvider for FieldTypes {
    fn id(&self) -> &'static str {
        "field"
    }

    fn description(&self) -> &'static str {
        "Field type family"
    }

    fn register(&self, registry: &mut RegistryBuilder) -> RegistryResult<()> {
        registry.register_type(
            TypeDefinition::new(TYPE_FIELD, SUBTYPE_BASE)
                .description("Common contract for all fields")
                .accepts_child(TYPE_ATTR, ANY, ANY)
                .accepts_child(TYPE_VALIDATOR, ANY, ANY)
                .optional_attribute("required", ValueKind::Boolean)
                .optional_attribute("defaultValue", ValueKind::String)
                .optional_attribute("isOptional", ValueKind::Boolean)
                .optional_attribute("isReadOnly", ValueKind::Boolean)
                .optional_attribute("description", ValueKind::String)
                .inline_attributes(ValueKind::String.subtype()),
        )?;

        let field = |subtype: &str| {
            TypeDefinition::new(TYPE_FIELD, subtype).extends(TYPE_FIELD, SUBTYPE_BASE)
        };
        registry.register_type(
            field("string")
                .description("Text field")
                .optional_attribute("pattern", ValueKind::String)
                .optional_attribute("maxLength", ValueKind::Int)
                .optional_attribute("minLength", ValueKind::Int)
                .default_subtype(),
        )?;
        registry.register_type(
            field("int")
                .description("32-bit integer field")
                .optional_attribute("minValue", ValueKind::Int)
                .optional_attribute("maxValue", ValueKind::Int),
        )?;
        registry.register_type(
            field("long")
                .description("64-bit integer field")
                .optional_attribute("minValue", ValueKind::Long)
                .optional_attribute("maxValue", ValueKind::Long),
        )?;
        registry.register_type(
            field("double")
                .description("Floating point field")
                .optional_attribute("minValue", ValueKind::Double)
                .optional_attribute("maxValue", ValueKind::Double)
                .optional_attribute("precision", ValueKind::Int),
        )?;
        registry.register_type(field("boolean").description("Boolean field"))?;
        registry.register_type(
            field("date")
                .description("Calendar date field")
                .optional_attribute("format", ValueKind::String),
        )?;
        registry.register_type(field("timestamp").description("Instant field"))?;
        registry.register_type(
            field("object")
                .description("Reference to another object")
                .optional_attribute("objectRef", ValueKind::String),
        )?;
        registry.register_type(
            field("stringArray")
                .description("List of strings")
                .optional_attribute("maxItems", ValueKind::Int),
        )?;
        registry.register_type(field("class").description("Class name field"))
    }
}

/// `attr.*`: one subtype per [`ValueKind`], `string` by default.
pub struct AttributeTypes;

impl TypeProvider for AttributeTypes {
    fn id(&self) -> &'static str {
        "attr"
    }

    fn description(&self) -> &'static str {
        "Attribute type family"
    }

    fn register(&self, registry: &mut RegistryBuilder) -> RegistryResult<()> {
        registry.register_type(
            TypeDefinition::new(TYPE_ATTR, SUBTYPE_BASE)
                .description("Common contract for all attributes")
                .factory(attribute_node)
                .accepts_no_children()
                .replaceable(true),
        )?;
        for kind in ValueKind::ALL {
            let mut definition = TypeDefinition::new(TYPE_ATTR, kind.subtype())
                .description(format!("Attribute holding a {kind} value"))
                .factory(attribute_node)
                .extends(TYPE_ATTR, SUBTYPE_BASE);
            if kind == ValueKind::String {
                definition = definition.default_subtype();
            }
            registry.register_type(definition)?;
        }
        Ok(())
    }
}

/// `validator.*`: auto-named `validator1`, `validator2`, ...
pub struct ValidatorTypes;

impl TypeProvider for ValidatorTypes {
    fn id(&self) -> &'static str {
        "validator"
    }

    fn description(&self) -> &'static str {
        "Validator type family"
    }

    fn register(&self, registry: &mut RegistryBuilder) -> RegistryResult<()> {
        registry.register_type(
            TypeDefinition::new(TYPE_VALIDATOR, SUBTYPE_BASE)
                .description("Common contract for all validators")
                .accepts_child(TYPE_ATTR, ANY, ANY)
                .optional_attribute("message", ValueKind::String)
                .name_prefix(TYPE_VALIDATOR)
                .inline_attributes(ValueKind::String.subtype())
                .replaceable(true),
        )?;

        let validator = |subtype: &str| {
            TypeDefinition::new(TYPE_VALIDATOR, subtype).extends(TYPE_VALIDATOR, SUBTYPE_BASE)
        };
        registry.register_type(
            validator("required")
                .description("Value must be present")
                .default_subtype(),
        )?;
        registry.register_type(
            validator("regex")
                .description("Value must match a pattern")
                .required_attribute("mask", ValueKind::String),
        )?;
        registry.register_type(
            validator("length")
                .description("Value length must be within bounds")
                .optional_attribute("min", ValueKind::Int)
                .optional_attribute("max", ValueKind::Int),
        )?;
        registry.register_type(
            validator("numeric")
                .description("Value must be a number within bounds")
                .optional_attribute("min", ValueKind::Double)
                .optional_attribute("max", ValueKind::Double),
        )
    }
}

/// `key.*`: primary (default, named `primary`), secondary and foreign.
pub struct KeyTypes;

impl TypeProvider for KeyTypes {
    fn id(&self) -> &'static str {
        "key"
    }

    fn description(&self) -> &'static str {
        "Key type family"
    }

    fn register(&self, registry: &mut RegistryBuilder) -> RegistryResult<()> {
        registry.register_type(
            TypeDefinition::new(TYPE_KEY, SUBTYPE_BASE)
                .description("Common contract for all keys")
                .accepts_child(TYPE_ATTR, ANY, ANY)
                .required_attribute("keys", ValueKind::StringArray)
                .name_prefix(TYPE_KEY)
                .inline_attributes(ValueKind::String.subtype()),
        )?;
        registry.register_type(
            TypeDefinition::new(TYPE_KEY, "primary")
                .description("Primary key")
                .extends(TYPE_KEY, SUBTYPE_BASE)
                .named("primary")
                .default_subtype(),
        )?;
        registry.register_type(
            TypeDefinition::new(TYPE_KEY, "secondary")
                .description("Secondary key")
                .extends(TYPE_KEY, SUBTYPE_BASE),
        )?;
        registry.register_type(
            TypeDefinition::new(TYPE_KEY, "foreign")
                .description("Key referencing another object")
                .extends(TYPE_KEY, SUBTYPE_BASE)
                .required_attribute("foreignObjectRef", ValueKind::String),
        )
    }
}
