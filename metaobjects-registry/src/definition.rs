//! Declarative descriptions of constructible node kinds.

use crate::ANY;
use metaobjects_model::MetaNode;
use metaobjects_types::{MetaIdentity, TypeKey, ValueKind};

/// Builds the node for a definition. Supplied at registration time.
pub type NodeFactory = fn(&TypeDefinition, MetaIdentity) -> MetaNode;

/// Factory for plain structural nodes.
pub fn standard_node(definition: &TypeDefinition, identity: MetaIdentity) -> MetaNode {
    MetaNode::new(identity).with_replaceable(definition.is_replaceable())
}

/// Factory for attribute nodes: the subtype names the value kind.
pub fn attribute_node(definition: &TypeDefinition, identity: MetaIdentity) -> MetaNode {
    let node = standard_node(definition, identity);
    match ValueKind::from_subtype(definition.subtype()) {
        Some(kind) => node.with_value_kind(kind),
        None => node,
    }
}

/// One entry of an attribute contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSpec {
    pub name: String,
    pub kind: ValueKind,
    pub required: bool,
}

/// A `(type, subtype, name)` pattern describing an accepted child.
///
/// Each part is either a literal or [`ANY`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildRequirement {
    pub meta_type: String,
    pub subtype: String,
    pub name: String,
    pub required: bool,
}

impl ChildRequirement {
    #[must_use]
    pub fn matches(&self, child: &MetaIdentity) -> bool {
        part_matches(&self.meta_type, &child.meta_type)
            && part_matches(&self.subtype, &child.subtype)
            && part_matches(&self.name, &child.name)
    }

    fn same_pattern(&self, other: &ChildRequirement) -> bool {
        self.meta_type == other.meta_type
            && self.subtype == other.subtype
            && self.name == other.name
    }
}

fn part_matches(pattern: &str, value: &str) -> bool {
    pattern == ANY || pattern == value
}

/// Describes a constructible `(type, subtype)` pair.
#[derive(Debug, Clone)]
pub struct TypeDefinition {
    key: TypeKey,
    description: String,
    pub(crate) provider: String,
    factory: NodeFactory,
    attributes: Vec<AttributeSpec>,
    children: Option<Vec<ChildRequirement>>,
    default_name: Option<String>,
    default_name_prefix: Option<String>,
    inline_attr_subtype: Option<String>,
    base: Option<TypeKey>,
    replaceable: bool,
    default_subtype: bool,
}

impl TypeDefinition {
    #[must_use]
    pub fn new(meta_type: impl Into<String>, subtype: impl Into<String>) -> Self {
        Self {
            key: TypeKey::new(meta_type, subtype),
            description: String::new(),
            provider: String::new(),
            factory: standard_node,
            attributes: Vec::new(),
            children: None,
            default_name: None,
            default_name_prefix: None,
            inline_attr_subtype: None,
            base: None,
            replaceable: false,
            default_subtype: false,
        }
    }

    /// True when both declare the same kind of node, whichever provider
    /// registered them.
    pub(crate) fn same_declaration(&self, other: &TypeDefinition) -> bool {
        self.key == other.key
            && self.description == other.description
            && std::ptr::fn_addr_eq(self.factory, other.factory)
            && self.attributes == other.attributes
            && self.children == other.children
            && self.default_name == other.default_name
            && self.default_name_prefix == other.default_name_prefix
            && self.inline_attr_subtype == other.inline_attr_subtype
            && self.base == other.base
            && self.replaceable == other.replaceable
            && self.default_subtype == other.default_subtype
    }

    // ── Declaration ─────────────────────────────────────────────

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn factory(mut self, factory: NodeFactory) -> Self {
        self.factory = factory;
        self
    }

    #[must_use]
    pub fn optional_attribute(self, name: impl Into<String>, kind: ValueKind) -> Self {
        self.attribute_spec(name.into(), kind, false)
    }

    #[must_use]
    pub fn required_attribute(self, name: impl Into<String>, kind: ValueKind) -> Self {
        self.attribute_spec(name.into(), kind, true)
    }

    fn attribute_spec(mut self, name: String, kind: ValueKind, required: bool) -> Self {
        self.attributes.retain(|a| a.name != name);
        self.attributes.push(AttributeSpec {
            name,
            kind,
            required,
        });
        self
    }

    /// Adds a pattern to the child whitelist. Declaring any pattern turns the
    /// definition from permissive into whitelisted.
    #[must_use]
    pub fn accepts_child(self, meta_type: &str, subtype: &str, name: &str) -> Self {
        self.child_requirement(meta_type, subtype, name, false)
    }

    /// Like [`accepts_child`](Self::accepts_child), and validation requires at
    /// least one matching child.
    #[must_use]
    pub fn requires_child(self, meta_type: &str, subtype: &str, name: &str) -> Self {
        self.child_requirement(meta_type, subtype, name, true)
    }

    fn child_requirement(mut self, meta_type: &str, subtype: &str, name: &str, required: bool) -> Self {
        self.children.get_or_insert_with(Vec::new).push(ChildRequirement {
            meta_type: meta_type.to_string(),
            subtype: subtype.to_string(),
            name: name.to_string(),
            required,
        });
        self
    }

    /// Declares an empty whitelist: no children at all.
    #[must_use]
    pub fn accepts_no_children(mut self) -> Self {
        self.children = Some(Vec::new());
        self
    }

    /// Name given to nodes of this kind when the source leaves it out.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.default_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.default_name_prefix = Some(prefix.into());
        self
    }

    /// Allows inline attributes on nodes of this type, created as `attr.<subtype>`
    /// unless the attribute contract says otherwise.
    #[must_use]
    pub fn inline_attributes(mut self, attr_subtype: impl Into<String>) -> Self {
        self.inline_attr_subtype = Some(attr_subtype.into());
        self
    }

    #[must_use]
    pub fn extends(mut self, meta_type: impl Into<String>, subtype: impl Into<String>) -> Self {
        self.base = Some(TypeKey::new(meta_type, subtype));
        self
    }

    #[must_use]
    pub fn replaceable(mut self, replaceable: bool) -> Self {
        self.replaceable = replaceable;
        self
    }

    /// Marks this subtype as the default for its type.
    #[must_use]
    pub fn default_subtype(mut self) -> Self {
        self.default_subtype = true;
        self
    }

    // ── Queries ─────────────────────────────────────────────────

    #[must_use]
    pub fn key(&self) -> &TypeKey {
        &self.key
    }

    #[must_use]
    pub fn meta_type(&self) -> &str {
        &self.key.meta_type
    }

    #[must_use]
    pub fn subtype(&self) -> &str {
        &self.key.subtype
    }

    #[must_use]
    pub fn describe(&self) -> &str {
        &self.description
    }

    /// Id of the provider that registered this definition.
    #[must_use]
    pub fn provider(&self) -> &str {
        &self.provider
    }

    #[must_use]
    pub fn attributes(&self) -> &[AttributeSpec] {
        &self.attributes
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeSpec> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn required_attributes(&self) -> impl Iterator<Item = &AttributeSpec> {
        self.attributes.iter().filter(|a| a.required)
    }

    /// `None` when any child is accepted.
    #[must_use]
    pub fn child_requirements(&self) -> Option<&[ChildRequirement]> {
        self.children.as_deref()
    }

    /// Whether the whitelist (if any) admits a child with this identity.
    #[must_use]
    pub fn accepts(&self, child: &MetaIdentity) -> bool {
        match &self.children {
            None => true,
            Some(requirements) => requirements.iter().any(|r| r.matches(child)),
        }
    }

    #[must_use]
    pub fn default_name(&self) -> Option<&str> {
        self.default_name.as_deref()
    }

    #[must_use]
    pub fn default_name_prefix(&self) -> Option<&str> {
        self.default_name_prefix.as_deref()
    }

    #[must_use]
    pub fn inline_attr_subtype(&self) -> Option<&str> {
        self.inline_attr_subtype.as_deref()
    }

    #[must_use]
    pub fn base(&self) -> Option<&TypeKey> {
        self.base.as_ref()
    }

    #[must_use]
    pub fn is_replaceable(&self) -> bool {
        self.replaceable
    }

    #[must_use]
    pub fn is_default_subtype(&self) -> bool {
        self.default_subtype
    }

    /// Builds an unattached node of this kind.
    #[must_use]
    pub fn create(&self, name: impl Into<String>) -> MetaNode {
        let identity = MetaIdentity::new(self.meta_type(), self.subtype(), name);
        (self.factory)(self, identity)
    }

    /// Folds a resolved base definition into this one. Own declarations win;
    /// everything left unset is inherited.
    pub(crate) fn inherit_from(&mut self, base: &TypeDefinition) {
        let mut attributes: Vec<AttributeSpec> = base
            .attributes
            .iter()
            .filter(|a| self.attribute(&a.name).is_none())
            .cloned()
            .collect();
        attributes.append(&mut self.attributes);
        self.attributes = attributes;

        self.children = match (self.children.take(), &base.children) {
            (None, inherited) => inherited.clone(),
            (Some(own), None) => Some(own),
            (Some(own), Some(inherited)) => {
                let mut merged: Vec<ChildRequirement> = inherited
                    .iter()
                    .filter(|r| !own.iter().any(|o| o.same_pattern(r)))
                    .cloned()
                    .collect();
                merged.extend(own);
                Some(merged)
            }
        };

        if self.default_name.is_none() {
            self.default_name.clone_from(&base.default_name);
        }
        if self.default_name_prefix.is_none() {
            self.default_name_prefix.clone_from(&base.default_name_prefix);
        }
        if self.inline_attr_subtype.is_none() {
            self.inline_attr_subtype.clone_from(&base.inline_attr_subtype);
        }
        self.replaceable |= base.replaceable;
    }
}
