use metaobjects_registry::{
    ANY, RegistryBuilder, RegistryError, RegistryResult, TypeDefinition, TypeProvider,
    attribute_node,
};
use metaobjects_types::{MetaIdentity, ValueKind};
use pretty_assertions::assert_eq;

struct WidgetTypes;

impl TypeProvider for WidgetTypes {
    fn id(&self) -> &'static str {
        "widgets"
    }

    fn register(&self, registry: &mut RegistryBuilder) -> RegistryResult<()> {
        registry.register_type(
            TypeDefinition::new("widget", "base")
                .accepts_child("attr", ANY, ANY)
                .required_attribute("label", ValueKind::String)
                .name_prefix("widget"),
        )?;
        registry.register_type(
            TypeDefinition::new("widget", "button")
                .extends("widget", "base")
                .optional_attribute("action", ValueKind::String)
                .default_subtype(),
        )
    }
}

struct RivalWidgets;

impl TypeProvider for RivalWidgets {
    fn id(&self) -> &'static str {
        "rival"
    }

    fn register(&self, registry: &mut RegistryBuilder) -> RegistryResult<()> {
        registry.register_type(TypeDefinition::new("widget", "button"))
    }
}

// ── Registration ────────────────────────────────────────────────

#[test]
fn provider_definitions_are_tagged_with_provider_id() {
    let mut builder = RegistryBuilder::new();
    builder.register_provider(&WidgetTypes).unwrap();
    let registry = builder.freeze().unwrap();
    assert_eq!(registry.find_type("widget", "button").unwrap().provider(), "widgets");
    assert_eq!(registry.providers(), ["widgets".to_string()]);
}

#[test]
fn registering_same_provider_twice_is_idempotent() {
    let mut builder = RegistryBuilder::new();
    builder.register_provider(&WidgetTypes).unwrap();
    builder.register_provider(&WidgetTypes).unwrap();
    assert_eq!(builder.len(), 2);
}

#[test]
fn identical_definition_registered_again_is_ignored() {
    let mut builder = RegistryBuilder::new();
    builder
        .register_type(TypeDefinition::new("widget", "base").named("first"))
        .unwrap();
    builder
        .register_type(TypeDefinition::new("widget", "base").named("first"))
        .unwrap();
    assert_eq!(builder.len(), 1);
}

#[test]
fn different_definition_for_a_registered_key_is_rejected() {
    let mut builder = RegistryBuilder::new();
    builder
        .register_type(TypeDefinition::new("widget", "base").named("a"))
        .unwrap();
    let err = builder
        .register_type(TypeDefinition::new("widget", "base").named("b"))
        .unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateType { .. }));

    let registry = builder.freeze().unwrap();
    assert_eq!(registry.default_name("widget", "base"), Some("a"));
}

#[test]
fn identical_definition_from_another_provider_is_accepted() {
    struct SameButtons;

    impl TypeProvider for SameButtons {
        fn id(&self) -> &'static str {
            "same-buttons"
        }

        fn register(&self, registry: &mut RegistryBuilder) -> RegistryResult<()> {
            WidgetTypes.register(registry)
        }
    }

    let mut builder = RegistryBuilder::new();
    builder.register_provider(&WidgetTypes).unwrap();
    builder.register_provider(&SameButtons).unwrap();
    assert_eq!(builder.len(), 2);

    let registry = builder.freeze().unwrap();
    assert_eq!(registry.find_type("widget", "button").unwrap().provider(), "widgets");
}

#[test]
fn conflicting_provider_is_rejected() {
    let mut builder = RegistryBuilder::new();
    builder.register_provider(&WidgetTypes).unwrap();
    let err = builder.register_provider(&RivalWidgets).unwrap_err();
    match err {
        RegistryError::DuplicateType { key, existing, provider } => {
            assert_eq!(key.to_string(), "widget.button");
            assert_eq!(existing, "widgets");
            assert_eq!(provider, "rival");
        }
        other => panic!("expected duplicate type, got {other:?}"),
    }
}

// ── Freezing ────────────────────────────────────────────────────

#[test]
fn subtype_inherits_contract_from_base() {
    let mut builder = RegistryBuilder::new();
    builder.register_provider(&WidgetTypes).unwrap();
    let registry = builder.freeze().unwrap();
    let button = registry.find_type("widget", "button").unwrap();

    let names: Vec<&str> = button.attributes().iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["label", "action"]);
    assert!(button.attribute("label").unwrap().required);
    assert_eq!(button.default_name_prefix(), Some("widget"));
    assert!(button.accepts(&MetaIdentity::new("attr", "string", "x")));
    assert!(!button.accepts(&MetaIdentity::new("field", "string", "x")));
}

#[test]
fn own_attribute_overrides_inherited() {
    let mut builder = RegistryBuilder::new();
    builder
        .register_type(TypeDefinition::new("t", "base").optional_attribute("size", ValueKind::Int))
        .unwrap();
    builder
        .register_type(
            TypeDefinition::new("t", "big")
                .extends("t", "base")
                .required_attribute("size", ValueKind::Long),
        )
        .unwrap();
    let registry = builder.freeze().unwrap();
    let size = registry.find_type("t", "big").unwrap().attribute("size").unwrap();
    assert_eq!(size.kind, ValueKind::Long);
    assert!(size.required);
}

#[test]
fn missing_base_fails_to_freeze() {
    let mut builder = RegistryBuilder::new();
    builder
        .register_type(TypeDefinition::new("widget", "button").extends("widget", "base"))
        .unwrap();
    assert!(matches!(builder.freeze(), Err(RegistryError::UnresolvedBase { .. })));
}

#[test]
fn inheritance_cycle_fails_to_freeze() {
    let mut builder = RegistryBuilder::new();
    builder
        .register_type(TypeDefinition::new("t", "a").extends("t", "b"))
        .unwrap();
    builder
        .register_type(TypeDefinition::new("t", "b").extends("t", "a"))
        .unwrap();
    assert!(matches!(builder.freeze(), Err(RegistryError::InheritanceCycle(_))));
}

// ── Construction ────────────────────────────────────────────────

#[test]
fn create_instance_falls_back_to_default_subtype() {
    let mut builder = RegistryBuilder::new();
    builder.register_provider(&WidgetTypes).unwrap();
    let registry = builder.freeze().unwrap();

    let node = registry.create_instance("widget", None, "ok").unwrap();
    assert_eq!(node.subtype(), "button");
    assert_eq!(node.name(), "ok");
    assert!(node.parent().is_none());
}

#[test]
fn create_instance_unknown_type_fails() {
    let registry = RegistryBuilder::new().freeze().unwrap();
    let err = registry.create_instance("widget", Some("button"), "ok").unwrap_err();
    assert!(matches!(err, RegistryError::UnknownType { .. }));
}

#[test]
fn create_instance_validates_name() {
    let mut builder = RegistryBuilder::new();
    builder.register_provider(&WidgetTypes).unwrap();
    let registry = builder.freeze().unwrap();
    assert!(matches!(
        registry.create_instance("widget", None, "1bad"),
        Err(RegistryError::Name(_))
    ));
}

#[test]
fn custom_factory_is_used() {
    let mut builder = RegistryBuilder::new();
    builder
        .register_type(TypeDefinition::new("attr", "int").factory(attribute_node))
        .unwrap();
    let registry = builder.freeze().unwrap();
    let node = registry.create_instance("attr", Some("int"), "size").unwrap();
    assert_eq!(node.value_kind(), Some(ValueKind::Int));
}

// ── Health ──────────────────────────────────────────────────────

#[test]
fn health_report_flags_family_without_base() {
    let mut builder = RegistryBuilder::new();
    builder
        .register_type(TypeDefinition::new("loner", "only"))
        .unwrap();
    let report = builder.freeze().unwrap().health_report();
    assert!(!report.is_healthy());
    assert_eq!(report.families.get("loner"), Some(&1));
    assert!(report.warnings.iter().any(|w| w.contains("no 'base' subtype")));
    assert_eq!(report.standalone.len(), 1);
}
