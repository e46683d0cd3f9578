use metaobjects_constraint::ViolationKind;
use metaobjects_loader::{
    LoaderConfig, LoaderError, LoadingPhase, MetaDataLoader, SourceDocument, SourceNode,
};
use metaobjects_model::ModelError;
use pretty_assertions::assert_eq;
use std::thread;

fn car_doc() -> SourceDocument {
    SourceDocument::new().package("acme").child(
        SourceNode::new("object")
            .named("Car")
            .child(SourceNode::new("field").named("id").subtype("long"))
            .child(SourceNode::new("key").attr("keys", "id")),
    )
}

// ── Phases ──────────────────────────────────────────────────────

#[test]
fn phases_advance_through_merge_and_init() {
    let mut loader = MetaDataLoader::new(LoaderConfig::default()).unwrap();
    assert_eq!(loader.phase(), LoadingPhase::Uninitialized);
    loader.merge(&car_doc()).unwrap();
    assert_eq!(loader.phase(), LoadingPhase::Loading);
    loader.init().unwrap();
    assert_eq!(loader.phase(), LoadingPhase::Initialized);
    assert!(loader.phase().is_ready());
}

#[test]
fn merge_after_init_is_rejected() {
    let mut loader = MetaDataLoader::new(LoaderConfig::default()).unwrap();
    loader.init().unwrap();
    let err = loader.merge(&car_doc()).unwrap_err();
    match err {
        LoaderError::InvalidPhase { operation, phase } => {
            assert_eq!(operation, "merge");
            assert_eq!(phase, LoadingPhase::Initialized);
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(matches!(loader.init().unwrap_err(), LoaderError::InvalidPhase { .. }));
}

#[test]
fn init_reports_incomplete_nodes_and_stays_loading() {
    let mut loader = MetaDataLoader::new(LoaderConfig::default()).unwrap();
    let doc = SourceDocument::new().child(
        SourceNode::new("object")
            .named("Car")
            .child(SourceNode::new("key").subtype("primary")),
    );
    loader.merge(&doc).unwrap();

    let err = loader.init().unwrap_err();
    match err {
        LoaderError::Model(ModelError::Constraint(violation)) => {
            assert_eq!(violation.kind, ViolationKind::Completeness);
            assert_eq!(violation.constraint_id, "key.primary.required.keys");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(loader.phase(), LoadingPhase::Loading);

    let fix = SourceDocument::new().child(
        SourceNode::new("object")
            .named("Car")
            .child(SourceNode::new("key").named("primary").attr("keys", "id")),
    );
    loader.merge(&fix).unwrap();
    loader.init().unwrap();
}

#[test]
fn abstract_nodes_are_exempt_from_completeness() {
    let mut loader = MetaDataLoader::new(LoaderConfig::default()).unwrap();
    let doc = SourceDocument::new().child(
        SourceNode::new("validator")
            .subtype("regex")
            .named("identifier")
            .abstract_node(),
    );
    loader.merge(&doc).unwrap();
    loader.init().unwrap();
}

#[test]
fn destroy_drops_the_tree() {
    let mut loader = MetaDataLoader::new(LoaderConfig::default()).unwrap();
    loader.merge(&car_doc()).unwrap();
    loader.init().unwrap();
    loader.destroy().unwrap();

    assert_eq!(loader.phase(), LoadingPhase::Destroyed);
    assert!(loader.objects().is_empty());
    assert!(matches!(loader.merge(&car_doc()).unwrap_err(), LoaderError::InvalidPhase { .. }));
    assert!(loader.destroy().is_err());
}

// ── Concurrency ─────────────────────────────────────────────────

#[test]
fn independent_loaders_build_in_parallel() {
    let snapshots: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    let mut loader = MetaDataLoader::new(LoaderConfig::default()).unwrap();
                    loader.merge(&car_doc()).unwrap();
                    loader.init().unwrap();
                    loader.tree().snapshot(loader.root())
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(snapshots.windows(2).all(|pair| pair[0] == pair[1]));
}

#[test]
fn initialized_tree_serves_concurrent_readers() {
    let mut loader = MetaDataLoader::new(LoaderConfig::default()).unwrap();
    loader.merge(&car_doc()).unwrap();
    loader.init().unwrap();
    let loader = &loader;

    thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(move || {
                let car = loader.get_by_name("object", "acme::Car").unwrap();
                let fields = loader.children_of(car, Some("field"), true);
                assert_eq!(fields.len(), 1);
                assert_eq!(loader.find_package_for(fields[0]), "acme");
            });
        }
    });
}

// ── Configuration ───────────────────────────────────────────────

#[test]
fn config_reads_the_loader_table() {
    let config = LoaderConfig::from_toml_str(
        r#"
[loader]
name = "catalog"
strict = true
default_package = "acme"
"#,
    )
    .unwrap();
    assert_eq!(config.name, "catalog");
    assert!(config.strict);
    assert_eq!(config.default_package.as_deref(), Some("acme"));
    assert!(!config.verbose);
}

#[test]
fn config_without_table_is_default() {
    assert_eq!(LoaderConfig::from_toml_str("").unwrap(), LoaderConfig::default());
}

#[test]
fn config_with_wrong_types_is_an_error() {
    let err = LoaderConfig::from_toml_str("[loader]\nstrict = \"yes\"\n").unwrap_err();
    assert!(matches!(err, LoaderError::Toml(_)));
}

#[test]
fn config_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(
        LoaderConfig::load_from(dir.path().join("missing.toml")),
        LoaderConfig::default()
    );

    let broken = dir.path().join("broken.toml");
    std::fs::write(&broken, "[loader\nstrict = ").unwrap();
    assert_eq!(LoaderConfig::load_from(&broken), LoaderConfig::default());

    let good = dir.path().join("loader.toml");
    std::fs::write(&good, "[loader]\nstrict = true\n").unwrap();
    assert!(LoaderConfig::load_from(&good).strict);
}

#[test]
fn loader_root_is_named_after_the_config() {
    let loader = MetaDataLoader::new(LoaderConfig::default().named("catalog")).unwrap();
    assert_eq!(loader.tree().identity(loader.root()).name, "catalog");
    assert_eq!(loader.tree().node(loader.root()).meta_type(), "metadata");
}
