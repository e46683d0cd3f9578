use metaobjects_model::{
    ConstraintViolation, MetaNode, MetaTree, ModelError, NodeId, TreeGuard, ViolationKind,
};
use metaobjects_types::{AttrValue, MetaIdentity, ValueKind};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn node(meta_type: &str, subtype: &str, name: &str) -> MetaNode {
    MetaNode::new(MetaIdentity::new(meta_type, subtype, name))
}

fn attr(name: &str, kind: ValueKind) -> MetaNode {
    MetaNode::new(MetaIdentity::new("attr", kind.subtype(), name))
        .with_value_kind(kind)
        .with_replaceable(true)
}

fn new_tree() -> MetaTree {
    MetaTree::new(node("metadata", "base", "test"))
}

// ── Containment ─────────────────────────────────────────────────

#[test]
fn attach_preserves_insertion_order() {
    let mut tree = new_tree();
    let root = tree.root();
    let a = tree.attach(root, node("object", "pojo", "A")).unwrap();
    let b = tree.attach(root, node("object", "pojo", "B")).unwrap();
    let c = tree.attach(root, node("field", "string", "c")).unwrap();
    assert_eq!(*tree.children(root), vec![a, b, c]);
    assert_eq!(tree.parent_of(b), Some(root));
}

#[test]
fn duplicate_type_and_name_is_rejected() {
    let mut tree = new_tree();
    let root = tree.root();
    tree.attach(root, node("object", "pojo", "A")).unwrap();
    let err = tree.attach(root, node("object", "map", "A")).unwrap_err();
    assert!(matches!(err, ModelError::DuplicateChild { .. }));
}

#[test]
fn same_name_different_type_is_allowed() {
    let mut tree = new_tree();
    let root = tree.root();
    tree.attach(root, node("object", "pojo", "A")).unwrap();
    assert!(tree.attach(root, node("field", "string", "A")).is_ok());
}

#[test]
fn replaceable_child_is_swapped_in_place_of_old() {
    let mut tree = new_tree();
    let root = tree.root();
    let obj = tree.attach(root, node("object", "pojo", "A")).unwrap();
    let first = tree.attach(obj, attr("maxLength", ValueKind::Int)).unwrap();
    let second = tree.attach(obj, attr("maxLength", ValueKind::Int)).unwrap();

    assert_eq!(*tree.children(obj), vec![second]);
    assert_eq!(tree.parent_of(first), None);
    assert_eq!(tree.try_get_child(obj, Some("attr"), "maxLength", false), Some(second));
}

#[test]
fn attached_node_cannot_be_added_again() {
    let mut tree = new_tree();
    let root = tree.root();
    let a = tree.attach(root, node("object", "pojo", "A")).unwrap();
    let b = tree.attach(root, node("object", "pojo", "B")).unwrap();
    let err = tree.add_child(b, a).unwrap_err();
    assert!(matches!(err, ModelError::AlreadyAttached(_)));
}

#[test]
fn detach_then_reattach() {
    let mut tree = new_tree();
    let root = tree.root();
    let a = tree.attach(root, node("object", "pojo", "A")).unwrap();
    let f = tree.attach(a, node("field", "string", "f")).unwrap();
    let b = tree.attach(root, node("object", "pojo", "B")).unwrap();

    tree.detach(f).unwrap();
    tree.add_child(b, f).unwrap();
    assert!(tree.children(a).is_empty());
    assert_eq!(tree.parent_of(f), Some(b));
}

#[test]
fn detach_unattached_fails() {
    let mut tree = new_tree();
    let loose = tree.insert(node("object", "pojo", "Loose"));
    assert!(matches!(tree.detach(loose), Err(ModelError::NotAttached(_))));
}

#[test]
fn root_cannot_become_its_own_descendant() {
    let mut tree = new_tree();
    let root = tree.root();
    let a = tree.attach(root, node("object", "pojo", "A")).unwrap();
    tree.detach(a).unwrap();
    tree.add_child(root, a).unwrap();
    let err = tree.add_child(a, root).unwrap_err();
    assert!(matches!(err, ModelError::ContainmentCycle { .. }));
}

#[test]
fn descendants_are_pre_order() {
    let mut tree = new_tree();
    let root = tree.root();
    let a = tree.attach(root, node("object", "pojo", "A")).unwrap();
    let f = tree.attach(a, node("field", "string", "f")).unwrap();
    let b = tree.attach(root, node("object", "pojo", "B")).unwrap();
    assert_eq!(tree.descendants(root), vec![root, a, f, b]);
}

#[test]
fn children_snapshot_is_stable_across_appends() {
    let mut tree = new_tree();
    let root = tree.root();
    tree.attach(root, node("object", "pojo", "A")).unwrap();
    let before = tree.children(root);
    tree.attach(root, node("object", "pojo", "B")).unwrap();
    assert_eq!(before.len(), 1);
    assert_eq!(tree.children(root).len(), 2);
}

// ── Lookup ──────────────────────────────────────────────────────

#[test]
fn get_child_missing_is_not_found() {
    let tree = new_tree();
    let err = tree.get_child(tree.root(), Some("object"), "Nope", true).unwrap_err();
    assert!(matches!(err, ModelError::NotFound { .. }));
    assert!(tree.try_get_child(tree.root(), Some("object"), "Nope", true).is_none());
}

#[test]
fn get_child_without_type_matches_any_type() {
    let mut tree = new_tree();
    let root = tree.root();
    let f = tree.attach(root, node("field", "string", "x")).unwrap();
    assert_eq!(tree.try_get_child(root, None, "x", false), Some(f));
}

// ── Values ──────────────────────────────────────────────────────

#[test]
fn set_value_coerces_to_declared_kind() {
    let mut tree = new_tree();
    let root = tree.root();
    let a = tree.attach(root, attr("size", ValueKind::Long)).unwrap();
    tree.set_value(a, AttrValue::Int(40)).unwrap();
    assert_eq!(tree.node(a).value(), Some(&AttrValue::Long(40)));
}

#[test]
fn set_value_rejects_unconvertible_literal() {
    let mut tree = new_tree();
    let root = tree.root();
    let a = tree.attach(root, attr("size", ValueKind::Int)).unwrap();
    let err = tree.set_value(a, AttrValue::String("big".into())).unwrap_err();
    assert!(matches!(err, ModelError::Value(_)));
}

// ── Naming ──────────────────────────────────────────────────────

#[test]
fn auto_name_index_follows_highest_existing() {
    let mut tree = new_tree();
    let root = tree.root();
    let obj = tree.attach(root, node("object", "pojo", "A")).unwrap();
    tree.attach(obj, node("validator", "required", "validator1")).unwrap();
    tree.attach(obj, node("validator", "required", "validator2")).unwrap();
    assert_eq!(tree.next_name_index(obj, "validator", "validator"), 3);
    assert_eq!(tree.next_name_index(obj, "key", "key"), 1);
}

#[test]
fn package_comes_from_root_level_ancestor() {
    let mut tree = new_tree();
    let root = tree.root();
    let car = tree.attach(root, node("object", "pojo", "acme::fleet::Car")).unwrap();
    let field = tree.attach(car, node("field", "string", "name")).unwrap();
    let attr_id = tree.attach(field, attr("maxLength", ValueKind::Int)).unwrap();

    assert_eq!(tree.find_package_for(car), "acme::fleet");
    assert_eq!(tree.find_package_for(attr_id), "acme::fleet");
    assert_eq!(tree.path_of(attr_id), "acme::fleet::Car/name/maxLength");
}

// ── Guard seam ──────────────────────────────────────────────────

struct NoNesting;

impl TreeGuard for NoNesting {
    fn check_attach(
        &self,
        tree: &MetaTree,
        parent: NodeId,
        child: &MetaIdentity,
    ) -> Result<(), ConstraintViolation> {
        if tree.identity(parent).meta_type == child.meta_type {
            return Err(ConstraintViolation::new(
                ViolationKind::Placement,
                "no-nesting",
                child.to_string(),
                "same type cannot nest",
            ));
        }
        Ok(())
    }

    fn check_value(
        &self,
        _tree: &MetaTree,
        node: NodeId,
        value: Option<&AttrValue>,
    ) -> Result<(), ConstraintViolation> {
        match value {
            Some(_) => Ok(()),
            None => Err(ConstraintViolation::new(
                ViolationKind::Validation,
                "required",
                node.to_string(),
                "value missing",
            )),
        }
    }
}

#[test]
fn guard_rejects_placement_before_attaching() {
    let mut tree = new_tree().with_guard(Arc::new(NoNesting));
    let root = tree.root();
    let f = tree.attach(root, node("field", "string", "outer")).unwrap();
    let err = tree.attach(f, node("field", "string", "inner")).unwrap_err();
    match err {
        ModelError::Constraint(v) => {
            assert_eq!(v.constraint_id, "no-nesting");
            assert_eq!(v.kind, ViolationKind::Placement);
        }
        other => panic!("expected constraint violation, got {other:?}"),
    }
    assert!(tree.children(f).is_empty());
}

#[test]
fn validate_reports_missing_values() {
    let mut tree = new_tree().with_guard(Arc::new(NoNesting));
    let root = tree.root();
    tree.attach(root, attr("x", ValueKind::String)).unwrap();
    assert!(matches!(
        tree.validate(root),
        Err(ModelError::Constraint(ConstraintViolation { kind: ViolationKind::Validation, .. }))
    ));
}

// ── Concurrency ─────────────────────────────────────────────────

#[test]
fn concurrent_readers_share_a_tree() {
    let mut tree = new_tree();
    let root = tree.root();
    let car = tree.attach(root, node("object", "pojo", "acme::Car")).unwrap();
    for i in 0..32 {
        tree.attach(car, node("field", "string", &format!("f{i}"))).unwrap();
    }

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                let fields = tree.children_of(car, Some("field"), true);
                assert_eq!(fields.len(), 32);
                for field in fields {
                    assert_eq!(tree.find_package_for(field), "acme");
                }
            });
        }
    });
}
