use crate::error::ConstraintViolation;
use crate::node::NodeId;
use crate::tree::MetaTree;
use metaobjects_types::{AttrValue, MetaIdentity};

/// Hook through which placement and validation rules are enforced while a
/// tree is built.
///
/// All methods default to accepting everything, so a tree without a guard
/// (or with a guard that overrides nothing) is fully permissive.
pub trait TreeGuard: Send + Sync {
    /// Called before `child` is attached under `parent`.
    fn check_attach(
        &self,
        _tree: &MetaTree,
        _parent: NodeId,
        _child: &MetaIdentity,
    ) -> Result<(), ConstraintViolation> {
        Ok(())
    }

    /// Called when a node's value is set, and again for every valued node
    /// during validation.
    fn check_value(
        &self,
        _tree: &MetaTree,
        _node: NodeId,
        _value: Option<&AttrValue>,
    ) -> Result<(), ConstraintViolation> {
        Ok(())
    }

    /// Called for every node during validation, after its children.
    fn check_complete(&self, _tree: &MetaTree, _node: NodeId) -> Result<(), ConstraintViolation> {
        Ok(())
    }
}
