//! Metadata node model.
//!
//! Nodes live in an arena owned by a [`MetaTree`]. Containment is expressed
//! with [`NodeId`] handles: a parent owns the ordered list of its children and
//! a child only records its parent's index, so there are no reference cycles.
//! Inheritance (`super`) is a second, independent link between nodes of the
//! same type.
//!
//! Rules that depend on the type registry or on declared constraints are not
//! known here. They plug in through the [`TreeGuard`] seam, which the tree
//! consults on every attach, value change and validation pass.

mod cache;
mod error;
mod guard;
mod node;
mod snapshot;
mod tree;

pub use cache::NodeCache;
pub use error::{ConstraintViolation, ModelError, ModelResult, ViolationKind};
pub use guard::TreeGuard;
pub use node::{ChildList, MetaNode, NodeId};
pub use snapshot::NodeSnapshot;
pub use tree::MetaTree;

/// Private boolean attribute marking a node as abstract.
pub const ABSTRACT_ATTR: &str = "_isAbstract";
