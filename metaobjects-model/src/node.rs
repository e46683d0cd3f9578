//! Nodes, handles and child collections.

use crate::cache::NodeCache;
use metaobjects_types::{AttrValue, MetaIdentity, ValueKind};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Handle to a node inside a [`MetaTree`](crate::MetaTree) arena.
///
/// Handles are only meaningful for the tree that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Ordered children of a node, indexed by `(type, name)`.
///
/// The order vector is copy-on-write: [`ChildList::snapshot`] hands out the
/// current vector and a later append allocates a new one, so an iteration in
/// progress never observes a partial update.
#[derive(Debug, Clone, Default)]
pub struct ChildList {
    order: Arc<Vec<NodeId>>,
    index: HashMap<(String, String), NodeId>,
}

impl ChildList {
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.order.iter().copied()
    }

    /// A stable view of the current order.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Vec<NodeId>> {
        Arc::clone(&self.order)
    }

    /// Finds a child by exact `(type, name)`.
    #[must_use]
    pub fn get(&self, meta_type: &str, name: &str) -> Option<NodeId> {
        self.index
            .get(&(meta_type.to_string(), name.to_string()))
            .copied()
    }

    pub(crate) fn push(&mut self, identity: &MetaIdentity, id: NodeId) {
        Arc::make_mut(&mut self.order).push(id);
        self.index
            .insert((identity.meta_type.clone(), identity.name.clone()), id);
    }

    pub(crate) fn remove(&mut self, identity: &MetaIdentity, id: NodeId) -> bool {
        let before = self.order.len();
        Arc::make_mut(&mut self.order).retain(|child| *child != id);
        let key = (identity.meta_type.clone(), identity.name.clone());
        if self.index.get(&key) == Some(&id) {
            self.index.remove(&key);
        }
        self.order.len() != before
    }
}

/// One element of a described schema: an object, field, attribute, validator,
/// key or the loader root.
#[derive(Debug, Clone)]
pub struct MetaNode {
    identity: MetaIdentity,
    pub(crate) value_kind: Option<ValueKind>,
    pub(crate) value: Option<AttrValue>,
    replaceable: bool,
    pub(crate) overlay: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) super_data: Option<NodeId>,
    pub(crate) children: ChildList,
    pub(crate) cache: NodeCache,
}

impl MetaNode {
    #[must_use]
    pub fn new(identity: MetaIdentity) -> Self {
        Self {
            identity,
            value_kind: None,
            value: None,
            replaceable: false,
            overlay: false,
            parent: None,
            super_data: None,
            children: ChildList::default(),
            cache: NodeCache::new(),
        }
    }

    /// Declares the kind every value of this node is coerced to.
    #[must_use]
    pub fn with_value_kind(mut self, kind: ValueKind) -> Self {
        self.value_kind = Some(kind);
        self
    }

    /// Marks the node as silently replaced when a same-named sibling is added.
    #[must_use]
    pub fn with_replaceable(mut self, replaceable: bool) -> Self {
        self.replaceable = replaceable;
        self
    }

    /// A fresh, unattached copy of this node's own state.
    pub(crate) fn detached_copy(&self) -> Self {
        Self {
            identity: self.identity.clone(),
            value_kind: self.value_kind,
            value: self.value.clone(),
            replaceable: self.replaceable,
            overlay: self.overlay,
            parent: None,
            super_data: self.super_data,
            children: ChildList::default(),
            cache: NodeCache::new(),
        }
    }

    #[must_use]
    pub fn identity(&self) -> &MetaIdentity {
        &self.identity
    }

    #[must_use]
    pub fn meta_type(&self) -> &str {
        &self.identity.meta_type
    }

    #[must_use]
    pub fn subtype(&self) -> &str {
        &self.identity.subtype
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.identity.name
    }

    /// The node's own value, ignoring anything inherited.
    #[must_use]
    pub fn value(&self) -> Option<&AttrValue> {
        self.value.as_ref()
    }

    #[must_use]
    pub fn value_kind(&self) -> Option<ValueKind> {
        self.value_kind
    }

    #[must_use]
    pub fn is_replaceable(&self) -> bool {
        self.replaceable
    }

    /// True if the node was produced by wrapping another node.
    #[must_use]
    pub fn is_overlay(&self) -> bool {
        self.overlay
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[must_use]
    pub fn super_data(&self) -> Option<NodeId> {
        self.super_data
    }

    #[must_use]
    pub fn children(&self) -> &ChildList {
        &self.children
    }

    #[must_use]
    pub fn cache(&self) -> &NodeCache {
        &self.cache
    }
}
