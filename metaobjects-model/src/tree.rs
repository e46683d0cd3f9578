//! The arena that owns every node of a metadata model.

use crate::error::{ModelError, ModelResult};
use crate::guard::TreeGuard;
use crate::node::{MetaNode, NodeId};
use crate::snapshot::NodeSnapshot;
use crate::ABSTRACT_ATTR;
use metaobjects_types::{AttrValue, MetaIdentity, TYPE_ATTR};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

const PACKAGE_CACHE_KEY: &str = "package";

/// An arena of metadata nodes rooted at a single loader node.
///
/// Detached or replaced nodes stay in the arena until the tree is dropped;
/// they are simply unreachable from the root.
#[derive(Clone)]
pub struct MetaTree {
    nodes: Vec<MetaNode>,
    root: NodeId,
    guard: Option<Arc<dyn TreeGuard>>,
}

impl fmt::Debug for MetaTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetaTree")
            .field("root", &self.node(self.root).identity())
            .field("nodes", &self.nodes.len())
            .field("guarded", &self.guard.is_some())
            .finish()
    }
}

impl MetaTree {
    /// Creates a tree whose root is `root`.
    #[must_use]
    pub fn new(mut root: MetaNode) -> Self {
        root.parent = None;
        Self {
            nodes: vec![root],
            root: NodeId(0),
            guard: None,
        }
    }

    #[must_use]
    pub fn with_guard(mut self, guard: Arc<dyn TreeGuard>) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn set_guard(&mut self, guard: Option<Arc<dyn TreeGuard>>) {
        self.guard = guard;
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the node behind a handle.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this tree.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &MetaNode {
        &self.nodes[id.0]
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&MetaNode> {
        self.nodes.get(id.0)
    }

    fn node_mut(&mut self, id: NodeId) -> &mut MetaNode {
        &mut self.nodes[id.0]
    }

    #[must_use]
    pub fn identity(&self, id: NodeId) -> &MetaIdentity {
        self.node(id).identity()
    }

    /// Number of arena slots, including unreachable nodes.
    #[must_use]
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    fn describe(&self, id: NodeId) -> String {
        self.identity(id).to_string()
    }

    // ── Containment ─────────────────────────────────────────────

    /// Adds a node to the arena without attaching it.
    pub fn insert(&mut self, mut node: MetaNode) -> NodeId {
        node.parent = None;
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Inserts `node` and attaches it under `parent`.
    pub fn attach(&mut self, parent: NodeId, node: MetaNode) -> ModelResult<NodeId> {
        let id = self.insert(node);
        self.add_child(parent, id)?;
        Ok(id)
    }

    /// Attaches an unparented node under `parent`.
    ///
    /// A local child with the same `(type, name)` is an error unless that
    /// child is replaceable, in which case it is detached first. Inherited
    /// children never conflict.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> ModelResult<()> {
        if self.node(child).parent.is_some() {
            return Err(ModelError::AlreadyAttached(self.describe(child)));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(ModelError::ContainmentCycle {
                parent: self.describe(parent),
                child: self.describe(child),
            });
        }

        if let Some(guard) = &self.guard {
            guard.check_attach(self, parent, self.identity(child))?;
        }

        let identity = self.identity(child).clone();
        if let Some(existing) = self
            .node(parent)
            .children
            .get(&identity.meta_type, &identity.name)
        {
            if !self.node(existing).is_replaceable() {
                return Err(ModelError::DuplicateChild {
                    parent: self.describe(parent),
                    child: identity.to_string(),
                });
            }
            debug!(parent = %self.describe(parent), child = %identity, "Replacing child");
            self.detach(existing)?;
        }

        self.node_mut(parent).children.push(&identity, child);
        self.node_mut(child).parent = Some(parent);
        Ok(())
    }

    /// Detaches a node from its parent. The node and its subtree stay valid.
    pub fn detach(&mut self, child: NodeId) -> ModelResult<()> {
        let parent = self
            .node(child)
            .parent
            .ok_or_else(|| ModelError::NotAttached(self.describe(child)))?;
        let identity = self.identity(child).clone();
        self.node_mut(parent).children.remove(&identity, child);
        let node = self.node_mut(child);
        node.parent = None;
        node.cache.remove(PACKAGE_CACHE_KEY);
        Ok(())
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, of: NodeId) -> bool {
        let mut current = Some(of);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self.node(id).parent;
        }
        false
    }

    #[must_use]
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// A stable view of a node's local children.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Arc<Vec<NodeId>> {
        self.node(id).children.snapshot()
    }

    /// All nodes of a subtree in pre-order, starting with `id`.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            let children = self.children(next);
            stack.extend(children.iter().rev().copied());
        }
        out
    }

    // ── Lookup ──────────────────────────────────────────────────

    fn local_child(&self, parent: NodeId, meta_type: Option<&str>, name: &str) -> Option<NodeId> {
        let children = &self.node(parent).children;
        match meta_type {
            Some(meta_type) => children.get(meta_type, name),
            None => children.iter().find(|c| self.node(*c).name() == name),
        }
    }

    /// Finds a child by name, optionally restricted to a type.
    ///
    /// Local children win. With `include_inherited`, the super chain is
    /// searched next; private attributes are invisible at every inherited
    /// level.
    #[must_use]
    pub fn try_get_child(
        &self,
        parent: NodeId,
        meta_type: Option<&str>,
        name: &str,
        include_inherited: bool,
    ) -> Option<NodeId> {
        if let Some(found) = self.local_child(parent, meta_type, name) {
            return Some(found);
        }
        if !include_inherited {
            return None;
        }
        let mut current = self.node(parent).super_data;
        while let Some(ancestor) = current {
            if let Some(found) = self.local_child(ancestor, meta_type, name) {
                if self.identity(found).is_private() {
                    return None;
                }
                return Some(found);
            }
            current = self.node(ancestor).super_data;
        }
        None
    }

    /// Like [`try_get_child`](Self::try_get_child) but fails with `NotFound`.
    pub fn get_child(
        &self,
        parent: NodeId,
        meta_type: Option<&str>,
        name: &str,
        include_inherited: bool,
    ) -> ModelResult<NodeId> {
        self.try_get_child(parent, meta_type, name, include_inherited)
            .ok_or_else(|| ModelError::NotFound {
                parent: self.describe(parent),
                meta_type: meta_type.unwrap_or("*").to_string(),
                name: name.to_string(),
            })
    }

    /// Children of a node, optionally filtered by type.
    ///
    /// With `include_inherited`, local children come first, followed by each
    /// super's children whose `(type, name)` has not been seen yet. Private
    /// attributes are skipped on inherited levels.
    #[must_use]
    pub fn children_of(
        &self,
        id: NodeId,
        meta_type: Option<&str>,
        include_inherited: bool,
    ) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut seen: HashSet<(&str, &str)> = HashSet::new();
        let mut current = Some(id);
        let mut inherited = false;

        while let Some(level) = current {
            for child in self.node(level).children.iter() {
                let identity = self.identity(child);
                if meta_type.is_some_and(|t| t != identity.meta_type) {
                    continue;
                }
                if inherited && identity.is_private() {
                    continue;
                }
                if seen.insert((&identity.meta_type, &identity.name)) {
                    out.push(child);
                }
            }
            if !include_inherited {
                break;
            }
            current = self.node(level).super_data;
            inherited = true;
        }
        out
    }

    // ── Inheritance ─────────────────────────────────────────────

    #[must_use]
    pub fn super_of(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).super_data
    }

    /// Links `id` to `super_id`. Both must share a type and the link must not
    /// close an inheritance cycle.
    pub fn set_super(&mut self, id: NodeId, super_id: NodeId) -> ModelResult<()> {
        let expected = &self.identity(id).meta_type;
        let actual = &self.identity(super_id).meta_type;
        if expected != actual {
            return Err(ModelError::SuperTypeMismatch {
                node: self.describe(id),
                expected: expected.clone(),
                actual: actual.clone(),
            });
        }
        let mut current = Some(super_id);
        while let Some(ancestor) = current {
            if ancestor == id {
                return Err(ModelError::SuperCycle {
                    node: self.describe(id),
                    super_node: self.describe(super_id),
                });
            }
            current = self.node(ancestor).super_data;
        }
        self.node_mut(id).super_data = Some(super_id);
        Ok(())
    }

    /// Creates an unattached overlay of `id`: same identity, no children,
    /// and `id` as its super.
    pub fn wrap(&mut self, id: NodeId) -> NodeId {
        let original = self.node(id);
        let mut wrapper = MetaNode::new(original.identity().clone())
            .with_replaceable(original.is_replaceable());
        wrapper.value_kind = original.value_kind;
        wrapper.overlay = true;
        wrapper.super_data = Some(id);
        self.insert(wrapper)
    }

    /// Copies a subtree into fresh, unattached nodes. Super links are shared
    /// with the original rather than copied.
    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        let copy = self.node(id).detached_copy();
        let copy_id = self.insert(copy);
        let children = self.children(id);
        for child in children.iter() {
            let child_copy = self.deep_clone(*child);
            let identity = self.identity(child_copy).clone();
            self.node_mut(copy_id).children.push(&identity, child_copy);
            self.node_mut(child_copy).parent = Some(copy_id);
        }
        copy_id
    }

    // ── Values ──────────────────────────────────────────────────

    /// Sets a node's value, coercing it to the node's declared kind and
    /// running value constraints.
    pub fn set_value(&mut self, id: NodeId, value: AttrValue) -> ModelResult<()> {
        let value = match self.node(id).value_kind {
            Some(kind) => value.convert(kind)?,
            None => value,
        };
        if let Some(guard) = &self.guard {
            guard.check_value(self, id, Some(&value))?;
        }
        self.node_mut(id).value = Some(value);
        Ok(())
    }

    /// The node's value, falling back along the super chain.
    #[must_use]
    pub fn resolved_value(&self, id: NodeId) -> Option<&AttrValue> {
        let mut current = Some(id);
        while let Some(level) = current {
            let node = self.node(level);
            if let Some(value) = node.value() {
                return Some(value);
            }
            current = node.super_data;
        }
        None
    }

    /// Resolves an attribute value by name, including inherited attributes.
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&AttrValue> {
        let attr = self.try_get_child(id, Some(TYPE_ATTR), name, true)?;
        self.resolved_value(attr)
    }

    /// True if the node carries a local `_isAbstract = true` attribute.
    #[must_use]
    pub fn is_abstract(&self, id: NodeId) -> bool {
        self.try_get_child(id, Some(TYPE_ATTR), ABSTRACT_ATTR, false)
            .and_then(|attr| self.node(attr).value())
            .and_then(AttrValue::as_bool)
            .unwrap_or(false)
    }

    // ── Naming ──────────────────────────────────────────────────

    /// The package context of a node: the package of its root-level ancestor.
    ///
    /// Memoized in the node cache once the node is attached.
    #[must_use]
    pub fn find_package_for(&self, id: NodeId) -> String {
        let node = self.node(id);
        let Some(parent) = node.parent else {
            return node.identity().package().to_string();
        };
        let package = node.cache.get_or_insert_with(PACKAGE_CACHE_KEY, || {
            if parent == self.root {
                node.identity().package().to_string()
            } else {
                self.find_package_for(parent)
            }
        });
        package.as_ref().clone()
    }

    /// Slash-separated names from the root (exclusive) down to `id`.
    #[must_use]
    pub fn path_of(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(level) = current {
            if level == self.root {
                break;
            }
            names.push(self.node(level).name());
            current = self.node(level).parent;
        }
        names.reverse();
        names.join("/")
    }

    /// Next free index for auto-naming `prefix<n>` children of `meta_type`,
    /// counting inherited children too. Starts at 1.
    #[must_use]
    pub fn next_name_index(&self, parent: NodeId, meta_type: &str, prefix: &str) -> u32 {
        self.children_of(parent, Some(meta_type), true)
            .into_iter()
            .filter_map(|child| {
                self.node(child)
                    .name()
                    .strip_prefix(prefix)
                    .and_then(|rest| rest.parse::<u32>().ok())
            })
            .max()
            .map_or(1, |max| max + 1)
    }

    // ── Validation & comparison ─────────────────────────────────

    /// Runs value and completeness checks over a subtree, children first.
    pub fn validate(&self, id: NodeId) -> ModelResult<()> {
        let Some(guard) = &self.guard else {
            return Ok(());
        };
        for child in self.children(id).iter() {
            self.validate(*child)?;
        }
        if self.node(id).value_kind.is_some() {
            guard.check_value(self, id, self.resolved_value(id))?;
        }
        guard.check_complete(self, id)?;
        Ok(())
    }

    /// Captures a comparable view of a subtree.
    #[must_use]
    pub fn snapshot(&self, id: NodeId) -> NodeSnapshot {
        let node = self.node(id);
        let children = node
            .children
            .iter()
            .filter(|child| !self.identity(*child).is_private())
            .map(|child| self.snapshot(child))
            .collect();
        NodeSnapshot {
            identity: node.identity().clone(),
            value: node.value().cloned(),
            super_path: node.super_data.map(|s| self.path_of(s)),
            children,
        }
    }

    /// Structural equality of two subtrees, possibly in different trees.
    #[must_use]
    pub fn structurally_equal(&self, id: NodeId, other: &MetaTree, other_id: NodeId) -> bool {
        self.snapshot(id) == other.snapshot(other_id)
    }
}
