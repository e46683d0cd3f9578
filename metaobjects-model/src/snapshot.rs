use metaobjects_types::{AttrValue, MetaIdentity};
use serde::Serialize;

/// Owned, comparable view of a subtree.
///
/// Snapshots capture identity, value, the path of the super node and the
/// public children in order. Private attributes, cache entries and arena
/// positions are left out, so two trees built the same way compare equal
/// regardless of how their arenas were filled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSnapshot {
    #[serde(flatten)]
    pub identity: MetaIdentity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<AttrValue>,
    #[serde(rename = "super", skip_serializing_if = "Option::is_none")]
    pub super_path: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

impl NodeSnapshot {
    /// Finds a direct child snapshot by type and name.
    #[must_use]
    pub fn child(&self, meta_type: &str, name: &str) -> Option<&NodeSnapshot> {
        self.children
            .iter()
            .find(|c| c.identity.meta_type == meta_type && c.identity.name == name)
    }
}
