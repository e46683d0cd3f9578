//! Node identity and registry keys.

use crate::name;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a constructible `(type, subtype)` pair in the type registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeKey {
    pub meta_type: String,
    pub subtype: String,
}

impl TypeKey {
    #[must_use]
    pub fn new(meta_type: impl Into<String>, subtype: impl Into<String>) -> Self {
        Self {
            meta_type: meta_type.into(),
            subtype: subtype.into(),
        }
    }

    /// Returns true if this key names the `base` definition of its family.
    #[must_use]
    pub fn is_base(&self) -> bool {
        self.subtype == crate::SUBTYPE_BASE
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.meta_type, self.subtype)
    }
}

/// The immutable identity triple of a metadata node.
///
/// `name` may be package-qualified (`acme::Car`) for nodes attached to the
/// loader root; nested nodes carry simple names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetaIdentity {
    pub meta_type: String,
    pub subtype: String,
    pub name: String,
}

impl MetaIdentity {
    #[must_use]
    pub fn new(
        meta_type: impl Into<String>,
        subtype: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            meta_type: meta_type.into(),
            subtype: subtype.into(),
            name: name.into(),
        }
    }

    /// The registry key this identity was constructed from.
    #[must_use]
    pub fn type_key(&self) -> TypeKey {
        TypeKey::new(&self.meta_type, &self.subtype)
    }

    /// The last `::` segment of the name.
    #[must_use]
    pub fn short_name(&self) -> &str {
        name::split_qualified(&self.name).1
    }

    /// The package portion of the name, empty when the name is unqualified.
    #[must_use]
    pub fn package(&self) -> &str {
        name::split_qualified(&self.name).0
    }

    /// True for attribute nodes whose name carries the private marker.
    #[must_use]
    pub fn is_private(&self) -> bool {
        self.meta_type == crate::TYPE_ATTR && name::is_private(&self.name)
    }
}

impl fmt::Display for MetaIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}({})", self.meta_type, self.subtype, self.name)
    }
}
