use crate::pattern::TargetPattern;
use metaobjects_types::MetaIdentity;

/// Allows or forbids attaching children matching `child` under parents
/// matching `parent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementConstraint {
    pub id: String,
    pub description: String,
    pub parent: TargetPattern,
    pub child: TargetPattern,
    pub allowed: bool,
}

impl PlacementConstraint {
    #[must_use]
    pub fn allow(id: impl Into<String>, parent: TargetPattern, child: TargetPattern) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            parent,
            child,
            allowed: true,
        }
    }

    #[must_use]
    pub fn forbid(id: impl Into<String>, parent: TargetPattern, child: TargetPattern) -> Self {
        Self {
            allowed: false,
            ..Self::allow(id, parent, child)
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn applies_to(&self, parent: &MetaIdentity, child: &MetaIdentity) -> bool {
        self.parent.matches(parent) && self.child.matches(child)
    }

    #[must_use]
    pub fn wildcards(&self) -> usize {
        self.parent.wildcards() + self.child.wildcards()
    }
}
