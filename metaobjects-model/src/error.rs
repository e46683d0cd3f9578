//! Error types for the node model.

use thiserror::Error;

/// Which family of rule a constraint violation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// A node was attached where it is not allowed.
    Placement,
    /// A name or value failed a validation rule.
    Validation,
    /// A required attribute or child is missing.
    Completeness,
}

/// A failed constraint check, carrying enough context to diagnose it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("constraint '{constraint_id}' violated by {node}: {explanation}")]
pub struct ConstraintViolation {
    pub constraint_id: String,
    pub node: String,
    pub explanation: String,
    pub kind: ViolationKind,
}

impl ConstraintViolation {
    pub fn new(
        kind: ViolationKind,
        constraint_id: impl Into<String>,
        node: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            constraint_id: constraint_id.into(),
            node: node.into(),
            explanation: explanation.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum ModelError {
    #[error("{parent} already has a child {child}")]
    DuplicateChild { parent: String, child: String },

    #[error("{meta_type} '{name}' not found under {parent}")]
    NotFound {
        parent: String,
        meta_type: String,
        name: String,
    },

    #[error("{0} is already attached to a parent")]
    AlreadyAttached(String),

    #[error("{0} is not attached to a parent")]
    NotAttached(String),

    #[error("attaching {child} under {parent} would make a node its own ancestor")]
    ContainmentCycle { parent: String, child: String },

    #[error("super of {node} must have type '{expected}', got '{actual}'")]
    SuperTypeMismatch {
        node: String,
        expected: String,
        actual: String,
    },

    #[error("making {super_node} the super of {node} would create an inheritance cycle")]
    SuperCycle { node: String, super_node: String },

    #[error(transparent)]
    Constraint(#[from] ConstraintViolation),

    #[error(transparent)]
    Value(#[from] metaobjects_types::Error),
}

pub type ModelResult<T> = Result<T, ModelError>;
