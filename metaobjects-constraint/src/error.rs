//! Error types for constraint definitions.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConstraintError {
    #[error("constraint definition parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read constraint definitions {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("constraint '{id}' references unknown abstract '{reference}'")]
    UnknownAbstract { id: String, reference: String },

    #[error("constraint '{id}' has unknown type '{kind}'")]
    UnknownConstraintType { id: String, kind: String },

    #[error("constraint '{id}' is missing parameter '{parameter}'")]
    MissingParameter { id: String, parameter: String },

    #[error("constraint '{id}' has invalid parameter '{parameter}': {reason}")]
    InvalidParameter {
        id: String,
        parameter: String,
        reason: String,
    },

    #[error("constraint '{id}' has an invalid pattern: {source}")]
    InvalidPattern {
        id: String,
        source: regex_lite::Error,
    },

    #[error("constraint '{0}' is already defined")]
    DuplicateConstraint(String),
}

pub type ConstraintResult<T> = Result<T, ConstraintError>;
