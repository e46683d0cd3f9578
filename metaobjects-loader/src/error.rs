//! Error types for the loader.

use crate::phase::LoadingPhase;
use metaobjects_constraint::ConstraintError;
use metaobjects_model::ModelError;
use metaobjects_registry::RegistryError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("{origin}: node under '{parent}' has no type")]
    MissingType { origin: String, parent: String },

    #[error("{meta_type} under '{parent}' needs a name: {reason}")]
    MissingName {
        meta_type: String,
        parent: String,
        reason: String,
    },

    #[error("{node}: super reference '{reference}' does not resolve")]
    UnresolvedSuper { node: String, reference: String },

    #[error("{node}: marked as an overlay but nothing exists to overlay")]
    OverlayTargetMissing { node: String },

    #[error("unknown type {meta_type}.{subtype} under '{parent}'")]
    UnknownType {
        meta_type: String,
        subtype: String,
        parent: String,
    },

    #[error("{node}: super '{reference}' declared on an existing node is ignored")]
    RedundantSuper { node: String, reference: String },

    #[error("{node}: inline attribute '{attribute}' is not accepted by this type")]
    InlineAttributeRejected { node: String, attribute: String },

    #[error("{node}: a value is only meaningful on attribute nodes")]
    UnexpectedValue { node: String },

    #[error("cannot {operation} while the loader is {phase}")]
    InvalidPhase {
        operation: &'static str,
        phase: LoadingPhase,
    },

    #[error("{origin}: malformed document: {reason}")]
    Format { origin: String, reason: String },

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Constraint(#[from] ConstraintError),

    #[error(transparent)]
    Name(#[from] metaobjects_types::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl LoaderError {
    /// True for anomalies that lenient mode logs and skips instead of failing.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnknownType { .. }
                | Self::RedundantSuper { .. }
                | Self::InlineAttributeRejected { .. }
                | Self::UnexpectedValue { .. }
        )
    }
}

pub type LoaderResult<T> = Result<T, LoaderError>;
