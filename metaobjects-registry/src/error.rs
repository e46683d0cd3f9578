//! Error types for the type registry.

use metaobjects_types::TypeKey;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    #[error("type {key} already registered by provider '{existing}', cannot register it again from '{provider}'")]
    DuplicateType {
        key: TypeKey,
        existing: String,
        provider: String,
    },

    #[error("no type definition for {meta_type}.{subtype}")]
    UnknownType { meta_type: String, subtype: String },

    #[error("type {key} extends {base}, which is not registered")]
    UnresolvedBase { key: TypeKey, base: TypeKey },

    #[error("type {0} is part of an inheritance cycle")]
    InheritanceCycle(TypeKey),

    #[error("a global type registry is already installed")]
    AlreadyInstalled,

    #[error(transparent)]
    Name(#[from] metaobjects_types::Error),
}

pub type RegistryResult<T> = Result<T, RegistryError>;
