//! Core type definitions for the MetaObjects metadata engine.
//!
//! This crate holds the vocabulary shared by every other crate:
//! - Node identity (`type`, `subtype`, `name`) and registry keys
//! - The `::`-delimited qualified-name grammar and package arithmetic
//! - Typed attribute values and literal sniffing
//!
//! It has no knowledge of trees, registries or constraints.

mod identity;
pub mod name;
mod value;

pub use identity::{MetaIdentity, TypeKey};
pub use value::{AttrValue, ValueKind};

/// Type category of the loader root node.
pub const TYPE_METADATA: &str = "metadata";
/// Type category of objects.
pub const TYPE_OBJECT: &str = "object";
/// Type category of fields.
pub const TYPE_FIELD: &str = "field";
/// Type category of attributes.
pub const TYPE_ATTR: &str = "attr";
/// Type category of validators.
pub const TYPE_VALIDATOR: &str = "validator";
/// Type category of keys.
pub const TYPE_KEY: &str = "key";
/// Subtype every type family uses for its inheritable base definition.
pub const SUBTYPE_BASE: &str = "base";

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in identity, naming and value operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("cannot expand '{value}' against package '{base}': {reason}")]
    InvalidPackage {
        base: String,
        value: String,
        reason: String,
    },

    #[error("'{text}' is not a valid {kind} literal")]
    InvalidLiteral { kind: ValueKind, text: String },

    #[error("unknown value kind: {0}")]
    UnknownValueKind(String),
}
