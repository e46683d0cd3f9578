//! Type registry for the metadata engine.
//!
//! Every constructible node kind is described by a [`TypeDefinition`] keyed by
//! `(type, subtype)`. Definitions are contributed by [`TypeProvider`]s during an
//! assembly phase on a [`RegistryBuilder`]; [`RegistryBuilder::freeze`] resolves
//! base-definition inheritance and yields an immutable [`TypeRegistry`] that is
//! safe to share across threads.

mod builder;
mod builtin;
mod definition;
mod error;
mod provider;
mod registry;

pub use builder::RegistryBuilder;
pub use builtin::{AttributeTypes, CoreTypes, FieldTypes, KeyTypes, ObjectTypes, ValidatorTypes};
pub use definition::{
    AttributeSpec, ChildRequirement, NodeFactory, TypeDefinition, attribute_node, standard_node,
};
pub use error::{RegistryError, RegistryResult};
pub use provider::{BUILTIN_PROVIDERS, TypeProvider};
pub use registry::{HealthReport, TypeRegistry};

/// Pattern token matching any type, subtype or name in a child requirement.
pub const ANY: &str = "*";
