//! Constraint engine for the metadata engine.
//!
//! Two families of rules are enforced while a tree is built:
//! - **Placement** rules decide whether a child may be attached under a
//!   parent. Explicit rules are consulted first, then the parent's
//!   registry whitelist.
//! - **Validation** rules check node names (on attach) and attribute values
//!   (on every value change and during validation).
//!
//! Rules are scoped by glob-style `(type, subtype, name)` patterns. When
//! several rules of the same kind match, the most specific pattern wins and
//! ties must all pass.
//!
//! [`ConstraintEngine`] implements [`TreeGuard`](metaobjects_model::TreeGuard),
//! so installing it on a tree is all a loader needs to do.

mod definitions;
mod engine;
mod error;
mod pattern;
mod placement;
mod validation;

pub use engine::{ConstraintEngine, SchemaConstraint};
pub use error::{ConstraintError, ConstraintResult};
pub use metaobjects_model::{ConstraintViolation, ViolationKind};
pub use pattern::{Glob, TargetPattern};
pub use placement::PlacementConstraint;
pub use validation::{CustomPredicate, Subject, ValidationConstraint, ValidationRule};

/// Pattern every identifier-like name segment must match.
pub const IDENTIFIER_PATTERN: &str = "^[a-zA-Z][a-zA-Z0-9_]*$";
