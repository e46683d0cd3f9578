//! Parser/merger for metadata documents.
//!
//! A [`MetaDataLoader`] owns one metadata tree. Documents are merged into it
//! one at a time: every node is either created through the type registry or
//! overlaid onto a node that already exists, with packages, super references
//! and inline attributes resolved along the way. Constraints are enforced by
//! the [`ConstraintEngine`](metaobjects_constraint::ConstraintEngine)
//! installed on the tree, so a merged document is consistent by
//! construction.
//!
//! Each merge is atomic: the document is applied to a staged copy of the
//! tree, which only replaces the live tree once every node merged cleanly.
//! After all documents are in, [`MetaDataLoader::init`] runs the final
//! validation pass and the tree becomes read-only.

mod config;
mod error;
pub mod json;
mod loader;
mod merge;
mod phase;
mod source;

pub use config::LoaderConfig;
pub use error::{LoaderError, LoaderResult};
pub use loader::MetaDataLoader;
pub use merge::MergeReport;
pub use phase::LoadingPhase;
pub use source::{Literal, SourceDocument, SourceNode};

/// Keys of a document node that never become inline attributes.
pub const RESERVED_KEYS: &[&str] = &[
    "package",
    "name",
    "type",
    "subType",
    "super",
    "value",
    "isAbstract",
    "isInterface",
    "overlay",
    "children",
];

/// Public attribute set by the `isInterface` marker.
pub const INTERFACE_ATTR: &str = "isInterface";
