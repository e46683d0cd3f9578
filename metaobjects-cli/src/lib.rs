//! Library half of the `metaobjects` binary: argument parsing, loader
//! assembly and model rendering.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use metaobjects_constraint::ConstraintEngine;
use metaobjects_loader::{LoaderConfig, MetaDataLoader};
use metaobjects_model::{MetaTree, NodeId};
use metaobjects_registry::TypeRegistry;
use std::fmt::Write;
use std::path::PathBuf;
use tracing::info;

/// Output format for the loaded model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Emit {
    /// Indented outline, one node per line
    #[default]
    Tree,
    /// The JSON document format, re-readable by the loader
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "metaobjects")]
#[command(about = "Load metadata documents, validate them and print the model")]
pub struct Args {
    /// Metadata documents (JSON), merged in order
    #[arg(required = true)]
    pub documents: Vec<PathBuf>,

    /// Loader config file (TOML with a [loader] table)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Fail on anomalies that would otherwise be logged and skipped
    #[arg(long)]
    pub strict: bool,

    /// Package for documents that declare none
    #[arg(short, long)]
    pub package: Option<String>,

    /// Constraint definition files (JSON), may be repeated
    #[arg(long = "constraints", value_name = "FILE")]
    pub constraints: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Emit::Tree)]
    pub emit: Emit,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// The config file's settings with command-line flags applied on top.
#[must_use]
pub fn resolve_config(args: &Args) -> LoaderConfig {
    let mut config = args
        .config
        .as_ref()
        .map(LoaderConfig::load_from)
        .unwrap_or_default();
    if args.strict {
        config.strict = true;
    }
    if let Some(package) = &args.package {
        config.default_package = Some(package.clone());
    }
    config.verbose |= args.verbose;
    config
}

/// A loader on the process-wide registry with the built-in constraints plus
/// any definition files.
pub fn build_loader(config: LoaderConfig, constraint_files: &[PathBuf]) -> Result<MetaDataLoader> {
    let registry = TypeRegistry::global().context("failed to assemble the type registry")?;
    let mut engine = ConstraintEngine::with_defaults(registry)?;
    for path in constraint_files {
        let added = engine
            .load_definitions_file(path)
            .with_context(|| format!("failed to load constraints from {}", path.display()))?;
        info!(path = %path.display(), constraints = added, "Loaded constraint definitions");
    }
    Ok(MetaDataLoader::with_engine(config, engine)?)
}

/// Default log filter for a resolved config.
#[must_use]
pub fn log_level(config: &LoaderConfig) -> &'static str {
    if config.verbose { "debug" } else { "info" }
}

/// Loads every document, initializes the model and renders it.
pub fn run(args: &Args) -> Result<String> {
    run_with_config(args, resolve_config(args))
}

/// Like [`run`], with the config already resolved.
pub fn run_with_config(args: &Args, config: LoaderConfig) -> Result<String> {
    let mut loader = build_loader(config, &args.constraints)?;

    for path in &args.documents {
        let report = loader
            .merge_file(path)
            .with_context(|| format!("failed to merge {}", path.display()))?;
        info!(document = %path.display(), %report, "Document merged");
    }
    loader.init().context("model validation failed")?;

    match args.emit {
        Emit::Tree => Ok(render_tree(loader.tree())),
        Emit::Json => Ok(loader.to_json()?),
    }
}

/// Renders the tree as an indented outline.
///
/// Supers are shown as `: path`, overlay wrappers and abstract nodes are
/// flagged, and attribute values follow `=`. Private attributes are hidden.
#[must_use]
pub fn render_tree(tree: &MetaTree) -> String {
    let mut out = String::new();
    render_node(tree, tree.root(), 0, &mut out);
    out
}

fn render_node(tree: &MetaTree, id: NodeId, depth: usize, out: &mut String) {
    let node = tree.node(id);
    let _ = write!(out, "{:indent$}{}", "", node.identity(), indent = depth * 2);
    if node.is_overlay() {
        out.push_str(" [overlay]");
    } else if let Some(super_id) = node.super_data() {
        let _ = write!(out, " : {}", tree.path_of(super_id));
    }
    if tree.is_abstract(id) {
        out.push_str(" [abstract]");
    }
    if let Some(value) = node.value() {
        let _ = write!(out, " = {value}");
    }
    out.push('\n');

    for child in tree.children(id).iter() {
        if !tree.identity(*child).is_private() {
            render_node(tree, *child, depth + 1, out);
        }
    }
}
