//! Loader lifecycle and read API.
//!
//! Owns one metadata tree, merges documents into it and, once initialized,
//! serves lookups to generators.

use crate::config::LoaderConfig;
use crate::error::{LoaderError, LoaderResult};
use crate::json;
use crate::merge::{MergeReport, Merger};
use crate::phase::LoadingPhase;
use crate::source::SourceDocument;
use metaobjects_constraint::ConstraintEngine;
use metaobjects_model::{MetaTree, NodeId};
use metaobjects_registry::TypeRegistry;
use metaobjects_types::{TYPE_METADATA, TYPE_OBJECT};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

pub struct MetaDataLoader {
    config: LoaderConfig,
    registry: Arc<TypeRegistry>,
    engine: Arc<ConstraintEngine>,
    tree: MetaTree,
    phase: LoadingPhase,
}

impl std::fmt::Debug for MetaDataLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetaDataLoader")
            .field("name", &self.config.name)
            .field("phase", &self.phase)
            .field("tree", &self.tree)
            .finish()
    }
}

impl MetaDataLoader {
    /// A loader backed by the process-wide registry and the built-in
    /// constraints.
    pub fn new(config: LoaderConfig) -> LoaderResult<Self> {
        let registry = TypeRegistry::global()?;
        let engine = ConstraintEngine::with_defaults(registry)?;
        Self::with_engine(config, engine)
    }

    /// A loader enforcing `engine`, and using the engine's registry.
    pub fn with_engine(config: LoaderConfig, engine: ConstraintEngine) -> LoaderResult<Self> {
        let registry = Arc::clone(engine.registry());
        let engine = Arc::new(engine);
        let tree = Self::empty_tree(&registry, &config.name)?.with_guard(engine.clone());
        debug!(name = %config.name, strict = config.strict, "Created loader");
        Ok(Self {
            config,
            registry,
            engine,
            tree,
            phase: LoadingPhase::Uninitialized,
        })
    }

    fn empty_tree(registry: &TypeRegistry, name: &str) -> LoaderResult<MetaTree> {
        let root = registry.create_instance(TYPE_METADATA, None, name)?;
        Ok(MetaTree::new(root))
    }

    // ── Build phase ─────────────────────────────────────────────

    /// Merges a document. On failure the tree is left exactly as it was.
    pub fn merge(&mut self, document: &SourceDocument) -> LoaderResult<MergeReport> {
        self.ensure_accepts("merge")?;

        let origin = document.origin_or_default();
        let mut staged = self.tree.clone();
        let report = Merger::new(&mut staged, &self.registry, &self.config, origin).merge(document)?;
        self.tree = staged;
        self.phase = LoadingPhase::Loading;

        info!(origin, %report, "Merged document");
        Ok(report)
    }

    /// Parses and merges a JSON document.
    pub fn merge_str(&mut self, text: &str, origin: &str) -> LoaderResult<MergeReport> {
        let document = json::read_document(text, origin)?;
        self.merge(&document)
    }

    /// Reads, parses and merges a JSON file.
    pub fn merge_file(&mut self, path: &Path) -> LoaderResult<MergeReport> {
        let text = std::fs::read_to_string(path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.merge_str(&text, &path.display().to_string())
    }

    /// Runs the final validation pass and moves the loader into the read
    /// phase. No documents can be merged afterwards.
    pub fn init(&mut self) -> LoaderResult<()> {
        self.ensure_accepts("init")?;
        self.tree.validate(self.tree.root())?;
        self.phase = LoadingPhase::Initialized;
        info!(name = %self.config.name, nodes = self.tree.descendants(self.tree.root()).len(), "Loader initialized");
        Ok(())
    }

    /// Drops the tree. The loader only reports its phase afterwards.
    pub fn destroy(&mut self) -> LoaderResult<()> {
        if self.phase == LoadingPhase::Destroyed {
            return Err(LoaderError::InvalidPhase {
                operation: "destroy",
                phase: self.phase,
            });
        }
        self.tree = Self::empty_tree(&self.registry, &self.config.name)?;
        self.phase = LoadingPhase::Destroyed;
        debug!(name = %self.config.name, "Loader destroyed");
        Ok(())
    }

    fn ensure_accepts(&self, operation: &'static str) -> LoaderResult<()> {
        if self.phase.accepts_documents() {
            Ok(())
        } else {
            Err(LoaderError::InvalidPhase {
                operation,
                phase: self.phase,
            })
        }
    }

    // ── Read API ────────────────────────────────────────────────

    #[must_use]
    pub fn phase(&self) -> LoadingPhase {
        self.phase
    }

    #[must_use]
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn engine(&self) -> &ConstraintEngine {
        &self.engine
    }

    #[must_use]
    pub fn tree(&self) -> &MetaTree {
        &self.tree
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    /// A root-level node by type and fully qualified name.
    #[must_use]
    pub fn get_by_name(&self, meta_type: &str, qualified_name: &str) -> Option<NodeId> {
        self.tree
            .try_get_child(self.tree.root(), Some(meta_type), qualified_name, false)
    }

    /// Root-level objects in declaration order.
    #[must_use]
    pub fn objects(&self) -> Vec<NodeId> {
        self.tree.children_of(self.tree.root(), Some(TYPE_OBJECT), false)
    }

    #[must_use]
    pub fn children_of(&self, node: NodeId, meta_type: Option<&str>, include_inherited: bool) -> Vec<NodeId> {
        self.tree.children_of(node, meta_type, include_inherited)
    }

    #[must_use]
    pub fn find_package_for(&self, node: NodeId) -> String {
        self.tree.find_package_for(node)
    }

    /// The tree in the JSON document format.
    pub fn to_json(&self) -> LoaderResult<String> {
        json::write_document(&self.tree)
    }
}
