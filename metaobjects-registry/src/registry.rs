//! The frozen, shareable type registry.

use crate::builder::RegistryBuilder;
use crate::definition::TypeDefinition;
use crate::error::{RegistryError, RegistryResult};
use metaobjects_model::MetaNode;
use metaobjects_types::{SUBTYPE_BASE, TypeKey, name};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::debug;

static GLOBAL: OnceLock<Arc<TypeRegistry>> = OnceLock::new();

/// Read-only set of resolved type definitions.
#[derive(Debug)]
pub struct TypeRegistry {
    definitions: HashMap<TypeKey, Arc<TypeDefinition>>,
    order: Vec<TypeKey>,
    default_subtypes: HashMap<String, String>,
    providers: Vec<String>,
}

impl TypeRegistry {
    pub(crate) fn new(
        definitions: HashMap<TypeKey, Arc<TypeDefinition>>,
        order: Vec<TypeKey>,
        default_subtypes: HashMap<String, String>,
        providers: Vec<String>,
    ) -> Self {
        Self {
            definitions,
            order,
            default_subtypes,
            providers,
        }
    }

    /// A registry containing only the built-in providers.
    pub fn builtin() -> RegistryResult<Self> {
        RegistryBuilder::with_builtins()?.freeze()
    }

    /// The process-wide registry. Built from the built-in providers on first
    /// use unless an application installed its own first.
    pub fn global() -> RegistryResult<Arc<TypeRegistry>> {
        if let Some(registry) = GLOBAL.get() {
            return Ok(Arc::clone(registry));
        }
        let built = Arc::new(Self::builtin()?);
        Ok(Arc::clone(GLOBAL.get_or_init(|| built)))
    }

    /// Installs the process-wide registry. Fails if one is already in place.
    pub fn install_global(registry: TypeRegistry) -> RegistryResult<Arc<TypeRegistry>> {
        let registry = Arc::new(registry);
        GLOBAL
            .set(Arc::clone(&registry))
            .map_err(|_| RegistryError::AlreadyInstalled)?;
        Ok(registry)
    }

    // ── Lookup ──────────────────────────────────────────────────

    #[must_use]
    pub fn find_type(&self, meta_type: &str, subtype: &str) -> Option<&TypeDefinition> {
        self.definitions
            .get(&TypeKey::new(meta_type, subtype))
            .map(|def| &**def)
    }

    /// Finds a definition, using the type's default subtype when `subtype` is
    /// absent or empty.
    pub fn resolve(&self, meta_type: &str, subtype: Option<&str>) -> RegistryResult<&TypeDefinition> {
        let subtype = match subtype.filter(|s| !s.is_empty()) {
            Some(s) => s,
            None => self.default_subtype(meta_type).unwrap_or(SUBTYPE_BASE),
        };
        self.find_type(meta_type, subtype)
            .ok_or_else(|| RegistryError::UnknownType {
                meta_type: meta_type.to_string(),
                subtype: subtype.to_string(),
            })
    }

    /// The declared default subtype, or `base` when the family has one.
    #[must_use]
    pub fn default_subtype(&self, meta_type: &str) -> Option<&str> {
        if let Some(subtype) = self.default_subtypes.get(meta_type) {
            return Some(subtype.as_str());
        }
        self.find_type(meta_type, SUBTYPE_BASE)
            .map(|_| SUBTYPE_BASE)
    }

    #[must_use]
    pub fn default_name(&self, meta_type: &str, subtype: &str) -> Option<&str> {
        self.find_type(meta_type, subtype)?.default_name()
    }

    #[must_use]
    pub fn default_name_prefix(&self, meta_type: &str, subtype: &str) -> Option<&str> {
        self.find_type(meta_type, subtype)?.default_name_prefix()
    }

    #[must_use]
    pub fn has_type(&self, meta_type: &str) -> bool {
        self.order.iter().any(|k| k.meta_type == meta_type)
    }

    // ── Construction ────────────────────────────────────────────

    /// Builds an unattached node. The name is validated against the name
    /// grammar; nothing else about the node is checked here.
    pub fn create_instance(
        &self,
        meta_type: &str,
        subtype: Option<&str>,
        node_name: &str,
    ) -> RegistryResult<MetaNode> {
        name::validate_name(meta_type, node_name)?;
        let definition = self.resolve(meta_type, subtype)?;
        debug!(key = %definition.key(), name = node_name, "Creating node");
        Ok(definition.create(node_name))
    }

    // ── Introspection ───────────────────────────────────────────

    /// Definitions in registration order.
    pub fn types(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.order
            .iter()
            .filter_map(|key| self.definitions.get(key).map(|def| &**def))
    }

    #[must_use]
    pub fn subtypes_of(&self, meta_type: &str) -> Vec<&str> {
        self.order
            .iter()
            .filter(|k| k.meta_type == meta_type)
            .map(|k| k.subtype.as_str())
            .collect()
    }

    #[must_use]
    pub fn providers(&self) -> &[String] {
        &self.providers
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Summarizes the registry's shape and flags suspicious families.
    #[must_use]
    pub fn health_report(&self) -> HealthReport {
        let mut families: BTreeMap<String, usize> = BTreeMap::new();
        for key in &self.order {
            *families.entry(key.meta_type.clone()).or_default() += 1;
        }

        let mut warnings = Vec::new();
        for meta_type in families.keys() {
            if self.find_type(meta_type, SUBTYPE_BASE).is_none() {
                warnings.push(format!("type '{meta_type}' has no '{SUBTYPE_BASE}' subtype"));
            }
            if !self.default_subtypes.contains_key(meta_type) {
                warnings.push(format!("type '{meta_type}' declares no default subtype"));
            }
        }

        let standalone = self
            .types()
            .filter(|d| d.base().is_none() && !d.key().is_base())
            .map(|d| d.key().clone())
            .collect();

        HealthReport {
            type_count: self.order.len(),
            families,
            standalone,
            warnings,
        }
    }
}

/// Result of [`TypeRegistry::health_report`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    pub type_count: usize,
    /// Number of subtypes per type.
    pub families: BTreeMap<String, usize>,
    /// Non-base definitions that extend nothing.
    pub standalone: Vec<TypeKey>,
    pub warnings: Vec<String>,
}

impl HealthReport {
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.warnings.is_empty()
    }
}

impl fmt::Display for HealthReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} types in {} families", self.type_count, self.families.len())?;
        for (meta_type, count) in &self.families {
            writeln!(f, "  {meta_type}: {count}")?;
        }
        for warning in &self.warnings {
            writeln!(f, "  warning: {warning}")?;
        }
        Ok(())
    }
}
