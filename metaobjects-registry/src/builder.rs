//! Assembly phase of the type registry.

use crate::definition::TypeDefinition;
use crate::error::{RegistryError, RegistryResult};
use crate::provider::{BUILTIN_PROVIDERS, TypeProvider};
use crate::registry::TypeRegistry;
use metaobjects_types::TypeKey;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

const APPLICATION_PROVIDER: &str = "application";

/// Collects type definitions before they are frozen into a [`TypeRegistry`].
///
/// The builder is single-threaded and consumed by [`freeze`](Self::freeze),
/// so no definition can be added once a registry is in use.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    definitions: Vec<TypeDefinition>,
    positions: HashMap<TypeKey, usize>,
    providers: Vec<String>,
    current_provider: Option<String>,
}

impl RegistryBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder pre-loaded with every provider in [`BUILTIN_PROVIDERS`].
    pub fn with_builtins() -> RegistryResult<Self> {
        let mut builder = Self::new();
        for provider in BUILTIN_PROVIDERS {
            builder.register_provider(*provider)?;
        }
        Ok(builder)
    }

    /// Runs a provider's registrations. Registering the same provider twice
    /// is a no-op.
    pub fn register_provider(&mut self, provider: &dyn TypeProvider) -> RegistryResult<()> {
        let id = provider.id();
        if self.providers.iter().any(|p| p == id) {
            debug!(provider = id, "Type provider already registered");
            return Ok(());
        }

        self.current_provider = Some(id.to_string());
        let before = self.definitions.len();
        let result = provider.register(self);
        self.current_provider = None;
        result?;

        self.providers.push(id.to_string());
        info!(
            provider = id,
            types = self.definitions.len() - before,
            "Registered type provider"
        );
        Ok(())
    }

    /// Adds a definition. Registering an identical definition again is a
    /// no-op; a different definition for a registered key is a conflict.
    pub fn register_type(&mut self, mut definition: TypeDefinition) -> RegistryResult<()> {
        definition.provider = self
            .current_provider
            .clone()
            .unwrap_or_else(|| APPLICATION_PROVIDER.to_string());

        if let Some(&pos) = self.positions.get(definition.key()) {
            let existing = &self.definitions[pos];
            if existing.same_declaration(&definition) {
                debug!(key = %definition.key(), "Ignoring repeated registration");
                return Ok(());
            }
            return Err(RegistryError::DuplicateType {
                key: definition.key().clone(),
                existing: existing.provider().to_string(),
                provider: definition.provider().to_string(),
            });
        }

        self.positions
            .insert(definition.key().clone(), self.definitions.len());
        self.definitions.push(definition);
        Ok(())
    }

    #[must_use]
    pub fn contains(&self, meta_type: &str, subtype: &str) -> bool {
        self.positions.contains_key(&TypeKey::new(meta_type, subtype))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Resolves base-definition inheritance and produces the read-only registry.
    pub fn freeze(self) -> RegistryResult<TypeRegistry> {
        let mut resolved: HashMap<TypeKey, TypeDefinition> = HashMap::new();
        for definition in &self.definitions {
            let mut visiting = HashSet::new();
            self.resolve(definition.key(), &mut visiting, &mut resolved)?;
        }

        let mut default_subtypes: HashMap<String, String> = HashMap::new();
        for definition in &self.definitions {
            if !definition.is_default_subtype() {
                continue;
            }
            let meta_type = definition.meta_type().to_string();
            if let Some(previous) = default_subtypes.get(&meta_type) {
                warn!(
                    meta_type = %meta_type,
                    kept = %previous,
                    ignored = %definition.subtype(),
                    "Type declares more than one default subtype"
                );
                continue;
            }
            default_subtypes.insert(meta_type, definition.subtype().to_string());
        }

        let order: Vec<TypeKey> = self.definitions.iter().map(|d| d.key().clone()).collect();
        let definitions = resolved
            .into_iter()
            .map(|(key, def)| (key, Arc::new(def)))
            .collect();

        info!(types = order.len(), providers = self.providers.len(), "Type registry frozen");
        Ok(TypeRegistry::new(definitions, order, default_subtypes, self.providers))
    }

    fn resolve(
        &self,
        key: &TypeKey,
        visiting: &mut HashSet<TypeKey>,
        resolved: &mut HashMap<TypeKey, TypeDefinition>,
    ) -> RegistryResult<()> {
        if resolved.contains_key(key) {
            return Ok(());
        }
        if !visiting.insert(key.clone()) {
            return Err(RegistryError::InheritanceCycle(key.clone()));
        }

        let Some(&pos) = self.positions.get(key) else {
            return Ok(());
        };
        let mut definition = self.definitions[pos].clone();
        if let Some(base_key) = definition.base().cloned() {
            if !self.positions.contains_key(&base_key) {
                return Err(RegistryError::UnresolvedBase {
                    key: key.clone(),
                    base: base_key,
                });
            }
            self.resolve(&base_key, visiting, resolved)?;
            if let Some(base) = resolved.get(&base_key) {
                definition.inherit_from(base);
            }
        }
        resolved.insert(key.clone(), definition);
        Ok(())
    }
}
