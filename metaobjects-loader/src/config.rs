//! Loader configuration, read from the `[loader]` table of a TOML file.

use crate::error::LoaderResult;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Name of the loader's root node.
    pub name: String,
    /// Raise recoverable anomalies instead of logging them once.
    pub strict: bool,
    /// Package for documents that do not declare one.
    pub default_package: Option<String>,
    /// Log at debug level.
    pub verbose: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            name: "metadata".to_string(),
            strict: false,
            default_package: None,
            verbose: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    loader: LoaderConfig,
}

impl LoaderConfig {
    /// Parses a TOML document with a `[loader]` table.
    pub fn from_toml_str(contents: &str) -> LoaderResult<Self> {
        let file: ConfigFile = toml::from_str(contents)?;
        Ok(file.loader)
    }

    /// Reads configuration from `path`, falling back to defaults when the
    /// file is missing or malformed.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("No loader config at {:?}, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(config) => {
                    info!("Loaded loader config from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!("Failed to parse loader config {:?}: {}. Using defaults.", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read loader config {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    #[must_use]
    pub fn with_default_package(mut self, package: impl Into<String>) -> Self {
        self.default_package = Some(package.into());
        self
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}
