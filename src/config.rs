//! Configuration file handling.
//!
//! This module loads `.cypher_record.json`: builder conventions plus the
//! relation declarations the linker works from. A missing file means
//! defaults; a malformed one is an error.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::Path;

use crate::linker::{RelationDeclaration, RelationRegistry};
use crate::query::{BuilderConfig, QueryBuilder};

pub const DEFAULT_CONFIG_PATH: &str = ".cypher_record.json";

/// Top-level configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub builder: BuilderConfig,
    #[serde(default)]
    pub relations: Vec<RelationDeclaration>,
}

impl ConfigFile {
    /// Load `.cypher_record.json` from the current directory.
    pub fn load() -> Result<Self, Box<dyn Error>> {
        Self::load_from(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from `path`, falling back to defaults when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The JSON is invalid
    /// - The relation declarations do not form a valid registry
    pub fn load_from(path: &Path) -> Result<Self, Box<dyn Error>> {
        if !path.exists() {
            log::debug!("{} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

        let config: ConfigFile = serde_json::from_str(&content)
            .map_err(|e| format!("Invalid JSON in {}: {}", path.display(), e))?;

        config.registry()?;
        Ok(config)
    }

    pub fn query_builder(&self) -> QueryBuilder {
        QueryBuilder::new(self.builder.clone())
    }

    /// Build the validated relation registry.
    pub fn registry(&self) -> Result<RelationRegistry, Box<dyn Error>> {
        Ok(RelationRegistry::from_declarations(self.relations.clone())?)
    }
}
