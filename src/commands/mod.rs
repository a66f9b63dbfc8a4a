//! Command definitions and implementations.
//!
//! Each command is defined in its own module with:
//! - The command struct with clap attributes for CLI parsing
//! - An `Execute` implementation producing an `Outputable` result

mod delete;
mod relations;
mod translate;

pub use delete::DeleteCmd;
pub use relations::{RelationRow, RelationsCmd, RelationsResult};
pub use translate::TranslateCmd;

use clap::Subcommand;
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fs;
use std::path::Path;

use crate::config::ConfigFile;
use crate::output::{OutputFormat, Outputable};
use crate::query::params::internal_name;
use crate::query::Params;

/// Trait for executing commands with command-specific result types.
pub trait Execute {
    type Output: Outputable;

    fn execute(self, config: &ConfigFile) -> Result<Self::Output, Box<dyn Error>>;
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Translate a query descriptor (JSON) into Cypher text and parameters
    Translate(TranslateCmd),

    /// Build the statement deleting matching nodes and their relationships
    Delete(DeleteCmd),

    /// List the configured relations
    Relations(RelationsCmd),
}

impl Command {
    /// Execute the command and return formatted output
    pub fn run(self, config: &ConfigFile, format: OutputFormat) -> Result<String, Box<dyn Error>> {
        match self {
            Command::Translate(cmd) => {
                let result = cmd.execute(config)?;
                Ok(result.format(format))
            }
            Command::Delete(cmd) => {
                let result = cmd.execute(config)?;
                Ok(result.format(format))
            }
            Command::Relations(cmd) => {
                let result = cmd.execute(config)?;
                Ok(result.format(format))
            }
        }
    }
}

/// Read and deserialize a JSON input file.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn Error>> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let value = serde_json::from_str(&content)
        .map_err(|e| format!("Invalid JSON in {}: {}", path.display(), e))?;
    Ok(value)
}

/// Read an external parameter file: a JSON object, keys with or without the `:` prefix.
pub(crate) fn read_params(path: Option<&Path>) -> Result<Params, Box<dyn Error>> {
    let Some(path) = path else {
        return Ok(Params::new());
    };
    let raw: Params = read_json(path)?;
    Ok(raw
        .into_iter()
        .map(|(name, value)| (internal_name(&name), value))
        .collect())
}
