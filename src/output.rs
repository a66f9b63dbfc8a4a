//! Output formatting for command results.
//!
//! Supports multiple output formats: table (human-readable), JSON, and toon.

use clap::ValueEnum;
use serde::Serialize;

use crate::query::Translated;

/// Output format for command results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// Token-efficient toon format
    Toon,
}

/// Trait for types that can be formatted for output
pub trait Outputable: Serialize {
    /// Format as a human-readable table
    fn to_table(&self) -> String;

    /// Format according to the specified output format
    fn format(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Table => self.to_table(),
            OutputFormat::Json => serde_json::to_string_pretty(self).unwrap_or_default(),
            OutputFormat::Toon => {
                let json_value = serde_json::to_value(self).unwrap_or_default();
                toon::encode(&json_value, None)
            }
        }
    }
}

/// Statement text followed by its parameters, one per line.
impl Outputable for Translated {
    fn to_table(&self) -> String {
        let mut lines = vec![self.text.clone(), String::new()];
        if self.params.is_empty() {
            lines.push("Parameters: (none)".to_string());
        } else {
            lines.push("Parameters:".to_string());
            for (name, value) in &self.params {
                lines.push(format!("  {} = {}", name, value));
            }
        }
        lines.join("\n")
    }
}
