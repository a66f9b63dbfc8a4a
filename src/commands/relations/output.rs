//! Output formatting for relations command results.

use super::execute::{RelationRow, RelationsResult};
use crate::output::Outputable;

fn format_row(row: &RelationRow) -> String {
    let mut line = format!(
        "{}.{} -> {} ({}, {})",
        row.owner, row.name, row.target, row.direction, row.multiplicity
    );
    if !row.edge_type.is_empty() {
        line.push_str(&format!(" [{}]", row.edge_type));
    }
    if let Some(via) = &row.via {
        line.push_str(&format!(" via {}", via));
    }
    if let Some(index_by) = &row.index_by {
        line.push_str(&format!(" indexed by {}", index_by));
    }
    line
}

impl Outputable for RelationsResult {
    fn to_table(&self) -> String {
        let mut lines = Vec::new();

        let header = match &self.owner_filter {
            Some(owner) => format!("Relations of {}", owner),
            None => "Relations".to_string(),
        };
        lines.push(header);
        lines.push(String::new());

        if self.relations.is_empty() {
            lines.push("No relations declared.".to_string());
        } else {
            lines.push(format!("Found {} relation(s):", self.relations.len()));
            for row in &self.relations {
                lines.push(format!("  {}", format_row(row)));
            }
        }

        lines.join("\n")
    }
}
