//! Transport that speaks Cypher through an external executor.

use serde_json::Value;

use super::{CommandResult, EdgeHandle, GraphTransport, NodeHandle, Row, TransportError};
use crate::query::{Params, QueryBuilder};

/// Anything that can run a Cypher statement with `{name}` parameters.
pub trait CypherExecutor: Send + Sync {
    fn run(&self, text: &str, params: &Params) -> Result<Vec<Row>, TransportError>;
}

/// Implements the transport primitives as generated Cypher statements.
pub struct CypherTransport<E: CypherExecutor> {
    builder: QueryBuilder,
    executor: E,
}

impl<E: CypherExecutor> CypherTransport<E> {
    pub fn new(builder: QueryBuilder, executor: E) -> Self {
        Self { builder, executor }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Returns the node object of a row: the anchor column when present,
    /// otherwise the row itself (already flattened to `{id, ...}`).
    fn node_row<'r>(&self, row: &'r Row) -> &'r Row {
        match row.get(&self.builder.config().identifier) {
            Some(Value::Object(node)) => node,
            _ => row,
        }
    }
}

fn row_id(row: &Row) -> Option<i64> {
    row.get("id").and_then(Value::as_i64)
}

impl<E: CypherExecutor> GraphTransport for CypherTransport<E> {
    fn resolve_node(&self, label: &str, id: i64) -> Result<Option<NodeHandle>, TransportError> {
        let statement = self.builder.find_node(Some(label), id)?;
        let rows = self.executor.run(&statement.text, &statement.params)?;
        Ok(rows.first().map(|row| NodeHandle {
            id: row_id(self.node_row(row)).unwrap_or(id),
            label: label.to_string(),
        }))
    }

    fn insert(&self, label: &str, properties: &Params) -> Result<CommandResult, TransportError> {
        let statement = self.builder.insert(label, properties)?;
        let rows = self.executor.run(&statement.text, &statement.params)?;
        let Some(row) = rows.first() else {
            return Ok(CommandResult {
                generated_id: None,
                properties: properties.clone(),
            });
        };
        let node = self.node_row(row);
        let mut stored = node.clone();
        stored.remove("id");
        Ok(CommandResult {
            generated_id: row_id(node),
            properties: stored,
        })
    }

    fn connect(
        &self,
        from: &NodeHandle,
        to: &NodeHandle,
        edge_type: &str,
        properties: &Params,
    ) -> Result<EdgeHandle, TransportError> {
        let statement = self.builder.relate(from.id, to.id, edge_type, properties)?;
        let rows = self.executor.run(&statement.text, &statement.params)?;
        let id = rows
            .first()
            .and_then(row_id)
            .ok_or_else(|| format!("Creating {} edge {} -> {} returned no id", edge_type, from.id, to.id))?;
        Ok(EdgeHandle {
            id,
            edge_type: edge_type.to_string(),
            from: from.id,
            to: to.id,
        })
    }

    fn execute(&self, text: &str, params: &Params) -> Result<Vec<Row>, TransportError> {
        self.executor.run(text, params)
    }

    fn backend_name(&self) -> &'static str {
        "Cypher"
    }
}
