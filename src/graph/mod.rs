//! Graph transport abstraction used by the relationship linker.
//!
//! The linker never talks to a database directly; it goes through a
//! [`GraphTransport`]. Two implementations ship with the crate:
//! - [`MemoryGraph`] keeps nodes and edges in process memory
//! - [`CypherTransport`] renders Cypher statements and hands them to a
//!   [`CypherExecutor`] (any client that runs text + parameters)

mod cypher;
mod memory;

use std::error::Error;

use serde::Serialize;

use crate::query::Params;

pub use cypher::{CypherExecutor, CypherTransport};
pub use memory::{MemoryGraph, StoredEdge, StoredNode};

/// Errors raised by a transport, passed through to callers untouched.
pub type TransportError = Box<dyn Error + Send + Sync>;

/// A result row: column name to JSON value.
///
/// Node columns are flattened to `{id, ...properties}`.
pub type Row = Params;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeHandle {
    pub id: i64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeHandle {
    pub id: i64,
    pub edge_type: String,
    pub from: i64,
    pub to: i64,
}

/// Outcome of an insert: the identity the store assigned plus the stored properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommandResult {
    pub generated_id: Option<i64>,
    pub properties: Params,
}

/// Trait for graph stores the linker can write through.
pub trait GraphTransport: Send + Sync {
    /// Look up a node by identity, restricted to `label` when it is non-empty.
    fn resolve_node(&self, label: &str, id: i64) -> Result<Option<NodeHandle>, TransportError>;

    /// Create a node with the given label and properties.
    fn insert(&self, label: &str, properties: &Params) -> Result<CommandResult, TransportError>;

    /// Create a directed, typed edge.
    fn connect(
        &self,
        from: &NodeHandle,
        to: &NodeHandle,
        edge_type: &str,
        properties: &Params,
    ) -> Result<EdgeHandle, TransportError>;

    /// Run an arbitrary statement.
    fn execute(&self, text: &str, params: &Params) -> Result<Vec<Row>, TransportError>;

    /// Backend name for logging.
    fn backend_name(&self) -> &'static str;
}
