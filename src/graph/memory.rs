//! In-process graph store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;

use super::{CommandResult, EdgeHandle, GraphTransport, NodeHandle, Row, TransportError};
use crate::query::Params;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredNode {
    pub id: i64,
    pub label: String,
    pub properties: Params,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredEdge {
    pub id: i64,
    pub edge_type: String,
    pub from: i64,
    pub to: i64,
    pub properties: Params,
}

#[derive(Debug, Default)]
struct GraphState {
    nodes: BTreeMap<i64, StoredNode>,
    edges: Vec<StoredEdge>,
    statements: Vec<(String, Params)>,
    next_node_id: i64,
    next_edge_id: i64,
}

/// Graph kept in memory behind a `RwLock`.
///
/// Statements passed to `execute` are recorded, not interpreted. Every trait
/// call counts as one operation, which lets callers assert that nothing was
/// touched.
#[derive(Debug, Default)]
pub struct MemoryGraph {
    state: RwLock<GraphState>,
    operations: AtomicUsize,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, GraphState>, TransportError> {
        self.state
            .read()
            .map_err(|e| format!("Failed to acquire read lock: {}", e).into())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, GraphState>, TransportError> {
        self.state
            .write()
            .map_err(|e| format!("Failed to acquire write lock: {}", e).into())
    }

    fn tick(&self) {
        self.operations.fetch_add(1, Ordering::SeqCst);
    }

    /// Number of transport calls served so far.
    pub fn operation_count(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }

    pub fn nodes(&self) -> Vec<StoredNode> {
        self.read().map(|s| s.nodes.values().cloned().collect()).unwrap_or_default()
    }

    pub fn edges(&self) -> Vec<StoredEdge> {
        self.read().map(|s| s.edges.clone()).unwrap_or_default()
    }

    pub fn node(&self, id: i64) -> Option<StoredNode> {
        self.read().ok().and_then(|s| s.nodes.get(&id).cloned())
    }

    /// Statements received through `execute`, in arrival order.
    pub fn statements(&self) -> Vec<(String, Params)> {
        self.read().map(|s| s.statements.clone()).unwrap_or_default()
    }
}

impl GraphTransport for MemoryGraph {
    fn resolve_node(&self, label: &str, id: i64) -> Result<Option<NodeHandle>, TransportError> {
        self.tick();
        let state = self.read()?;
        Ok(state
            .nodes
            .get(&id)
            .filter(|node| label.is_empty() || node.label == label)
            .map(|node| NodeHandle {
                id: node.id,
                label: node.label.clone(),
            }))
    }

    fn insert(&self, label: &str, properties: &Params) -> Result<CommandResult, TransportError> {
        self.tick();
        let mut state = self.write()?;
        let id = state.next_node_id;
        state.next_node_id += 1;
        state.nodes.insert(
            id,
            StoredNode {
                id,
                label: label.to_string(),
                properties: properties.clone(),
            },
        );
        log::debug!("memory graph: created node {}:{}", label, id);
        Ok(CommandResult {
            generated_id: Some(id),
            properties: properties.clone(),
        })
    }

    fn connect(
        &self,
        from: &NodeHandle,
        to: &NodeHandle,
        edge_type: &str,
        properties: &Params,
    ) -> Result<EdgeHandle, TransportError> {
        self.tick();
        let mut state = self.write()?;
        for end in [from.id, to.id] {
            if !state.nodes.contains_key(&end) {
                return Err(format!("Node {} does not exist", end).into());
            }
        }
        let id = state.next_edge_id;
        state.next_edge_id += 1;
        state.edges.push(StoredEdge {
            id,
            edge_type: edge_type.to_string(),
            from: from.id,
            to: to.id,
            properties: properties.clone(),
        });
        log::debug!("memory graph: created edge ({})-[{}]->({})", from.id, edge_type, to.id);
        Ok(EdgeHandle {
            id,
            edge_type: edge_type.to_string(),
            from: from.id,
            to: to.id,
        })
    }

    fn execute(&self, text: &str, params: &Params) -> Result<Vec<Row>, TransportError> {
        self.tick();
        self.write()?.statements.push((text.to_string(), params.clone()));
        Ok(Vec::new())
    }

    fn backend_name(&self) -> &'static str {
        "Memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: serde_json::Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_insert_assigns_sequential_ids() {
        let graph = MemoryGraph::new();
        let a = graph.insert("Person", &props(json!({"name": "Ann"}))).unwrap();
        let b = graph.insert("Person", &Params::new()).unwrap();
        assert_eq!(a.generated_id, Some(0));
        assert_eq!(b.generated_id, Some(1));
        assert_eq!(graph.node(0).unwrap().properties, props(json!({"name": "Ann"})));
    }

    #[test]
    fn test_resolve_node_respects_label() {
        let graph = MemoryGraph::new();
        graph.insert("Person", &Params::new()).unwrap();
        assert!(graph.resolve_node("Person", 0).unwrap().is_some());
        assert!(graph.resolve_node("", 0).unwrap().is_some());
        assert!(graph.resolve_node("Post", 0).unwrap().is_none());
        assert!(graph.resolve_node("Person", 7).unwrap().is_none());
    }

    #[test]
    fn test_connect_requires_both_ends() {
        let graph = MemoryGraph::new();
        graph.insert("Person", &Params::new()).unwrap();
        let from = graph.resolve_node("Person", 0).unwrap().unwrap();
        let ghost = NodeHandle {
            id: 42,
            label: "Person".to_string(),
        };
        assert!(graph.connect(&from, &ghost, "KNOWS", &Params::new()).is_err());
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn test_execute_records_statement() {
        let graph = MemoryGraph::new();
        let rows = graph.execute("MATCH (n) RETURN n", &Params::new()).unwrap();
        assert!(rows.is_empty());
        assert_eq!(graph.statements()[0].0, "MATCH (n) RETURN n");
        assert_eq!(graph.operation_count(), 1);
    }
}
