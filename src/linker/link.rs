use serde_json::Value;

use super::record::{Record, Related};
use super::registry::{Multiplicity, RelationDescriptor, RelationRegistry, Via};
use super::LinkError;
use crate::graph::{GraphTransport, NodeHandle};
use crate::query::{Direction, Params};

/// Creates the graph structure behind a declared relation.
///
/// All preconditions are checked before the transport is touched. Writes
/// happen one at a time with no rollback, so a transport failure midway can
/// leave an intermediate node without its edge.
pub struct RelationshipLinker<'a, T: GraphTransport + ?Sized> {
    registry: &'a RelationRegistry,
    transport: &'a T,
}

/// What the checked relation resolves to.
enum Plan<'r> {
    Direct(&'r RelationDescriptor),
    ViaEntity {
        name: &'r str,
        via: &'r RelationDescriptor,
    },
    ViaEdge {
        link: &'r str,
        direction: Direction,
    },
}

impl<'a, T: GraphTransport + ?Sized> RelationshipLinker<'a, T> {
    pub fn new(registry: &'a RelationRegistry, transport: &'a T) -> Self {
        Self { registry, transport }
    }

    /// Links `target` to `owner` through `relation` and updates the owner's cache.
    ///
    /// `extra` becomes the attributes of the intermediate entity (via entity)
    /// or the properties of the edge (via edge).
    pub fn link(&self, owner: &mut Record, relation: &str, target: &Record, extra: &Params) -> Result<(), LinkError> {
        let descriptor = self.descriptor(&owner.label, relation)?;
        if !descriptor.direction.is_directed() {
            return Err(LinkError::UndirectedRelation {
                owner: owner.label.clone(),
                relation: relation.to_string(),
            });
        }
        let owner_id = owner.id.ok_or_else(|| LinkError::UnpersistedEntity {
            relation: relation.to_string(),
            side: "owner",
        })?;
        let target_id = target.id.ok_or_else(|| LinkError::UnpersistedEntity {
            relation: relation.to_string(),
            side: "target",
        })?;
        let plan = self.plan(&owner.label, relation, descriptor)?;

        let owner_node = self.resolve(&owner.label, owner_id)?;
        match plan {
            Plan::ViaEntity { name, via } => {
                let intermediate = self.link_via_entity(&owner_node, via, extra)?;
                log::debug!("created {}#{:?} for '{}'", intermediate.label, intermediate.id, relation);
                owner.forget_relation(name);
            }
            Plan::ViaEdge { link, direction } => {
                let target_node = self.resolve(&target.label, target_id)?;
                self.connect(&owner_node, &target_node, direction, link, extra)?;
            }
            Plan::Direct(descriptor) => {
                if !extra.is_empty() {
                    log::warn!("ignoring {} extra attributes on direct relation '{}'", extra.len(), relation);
                }
                let target_node = self.resolve(&target.label, target_id)?;
                self.connect(
                    &owner_node,
                    &target_node,
                    descriptor.direction,
                    &descriptor.edge_type(),
                    &Params::new(),
                )?;
            }
        }

        update_cache(owner, relation, descriptor, target);
        log::info!(
            "linked {}#{} {} {}#{}",
            owner.label,
            owner_id,
            relation,
            target.label,
            target_id
        );
        Ok(())
    }

    fn descriptor(&self, owner: &str, relation: &str) -> Result<&'a RelationDescriptor, LinkError> {
        self.registry
            .get(owner, relation)
            .ok_or_else(|| LinkError::UnknownRelation {
                owner: owner.to_string(),
                relation: relation.to_string(),
            })
    }

    fn plan(&self, owner: &str, relation: &str, descriptor: &'a RelationDescriptor) -> Result<Plan<'a>, LinkError> {
        match &descriptor.via {
            None => Ok(Plan::Direct(descriptor)),
            Some(Via::Entity { relation: name }) => {
                let via = self.descriptor(owner, name)?;
                if !via.direction.is_directed() {
                    return Err(LinkError::UndirectedRelation {
                        owner: owner.to_string(),
                        relation: name.clone(),
                    });
                }
                Ok(Plan::ViaEntity { name, via })
            }
            Some(Via::Edge { link, direction }) => {
                if !direction.is_directed() {
                    return Err(LinkError::UndirectedRelation {
                        owner: owner.to_string(),
                        relation: relation.to_string(),
                    });
                }
                Ok(Plan::ViaEdge {
                    link,
                    direction: *direction,
                })
            }
        }
    }

    /// Inserts the intermediate entity and connects it to the owner.
    fn link_via_entity(&self, owner_node: &NodeHandle, via: &RelationDescriptor, extra: &Params) -> Result<Record, LinkError> {
        let mut intermediate = Record::new(via.target.clone()).with_attributes(extra.clone());
        let created = self.transport.insert(&intermediate.label, &intermediate.attributes)?;
        let id = created.generated_id.ok_or_else(|| LinkError::NodeNotFound {
            label: intermediate.label.clone(),
            id: None,
        })?;
        let node = self.resolve(&intermediate.label, id)?;
        intermediate.id = Some(id);
        if !created.properties.is_empty() {
            intermediate.attributes = created.properties;
        }

        self.connect(owner_node, &node, via.direction, &via.edge_type(), &Params::new())?;
        Ok(intermediate)
    }

    /// `In` points the edge at the owner, `Out` away from it.
    fn connect(
        &self,
        owner: &NodeHandle,
        other: &NodeHandle,
        direction: Direction,
        edge_type: &str,
        properties: &Params,
    ) -> Result<(), LinkError> {
        let (from, to) = match direction {
            Direction::In => (other, owner),
            _ => (owner, other),
        };
        let edge = self.transport.connect(from, to, edge_type, properties)?;
        log::debug!(
            "{}: created edge {} ({})-[{}]->({})",
            self.transport.backend_name(),
            edge.id,
            edge.from,
            edge.edge_type,
            edge.to
        );
        Ok(())
    }

    fn resolve(&self, label: &str, id: i64) -> Result<NodeHandle, LinkError> {
        self.transport
            .resolve_node(label, id)?
            .ok_or_else(|| LinkError::NodeNotFound {
                label: label.to_string(),
                id: Some(id),
            })
    }
}

fn update_cache(owner: &mut Record, relation: &str, descriptor: &RelationDescriptor, target: &Record) {
    if descriptor.multiplicity == Multiplicity::One {
        owner.populate_relation(relation, Related::One(Box::new(target.clone())));
        return;
    }
    match owner.related_mut(relation) {
        Some(Related::Indexed(by_key)) => {
            let key = descriptor
                .index_by
                .as_deref()
                .and_then(|attribute| target.attribute(attribute))
                .map(index_key)
                .or_else(|| target.id.map(|id| id.to_string()))
                .unwrap_or_default();
            by_key.insert(key, target.clone());
        }
        Some(Related::Many(list)) => list.push(target.clone()),
        Some(loaded @ Related::One(_)) => {
            let mut list = Vec::with_capacity(2);
            if let Related::One(previous) = std::mem::replace(loaded, Related::Many(Vec::new())) {
                list.push(*previous);
            }
            list.push(target.clone());
            *loaded = Related::Many(list);
        }
        None => {}
    }
}

fn index_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{CommandResult, EdgeHandle, MemoryGraph, Row, TransportError};
    use serde_json::json;
    use std::collections::BTreeMap;

    fn registry() -> RelationRegistry {
        let mut registry = RelationRegistry::new();
        let declarations = [
            ("posts", RelationDescriptor::has_many("Post", "WROTE", Direction::Out)),
            ("editor", RelationDescriptor::has_one("Editor", "EDITS", Direction::In)),
            ("tags", RelationDescriptor::has_many("Tag", "TAGGED", Direction::Out).index_by("name")),
            ("friends", RelationDescriptor::has_many("Author", "KNOWS", Direction::Undirected)),
            ("memberships", RelationDescriptor::has_many("Membership", "MEMBER_OF", Direction::Out)),
            (
                "groups",
                RelationDescriptor::has_many("Group", "", Direction::Out).via_entity("memberships"),
            ),
            (
                "follows",
                RelationDescriptor::has_many("Author", "", Direction::Out).via_edge("FOLLOWS", Direction::In),
            ),
        ];
        for (name, relation) in declarations {
            registry.declare("Author", name, relation).unwrap();
        }
        registry
    }

    fn saved(graph: &MemoryGraph, label: &str, attributes: serde_json::Value) -> Record {
        let attributes = attributes.as_object().cloned().unwrap();
        let id = graph.insert(label, &attributes).unwrap().generated_id.unwrap();
        Record::new(label).with_id(id).with_attributes(attributes)
    }

    #[test]
    fn test_direct_out_link() {
        let graph = MemoryGraph::new();
        let registry = registry();
        let mut author = saved(&graph, "Author", json!({"name": "Ann"}));
        let post = saved(&graph, "Post", json!({"title": "Hi"}));

        RelationshipLinker::new(&registry, &graph)
            .link(&mut author, "posts", &post, &Params::new())
            .unwrap();

        let edges = graph.edges();
        assert_eq!(edges.len(), 1);
        assert_eq!((edges[0].from, edges[0].to), (author.id.unwrap(), post.id.unwrap()));
        assert_eq!(edges[0].edge_type, "WROTE");
        assert!(author.related("posts").is_none());
    }

    #[test]
    fn test_direct_in_link_replaces_to_one_cache() {
        let graph = MemoryGraph::new();
        let registry = registry();
        let mut author = saved(&graph, "Author", json!({}));
        let editor = saved(&graph, "Editor", json!({}));

        RelationshipLinker::new(&registry, &graph)
            .link(&mut author, "editor", &editor, &Params::new())
            .unwrap();

        let edge = &graph.edges()[0];
        assert_eq!((edge.from, edge.to), (editor.id.unwrap(), author.id.unwrap()));
        assert_eq!(author.related("editor"), Some(&Related::One(Box::new(editor))));
    }

    #[test]
    fn test_loaded_to_many_is_appended() {
        let graph = MemoryGraph::new();
        let registry = registry();
        let mut author = saved(&graph, "Author", json!({}));
        author.populate_relation("posts", Related::Many(vec![]));
        let post = saved(&graph, "Post", json!({}));

        RelationshipLinker::new(&registry, &graph)
            .link(&mut author, "posts", &post, &Params::new())
            .unwrap();

        assert_eq!(author.related("posts"), Some(&Related::Many(vec![post])));
    }

    #[test]
    fn test_single_cached_record_is_kept_when_widened() {
        let graph = MemoryGraph::new();
        let registry = registry();
        let mut author = saved(&graph, "Author", json!({}));
        let first = saved(&graph, "Post", json!({"title": "First"}));
        let second = saved(&graph, "Post", json!({"title": "Second"}));
        author.populate_relation("posts", Related::One(Box::new(first.clone())));

        RelationshipLinker::new(&registry, &graph)
            .link(&mut author, "posts", &second, &Params::new())
            .unwrap();

        assert_eq!(author.related("posts"), Some(&Related::Many(vec![first, second])));
    }

    #[test]
    fn test_loaded_indexed_relation_is_keyed() {
        let graph = MemoryGraph::new();
        let registry = registry();
        let mut author = saved(&graph, "Author", json!({}));
        author.populate_relation("tags", Related::Indexed(BTreeMap::new()));
        let tag = saved(&graph, "Tag", json!({"name": "rust"}));

        RelationshipLinker::new(&registry, &graph)
            .link(&mut author, "tags", &tag, &Params::new())
            .unwrap();

        match author.related("tags") {
            Some(Related::Indexed(by_key)) => assert_eq!(by_key.get("rust"), Some(&tag)),
            other => panic!("Expected indexed relation, got {:?}", other),
        }
    }

    #[test]
    fn test_via_entity_creates_one_node_and_one_edge() {
        let graph = MemoryGraph::new();
        let registry = registry();
        let mut author = saved(&graph, "Author", json!({}));
        author.populate_relation("memberships", Related::Many(vec![]));
        let group = saved(&graph, "Group", json!({}));
        let nodes_before = graph.nodes().len();
        let extra = json!({"role": "admin"}).as_object().cloned().unwrap();

        RelationshipLinker::new(&registry, &graph)
            .link(&mut author, "groups", &group, &extra)
            .unwrap();

        let nodes = graph.nodes();
        assert_eq!(nodes.len(), nodes_before + 1);
        let membership = nodes.last().unwrap();
        assert_eq!(membership.label, "Membership");
        assert_eq!(membership.properties, extra);

        let edges = graph.edges();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].edge_type, "MEMBER_OF");
        assert_eq!((edges[0].from, edges[0].to), (author.id.unwrap(), membership.id));
        assert!(!author.is_relation_loaded("memberships"));
    }

    #[test]
    fn test_via_edge_carries_extra_properties() {
        let graph = MemoryGraph::new();
        let registry = registry();
        let mut author = saved(&graph, "Author", json!({}));
        let other = saved(&graph, "Author", json!({}));
        let extra = json!({"since": 2020}).as_object().cloned().unwrap();

        RelationshipLinker::new(&registry, &graph)
            .link(&mut author, "follows", &other, &extra)
            .unwrap();

        assert_eq!(graph.nodes().len(), 2);
        let edge = &graph.edges()[0];
        assert_eq!(edge.edge_type, "FOLLOWS");
        assert_eq!((edge.from, edge.to), (other.id.unwrap(), author.id.unwrap()));
        assert_eq!(edge.properties, extra);
    }

    #[test]
    fn test_preconditions_fail_without_io() {
        let graph = MemoryGraph::new();
        let registry = registry();
        let mut author = Record::new("Author").with_id(0);
        let unsaved = Record::new("Post");
        let linker = RelationshipLinker::new(&registry, &graph);

        assert!(matches!(
            linker.link(&mut author, "nope", &unsaved, &Params::new()),
            Err(LinkError::UnknownRelation { .. })
        ));
        assert!(matches!(
            linker.link(&mut author, "friends", &unsaved, &Params::new()),
            Err(LinkError::UndirectedRelation { .. })
        ));
        assert!(matches!(
            linker.link(&mut author, "posts", &unsaved, &Params::new()),
            Err(LinkError::UnpersistedEntity { side: "target", .. })
        ));
        let mut fresh = Record::new("Author");
        assert!(matches!(
            linker.link(&mut fresh, "posts", &unsaved, &Params::new()),
            Err(LinkError::UnpersistedEntity { side: "owner", .. })
        ));
        assert_eq!(graph.operation_count(), 0);
    }

    #[test]
    fn test_undirected_via_edge_is_rejected() {
        let graph = MemoryGraph::new();
        let mut registry = RelationRegistry::new();
        registry
            .declare(
                "Author",
                "peers",
                RelationDescriptor::has_many("Author", "", Direction::Out).via_edge("PEER", Direction::Undirected),
            )
            .unwrap();
        let mut author = Record::new("Author").with_id(1);
        let other = Record::new("Author").with_id(2);

        let err = RelationshipLinker::new(&registry, &graph)
            .link(&mut author, "peers", &other, &Params::new())
            .unwrap_err();
        assert!(matches!(err, LinkError::UndirectedRelation { .. }));
        assert_eq!(graph.operation_count(), 0);
    }

    #[test]
    fn test_missing_owner_node() {
        let graph = MemoryGraph::new();
        let registry = registry();
        let mut author = Record::new("Author").with_id(5);
        let post = Record::new("Post").with_id(6);

        let err = RelationshipLinker::new(&registry, &graph)
            .link(&mut author, "posts", &post, &Params::new())
            .unwrap_err();
        assert!(matches!(err, LinkError::NodeNotFound { id: Some(5), .. }));
    }

    /// Stores nothing and reports no generated identity.
    struct AmnesiacGraph;

    impl GraphTransport for AmnesiacGraph {
        fn resolve_node(&self, label: &str, id: i64) -> Result<Option<NodeHandle>, TransportError> {
            Ok(Some(NodeHandle { id, label: label.to_string() }))
        }

        fn insert(&self, _label: &str, _properties: &Params) -> Result<CommandResult, TransportError> {
            Ok(CommandResult::default())
        }

        fn connect(&self, _: &NodeHandle, _: &NodeHandle, _: &str, _: &Params) -> Result<EdgeHandle, TransportError> {
            Err("connection reset".into())
        }

        fn execute(&self, _text: &str, _params: &Params) -> Result<Vec<Row>, TransportError> {
            Ok(Vec::new())
        }

        fn backend_name(&self) -> &'static str {
            "Amnesiac"
        }
    }

    #[test]
    fn test_via_entity_without_generated_id() {
        let registry = registry();
        let mut author = Record::new("Author").with_id(1);
        let group = Record::new("Group").with_id(2);

        let err = RelationshipLinker::new(&registry, &AmnesiacGraph)
            .link(&mut author, "groups", &group, &Params::new())
            .unwrap_err();
        assert!(matches!(err, LinkError::NodeNotFound { id: None, .. }));
    }

    #[test]
    fn test_transport_errors_pass_through() {
        let registry = registry();
        let mut author = Record::new("Author").with_id(1);
        let post = Record::new("Post").with_id(2);

        let err = RelationshipLinker::new(&registry, &AmnesiacGraph)
            .link(&mut author, "posts", &post, &Params::new())
            .unwrap_err();
        assert!(matches!(err, LinkError::Transport(_)));
        assert_eq!(err.to_string(), "connection reset");
    }
}
