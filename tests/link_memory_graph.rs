//! Integration tests for the relationship linker over the in-memory graph.
//!
//! The relation schema is loaded from a JSON configuration file the same way
//! the CLI loads it, then records are linked and the resulting nodes, edges
//! and relation caches are inspected.

use std::io::Write;

use cypher_record::config::ConfigFile;
use cypher_record::graph::{GraphTransport, MemoryGraph};
use cypher_record::linker::{LinkError, Record, Related, RelationRegistry, RelationshipLinker};
use cypher_record::query::Params;
use serde_json::json;
use tempfile::NamedTempFile;

// =============================================================================
// Helpers
// =============================================================================

const SCHEMA: &str = r#"
{
    "builder": { "identifier": "n" },
    "relations": [
        { "owner": "Author", "name": "posts", "target": "Post", "link": ["WROTE"],
          "direction": "out", "multiplicity": "many", "index_by": "slug" },
        { "owner": "Author", "name": "memberships", "target": "Membership", "link": ["MEMBER_OF"],
          "direction": "out" },
        { "owner": "Author", "name": "groups", "target": "Group", "direction": "out",
          "via": { "entity": { "relation": "memberships" } } },
        { "owner": "Author", "name": "follows", "target": "Author", "direction": "out",
          "via": { "edge": { "link": "FOLLOWS", "direction": "out" } } },
        { "owner": "Post", "name": "author", "target": "Author", "link": ["WROTE"],
          "direction": "in", "multiplicity": "one" },
        { "owner": "Post", "name": "related", "target": "Post", "link": ["SEE_ALSO"],
          "direction": "undirected" }
    ]
}
"#;

fn registry() -> RelationRegistry {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(SCHEMA.as_bytes()).unwrap();
    ConfigFile::load_from(file.path()).unwrap().registry().unwrap()
}

fn params(value: serde_json::Value) -> Params {
    value.as_object().cloned().unwrap_or_default()
}

/// Inserts a node and returns a persisted record pointing at it.
fn persisted(graph: &MemoryGraph, label: &str, attributes: Params) -> Record {
    let created = graph.insert(label, &attributes).unwrap();
    Record::new(label)
        .with_id(created.generated_id.unwrap())
        .with_attributes(attributes)
}

// =============================================================================
// Direct relations
// =============================================================================

#[test]
fn direct_out_relation_creates_edge_and_indexes_cache() {
    let registry = registry();
    let graph = MemoryGraph::new();
    let mut author = persisted(&graph, "Author", params(json!({"name": "Ann"})));
    let post = persisted(&graph, "Post", params(json!({"slug": "hello"})));
    author.populate_relation("posts", Related::Indexed(Default::default()));

    RelationshipLinker::new(&registry, &graph)
        .link(&mut author, "posts", &post, &Params::new())
        .unwrap();

    let edges = graph.edges();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].edge_type, "WROTE");
    assert_eq!(edges[0].from, author.id.unwrap());
    assert_eq!(edges[0].to, post.id.unwrap());

    match author.related("posts") {
        Some(Related::Indexed(by_slug)) => {
            assert_eq!(by_slug.len(), 1);
            assert_eq!(by_slug["hello"].id, post.id);
        }
        other => panic!("Expected indexed cache, got {:?}", other),
    }
}

#[test]
fn inbound_relation_points_edge_at_owner() {
    let registry = registry();
    let graph = MemoryGraph::new();
    let author = persisted(&graph, "Author", Params::new());
    let mut post = persisted(&graph, "Post", Params::new());

    RelationshipLinker::new(&registry, &graph)
        .link(&mut post, "author", &author, &Params::new())
        .unwrap();

    let edge = &graph.edges()[0];
    assert_eq!(edge.from, author.id.unwrap());
    assert_eq!(edge.to, post.id.unwrap());
    match post.related("author") {
        Some(Related::One(linked)) => assert_eq!(linked.id, author.id),
        other => panic!("Expected single cached author, got {:?}", other),
    }
}

#[test]
fn unloaded_many_cache_stays_unloaded() {
    let registry = registry();
    let graph = MemoryGraph::new();
    let mut author = persisted(&graph, "Author", Params::new());
    let post = persisted(&graph, "Post", params(json!({"slug": "a"})));

    RelationshipLinker::new(&registry, &graph)
        .link(&mut author, "posts", &post, &Params::new())
        .unwrap();

    assert!(!author.is_relation_loaded("posts"));
    assert_eq!(graph.edges().len(), 1);
}

// =============================================================================
// Via relations
// =============================================================================

#[test]
fn via_entity_inserts_intermediate_node() {
    let registry = registry();
    let graph = MemoryGraph::new();
    let mut author = persisted(&graph, "Author", Params::new());
    let group = persisted(&graph, "Group", params(json!({"title": "Rustaceans"})));
    author.populate_relation("memberships", Related::Many(Vec::new()));

    RelationshipLinker::new(&registry, &graph)
        .link(&mut author, "groups", &group, &params(json!({"role": "admin"})))
        .unwrap();

    let nodes = graph.nodes();
    assert_eq!(nodes.len(), 3);
    let membership = nodes.iter().find(|n| n.label == "Membership").unwrap();
    assert_eq!(membership.properties, params(json!({"role": "admin"})));

    let edges = graph.edges();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].edge_type, "MEMBER_OF");
    assert_eq!(edges[0].from, author.id.unwrap());
    assert_eq!(edges[0].to, membership.id);

    assert!(!author.is_relation_loaded("memberships"));
}

#[test]
fn via_edge_carries_extra_properties() {
    let registry = registry();
    let graph = MemoryGraph::new();
    let mut ann = persisted(&graph, "Author", Params::new());
    let bob = persisted(&graph, "Author", Params::new());
    ann.populate_relation("follows", Related::Many(Vec::new()));

    RelationshipLinker::new(&registry, &graph)
        .link(&mut ann, "follows", &bob, &params(json!({"since": 2020})))
        .unwrap();

    let edges = graph.edges();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].edge_type, "FOLLOWS");
    assert_eq!(edges[0].properties, params(json!({"since": 2020})));
    match ann.related("follows") {
        Some(Related::Many(list)) => assert_eq!(list[0].id, bob.id),
        other => panic!("Expected list cache, got {:?}", other),
    }
}

// =============================================================================
// Preconditions
// =============================================================================

#[test]
fn preconditions_fail_before_any_graph_access() {
    let registry = registry();
    let graph = MemoryGraph::new();
    let mut author = Record::new("Author").with_id(1);
    let draft = Record::new("Post");
    let linker = RelationshipLinker::new(&registry, &graph);

    let err = linker.link(&mut author, "posts", &draft, &Params::new()).unwrap_err();
    assert!(matches!(err, LinkError::UnpersistedEntity { side: "target", .. }));

    let err = linker.link(&mut author, "comments", &draft, &Params::new()).unwrap_err();
    assert!(matches!(err, LinkError::UnknownRelation { .. }));

    let mut post = Record::new("Post").with_id(2);
    let other = Record::new("Post").with_id(3);
    let err = linker.link(&mut post, "related", &other, &Params::new()).unwrap_err();
    assert!(matches!(err, LinkError::UndirectedRelation { .. }));

    assert_eq!(graph.operation_count(), 0);
}

#[test]
fn missing_node_is_reported() {
    let registry = registry();
    let graph = MemoryGraph::new();
    let mut author = persisted(&graph, "Author", Params::new());
    let ghost = Record::new("Post").with_id(999);

    let err = RelationshipLinker::new(&registry, &graph)
        .link(&mut author, "posts", &ghost, &Params::new())
        .unwrap_err();

    match err {
        LinkError::NodeNotFound { label, id } => {
            assert_eq!(label, "Post");
            assert_eq!(id, Some(999));
        }
        other => panic!("Expected NodeNotFound, got {:?}", other),
    }
    assert!(graph.edges().is_empty());
}
