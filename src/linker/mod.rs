//! Persisting relationships between stored records.
//!
//! A [`RelationRegistry`] describes, per owner label, how each named relation
//! maps onto the graph. [`RelationshipLinker`] uses it to create the edge (and
//! for via-entity relations, the intermediate node) that connects two records,
//! then refreshes the owner's relation cache.

mod link;
mod record;
mod registry;

use thiserror::Error;

use crate::graph::TransportError;

pub use link::RelationshipLinker;
pub use record::{Record, Related};
pub use registry::{Multiplicity, RelationDeclaration, RelationDescriptor, RelationRegistry, Via};

#[derive(Error, Debug)]
pub enum LinkError {
    #[error("Relation '{relation}' of '{owner}' is not declared")]
    UnknownRelation { owner: String, relation: String },

    #[error("Relation '{relation}' of '{owner}' has no direction and cannot be linked")]
    UndirectedRelation { owner: String, relation: String },

    #[error("Cannot link '{relation}': the {side} record has not been saved")]
    UnpersistedEntity { relation: String, side: &'static str },

    #[error("Node {label}#{id:?} could not be found")]
    NodeNotFound { label: String, id: Option<i64> },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Relation '{relation}' of '{owner}' is declared twice")]
    DuplicateRelation { owner: String, relation: String },

    #[error("Relation '{relation}' of '{owner}' has an empty link")]
    EmptyLink { owner: String, relation: String },

    #[error("Relation '{relation}' of '{owner}' goes through undeclared relation '{via}'")]
    UnknownVia { owner: String, relation: String, via: String },
}
