//! Relation declarations, keyed by (owner label, relation name).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::RegistryError;
use crate::query::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Multiplicity {
    One,
    #[default]
    Many,
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Multiplicity::One => "one",
            Multiplicity::Many => "many",
        })
    }
}

/// How a relation reaches its target when there is no direct edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Via {
    /// Through an intermediate node reached by another relation of the owner.
    Entity { relation: String },
    /// Through a single property-bearing edge.
    Edge { link: String, direction: Direction },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDescriptor {
    pub target: String,
    /// Edge type tokens; joined with `:` when the edge is created.
    #[serde(default)]
    pub link: Vec<String>,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub multiplicity: Multiplicity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub via: Option<Via>,
}

impl RelationDescriptor {
    pub fn has_one(target: impl Into<String>, link: impl Into<String>, direction: Direction) -> Self {
        Self {
            target: target.into(),
            link: vec![link.into()],
            direction,
            multiplicity: Multiplicity::One,
            index_by: None,
            via: None,
        }
    }

    pub fn has_many(target: impl Into<String>, link: impl Into<String>, direction: Direction) -> Self {
        Self {
            multiplicity: Multiplicity::Many,
            ..Self::has_one(target, link, direction)
        }
    }

    pub fn index_by(mut self, attribute: impl Into<String>) -> Self {
        self.index_by = Some(attribute.into());
        self
    }

    pub fn via_entity(mut self, relation: impl Into<String>) -> Self {
        self.via = Some(Via::Entity {
            relation: relation.into(),
        });
        self
    }

    pub fn via_edge(mut self, link: impl Into<String>, direction: Direction) -> Self {
        self.via = Some(Via::Edge {
            link: link.into(),
            direction,
        });
        self
    }

    /// Edge type for a direct link.
    pub fn edge_type(&self) -> String {
        self.link.join(":")
    }

    /// True when every link token is non-empty and there is at least one.
    pub fn has_link(&self) -> bool {
        !self.link.is_empty() && self.link.iter().all(|token| !token.is_empty())
    }
}

/// One entry of the `relations` list in the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationDeclaration {
    pub owner: String,
    pub name: String,
    #[serde(flatten)]
    pub relation: RelationDescriptor,
}

/// Immutable after construction; shared by reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationRegistry {
    relations: BTreeMap<String, BTreeMap<String, RelationDescriptor>>,
}

impl RelationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(
        &mut self,
        owner: impl Into<String>,
        name: impl Into<String>,
        relation: RelationDescriptor,
    ) -> Result<(), RegistryError> {
        let owner = owner.into();
        let name = name.into();
        let by_owner = self.relations.entry(owner.clone()).or_default();
        if by_owner.contains_key(&name) {
            return Err(RegistryError::DuplicateRelation { owner, relation: name });
        }
        by_owner.insert(name, relation);
        Ok(())
    }

    /// Builds and validates a registry from configuration entries.
    pub fn from_declarations(declarations: Vec<RelationDeclaration>) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for declaration in declarations {
            registry.declare(declaration.owner, declaration.name, declaration.relation)?;
        }
        registry.validate()?;
        Ok(registry)
    }

    /// Checks that every edge the linker could create has a type.
    ///
    /// Direct relations need their own link, via edges need a non-empty link,
    /// and a via entity must name a declared relation that has a link itself.
    pub fn validate(&self) -> Result<(), RegistryError> {
        for (owner, name, relation) in self.iter() {
            let empty_link = |relation: &str| RegistryError::EmptyLink {
                owner: owner.to_string(),
                relation: relation.to_string(),
            };
            match &relation.via {
                None if !relation.has_link() => return Err(empty_link(name)),
                None => {}
                Some(Via::Edge { link, .. }) if link.is_empty() => return Err(empty_link(name)),
                Some(Via::Edge { .. }) => {}
                Some(Via::Entity { relation: via }) => match self.get(owner, via) {
                    None => {
                        return Err(RegistryError::UnknownVia {
                            owner: owner.to_string(),
                            relation: name.to_string(),
                            via: via.clone(),
                        });
                    }
                    Some(intermediate) if !intermediate.has_link() => return Err(empty_link(via)),
                    Some(_) => {}
                },
            }
        }
        Ok(())
    }

    pub fn get(&self, owner: &str, name: &str) -> Option<&RelationDescriptor> {
        self.relations.get(owner).and_then(|by_owner| by_owner.get(name))
    }

    /// All relations as `(owner, name, descriptor)`, sorted by owner then name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &RelationDescriptor)> {
        self.relations.iter().flat_map(|(owner, by_owner)| {
            by_owner
                .iter()
                .map(move |(name, relation)| (owner.as_str(), name.as_str(), relation))
        })
    }

    pub fn len(&self) -> usize {
        self.relations.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
