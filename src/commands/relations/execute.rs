use std::error::Error;

use serde::Serialize;

use super::RelationsCmd;
use crate::commands::Execute;
use crate::config::ConfigFile;
use crate::linker::{Multiplicity, RelationDescriptor, Via};
use crate::query::Direction;

/// A declared relation, flattened for display
#[derive(Debug, Clone, Serialize)]
pub struct RelationRow {
    pub owner: String,
    pub name: String,
    pub target: String,
    pub edge_type: String,
    pub direction: Direction,
    pub multiplicity: Multiplicity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via: Option<String>,
}

impl RelationRow {
    fn new(owner: &str, name: &str, relation: &RelationDescriptor) -> Self {
        let (edge_type, via) = match &relation.via {
            None => (relation.edge_type(), None),
            Some(Via::Entity { relation: via }) => (String::new(), Some(format!("entity {}", via))),
            Some(Via::Edge { link, direction }) => (link.clone(), Some(format!("edge {}", direction))),
        };
        Self {
            owner: owner.to_string(),
            name: name.to_string(),
            target: relation.target.clone(),
            edge_type,
            direction: relation.direction,
            multiplicity: relation.multiplicity,
            index_by: relation.index_by.clone(),
            via,
        }
    }
}

/// Result of the relations command execution
#[derive(Debug, Default, Serialize)]
pub struct RelationsResult {
    pub owner_filter: Option<String>,
    pub relations: Vec<RelationRow>,
}

impl Execute for RelationsCmd {
    type Output = RelationsResult;

    fn execute(self, config: &ConfigFile) -> Result<Self::Output, Box<dyn Error>> {
        let registry = config.registry()?;
        let relations = registry
            .iter()
            .filter(|(owner, _, _)| self.owner.as_deref().is_none_or(|wanted| wanted == *owner))
            .map(|(owner, name, relation)| RelationRow::new(owner, name, relation))
            .collect();

        Ok(RelationsResult {
            owner_filter: self.owner,
            relations,
        })
    }
}
