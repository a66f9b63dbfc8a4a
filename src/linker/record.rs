use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::query::Params;

/// Loaded contents of a relation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Related {
    One(Box<Record>),
    Many(Vec<Record>),
    /// To-many relation keyed by one attribute of the related records.
    Indexed(BTreeMap<String, Record>),
}

/// An entity handle: label, graph identity once saved, attributes and
/// whatever relations have been loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub label: String,
    pub id: Option<i64>,
    pub attributes: Params,
    related: BTreeMap<String, Related>,
}

impl Record {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            id: None,
            attributes: Params::new(),
            related: BTreeMap::new(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_attributes(mut self, attributes: Params) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn related(&self, relation: &str) -> Option<&Related> {
        self.related.get(relation)
    }

    pub fn related_mut(&mut self, relation: &str) -> Option<&mut Related> {
        self.related.get_mut(relation)
    }

    pub fn is_relation_loaded(&self, relation: &str) -> bool {
        self.related.contains_key(relation)
    }

    pub fn populate_relation(&mut self, relation: impl Into<String>, related: Related) {
        self.related.insert(relation.into(), related);
    }

    /// Drops a cached relation so the next access reloads it.
    pub fn forget_relation(&mut self, relation: &str) -> Option<Related> {
        self.related.remove(relation)
    }
}
