//! The abstract, relational-style query description handed to the builder.
//!
//! A [`QueryDescriptor`] is created per logical query, filled in by the caller
//! (directly or through the chaining helpers), translated once and dropped.
//! The builder only ever reads it; nested descriptors are owned children.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::condition::Condition;
use super::expression::Expression;
use super::params::{internal_name, Params};

/// Relationship direction, seen from the anchor (or owning) entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
    #[default]
    Undirected,
}

impl Direction {
    pub fn is_directed(&self) -> bool {
        !matches!(self, Direction::Undirected)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::In => "in",
            Direction::Out => "out",
            Direction::Undirected => "undirected",
        })
    }
}

/// A projected column: plain name (`id` is reserved) or raw expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnSpec {
    Name(String),
    Expression(Expression),
}

impl From<&str> for ColumnSpec {
    fn from(name: &str) -> Self {
        ColumnSpec::Name(name.to_string())
    }
}

impl From<String> for ColumnSpec {
    fn from(name: String) -> Self {
        ColumnSpec::Name(name)
    }
}

impl From<Expression> for ColumnSpec {
    fn from(expr: Expression) -> Self {
        ColumnSpec::Expression(expr)
    }
}

/// Entry of the select list. A nested descriptor is an inlined sub-match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectItem {
    Column(ColumnSpec),
    SubQuery(Box<QueryDescriptor>),
}

impl From<ColumnSpec> for SelectItem {
    fn from(column: ColumnSpec) -> Self {
        SelectItem::Column(column)
    }
}

impl From<&str> for SelectItem {
    fn from(name: &str) -> Self {
        SelectItem::Column(name.into())
    }
}

impl From<String> for SelectItem {
    fn from(name: String) -> Self {
        SelectItem::Column(name.into())
    }
}

impl From<Expression> for SelectItem {
    fn from(expr: Expression) -> Self {
        SelectItem::Column(expr.into())
    }
}

/// `(foreign label, relation labels, direction)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinSpec {
    pub label: String,
    pub relations: Vec<String>,
    #[serde(default)]
    pub direction: Direction,
}

impl JoinSpec {
    pub fn new(label: impl Into<String>, relation: impl Into<String>, direction: Direction) -> Self {
        Self {
            label: label.into(),
            relations: vec![relation.into()],
            direction,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Sort entry: a direction, or an expression spliced verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sort {
    Direction(SortDirection),
    Expression(Expression),
}

impl Sort {
    pub const ASC: Sort = Sort::Direction(SortDirection::Asc);
    pub const DESC: Sort = Sort::Direction(SortDirection::Desc);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnionSpec {
    pub query: QueryDescriptor,
    #[serde(default)]
    pub all: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueryDescriptor {
    /// Modifier appended to the MATCH verb.
    pub select_option: Option<String>,
    pub distinct: bool,
    pub select: Vec<SelectItem>,
    /// Labels on the anchor pattern; empty matches any node.
    pub from: Vec<String>,
    pub join: Vec<JoinSpec>,
    #[serde(rename = "where")]
    pub condition: Option<Condition>,
    pub group_by: Vec<ColumnSpec>,
    pub having: Option<Condition>,
    #[serde(with = "super::pairs")]
    pub order_by: Vec<(String, Sort)>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub union: Vec<UnionSpec>,
    pub params: Params,
}

impl QueryDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_option(mut self, option: impl Into<String>) -> Self {
        self.select_option = Some(option.into());
        self
    }

    pub fn distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    pub fn select<I, T>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<SelectItem>,
    {
        self.select = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn add_select(mut self, column: impl Into<SelectItem>) -> Self {
        self.select.push(column.into());
        self
    }

    /// Adds a nested descriptor as an inlined sub-match.
    pub fn with_sub_match(mut self, query: QueryDescriptor) -> Self {
        self.select.push(SelectItem::SubQuery(Box::new(query)));
        self
    }

    /// Adds labels to the anchor pattern, ignoring ones already present.
    pub fn from<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for label in labels {
            let label = label.into();
            if !self.from.contains(&label) {
                self.from.push(label);
            }
        }
        self
    }

    pub fn join(mut self, join: JoinSpec) -> Self {
        self.join.push(join);
        self
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn and_filter(self, condition: Condition) -> Self {
        self.combine_filter(condition, Condition::and)
    }

    pub fn or_filter(self, condition: Condition) -> Self {
        self.combine_filter(condition, Condition::or)
    }

    fn combine_filter(mut self, condition: Condition, combine: fn(Vec<Condition>) -> Condition) -> Self {
        self.condition = Some(match self.condition.take() {
            Some(existing) => combine(vec![existing, condition]),
            None => condition,
        });
        self
    }

    pub fn group_by<I, T>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ColumnSpec>,
    {
        self.group_by = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn having(mut self, condition: Condition) -> Self {
        self.having = Some(condition);
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, sort: Sort) -> Self {
        self.order_by.push((column.into(), sort));
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn union(mut self, query: QueryDescriptor, all: bool) -> Self {
        self.union.push(UnionSpec { query, all });
        self
    }

    /// Binds a descriptor-level parameter; the internal prefix is added when missing.
    pub fn param(mut self, name: &str, value: impl Into<serde_json::Value>) -> Self {
        self.params.insert(internal_name(name), value.into());
        self
    }
}
