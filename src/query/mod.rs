//! Translation of relational-style query descriptors into Cypher.
//!
//! The entry point is [`QueryBuilder`]: it takes a [`QueryDescriptor`] plus
//! externally bound parameters and returns the query text with its
//! wire-level parameter map.

pub mod builder;
pub mod condition;
pub mod descriptor;
pub mod expression;
pub mod inflector;
pub mod mutation;
mod pairs;
pub mod params;
pub mod quote;

use thiserror::Error;

pub use builder::{BuilderConfig, QueryBuilder};
pub use condition::{Condition, InCondition, InOperator, InValues, LogicalOperator, Operand};
pub use descriptor::{ColumnSpec, Direction, JoinSpec, QueryDescriptor, SelectItem, Sort, SortDirection, UnionSpec};
pub use expression::Expression;
pub use params::{Params, Translated};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("Join #{index} must name a foreign label and at least one relation label")]
    InvalidJoin { index: usize },

    #[error("Join #{index} reuses the pattern variable '{variable}'")]
    DuplicateJoinVariable { index: usize, variable: String },

    #[error("HAVING is not supported by graph pattern queries")]
    HavingUnsupported,

    #[error("Operator '{operator}' requires two operands")]
    MissingOperand { operator: String },

    #[error("Parameter '{name}' is bound to more than one value")]
    ParamCollision { name: String },

    #[error("Update of '{label}' has no attributes to set")]
    EmptyUpdate { label: String },
}
