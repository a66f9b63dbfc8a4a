//! Filter conditions as a closed sum type.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::descriptor::QueryDescriptor;
use super::expression::Expression;

/// Right-hand side of a comparison: a bound value or a literal expression.
///
/// A JSON `null` compiles to an `IS NULL` test, a JSON array to an IN
/// membership test, and (inside IN lists) a JSON object is a row keyed by
/// column name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    Expression(Expression),
    Value(Value),
}

impl Operand {
    pub fn null() -> Self {
        Operand::Value(Value::Null)
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Operand::Value(value)
    }
}

impl From<Expression> for Operand {
    fn from(expr: Expression) -> Self {
        Operand::Expression(expr)
    }
}

impl From<&str> for Operand {
    fn from(value: &str) -> Self {
        Operand::Value(Value::from(value))
    }
}

impl From<String> for Operand {
    fn from(value: String) -> Self {
        Operand::Value(Value::from(value))
    }
}

impl From<i32> for Operand {
    fn from(value: i32) -> Self {
        Operand::Value(Value::from(value))
    }
}

impl From<i64> for Operand {
    fn from(value: i64) -> Self {
        Operand::Value(Value::from(value))
    }
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Operand::Value(Value::from(value))
    }
}

impl From<bool> for Operand {
    fn from(value: bool) -> Self {
        Operand::Value(Value::from(value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InOperator {
    #[default]
    In,
    NotIn,
}

impl InOperator {
    pub fn keyword(&self) -> &'static str {
        match self {
            InOperator::In => "IN",
            InOperator::NotIn => "NOT IN",
        }
    }

    /// Comparison used when the value list collapses to a single element.
    pub fn comparison(&self) -> &'static str {
        match self {
            InOperator::In => "=",
            InOperator::NotIn => "<>",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    pub fn keyword(&self) -> &'static str {
        match self {
            LogicalOperator::And => "AND",
            LogicalOperator::Or => "OR",
        }
    }
}

/// Values an IN condition tests membership against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InValues {
    List(Vec<Operand>),
    SubQuery(Box<QueryDescriptor>),
}

/// `columns IN values`, single-column or composite.
///
/// `values` is optional only so that a descriptor missing its second operand
/// can be represented and rejected at build time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InCondition {
    #[serde(default)]
    pub operator: InOperator,
    pub columns: Vec<String>,
    #[serde(default)]
    pub values: Option<InValues>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Column/operand pairs combined with AND, in insertion order.
    Hash(#[serde(with = "super::pairs")] Vec<(String, Operand)>),
    In(InCondition),
    Composite {
        operator: LogicalOperator,
        conditions: Vec<Condition>,
    },
    Not(Box<Condition>),
    Raw(Expression),
}

impl Condition {
    pub fn hash<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Operand)>,
    {
        Condition::Hash(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn in_list<I>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Operand>,
    {
        Condition::In(InCondition {
            operator: InOperator::In,
            columns: vec![column.into()],
            values: Some(InValues::List(values.into_iter().collect())),
        })
    }

    pub fn not_in_list<I>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Operand>,
    {
        Condition::In(InCondition {
            operator: InOperator::NotIn,
            columns: vec![column.into()],
            values: Some(InValues::List(values.into_iter().collect())),
        })
    }

    /// Composite IN over several columns; each row is a JSON object keyed by column.
    pub fn composite_in<C, S>(columns: C, rows: Vec<Value>) -> Self
    where
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Condition::In(InCondition {
            operator: InOperator::In,
            columns: columns.into_iter().map(Into::into).collect(),
            values: Some(InValues::List(rows.into_iter().map(Operand::Value).collect())),
        })
    }

    pub fn in_query(column: impl Into<String>, query: QueryDescriptor) -> Self {
        Condition::In(InCondition {
            operator: InOperator::In,
            columns: vec![column.into()],
            values: Some(InValues::SubQuery(Box::new(query))),
        })
    }

    pub fn and(conditions: Vec<Condition>) -> Self {
        Condition::Composite {
            operator: LogicalOperator::And,
            conditions,
        }
    }

    pub fn or(conditions: Vec<Condition>) -> Self {
        Condition::Composite {
            operator: LogicalOperator::Or,
            conditions,
        }
    }

    pub fn negate(condition: Condition) -> Self {
        Condition::Not(Box::new(condition))
    }

    pub fn raw(expression: Expression) -> Self {
        Condition::Raw(expression)
    }
}
