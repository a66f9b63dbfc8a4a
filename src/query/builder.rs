//! Cypher generation for read and delete statements.
//!
//! Clauses are rendered in a fixed order and joined by the configured
//! separator; clauses that render empty are dropped:
//!
//! ```text
//! MATCH [option] (n:Label) [WITH sub]* [join]* [WHERE ..] RETURN .. [ORDER BY ..] [LIMIT x SKIP y]
//! ```
//!
//! Every value is bound through one [`ParamSink`] per translation, so
//! placeholder numbering follows clause order and nested descriptors share the
//! counter with their parent.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::condition::{Condition, InCondition, InOperator, InValues, LogicalOperator, Operand};
use super::descriptor::{ColumnSpec, Direction, JoinSpec, QueryDescriptor, SelectItem, Sort, SortDirection, UnionSpec};
use super::inflector::variablize;
use super::params::{externalize, ParamSink, Params, Translated};
use super::quote::quote_column_name;
use super::BuildError;

/// Reserved column name standing for the graph identity of the anchor node.
pub const ID_COLUMN: &str = "id";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Variable bound to the anchor node.
    pub identifier: String,
    /// Variable bound to relationships in delete and relate statements.
    pub relation_identifier: String,
    pub separator: String,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            identifier: "n".to_string(),
            relation_identifier: "r".to_string(),
            separator: " ".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    config: BuilderConfig,
}

impl QueryBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Translates a descriptor into Cypher text and wire-level parameters.
    pub fn translate(&self, query: &QueryDescriptor, params: Params) -> Result<Translated, BuildError> {
        let mut sink = ParamSink::new(params);
        let text = self.build(query, &mut sink)?;
        self.finish(text, sink)
    }

    /// `MATCH (n:Label) OPTIONAL MATCH (n)-[r]-() WHERE .. DELETE n,r`
    pub fn delete<I, S>(&self, labels: I, condition: Option<&Condition>, params: Params) -> Result<Translated, BuildError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        let mut sink = ParamSink::new(params);
        let n = &self.config.identifier;
        let r = &self.config.relation_identifier;

        let text = self.join_clauses([
            "MATCH".to_string(),
            self.build_anchor(&labels),
            format!("OPTIONAL MATCH ({n})-[{r}]-()"),
            self.build_where(condition, &mut sink)?,
            format!("DELETE {n},{r}"),
        ]);
        self.finish(text, sink)
    }

    pub(crate) fn finish(&self, text: String, sink: ParamSink) -> Result<Translated, BuildError> {
        let translated = externalize(&text, sink.into_params())?;
        log::debug!("translated: {} ({} params)", translated.text, translated.params.len());
        Ok(translated)
    }

    /// Renders a descriptor into internal-placeholder text, binding into `sink`.
    pub(crate) fn build(&self, query: &QueryDescriptor, sink: &mut ParamSink) -> Result<String, BuildError> {
        if query.having.is_some() {
            return Err(BuildError::HavingUnsupported);
        }
        sink.merge(&query.params)?;

        let mut sub_matches = Vec::new();
        let mut columns = Vec::new();
        for item in &query.select {
            match item {
                SelectItem::SubQuery(sub) => sub_matches.push(sub.as_ref()),
                SelectItem::Column(column) => columns.push(column),
            }
        }
        let projection: Vec<&ColumnSpec> = if query.group_by.is_empty() {
            columns
        } else {
            query.group_by.iter().collect()
        };

        let text = self.join_clauses([
            self.build_match(query.select_option.as_deref()),
            self.build_anchor(&query.from),
            self.build_sub_matches(&sub_matches, sink)?,
            self.build_joins(&query.join)?,
            self.build_where(query.condition.as_ref(), sink)?,
            self.build_return(&projection, query.distinct, sink)?,
            self.build_order_by(&query.order_by, sink)?,
            self.build_paging(query.limit, query.offset),
        ]);

        if query.union.is_empty() {
            return Ok(text);
        }
        let union = self.build_union(&query.union, sink)?;
        Ok(format!("({text}){}{union}", self.config.separator))
    }

    pub(crate) fn join_clauses<I>(&self, clauses: I) -> String
    where
        I: IntoIterator<Item = String>,
    {
        clauses
            .into_iter()
            .filter(|clause| !clause.is_empty())
            .collect::<Vec<_>>()
            .join(&self.config.separator)
    }

    fn build_match(&self, option: Option<&str>) -> String {
        match option {
            Some(option) if !option.is_empty() => format!("MATCH {option}"),
            _ => "MATCH".to_string(),
        }
    }

    /// `(n:A:B)`, or `(n)` without labels.
    pub(crate) fn build_anchor(&self, labels: &[String]) -> String {
        let labels: String = labels.iter().map(|label| format!(":{label}")).collect();
        format!("({}{labels})", self.config.identifier)
    }

    fn build_sub_matches(&self, queries: &[&QueryDescriptor], sink: &mut ParamSink) -> Result<String, BuildError> {
        let mut parts = Vec::with_capacity(queries.len());
        for query in queries {
            parts.push(format!("WITH {}", self.build(query, sink)?));
        }
        Ok(parts.join("\n"))
    }

    /// Variables derived from labels must stay distinct from each other and
    /// from the anchor, otherwise Cypher binds two joins to the same element.
    fn build_joins(&self, joins: &[JoinSpec]) -> Result<String, BuildError> {
        let mut parts = Vec::with_capacity(joins.len());
        let mut taken = HashSet::from([self.config.identifier.clone()]);
        for (index, join) in joins.iter().enumerate() {
            let relation = match join.relations.first() {
                Some(relation) if !join.label.is_empty() && !relation.is_empty() => relation,
                _ => return Err(BuildError::InvalidJoin { index }),
            };
            let node_var = variablize(&join.label);
            let edge_var = variablize(relation);
            for variable in [&edge_var, &node_var] {
                if !taken.insert(variable.clone()) {
                    return Err(BuildError::DuplicateJoinVariable {
                        index,
                        variable: variable.clone(),
                    });
                }
            }
            let node = format!("({node_var}:{})", join.label);
            let edge = format!("[{edge_var}:{relation}]");
            parts.push(match join.direction {
                Direction::In => format!("<-{edge}-{node}"),
                Direction::Out => format!("-{edge}->{node}"),
                Direction::Undirected => format!("-{edge}-{node}"),
            });
        }
        Ok(parts.join(&self.config.separator))
    }

    pub(crate) fn build_where(&self, condition: Option<&Condition>, sink: &mut ParamSink) -> Result<String, BuildError> {
        let rendered = match condition {
            Some(condition) => self.build_condition(condition, sink)?,
            None => String::new(),
        };
        Ok(if rendered.is_empty() {
            rendered
        } else {
            format!("WHERE {rendered}")
        })
    }

    pub(crate) fn build_condition(&self, condition: &Condition, sink: &mut ParamSink) -> Result<String, BuildError> {
        match condition {
            Condition::Hash(pairs) => self.build_hash_condition(pairs, sink),
            Condition::In(inc) => self.build_in_condition(inc, sink),
            Condition::Composite { operator, conditions } => self.build_composite(*operator, conditions, sink),
            Condition::Not(inner) => {
                let inner = self.build_condition(inner, sink)?;
                Ok(if inner.is_empty() { inner } else { format!("NOT ({inner})") })
            }
            Condition::Raw(expr) => {
                sink.merge(&expr.params)?;
                Ok(expr.expression.clone())
            }
        }
    }

    fn build_hash_condition(&self, pairs: &[(String, Operand)], sink: &mut ParamSink) -> Result<String, BuildError> {
        let mut parts = Vec::with_capacity(pairs.len());
        for (column, operand) in pairs {
            let part = match operand {
                Operand::Value(Value::Array(items)) => {
                    let inc = InCondition {
                        operator: InOperator::In,
                        columns: vec![column.clone()],
                        values: Some(InValues::List(items.iter().cloned().map(Operand::Value).collect())),
                    };
                    self.build_in_condition(&inc, sink)?
                }
                Operand::Value(Value::Null) => format!("{} IS NULL", self.column_ref(column)),
                Operand::Expression(expr) => {
                    sink.merge(&expr.params)?;
                    format!("{}={}", self.column_ref(column), expr.expression)
                }
                Operand::Value(value) => {
                    let placeholder = sink.bind(self.bound_value(column, value));
                    format!("{}={placeholder}", self.column_ref(column))
                }
            };
            parts.push(part);
        }

        Ok(match parts.len() {
            0 => String::new(),
            1 => parts.remove(0),
            _ => format!("({})", parts.join(") AND (")),
        })
    }

    fn build_in_condition(&self, inc: &InCondition, sink: &mut ParamSink) -> Result<String, BuildError> {
        let operator = inc.operator;
        let values = inc.values.as_ref().ok_or_else(|| BuildError::MissingOperand {
            operator: operator.keyword().to_string(),
        })?;

        let degenerate = match values {
            InValues::List(list) => list.is_empty(),
            InValues::SubQuery(_) => false,
        };
        if degenerate || inc.columns.is_empty() {
            return Ok(match operator {
                InOperator::In => "0=1".to_string(),
                InOperator::NotIn => String::new(),
            });
        }

        let list = match values {
            InValues::SubQuery(query) => {
                let sub = self.build(query, sink)?;
                let column = if inc.columns.len() == 1 {
                    self.column_ref(&inc.columns[0])
                } else {
                    format!("({})", self.column_refs(&inc.columns))
                };
                return Ok(format!("{column} {} ({sub})", operator.keyword()));
            }
            InValues::List(list) => list,
        };

        if inc.columns.len() > 1 {
            return self.build_composite_in(operator, &inc.columns, list, sink);
        }

        let column = &inc.columns[0];
        let mut rendered = Vec::with_capacity(list.len());
        for operand in list {
            let item = match operand {
                Operand::Expression(expr) => {
                    sink.merge(&expr.params)?;
                    expr.expression.clone()
                }
                Operand::Value(Value::Object(row)) => match row.get(column) {
                    Some(value) if !value.is_null() => sink.bind(self.bound_value(column, value)),
                    _ => "NULL".to_string(),
                },
                Operand::Value(Value::Null) => "NULL".to_string(),
                Operand::Value(value) => sink.bind(self.bound_value(column, value)),
            };
            rendered.push(item);
        }

        let column = self.column_ref(column);
        if rendered.len() == 1 {
            Ok(format!("{column}{}{}", operator.comparison(), rendered[0]))
        } else {
            Ok(format!("{column} {} ({})", operator.keyword(), rendered.join(", ")))
        }
    }

    fn build_composite_in(
        &self,
        operator: InOperator,
        columns: &[String],
        rows: &[Operand],
        sink: &mut ParamSink,
    ) -> Result<String, BuildError> {
        let mut tuples = Vec::with_capacity(rows.len());
        for row in rows {
            let tuple = match row {
                Operand::Expression(expr) => {
                    sink.merge(&expr.params)?;
                    expr.expression.clone()
                }
                Operand::Value(value) => {
                    let mut items = Vec::with_capacity(columns.len());
                    for column in columns {
                        match value.get(column) {
                            Some(v) if !v.is_null() => items.push(sink.bind(self.bound_value(column, v))),
                            _ => items.push("NULL".to_string()),
                        }
                    }
                    format!("({})", items.join(", "))
                }
            };
            tuples.push(tuple);
        }
        Ok(format!(
            "({}) {} ({})",
            self.column_refs(columns),
            operator.keyword(),
            tuples.join(", ")
        ))
    }

    fn build_composite(
        &self,
        operator: LogicalOperator,
        conditions: &[Condition],
        sink: &mut ParamSink,
    ) -> Result<String, BuildError> {
        let mut parts = Vec::with_capacity(conditions.len());
        for condition in conditions {
            let part = self.build_condition(condition, sink)?;
            if !part.is_empty() {
                parts.push(part);
            }
        }
        if parts.is_empty() {
            return Ok(String::new());
        }
        Ok(format!("({})", parts.join(&format!(") {} (", operator.keyword()))))
    }

    fn build_return(&self, columns: &[&ColumnSpec], distinct: bool, sink: &mut ParamSink) -> Result<String, BuildError> {
        let keyword = if distinct { "RETURN DISTINCT" } else { "RETURN" };
        if columns.is_empty() {
            return Ok(format!("{keyword} {}", self.config.identifier));
        }
        let mut rendered = Vec::with_capacity(columns.len());
        for column in columns {
            rendered.push(match column {
                ColumnSpec::Name(name) if name == ID_COLUMN => self.id_ref(),
                ColumnSpec::Name(name) => quote_column_name(name),
                ColumnSpec::Expression(expr) => {
                    sink.merge(&expr.params)?;
                    expr.expression.clone()
                }
            });
        }
        Ok(format!("{keyword} {}", rendered.join(", ")))
    }

    fn build_order_by(&self, order_by: &[(String, Sort)], sink: &mut ParamSink) -> Result<String, BuildError> {
        if order_by.is_empty() {
            return Ok(String::new());
        }
        let mut parts = Vec::with_capacity(order_by.len());
        for (name, sort) in order_by {
            parts.push(match sort {
                Sort::Expression(expr) => {
                    sink.merge(&expr.params)?;
                    expr.expression.clone()
                }
                Sort::Direction(direction) => {
                    let column = if name == ID_COLUMN {
                        self.id_ref()
                    } else {
                        quote_column_name(name)
                    };
                    match direction {
                        SortDirection::Asc => column,
                        SortDirection::Desc => format!("{column} DESC"),
                    }
                }
            });
        }
        Ok(format!("ORDER BY {}", parts.join(", ")))
    }

    fn build_paging(&self, limit: Option<i64>, offset: Option<i64>) -> String {
        let mut parts = Vec::with_capacity(2);
        if let Some(limit) = limit.filter(|l| *l >= 0) {
            parts.push(format!("LIMIT {limit}"));
        }
        if let Some(offset) = offset.filter(|o| *o >= 0) {
            parts.push(format!("SKIP {offset}"));
        }
        parts.join(" ")
    }

    fn build_union(&self, unions: &[UnionSpec], sink: &mut ParamSink) -> Result<String, BuildError> {
        let mut parts = Vec::with_capacity(unions.len());
        for union in unions {
            let sub = self.build(&union.query, sink)?;
            let keyword = if union.all { "UNION ALL" } else { "UNION" };
            parts.push(format!("{keyword} ({sub})"));
        }
        Ok(parts.join(&self.config.separator))
    }

    fn id_ref(&self) -> String {
        format!("id({})", self.config.identifier)
    }

    /// `id` -> `id(n)`, function calls stay raw, anything else is a property of the anchor.
    pub(crate) fn column_ref(&self, column: &str) -> String {
        if column == ID_COLUMN {
            self.id_ref()
        } else if column.contains('(') {
            column.to_string()
        } else {
            format!("{}.{}", self.config.identifier, quote_column_name(column))
        }
    }

    fn column_refs(&self, columns: &[String]) -> String {
        columns
            .iter()
            .map(|column| self.column_ref(column))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn bound_value(&self, column: &str, value: &Value) -> Value {
        if column == ID_COLUMN {
            Value::from(coerce_graph_id(value))
        } else {
            value.clone()
        }
    }
}

/// Integer coercion for graph identities.
///
/// Strings contribute their leading integer (`"42abc"` is 42, `"abc"` is 0),
/// floats are truncated and booleans map to 1/0.
pub fn coerce_graph_id(value: &Value) -> i64 {
    match value {
        Value::Null => 0,
        Value::Bool(b) => i64::from(*b),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(i64::MAX),
        Value::String(s) => leading_integer(s),
        Value::Array(items) => i64::from(!items.is_empty()),
        Value::Object(map) => i64::from(!map.is_empty()),
    }
}

fn leading_integer(s: &str) -> i64 {
    let trimmed = s.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, b| acc.saturating_mul(10).saturating_add(i64::from(b - b'0')));
    if negative { -magnitude } else { magnitude }
}
