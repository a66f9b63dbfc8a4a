//! Write statements used by record persistence and the Cypher transport.

use super::builder::QueryBuilder;
use super::condition::{Condition, Operand};
use super::descriptor::QueryDescriptor;
use super::expression::Expression;
use super::params::{ParamSink, Params, Translated};
use super::quote::quote_column_name;
use super::BuildError;
use serde_json::Value;

impl QueryBuilder {
    /// `CREATE (n:Label {name: {p0}}) RETURN n`
    pub fn insert(&self, label: &str, properties: &Params) -> Result<Translated, BuildError> {
        let mut sink = ParamSink::default();
        let n = &self.config().identifier;
        let labels = if label.is_empty() { String::new() } else { format!(":{label}") };
        let properties = self.property_map(properties, &mut sink);
        self.finish(format!("CREATE ({n}{labels}{properties}) RETURN {n}"), sink)
    }

    /// `MATCH (n:Label) WHERE .. SET n.a={p0}, n.b=NULL`
    ///
    /// Expression operands are spliced; `null` clears the property.
    pub fn update(
        &self,
        label: &str,
        attributes: &[(String, Operand)],
        condition: Option<&Condition>,
        params: Params,
    ) -> Result<Translated, BuildError> {
        if attributes.is_empty() {
            return Err(BuildError::EmptyUpdate {
                label: label.to_string(),
            });
        }
        let mut sink = ParamSink::new(params);
        let labels: Vec<String> = Some(label).filter(|l| !l.is_empty()).map(String::from).into_iter().collect();
        let anchor = self.build_anchor(&labels);
        let filter = self.build_where(condition, &mut sink)?;

        let n = &self.config().identifier;
        let mut sets = Vec::with_capacity(attributes.len());
        for (column, operand) in attributes {
            let value = match operand {
                Operand::Expression(expr) => {
                    sink.merge(&expr.params)?;
                    expr.expression.clone()
                }
                Operand::Value(Value::Null) => "NULL".to_string(),
                Operand::Value(value) => sink.bind(value.clone()),
            };
            sets.push(format!("{n}.{}={value}", quote_column_name(column)));
        }

        let text = self.join_clauses([
            "MATCH".to_string(),
            anchor,
            filter,
            format!("SET {}", sets.join(", ")),
        ]);
        self.finish(text, sink)
    }

    /// `SET n.age=n.age+{bp0}` for each counter, in order.
    pub fn update_counters(
        &self,
        label: &str,
        counters: &[(String, i64)],
        condition: Option<&Condition>,
        params: Params,
    ) -> Result<Translated, BuildError> {
        let n = &self.config().identifier;
        let attributes: Vec<(String, Operand)> = counters
            .iter()
            .enumerate()
            .map(|(i, (column, increment))| {
                let name = format!("bp{i}");
                let expr = Expression::new(format!("{n}.{}+:{name}", quote_column_name(column)))
                    .with_param(&name, *increment);
                (column.clone(), Operand::Expression(expr))
            })
            .collect();
        self.update(label, &attributes, condition, params)
    }

    /// Creates one typed edge between two nodes addressed by identity.
    pub fn relate(&self, from_id: i64, to_id: i64, edge_type: &str, properties: &Params) -> Result<Translated, BuildError> {
        let mut sink = ParamSink::default();
        let from = sink.bind(Value::from(from_id));
        let to = sink.bind(Value::from(to_id));
        let properties = self.property_map(properties, &mut sink);
        let r = &self.config().relation_identifier;

        let text = self.join_clauses([
            "MATCH (a), (b)".to_string(),
            format!("WHERE id(a)={from} AND id(b)={to}"),
            format!("CREATE (a)-[{r}:{edge_type}{properties}]->(b)"),
            format!("RETURN id({r}) AS id"),
        ]);
        self.finish(text, sink)
    }

    /// `MATCH (n:Label) WHERE id(n)={p0} RETURN n`
    pub fn find_node(&self, label: Option<&str>, id: i64) -> Result<Translated, BuildError> {
        let query = QueryDescriptor::new()
            .from(label.filter(|l| !l.is_empty()))
            .filter(Condition::hash([("id", Operand::from(id))]));
        self.translate(&query, Params::new())
    }

    /// ` {a: :p0, b: :p1}`, or nothing for an empty map.
    fn property_map(&self, properties: &Params, sink: &mut ParamSink) -> String {
        if properties.is_empty() {
            return String::new();
        }
        let entries: Vec<String> = properties
            .iter()
            .map(|(key, value)| format!("{}: {}", quote_column_name(key), sink.bind(value.clone())))
            .collect();
        format!(" {{{}}}", entries.join(", "))
    }
}
