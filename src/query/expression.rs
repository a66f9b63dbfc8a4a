//! Raw Cypher fragments carried through the builder verbatim.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::params::{internal_name, Params};

/// A literal Cypher fragment with its own named parameters.
///
/// The text is spliced into the generated query as-is. Parameters are merged
/// into the outer parameter map under their own names, bypassing the
/// placeholder allocator, so the text must reference them with the internal
/// prefix (e.g. `n.age+:bp0`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Expression {
    pub expression: String,
    #[serde(default, skip_serializing_if = "Params::is_empty")]
    pub params: Params,
}

impl Expression {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            params: Params::new(),
        }
    }

    /// Binds a named parameter. The internal prefix is added when missing.
    pub fn with_param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.params.insert(internal_name(name), value.into());
        self
    }
}
