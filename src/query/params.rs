//! Placeholder allocation and the final rename into wire-level syntax.
//!
//! While clauses are built, every bound value is referenced by an internal
//! placeholder (`:p0`, `:p1`, ...). Once the whole query text exists,
//! [`externalize`] rewrites those tokens into the `{p0}` form the graph
//! database expects and renames the parameter map keys in lockstep.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{Map, Value};

use super::BuildError;

/// Ordered parameter map (insertion order is preserved).
pub type Params = Map<String, Value>;

/// Prefix marking an internal placeholder in query text and parameter keys.
pub const PARAM_PREFIX: char = ':';

/// Stem of allocator-generated placeholder names.
const PLACEHOLDER_STEM: &str = "p";

/// Returns `name` with the internal prefix, adding it when missing.
pub fn internal_name(name: &str) -> String {
    if name.starts_with(PARAM_PREFIX) {
        name.to_string()
    } else {
        format!("{PARAM_PREFIX}{name}")
    }
}

/// Final output of a translation: query text plus wire-level parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Translated {
    pub text: String,
    pub params: Params,
}

/// Parameter map under construction, with a single monotonic counter.
///
/// Names already present (external or expression parameters) are skipped by
/// the counter, so an allocated placeholder never shadows another binding.
#[derive(Debug, Default)]
pub struct ParamSink {
    params: Params,
    next: usize,
}

impl ParamSink {
    pub fn new(params: Params) -> Self {
        Self { params, next: 0 }
    }

    /// Binds a value under a fresh placeholder and returns the placeholder.
    pub fn bind(&mut self, value: Value) -> String {
        loop {
            let name = format!("{PARAM_PREFIX}{PLACEHOLDER_STEM}{}", self.next);
            self.next += 1;
            if !self.params.contains_key(&name) {
                self.params.insert(name.clone(), value);
                return name;
            }
        }
    }

    /// Merges named parameters (descriptor, expressions, raw conditions).
    ///
    /// Names are stored in internal form whether or not the caller wrote the
    /// prefix. Re-binding a name to the same value is allowed; a different
    /// value under an existing name is a collision.
    pub fn merge(&mut self, params: &Params) -> Result<(), BuildError> {
        for (name, value) in params {
            let name = internal_name(name);
            match self.params.get(&name) {
                Some(existing) if existing != value => {
                    return Err(BuildError::ParamCollision { name });
                }
                Some(_) => {}
                None => {
                    self.params.insert(name, value.clone());
                }
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn into_params(self) -> Params {
        self.params
    }
}

fn is_identifier_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'`'
}

/// Rewrites internal placeholders into `{name}` form and renames the keys.
///
/// A token is a placeholder only when it is a key of `params` and the prefix is
/// not glued to a preceding identifier, so label syntax such as `n:Person` is
/// never touched and `:p1` never matches inside `:p10`. Entries that end up
/// unreferenced by the text are dropped.
pub fn externalize(text: &str, params: Params) -> Result<Translated, BuildError> {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len() + params.len() * 2);
    let mut used: HashSet<&str> = HashSet::new();
    let mut last = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == PARAM_PREFIX as u8 && (i == 0 || !is_identifier_byte(bytes[i - 1])) {
            let start = i + 1;
            let mut end = start;
            while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
                end += 1;
            }
            if end > start && params.contains_key(&text[i..end]) {
                out.push_str(&text[last..i]);
                out.push('{');
                out.push_str(&text[start..end]);
                out.push('}');
                used.insert(&text[i..end]);
                last = end;
                i = end;
                continue;
            }
        }
        i += 1;
    }
    out.push_str(&text[last..]);

    let mut renamed = Params::new();
    for (name, value) in &params {
        let wire = match name.strip_prefix(PARAM_PREFIX) {
            Some(stripped) if used.contains(name.as_str()) => stripped.to_string(),
            Some(_) => {
                log::debug!("dropping unreferenced parameter {}", name);
                continue;
            }
            None if out.contains(&format!("{{{name}}}")) => name.clone(),
            None => {
                log::debug!("dropping unreferenced parameter {}", name);
                continue;
            }
        };
        if renamed.contains_key(&wire) {
            return Err(BuildError::ParamCollision { name: wire });
        }
        renamed.insert(wire, value.clone());
    }

    Ok(Translated {
        text: out,
        params: renamed,
    })
}
