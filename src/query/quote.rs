//! Identifier quoting for property names and projected columns.

use std::sync::LazyLock;

use regex::Regex;

static PLAIN_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$").unwrap()
});

/// Whether `name` is already an expression the builder must not touch.
///
/// Function calls, backtick-quoted names, aliased columns and `*` pass through.
pub fn is_raw_expression(name: &str) -> bool {
    name.contains('(') || name.contains('`') || name.contains(char::is_whitespace) || name == "*"
}

/// Quote a property or column name for use in Cypher.
///
/// Plain identifiers (optionally dotted, like `n.name`) and raw expressions
/// are returned unchanged. Anything else is wrapped in backticks, with
/// embedded backticks doubled.
pub fn quote_column_name(name: &str) -> String {
    if PLAIN_IDENTIFIER.is_match(name) || is_raw_expression(name) {
        name.to_string()
    } else {
        format!("`{}`", name.replace('`', "``"))
    }
}
