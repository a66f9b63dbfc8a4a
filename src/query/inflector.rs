//! Derives pattern variable names from labels.
//!
//! Join expansion needs a variable per foreign node and per relationship.
//! Names are the lower-camel, singular form of the label:
//! - Post -> post
//! - BlogPosts -> blogPost
//! - WRITTEN_BY -> writtenBy
//! - Categories -> category

use std::sync::LazyLock;

use regex::Regex;

static WORD_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}]+").unwrap());

/// Words whose plural and singular forms coincide.
const UNCOUNTABLE: &[&str] = &["news", "series", "species", "data", "information"];

/// Converts a label to a lower-camel, singular variable name.
pub fn variablize(label: &str) -> String {
    let camel = WORD_SEPARATOR
        .split(label)
        .filter(|word| !word.is_empty())
        .map(capitalize_word)
        .collect::<String>();

    let singular = singularize(&camel);
    let mut chars = singular.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Upper-cases the first letter; SHOUTING words are folded to Title case first.
fn capitalize_word(word: &str) -> String {
    let shouting = word.chars().any(char::is_alphabetic) && !word.chars().any(char::is_lowercase);
    let word = if shouting { word.to_lowercase() } else { word.to_string() };

    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Singularizes the trailing word of a PascalCase name.
pub fn singularize(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    if UNCOUNTABLE.iter().any(|u| lower.ends_with(u)) {
        return word.to_string();
    }

    let strip = |n: usize| word[..word.len() - n].to_string();

    if lower.len() > 3 && lower.ends_with("ies") {
        return format!("{}y", strip(3));
    }
    if ["sses", "shes", "ches", "xes", "zzes"].iter().any(|s| lower.ends_with(s)) {
        return strip(2);
    }
    if ["ss", "us", "is"].iter().any(|s| lower.ends_with(s)) {
        return word.to_string();
    }
    if lower.len() > 1 && lower.ends_with('s') {
        return strip(1);
    }
    word.to_string()
}
