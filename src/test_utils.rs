//! Shared test utilities for command and integration tests.

use std::io::Write;

use tempfile::NamedTempFile;

use crate::config::ConfigFile;

/// Create a temporary file containing the given content.
///
/// Used to hand descriptor, condition and parameter JSON to commands.
pub fn create_temp_json_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write temp file");
    file
}

/// Configuration with a small blog schema:
/// authors write posts, join groups through memberships and follow each other.
pub fn blog_config() -> ConfigFile {
    serde_json::from_str(BLOG_CONFIG).expect("Blog config should parse")
}

pub const BLOG_CONFIG: &str = r#"
{
    "relations": [
        { "owner": "Author", "name": "posts", "target": "Post", "link": ["WROTE"],
          "direction": "out", "multiplicity": "many", "index_by": "slug" },
        { "owner": "Author", "name": "memberships", "target": "Membership", "link": ["MEMBER_OF"],
          "direction": "out" },
        { "owner": "Author", "name": "groups", "target": "Group", "direction": "out",
          "via": { "entity": { "relation": "memberships" } } },
        { "owner": "Author", "name": "follows", "target": "Author", "direction": "out",
          "via": { "edge": { "link": "FOLLOWS", "direction": "out" } } },
        { "owner": "Post", "name": "author", "target": "Author", "link": ["WROTE"],
          "direction": "in", "multiplicity": "one" }
    ]
}
"#;
