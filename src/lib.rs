//! cypher_record library - relational-style queries and relations over a Cypher graph
//!
//! Provides the query translator (descriptor to Cypher text and parameters),
//! the relationship linker with its relation registry, graph transports, and
//! the configuration, command and output infrastructure behind the CLI.

pub mod cli;
pub mod commands;
pub mod config;
pub mod graph;
pub mod linker;
pub mod output;
pub mod query;

#[macro_use]
pub mod test_macros;

#[cfg(test)]
pub mod test_utils;
