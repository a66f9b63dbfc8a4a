mod execute;
mod execute_tests;

use std::path::PathBuf;

use clap::Args;

/// Build the statement deleting matching nodes and their relationships
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  cypher_record delete --label Person                       # Every Person node
  cypher_record delete --label Person --where cond.json     # Filtered by a condition
  cypher_record delete -l Person -l Admin                   # Nodes carrying both labels")]
pub struct DeleteCmd {
    /// Label of the nodes to delete (repeatable)
    #[arg(short, long = "label", required = true)]
    pub labels: Vec<String>,

    /// JSON file holding the filter condition, e.g. {"hash": {"status": 0}}
    #[arg(short = 'w', long = "where")]
    pub condition: Option<PathBuf>,

    /// JSON object of externally bound parameters
    #[arg(short, long)]
    pub params: Option<PathBuf>,
}
