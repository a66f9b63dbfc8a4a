mod execute;
mod output;

pub use execute::{RelationRow, RelationsResult};

use clap::Args;

/// List the configured relations
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  cypher_record relations                   # All declared relations
  cypher_record relations --owner Author    # Relations of one label")]
pub struct RelationsCmd {
    /// Only show relations owned by this label
    #[arg(long)]
    pub owner: Option<String>,
}
