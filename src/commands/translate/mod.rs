mod execute;

use std::path::PathBuf;

use clap::Args;

/// Translate a query descriptor (JSON) into Cypher text and parameters
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  cypher_record translate query.json                    # Print statement and parameters
  cypher_record translate query.json --params p.json    # Bind external parameters
  cypher_record translate query.json -o json            # Machine-readable output")]
pub struct TranslateCmd {
    /// Path to the query descriptor JSON file
    pub descriptor: PathBuf,

    /// JSON object of externally bound parameters
    #[arg(short, long)]
    pub params: Option<PathBuf>,
}
