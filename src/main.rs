use clap::Parser;

use cypher_record::cli::Args;
use cypher_record::config::ConfigFile;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let config = ConfigFile::load_from(&args.config)?;
    let output = args.command.run(&config, args.format)?;
    println!("{}", output);
    Ok(())
}
