//! BNET Search - evolve gene networks onto target attractors
//!
//! Usage: `bnet-search [config.json]`
//!
//! Without a config file, settings come from `BNET_*` environment
//! variables. The report is printed to stdout as JSON; logs go to stderr.

use tracing::{info, Level};

use bnet_core::BnetConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let level = if std::env::var("BNET_DEBUG").is_ok() {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading config from {}", path);
            BnetConfig::load(&path)?
        }
        None => BnetConfig::from_env()?,
    };

    info!(
        "🧬 {} genes, {} inputs, {} runs of up to {} generations",
        config.network.genes,
        config.network.inputs,
        config.search.runs,
        config.search.max_generations
    );

    let report = bnet_search::run_search(&config)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
