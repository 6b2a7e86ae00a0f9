//! Entrel server binary
//!
//! Starts the HTTP server for the entity registry.

use anyhow::Context;
use clap::Parser;
use entrel_api::{config::ApiConfig, start_server};
use std::path::PathBuf;
use std::process;

/// Entrel - persons, companies, relations and ownership over HTTP.
#[derive(Debug, Parser)]
#[command(name = "entrel-server")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "ENTREL_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ApiConfig::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => {
            eprintln!("Warning: No config file specified, using default test configuration");
            eprintln!("Usage: entrel-server --config <path-to-config.toml>");
            eprintln!();
            ApiConfig::default_test_config()
        }
    };

    start_server(config).await?;

    Ok(())
}
