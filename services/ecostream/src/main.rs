//! EcoStream dashboard CLI

use std::path::PathBuf;

use clap::Parser;
use ecostream::{load_config, Config};
use tracing::Level;

#[derive(Parser)]
#[command(name = "ecostream")]
#[command(about = "Live industrial telemetry dashboard")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL of the readings service (overrides config file)
    #[arg(long)]
    endpoint: Option<String>,

    /// Dashboard port (overrides config file)
    #[arg(long)]
    port: Option<u16>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, endpoint={:?}, port={:?}, log_level={:?}",
        args.config,
        args.endpoint,
        args.port,
        args.log_level
    );

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    if let Some(endpoint) = args.endpoint {
        config.source.base_url = endpoint;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing::info!(
        "Starting EcoStream dashboard, polling {} every {} ms",
        config.source.readings_url(),
        config.source.polling_interval_ms
    );

    ecostream::run(config).await?;

    Ok(())
}
