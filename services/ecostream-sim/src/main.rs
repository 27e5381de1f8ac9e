//! EcoStream simulator CLI

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::Level;

use ecostream_sim::SimConfig;

#[derive(Parser)]
#[command(name = "ecostream-sim")]
#[command(about = "Simulated press telemetry feed")]
#[command(version)]
struct Args {
    /// Port to serve the readings API on
    #[arg(short, long, default_value = "8000")]
    port: u16,

    /// Address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    bind_address: String,

    /// Milliseconds between generated readings
    #[arg(long, default_value = "1000")]
    interval_ms: u64,

    /// Number of readings served by GET /readings
    #[arg(long, default_value = "50")]
    window: usize,

    /// Probability that a reading is an anomaly
    #[arg(long, default_value = "0.05")]
    anomaly_chance: f64,

    #[arg(long, default_value = "press_001")]
    machine_id: String,

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

    let config = SimConfig {
        machine_id: args.machine_id,
        interval_ms: args.interval_ms,
        window: args.window,
        anomaly_chance: args.anomaly_chance,
        bind_address: args.bind_address,
        port: args.port,
    };

    let cancel = CancellationToken::new();
    let cancel_for_signal = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        cancel_for_signal.cancel();
    });

    ecostream_sim::run(config, cancel).await?;
    Ok(())
}
