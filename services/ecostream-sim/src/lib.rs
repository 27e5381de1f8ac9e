//! EcoStream simulator - a stand-in for the press sensor feed
//!
//! Generates a reading every interval, keeps a bounded window of them and
//! serves it newest first on `GET /readings`, which is what the dashboard
//! polls.

pub mod config;
pub mod error;
pub mod generator;
pub mod server;
pub mod window;

pub use config::SimConfig;
pub use error::{Result, SimError};

use std::time::Duration;

use chrono::Local;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::generator::Generator;
use crate::window::WindowHandle;

/// Push a fresh reading into the window every `interval` until cancelled
pub async fn generate_readings(
    generator: Generator,
    window: WindowHandle,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut rng = StdRng::from_entropy();
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!("Generator cancelled");
                break;
            }
            _ = ticker.tick() => {
                let reading = generator.generate(&mut rng, Local::now().naive_local());
                tracing::debug!(
                    "Generated {} reading: temp={} pressure={} vibration={}",
                    reading.status,
                    reading.temperature,
                    reading.pressure,
                    reading.vibration
                );
                window.write().await.push(reading);
            }
        }
    }
}

/// Generate and serve readings until the cancellation token fires
pub async fn run(config: SimConfig, cancel: CancellationToken) -> Result<()> {
    config.validate()?;

    let window = window::new_window_handle(config.window);
    let generator = Generator::new(config.machine_id.clone(), config.anomaly_chance)?;

    let generator_task = tokio::spawn(generate_readings(
        generator,
        window.clone(),
        Duration::from_millis(config.interval_ms),
        cancel.clone(),
    ));

    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        "Simulating {} on http://{} (anomaly chance {})",
        config.machine_id,
        addr,
        config.anomaly_chance
    );

    let shutdown = cancel.clone();
    axum::serve(listener, server::build_router(window))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| SimError::Server(e.to_string()))?;

    cancel.cancel();
    generator_task
        .await
        .map_err(|e| SimError::Server(e.to_string()))?;

    tracing::info!("Simulator stopped");
    Ok(())
}
