//! EcoStream - live industrial telemetry dashboard
//!
//! Polls a readings endpoint on a fixed interval, keeps the returned history
//! and the latest reading in shared state, and serves a dashboard with metric
//! cards, a temperature chart and a critical alert mode.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod io;
pub mod poller;
pub mod reading;
pub mod render;
pub mod source;
pub mod state;
pub mod view;

pub use config::{load_config, Config};
pub use error::{EcostreamError, Result};

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::io::{HttpClient, ReqwestHttpClient};
use crate::poller::Poller;
use crate::source::{HttpReadingSource, ReadingSource};
use crate::state::StateHandle;

/// Assembles a [`Dashboard`] from configuration, with optional injected
/// collaborators for tests
pub struct DashboardBuilder {
    config: Config,
    http: Option<Arc<dyn HttpClient>>,
    source: Option<Arc<dyn ReadingSource>>,
    state: Option<StateHandle>,
    cancel: Option<CancellationToken>,
}

impl DashboardBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            http: None,
            source: None,
            state: None,
            cancel: None,
        }
    }

    /// HTTP client used by the default readings source
    pub fn with_http_client(mut self, http: Arc<dyn HttpClient>) -> Self {
        self.http = Some(http);
        self
    }

    /// Replace the HTTP readings source entirely
    pub fn with_source(mut self, source: Arc<dyn ReadingSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_state(mut self, state: StateHandle) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_cancellation_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn build(self) -> Result<Dashboard> {
        self.config.validate()?;

        let source: Arc<dyn ReadingSource> = match self.source {
            Some(source) => source,
            None => {
                let http: Arc<dyn HttpClient> = match self.http {
                    Some(http) => http,
                    None => Arc::new(ReqwestHttpClient::with_timeout(
                        self.config.source.request_timeout(),
                    )?),
                };
                Arc::new(HttpReadingSource::new(
                    self.config.source.readings_url(),
                    http,
                ))
            }
        };

        tracing::debug!("Built dashboard with source {:?}", source);

        Ok(Dashboard {
            config: self.config,
            source,
            state: self.state.unwrap_or_else(state::new_state_handle),
            cancel: self.cancel.unwrap_or_default(),
        })
    }
}

/// A configured dashboard, ready to start
pub struct Dashboard {
    config: Config,
    source: Arc<dyn ReadingSource>,
    state: StateHandle,
    cancel: CancellationToken,
}

impl Dashboard {
    pub fn state(&self) -> StateHandle {
        Arc::clone(&self.state)
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Activate the poller, serve the dashboard if enabled, and run until the
    /// cancellation token fires. The poller is deactivated before returning.
    pub async fn start(self) -> Result<()> {
        let mut poller = Poller::new(
            Arc::clone(&self.source),
            Arc::clone(&self.state),
            self.config.source.polling_interval(),
            self.cancel.clone(),
        )
        .activate();

        let server = if self.config.server.enabled {
            let addr = format!(
                "{}:{}",
                self.config.server.bind_address, self.config.server.port
            );
            let router = dashboard::build_router(
                Arc::clone(&self.state),
                self.config.source.polling_interval_ms,
            );
            let cancel_for_server = self.cancel.clone();

            Some(tokio::spawn(async move {
                let listener = match tokio::net::TcpListener::bind(&addr).await {
                    Ok(l) => l,
                    Err(e) => {
                        tracing::error!(
                            "Failed to bind dashboard to {}: {}. Continuing without dashboard.",
                            addr,
                            e
                        );
                        return;
                    }
                };
                tracing::info!("Dashboard listening on http://{}", addr);

                if let Err(e) = axum::serve(listener, router)
                    .with_graceful_shutdown(async move {
                        cancel_for_server.cancelled().await;
                    })
                    .await
                {
                    tracing::error!("Dashboard server error: {}", e);
                }

                tracing::debug!("Dashboard stopped");
            }))
        } else {
            None
        };

        tracing::info!("EcoStream dashboard started");
        self.cancel.cancelled().await;

        poller.deactivate().await;
        let grace = self.config.source.request_timeout();
        if tokio::time::timeout(grace, poller.wait_in_flight())
            .await
            .is_err()
        {
            tracing::debug!(
                "{} fetches still in flight after {:?}; leaving them",
                poller.in_flight_count(),
                grace
            );
        }

        if let Some(server) = server {
            server
                .await
                .map_err(|e| EcostreamError::Server(e.to_string()))?;
        }

        tracing::info!("EcoStream dashboard stopped");
        Ok(())
    }
}

/// Run the dashboard until Ctrl-C
pub async fn run(config: Config) -> Result<()> {
    let dashboard = DashboardBuilder::new(config).build()?;

    let cancel_for_signal = dashboard.cancellation_token();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        cancel_for_signal.cancel();
    });

    dashboard.start().await
}
