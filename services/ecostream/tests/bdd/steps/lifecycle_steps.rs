//! BDD step definitions for the builder and lifecycle feature

use std::sync::Arc;

use cucumber::{given, then, when};
use tokio_util::sync::CancellationToken;

use ecostream::io::HttpClient;
use ecostream::source::ReadingSource;
use ecostream::{Config, DashboardBuilder};

use crate::doubles::{CannedHttpClient, GatedSource};
use crate::world::EcostreamWorld;

fn config(world: &mut EcostreamWorld) -> &mut Config {
    world.config.get_or_insert_with(Config::default)
}

#[given("a default configuration")]
fn default_config(world: &mut EcostreamWorld) {
    world.config = Some(Config::default());
}

#[given(expr = "the polling interval is {int} ms")]
fn polling_interval(world: &mut EcostreamWorld, ms: u64) {
    config(world).source.polling_interval_ms = ms;
}

#[given(expr = "the request timeout is {int} ms")]
fn request_timeout(world: &mut EcostreamWorld, ms: u64) {
    config(world).source.request_timeout_ms = ms;
}

#[given(expr = "the base URL is {string}")]
fn base_url(world: &mut EcostreamWorld, url: String) {
    config(world).source.base_url = url;
}

#[given("the dashboard server is disabled")]
fn server_disabled(world: &mut EcostreamWorld) {
    config(world).server.enabled = false;
}

#[when("the dashboard is built")]
fn build(world: &mut EcostreamWorld) {
    let http: Arc<dyn HttpClient> = Arc::new(CannedHttpClient::ok("[]"));
    let result = DashboardBuilder::new(config(world).clone())
        .with_http_client(http)
        .build();
    world.build_error = result.err().map(|e| e.to_string());
}

#[when("the dashboard is started with an already cancelled token")]
async fn start_cancelled(world: &mut EcostreamWorld) {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let http: Arc<dyn HttpClient> = Arc::new(CannedHttpClient::ok("[]"));
    let dashboard = DashboardBuilder::new(config(world).clone())
        .with_http_client(http)
        .with_state(world.state())
        .with_cancellation_token(cancel)
        .build()
        .expect("build failed");
    world.start_succeeded = Some(dashboard.start().await.is_ok());
}

#[when("the dashboard is stopped while a fetch is in flight")]
async fn stop_during_fetch(world: &mut EcostreamWorld) {
    let gate = Arc::new(GatedSource::new(vec![]));
    let source: Arc<dyn ReadingSource> = gate.clone();
    let cancel = CancellationToken::new();
    let dashboard = DashboardBuilder::new(config(world).clone())
        .with_source(source)
        .with_state(world.state())
        .with_cancellation_token(cancel.clone())
        .build()
        .expect("build failed");

    let running = tokio::spawn(dashboard.start());
    gate.started.notified().await;
    cancel.cancel();
    gate.release.notify_one();

    let result = running.await.expect("dashboard task panicked");
    world.start_succeeded = Some(result.is_ok());
}

#[then("the build should succeed")]
fn build_succeeds(world: &mut EcostreamWorld) {
    assert_eq!(world.build_error, None);
}

#[then(expr = "the build should fail with {string}")]
fn build_fails(world: &mut EcostreamWorld, expected: String) {
    let err = world.build_error.as_ref().expect("build succeeded");
    assert!(
        err.contains(&expected),
        "Expected error containing '{}', got '{}'",
        expected,
        err
    );
}

#[then("the dashboard should stop cleanly")]
fn stopped_cleanly(world: &mut EcostreamWorld) {
    assert_eq!(world.start_succeeded, Some(true));
}
