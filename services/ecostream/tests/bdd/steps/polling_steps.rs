//! BDD step definitions for the polling feature

use std::sync::Arc;

use cucumber::gherkin::Step;
use cucumber::{given, then, when};
use tokio_util::sync::CancellationToken;

use ecostream::io::HttpClient;
use ecostream::poller::{poll_once, PollOutcome};
use ecostream::source::HttpReadingSource;

use crate::doubles::{Canned, CannedHttpClient};
use crate::world::EcostreamWorld;

const READINGS_URL: &str = "http://127.0.0.1:8000/readings";

async fn poll_with(world: &mut EcostreamWorld, client: CannedHttpClient) {
    let http: Arc<dyn HttpClient> = Arc::new(client);
    let source = Arc::new(HttpReadingSource::new(READINGS_URL, http));
    let state = world.state();
    let seq = world.tick();
    let outcome = poll_once(source, state, seq, CancellationToken::new()).await;
    world.last_outcome = Some(outcome);
}

fn docstring(step: &Step) -> String {
    step.docstring
        .as_ref()
        .expect("step needs a docstring")
        .to_string()
}

fn parse_outcome(s: &str) -> PollOutcome {
    match s {
        "applied" => PollOutcome::Applied,
        "empty" => PollOutcome::Empty,
        "stale" => PollOutcome::Stale,
        "failed" => PollOutcome::Failed,
        "discarded" => PollOutcome::Discarded,
        other => panic!("Unknown poll outcome: {}", other),
    }
}

#[given("a dashboard with no successful poll")]
fn fresh_dashboard(world: &mut EcostreamWorld) {
    world.state = Some(ecostream::state::new_state_handle());
}

#[when("the server responds with:")]
async fn server_responds_with(world: &mut EcostreamWorld, step: &Step) {
    let body = docstring(step);
    poll_with(world, CannedHttpClient::ok(&body)).await;
}

#[when(expr = "the server responds with status {int}")]
async fn server_responds_with_status(world: &mut EcostreamWorld, status: u16) {
    let client = CannedHttpClient::new(Canned::Response {
        status,
        body: "Internal Server Error".to_string(),
    });
    poll_with(world, client).await;
}

#[when("the server is unreachable")]
async fn server_unreachable(world: &mut EcostreamWorld) {
    poll_with(world, CannedHttpClient::new(Canned::Unreachable)).await;
}

#[when("the server responds with malformed JSON")]
async fn server_malformed(world: &mut EcostreamWorld) {
    poll_with(world, CannedHttpClient::ok(r#"{"not": "an array"}"#)).await;
}

#[when("an older poll finishes late with:")]
async fn older_poll_finishes_late(world: &mut EcostreamWorld, step: &Step) {
    let body = docstring(step);
    let http: Arc<dyn HttpClient> = Arc::new(CannedHttpClient::ok(&body));
    let source = Arc::new(HttpReadingSource::new(READINGS_URL, http));
    let state = world.state();
    // a tick that was dispatched before the last applied one
    let seq = world.next_seq.saturating_sub(1);
    world.last_outcome = Some(poll_once(source, state, seq, CancellationToken::new()).await);
}

#[when("the current state is remembered")]
async fn remember_state(world: &mut EcostreamWorld) {
    let state = world.state();
    let s = state.read().await;
    world.snapshot = Some((s.history.clone(), s.latest.clone()));
}

#[then(expr = "the poll should be {word}")]
fn poll_outcome_is(world: &mut EcostreamWorld, expected: String) {
    assert_eq!(world.last_outcome, Some(parse_outcome(&expected)));
}

#[then("the state should be unchanged")]
async fn state_unchanged(world: &mut EcostreamWorld) {
    let (history, latest) = world.snapshot.clone().expect("no remembered state");
    let state = world.state();
    let s = state.read().await;
    assert_eq!(s.history, history);
    assert_eq!(s.latest, latest);
}

#[then("there should be no latest reading")]
async fn no_latest(world: &mut EcostreamWorld) {
    let state = world.state();
    assert!(state.read().await.latest.is_none());
}

#[then(expr = "the latest reading should have temperature {float}")]
async fn latest_temperature(world: &mut EcostreamWorld, expected: f64) {
    let state = world.state();
    let s = state.read().await;
    let latest = s.latest.as_ref().expect("no latest reading");
    assert_eq!(latest.temperature, Some(expected));
}

#[then(expr = "the latest reading should have status {string}")]
async fn latest_status(world: &mut EcostreamWorld, expected: String) {
    let state = world.state();
    let s = state.read().await;
    let latest = s.latest.as_ref().expect("no latest reading");
    assert_eq!(latest.status.to_string(), expected);
}

#[then(expr = "the history temperatures should be {string}")]
async fn history_temperatures(world: &mut EcostreamWorld, expected: String) {
    let state = world.state();
    let s = state.read().await;
    let actual: Vec<String> = s
        .history
        .iter()
        .map(|r| {
            r.temperature
                .map(|t| format!("{:.1}", t))
                .unwrap_or_else(|| "-".to_string())
        })
        .collect();
    assert_eq!(actual.join(", "), expected);
}

#[then(expr = "the consecutive failure count should be {int}")]
async fn failure_count(world: &mut EcostreamWorld, expected: u32) {
    let state = world.state();
    assert_eq!(state.read().await.consecutive_failures, expected);
}
