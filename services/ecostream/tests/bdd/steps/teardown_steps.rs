//! BDD step definitions for the poller teardown feature

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use cucumber::{given, then, when};
use tokio_util::sync::CancellationToken;

use ecostream::poller::Poller;
use ecostream::reading::{Reading, Status};
use ecostream::source::ReadingSource;

use crate::doubles::GatedSource;
use crate::world::EcostreamWorld;

#[given("an active poller whose fetch is held open")]
async fn active_poller_held_open(world: &mut EcostreamWorld) {
    let gate = Arc::new(GatedSource::new(vec![Reading {
        timestamp: Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
        temperature: Some(99.0),
        pressure: Some(100.0),
        vibration: Some(10.0),
        status: Status::Critical,
        machine_id: None,
    }]));
    let source: Arc<dyn ReadingSource> = gate.clone();

    let handle = Poller::new(
        source,
        world.state(),
        Duration::from_secs(60),
        CancellationToken::new(),
    )
    .activate();

    gate.started.notified().await;
    world.gate = Some(gate);
    world.poller = Some(handle);
}

#[when("the poller is deactivated")]
async fn deactivate(world: &mut EcostreamWorld) {
    world
        .poller
        .as_mut()
        .expect("poller not started")
        .deactivate()
        .await;
}

#[when("the held fetch completes")]
async fn held_fetch_completes(world: &mut EcostreamWorld) {
    world.gate.as_ref().expect("no gated source").release.notify_one();
    world
        .poller
        .as_ref()
        .expect("poller not started")
        .wait_in_flight()
        .await;
}

#[then("the poller should be inactive")]
fn poller_inactive(world: &mut EcostreamWorld) {
    let poller = world.poller.as_ref().expect("poller not started");
    assert!(!poller.is_active());
    assert_eq!(poller.in_flight_count(), 0);
}
