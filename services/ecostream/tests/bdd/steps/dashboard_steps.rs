//! BDD step definitions for the dashboard server feature

use axum::body::Body;
use axum::http::Request;
use cucumber::gherkin::Step;
use cucumber::{given, then, when};
use tower::ServiceExt;

use ecostream::dashboard::build_router;
use ecostream::reading::Reading;

use crate::world::EcostreamWorld;

#[given("the state holds the readings:")]
async fn state_holds(world: &mut EcostreamWorld, step: &Step) {
    let body = step.docstring.as_ref().expect("step needs a docstring");
    let readings: Vec<Reading> = serde_json::from_str(body).expect("invalid readings JSON");
    let state = world.state();
    let seq = world.tick();
    state.write().await.apply_readings(seq, readings, 1000);
}

#[when(expr = "the dashboard path {string} is requested")]
async fn request_path(world: &mut EcostreamWorld, path: String) {
    let app = build_router(world.state(), 2000);
    let response = app
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    world.response_status = Some(response.status().as_u16());
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    world.response_body = Some(String::from_utf8(body.to_vec()).unwrap());
}

#[then(expr = "the response status should be {int}")]
fn response_status(world: &mut EcostreamWorld, expected: u16) {
    assert_eq!(world.response_status, Some(expected));
}

#[then(expr = "the response should contain {string}")]
fn response_contains(world: &mut EcostreamWorld, expected: String) {
    let body = world.response_body.as_ref().expect("no response body");
    assert!(
        body.contains(&expected),
        "Expected response to contain '{}', but it didn't.\nResponse body:\n{}",
        expected,
        body
    );
}

#[then(expr = "the response should not contain {string}")]
fn response_not_contains(world: &mut EcostreamWorld, unexpected: String) {
    let body = world.response_body.as_ref().expect("no response body");
    assert!(
        !body.contains(&unexpected),
        "Expected response not to contain '{}'.\nResponse body:\n{}",
        unexpected,
        body
    );
}
