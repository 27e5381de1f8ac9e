//! HTTP API: readings feed, ingest endpoint and health check

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::generator::SensorReading;
use crate::window::WindowHandle;

#[derive(Debug, Serialize)]
struct Message {
    message: &'static str,
}

/// Build the simulator axum router
pub fn build_router(window: WindowHandle) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/readings", get(readings_handler))
        .route("/ingest", post(ingest_handler))
        .with_state(window)
}

async fn root_handler() -> impl IntoResponse {
    Json(Message {
        message: "EcoStream API is running",
    })
}

async fn readings_handler(State(window): State<WindowHandle>) -> impl IntoResponse {
    let window = window.read().await;
    Json(window.newest_first())
}

async fn ingest_handler(
    State(window): State<WindowHandle>,
    Json(reading): Json<SensorReading>,
) -> impl IntoResponse {
    tracing::info!(
        "Received {} | Status: {} | Temp: {}",
        reading.machine_id,
        reading.status,
        reading.temperature
    );
    window.write().await.push(reading);
    Json(Message {
        message: "Data received successfully",
    })
}
