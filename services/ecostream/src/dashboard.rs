//! Web dashboard: HTML page and JSON API over the shared state

use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;
use chrono::Local;

use crate::render;
use crate::state::StateHandle;
use crate::view::DashboardView;

/// Dashboard application state
#[derive(Clone)]
pub struct DashboardState {
    pub state: StateHandle,
    pub refresh_ms: u64,
}

/// Build the dashboard axum router
pub fn build_router(state: StateHandle, refresh_ms: u64) -> Router {
    let dashboard_state = DashboardState { state, refresh_ms };

    Router::new()
        .route("/", get(index_handler))
        .route("/fragment", get(fragment_handler))
        .route("/api/view", get(view_handler))
        .route("/api/readings", get(readings_handler))
        .route("/api/latest", get(latest_handler))
        .route("/api/status", get(status_handler))
        .route("/health", get(health_handler))
        .with_state(dashboard_state)
}

async fn current_view(dashboard: &DashboardState) -> DashboardView {
    let state = dashboard.state.read().await;
    DashboardView::from_state(&state, &Local)
}

async fn index_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let view = current_view(&dashboard).await;
    Html(render::render_page(&view, dashboard.refresh_ms))
}

async fn fragment_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let view = current_view(&dashboard).await;
    Html(render::render_dashboard(&view, dashboard.refresh_ms))
}

async fn view_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    axum::Json(current_view(&dashboard).await)
}

async fn readings_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let state = dashboard.state.read().await;
    axum::Json(state.history.clone())
}

async fn latest_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let state = dashboard.state.read().await;
    axum::Json(state.latest.clone())
}

async fn status_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let state = dashboard.state.read().await;
    axum::Json(state.poll_status())
}

async fn health_handler() -> impl IntoResponse {
    "OK"
}
