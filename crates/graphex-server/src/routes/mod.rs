//! HTTP route handlers for the query service and the rebuild trigger.

pub mod graph;
pub mod rebuild;
pub mod stats;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Safety-net cap on any single request; bounded queries finish well inside it.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the main Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    // The timeout wraps the read paths only; a rebuild legitimately runs long.
    Router::new()
        .merge(graph::routes())
        .merge(stats::routes())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .merge(rebuild::routes())
}

pub(crate) fn internal_error(
    err: graphex_core::Error,
) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": err.to_string() })),
    )
}
