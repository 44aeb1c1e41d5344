//! Stats and health routes.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;
use graphex_store::GraphStats;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stats", get(get_stats))
        .route("/status", get(get_status))
}

/// GET /api/stats — graph statistics for the current generation.
/// `avg_degree` is rounded here, at presentation time only.
async fn get_stats(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let store = state.store();
    let stats = store.get_stats().unwrap_or(GraphStats {
        total_nodes: 0,
        total_edges: 0,
        avg_degree: 0.0,
    });

    Json(serde_json::json!({
        "total_nodes": stats.total_nodes,
        "total_edges": stats.total_edges,
        "avg_degree": (stats.avg_degree * 100.0).round() / 100.0,
        "generation": state.generation(),
        "db_path": store.path().display().to_string(),
    }))
}

/// GET /api/status — health check.
async fn get_status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let store = state.store();
    Json(serde_json::json!({
        "status": "healthy",
        "service": "graphex",
        "generation": state.generation(),
        "nodes": store.count_nodes().unwrap_or(0),
        "edges": store.count_edges().unwrap_or(0),
    }))
}
