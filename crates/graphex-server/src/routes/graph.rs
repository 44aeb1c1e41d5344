//! Graph query routes: initial view, expansion, node detail, label search.
//! Each handler is a pure function of the current store generation.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use super::internal_error;
use crate::state::AppState;
use graphex_core::Error;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/initial", get(initial_view))
        .route("/expand/{id}", get(expand_node))
        .route("/node/{id}", get(node_detail))
        .route("/search", get(search))
        .route("/neighborhood/{id}", get(neighborhood))
}

/// GET /api/initial — the important-node seed view with its induced edges.
async fn initial_view(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let store = state.store();
    match (store.get_important_nodes(), store.important_edges()) {
        (Ok(nodes), Ok(edges)) => (
            StatusCode::OK,
            Json(serde_json::json!({ "nodes": nodes, "edges": edges })),
        ),
        (Err(e), _) | (_, Err(e)) => internal_error(e),
    }
}

/// GET /api/expand/{id} — the full 1-hop neighborhood, unbounded count.
async fn expand_node(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.store().one_hop(&id) {
        Ok((nodes, edges)) => (
            StatusCode::OK,
            Json(serde_json::json!({ "nodes": nodes, "edges": edges })),
        ),
        Err(Error::NotFound(_)) => not_found(&id),
        Err(e) => internal_error(e),
    }
}

/// GET /api/node/{id} — node detail plus its distinct neighbor count.
async fn node_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let store = state.store();
    match store.get_node(&id) {
        Ok(Some(node)) => match store.neighbor_count(&id) {
            Ok(neighbors) => (
                StatusCode::OK,
                Json(serde_json::json!({
                    "id": node.id,
                    "label": node.label,
                    "degree": node.degree,
                    "neighbors": neighbors,
                })),
            ),
            Err(e) => internal_error(e),
        },
        Ok(None) => not_found(&id),
        Err(e) => internal_error(e),
    }
}

#[derive(Deserialize)]
struct SearchParams {
    q: Option<String>,
    limit: Option<usize>,
}

/// GET /api/search?q= — label substring search, most-connected first.
/// Queries shorter than 2 characters return empty without touching storage.
async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let query = params.q.unwrap_or_default();
    if query.chars().count() < 2 {
        return (StatusCode::OK, Json(serde_json::json!([])));
    }

    let limit = params.limit.unwrap_or(state.config.search_limit);
    match state.store().search_nodes_by_label(&query, limit) {
        Ok(nodes) => (StatusCode::OK, Json(serde_json::json!(nodes))),
        Err(e) => internal_error(e),
    }
}

#[derive(Deserialize)]
struct NeighborhoodParams {
    distance: Option<u32>,
    limit: Option<usize>,
}

/// GET /api/neighborhood/{id}?distance=&limit= — bounded breadth-first
/// expansion with a distance map and ranked navigation hints.
async fn neighborhood(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<NeighborhoodParams>,
) -> impl IntoResponse {
    let store = state.store();
    let distance = params.distance.unwrap_or(state.config.expand_max_distance);
    let limit = params.limit.unwrap_or(state.config.expand_max_nodes);

    match store.expand(&id, distance, limit, state.config.on_missing_center) {
        Ok(expansion) => match store.navigation_hints(&expansion, state.config.hint_top_n) {
            Ok(hints) => (
                StatusCode::OK,
                Json(serde_json::json!({
                    "center": expansion.center_id,
                    "nodes": expansion.nodes,
                    "edges": expansion.edges,
                    "distances": expansion.distances,
                    "hints": hints,
                })),
            ),
            Err(e) => internal_error(e),
        },
        Err(Error::NotFound(_)) => not_found(&id),
        Err(e) => internal_error(e),
    }
}

fn not_found(id: &str) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": format!("Node '{}' not found", id) })),
    )
}
