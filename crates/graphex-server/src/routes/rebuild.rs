//! Rebuild route: ingest a new graph description into a fresh store
//! generation and swap it in. The prior generation stays live on failure.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use super::internal_error;
use crate::state::{self, AppState};
use graphex_core::Error;
use graphex_ingest::{parse_dot, IngestOptions, RawEdgeRecord, RawNodeRecord};
use graphex_rank::RankMethod;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/rebuild", post(rebuild))
}

#[derive(Deserialize)]
struct RebuildRequest {
    #[serde(default)]
    nodes: Vec<RawNodeRecord>,
    #[serde(default)]
    edges: Vec<RawEdgeRecord>,
    /// DOT text; when present it takes precedence over the record lists.
    dot: Option<String>,
    method: Option<RankMethod>,
}

/// POST /api/rebuild — build-then-swap ingestion of a full graph description.
async fn rebuild(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RebuildRequest>,
) -> impl IntoResponse {
    let RebuildRequest {
        nodes,
        edges,
        dot,
        method,
    } = req;
    let (nodes, edges) = match dot {
        Some(text) => parse_dot(&text),
        None => (nodes, edges),
    };

    let options = IngestOptions {
        method: method.unwrap_or_default(),
        top_n: state.config.important_top_n,
        batch_size: state.config.batch_size,
    };

    match state::rebuild(state.clone(), nodes, edges, options).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "rebuilt",
                "generation": outcome.generation,
                "report": outcome.report,
            })),
        ),
        Err(Error::EmptyGraph) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "error": Error::EmptyGraph.to_string() })),
        ),
        Err(e) => internal_error(e),
    }
}
