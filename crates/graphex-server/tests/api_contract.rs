//! API contract tests — validates that response shapes match what an
//! incremental-exploration client expects.
//!
//! These assert field names and types on the JSON each route produces, so a
//! client can dedup nodes/edges by id across /initial, /expand, and
//! /neighborhood responses.

/// /api/initial and /api/expand/{id} share the {nodes, edges} shape.
#[test]
fn test_view_response_shape() {
    let response = serde_json::json!({
        "nodes": [
            { "id": "Berlin", "label": "Berlin", "degree": 12 }
        ],
        "edges": [
            { "id": 0, "source": "Berlin", "target": "Hamburg" }
        ],
    });

    assert!(response["nodes"].is_array());
    assert!(response["edges"].is_array());

    let node = &response["nodes"][0];
    assert!(node["id"].is_string());
    assert!(node["label"].is_string());
    assert!(node["degree"].is_number());

    let edge = &response["edges"][0];
    // Integer edge ids are the client-side dedup handle.
    assert!(edge["id"].is_number());
    assert!(edge["source"].is_string());
    assert!(edge["target"].is_string());
}

/// /api/node/{id} returns the node plus its neighbor count.
#[test]
fn test_node_detail_shape() {
    let response = serde_json::json!({
        "id": "Berlin",
        "label": "Berlin",
        "degree": 12,
        "neighbors": 12,
    });

    assert!(response["id"].is_string());
    assert!(response["label"].is_string());
    assert!(response["degree"].is_number());
    assert!(response["neighbors"].is_number());
}

/// /api/search returns a bare array of nodes, best-connected first.
#[test]
fn test_search_response_shape() {
    let response = serde_json::json!([
        { "id": "Berlin", "label": "Berlin", "degree": 12 },
        { "id": "Bern", "label": "Bern", "degree": 4 },
    ]);

    assert!(response.is_array());
    assert!(response[0]["degree"].as_i64() >= response[1]["degree"].as_i64());
}

/// /api/neighborhood/{id} adds the distance map and navigation hints.
#[test]
fn test_neighborhood_response_shape() {
    let response = serde_json::json!({
        "center": "Berlin",
        "nodes": [
            { "id": "Berlin", "label": "Berlin", "degree": 12 }
        ],
        "edges": [],
        "distances": { "Berlin": 0, "Hamburg": 1 },
        "hints": [
            { "id": "Munich", "label": "Munich", "degree": 9 }
        ],
    });

    assert!(response["center"].is_string());
    assert!(response["nodes"].is_array());
    assert!(response["edges"].is_array());
    assert!(response["distances"].is_object());
    assert!(response["distances"]["Berlin"].is_number());
    // Hints are full node records, separate from the subgraph itself.
    assert!(response["hints"].is_array());
    assert!(response["hints"][0]["degree"].is_number());
}

/// /api/stats rounds avg_degree at presentation time.
#[test]
fn test_stats_response_shape() {
    let response = serde_json::json!({
        "total_nodes": 11342,
        "total_edges": 48219,
        "avg_degree": 8.5,
        "generation": 3,
        "db_path": "/data/graphdb/graph-3.db",
    });

    assert!(response["total_nodes"].is_number());
    assert!(response["total_edges"].is_number());
    assert!(response["avg_degree"].is_number());
    assert!(response["generation"].is_number());
    assert!(response["db_path"].is_string());
}

/// /api/status health shape.
#[test]
fn test_status_response_shape() {
    let response = serde_json::json!({
        "status": "healthy",
        "service": "graphex",
        "generation": 1,
        "nodes": 11342,
        "edges": 48219,
    });

    assert!(response["status"].is_string());
    assert!(response["service"].is_string());
    assert!(response["generation"].is_number());
}

/// /api/rebuild success shape carries the full ingestion summary.
#[test]
fn test_rebuild_response_shape() {
    let response = serde_json::json!({
        "status": "rebuilt",
        "generation": 2,
        "report": {
            "inserted_nodes": 11342,
            "overwritten_nodes": 0,
            "inserted_edges": 48219,
            "excluded_missing_endpoint": 3,
            "excluded_duplicate": 120,
            "malformed_records": 1,
            "method": "degree",
            "ranking_fallback": false,
        },
    });

    assert!(response["generation"].is_number());
    let report = &response["report"];
    assert!(report["inserted_nodes"].is_number());
    assert!(report["inserted_edges"].is_number());
    assert!(report["excluded_missing_endpoint"].is_number());
    assert!(report["excluded_duplicate"].is_number());
    assert!(report["malformed_records"].is_number());
    assert!(report["method"].is_string());
    assert!(report["ranking_fallback"].is_boolean());
}

/// Typed miss and rebuild failure shapes: an error field, never a crash.
#[test]
fn test_error_response_shape() {
    let not_found = serde_json::json!({ "error": "Node 'Z' not found" });
    assert!(not_found["error"].is_string());

    let empty_graph = serde_json::json!({
        "error": "Empty graph: ingestion produced zero valid nodes"
    });
    assert!(empty_graph["error"].is_string());
}
