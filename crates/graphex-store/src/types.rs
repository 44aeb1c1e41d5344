//! Data types for graph rows, write reports, and statistics.

use serde::{Deserialize, Serialize};

/// A node row from the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    /// Incident-edge count, cached at ingestion time against the deduplicated
    /// edge set. Never recomputed lazily.
    pub degree: i64,
}

/// An edge row from the database. Undirected; `id` is a dense insertion-order
/// integer used by clients to dedup across incremental requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: i64,
    pub source: String,
    pub target: String,
}

/// A node to be written during ingestion. Degree is derived later, once the
/// final edge set is known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeInput {
    pub id: String,
    pub label: String,
}

/// An edge to be written during ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeInput {
    pub source: String,
    pub target: String,
}

/// Outcome counts from a node write pass.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NodeWriteReport {
    pub seen: usize,
    pub inserted: usize,
    /// Duplicate ids resolved last-write-wins. A warning, not an error.
    pub overwritten: usize,
}

/// Outcome counts from an edge write pass.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EdgeWriteReport {
    pub total_seen: usize,
    pub inserted: usize,
    pub excluded_missing_endpoint: usize,
    pub excluded_duplicate: usize,
}

impl EdgeWriteReport {
    pub fn merge(&mut self, other: EdgeWriteReport) {
        self.total_seen += other.total_seen;
        self.inserted += other.inserted;
        self.excluded_missing_endpoint += other.excluded_missing_endpoint;
        self.excluded_duplicate += other.excluded_duplicate;
    }
}

impl NodeWriteReport {
    pub fn merge(&mut self, other: NodeWriteReport) {
        self.seen += other.seen;
        self.inserted += other.inserted;
        self.overwritten += other.overwritten;
    }
}

/// Aggregate graph statistics, computed once per ingestion pass.
/// `avg_degree` is stored at full precision; rounding happens at presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    pub total_nodes: i64,
    pub total_edges: i64,
    pub avg_degree: f64,
}
