//! Single-pass ingestion: records → store → derived tables.
//!
//! Order matters: nodes first (edge writes need the endpoints present), then
//! edges (deduplicated, dense ids), then degrees recomputed from the final
//! edge set, then importance ranking and stats. Per-record problems aggregate
//! into the report; only a zero-valid-node pass is fatal.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::dot::parse_dot;
use crate::records::{validate_edges, validate_nodes, RawEdgeRecord, RawNodeRecord};
use graphex_core::{Error, Result};
use graphex_rank::{rank_with_fallback, GraphSnapshot, RankMethod};
use graphex_store::{EdgeWriteReport, GraphStats, GraphStore, NodeWriteReport};

/// Ingestion tuning. `batch_size` affects write granularity only; any value
/// ≥ 1 produces identical final state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestOptions {
    pub method: RankMethod,
    pub top_n: usize,
    pub batch_size: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            method: RankMethod::Degree,
            top_n: 50,
            batch_size: 1000,
        }
    }
}

/// Aggregated outcome of one ingestion pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    pub inserted_nodes: usize,
    pub overwritten_nodes: usize,
    pub inserted_edges: usize,
    pub excluded_missing_endpoint: usize,
    pub excluded_duplicate: usize,
    pub malformed_records: usize,
    pub method: RankMethod,
    /// True when the configured ranking strategy was unavailable and the
    /// pipeline fell back to degree.
    pub ranking_fallback: bool,
}

/// Runs one ingestion pass against a (fresh) store generation.
pub struct IngestPipeline<'a> {
    store: &'a GraphStore,
}

impl<'a> IngestPipeline<'a> {
    pub fn new(store: &'a GraphStore) -> Self {
        Self { store }
    }

    /// Ingest a raw record stream. Fails with `EmptyGraph` before writing any
    /// derived state if no valid node records remain after validation.
    pub fn run(
        &self,
        nodes: Vec<RawNodeRecord>,
        edges: Vec<RawEdgeRecord>,
        options: &IngestOptions,
    ) -> Result<IngestReport> {
        let (node_inputs, malformed_nodes) = validate_nodes(nodes);
        let (edge_inputs, malformed_edges) = validate_edges(edges);
        let malformed_records = malformed_nodes + malformed_edges;

        if node_inputs.is_empty() {
            return Err(Error::EmptyGraph);
        }

        let batch_size = options.batch_size.max(1);

        let mut node_report = NodeWriteReport::default();
        for chunk in node_inputs.chunks(batch_size) {
            node_report.merge(self.store.put_nodes(chunk)?);
            debug!("processed {} nodes", node_report.seen);
        }

        let mut edge_report = EdgeWriteReport::default();
        for chunk in edge_inputs.chunks(batch_size) {
            edge_report.merge(self.store.put_edges(chunk)?);
            debug!("processed {} edges", edge_report.total_seen);
        }

        // Degrees must reflect the deduplicated, endpoint-filtered edge set.
        self.store.recompute_degrees()?;
        self.store.optimize()?;

        let edge_pairs: Vec<(String, String)> = self
            .store
            .all_edges()?
            .into_iter()
            .map(|e| (e.source, e.target))
            .collect();
        let snapshot = GraphSnapshot::new(self.store.all_node_ids()?, &edge_pairs);
        let (ranked, ranking_fallback) =
            rank_with_fallback(&snapshot, options.method, options.top_n);
        self.store.set_important_nodes(&ranked)?;

        let total_nodes = self.store.count_nodes()?;
        let total_edges = self.store.count_edges()?;
        let avg_degree = if total_nodes > 0 {
            2.0 * total_edges as f64 / total_nodes as f64
        } else {
            0.0
        };
        self.store.set_stats(&GraphStats {
            total_nodes,
            total_edges,
            avg_degree,
        })?;

        info!(
            "ingested {} nodes, {} edges ({} excluded: {} missing endpoint, {} duplicate), method={}",
            node_report.inserted,
            edge_report.inserted,
            edge_report.excluded_missing_endpoint + edge_report.excluded_duplicate,
            edge_report.excluded_missing_endpoint,
            edge_report.excluded_duplicate,
            options.method,
        );

        Ok(IngestReport {
            inserted_nodes: node_report.inserted,
            overwritten_nodes: node_report.overwritten,
            inserted_edges: edge_report.inserted,
            excluded_missing_endpoint: edge_report.excluded_missing_endpoint,
            excluded_duplicate: edge_report.excluded_duplicate,
            malformed_records,
            method: options.method,
            ranking_fallback,
        })
    }

    /// Ingest a DOT graph description.
    pub fn run_dot(&self, text: &str, options: &IngestOptions) -> Result<IngestReport> {
        let (nodes, edges) = parse_dot(text);
        self.run(nodes, edges, options)
    }
}
