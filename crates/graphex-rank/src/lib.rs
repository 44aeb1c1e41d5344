//! Graphex Rank — node importance ranking over a graph snapshot.
//!
//! A closed set of strategies (degree, betweenness, PageRank); the fallible
//! ones report a typed `Unavailable` outcome and the caller explicitly decides
//! to fall back to degree. Ranking is pure with respect to the snapshot.

pub mod centrality;
pub mod snapshot;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

pub use snapshot::GraphSnapshot;

/// Importance strategy, selected at ingestion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankMethod {
    #[default]
    Degree,
    Betweenness,
    PageRank,
}

impl std::fmt::Display for RankMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RankMethod::Degree => write!(f, "degree"),
            RankMethod::Betweenness => write!(f, "betweenness"),
            RankMethod::PageRank => write!(f, "pagerank"),
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown ranking method '{0}' (expected degree, betweenness, or pagerank)")]
pub struct UnknownMethod(String);

impl std::str::FromStr for RankMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "degree" => Ok(RankMethod::Degree),
            "betweenness" => Ok(RankMethod::Betweenness),
            "pagerank" => Ok(RankMethod::PageRank),
            other => Err(UnknownMethod(other.to_string())),
        }
    }
}

/// A ranking strategy could not produce scores for this snapshot.
#[derive(Debug, Error)]
#[error("ranking unavailable: {0}")]
pub struct Unavailable(pub String);

/// Rank node ids by the given method, best first, capped to `top_n`.
/// Ties break by first-seen (insertion) order, keeping output deterministic.
pub fn rank(
    snapshot: &GraphSnapshot,
    method: RankMethod,
    top_n: usize,
) -> Result<Vec<String>, Unavailable> {
    let scores = match method {
        RankMethod::Degree => (0..snapshot.node_count())
            .map(|i| snapshot.degree(i) as f64)
            .collect(),
        RankMethod::Betweenness => centrality::betweenness(snapshot, centrality::PIVOT_BUDGET)?,
        RankMethod::PageRank => centrality::pagerank(
            snapshot,
            centrality::DAMPING,
            centrality::TOLERANCE,
            centrality::MAX_ITERATIONS,
        )?,
    };
    Ok(order_by_score(snapshot, &scores, top_n))
}

/// Rank by the given method, falling back to degree if the method reports
/// `Unavailable`. The bool is true when the fallback fired, so callers can
/// surface it instead of swallowing it.
pub fn rank_with_fallback(
    snapshot: &GraphSnapshot,
    method: RankMethod,
    top_n: usize,
) -> (Vec<String>, bool) {
    match rank(snapshot, method, top_n) {
        Ok(ids) => (ids, false),
        Err(err) => {
            warn!("{} ranking failed ({}), falling back to degree", method, err);
            let ids = rank(snapshot, RankMethod::Degree, top_n).unwrap_or_default();
            (ids, true)
        }
    }
}

fn order_by_score(snapshot: &GraphSnapshot, scores: &[f64], top_n: usize) -> Vec<String> {
    let mut positions: Vec<usize> = (0..snapshot.node_count()).collect();
    // Stable sort: equal scores keep first-seen order.
    positions.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    positions.truncate(top_n);
    positions
        .into_iter()
        .map(|i| snapshot.id(i).to_string())
        .collect()
}
