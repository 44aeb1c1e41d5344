//! Betweenness and PageRank scoring over a graph snapshot.
//!
//! Both strategies return a typed `Unavailable` instead of silently degrading;
//! the caller decides whether to fall back to degree ranking.

use std::collections::VecDeque;

use crate::snapshot::GraphSnapshot;
use crate::Unavailable;

pub const DAMPING: f64 = 0.85;
pub const TOLERANCE: f64 = 1e-6;
pub const MAX_ITERATIONS: usize = 100;
/// Pivot budget for sampled betweenness: min(PIVOT_BUDGET, |V|) pivots.
pub const PIVOT_BUDGET: usize = 100;

/// Damped PageRank power iteration. Converges when the L1 delta drops below
/// `tolerance * |V|`; exceeding `max_iterations` is a typed failure, not a
/// silently returned partial result.
pub fn pagerank(
    snapshot: &GraphSnapshot,
    damping: f64,
    tolerance: f64,
    max_iterations: usize,
) -> Result<Vec<f64>, Unavailable> {
    let n = snapshot.node_count();
    if n == 0 {
        return Err(Unavailable("pagerank on an empty graph".into()));
    }

    let degrees: Vec<usize> = (0..n).map(|i| snapshot.degree(i)).collect();
    let uniform = 1.0 / n as f64;
    let mut ranks = vec![uniform; n];

    for _ in 0..max_iterations {
        // Rank mass of isolated nodes is redistributed uniformly.
        let dangling: f64 = (0..n)
            .filter(|&i| degrees[i] == 0)
            .map(|i| ranks[i])
            .sum();

        let base = (1.0 - damping) * uniform + damping * dangling * uniform;
        let mut next = vec![base; n];
        for i in 0..n {
            if degrees[i] == 0 {
                continue;
            }
            let share = damping * ranks[i] / degrees[i] as f64;
            for j in snapshot.neighbors(i) {
                next[j] += share;
            }
        }

        let delta: f64 = ranks
            .iter()
            .zip(next.iter())
            .map(|(old, new)| (old - new).abs())
            .sum();
        ranks = next;

        if delta < tolerance * n as f64 {
            return Ok(ranks);
        }
    }

    Err(Unavailable(format!(
        "pagerank did not converge within {} iterations",
        max_iterations
    )))
}

/// Brandes betweenness centrality over a bounded pivot sample.
///
/// Pivots are chosen by a deterministic stride over first-seen order, so the
/// scores (and therefore the ranking) are a pure function of the snapshot.
pub fn betweenness(
    snapshot: &GraphSnapshot,
    pivot_budget: usize,
) -> Result<Vec<f64>, Unavailable> {
    let n = snapshot.node_count();
    if n == 0 {
        return Err(Unavailable("betweenness on an empty graph".into()));
    }
    if pivot_budget == 0 {
        return Err(Unavailable("betweenness with a zero pivot budget".into()));
    }

    let pivots: Vec<usize> = if n <= pivot_budget {
        (0..n).collect()
    } else {
        let stride = n / pivot_budget;
        (0..pivot_budget).map(|k| k * stride).collect()
    };

    let mut scores = vec![0.0; n];

    for &s in &pivots {
        // Single-source shortest paths (unweighted BFS), counting paths.
        let mut sigma = vec![0.0_f64; n];
        let mut dist = vec![-1_i64; n];
        let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut stack = Vec::new();
        let mut queue = VecDeque::new();

        sigma[s] = 1.0;
        dist[s] = 0;
        queue.push_back(s);

        while let Some(v) = queue.pop_front() {
            stack.push(v);
            for w in snapshot.neighbors(v) {
                if dist[w] < 0 {
                    dist[w] = dist[v] + 1;
                    queue.push_back(w);
                }
                if dist[w] == dist[v] + 1 {
                    let paths = sigma[v];
                    sigma[w] += paths;
                    preds[w].push(v);
                }
            }
        }

        // Dependency accumulation in reverse BFS order.
        let mut delta = vec![0.0_f64; n];
        while let Some(w) = stack.pop() {
            for &v in &preds[w] {
                let contribution = sigma[v] / sigma[w] * (1.0 + delta[w]);
                delta[v] += contribution;
            }
            if w != s {
                scores[w] += delta[w];
            }
        }
    }

    // Undirected pair correction, extrapolated from the pivot sample.
    let scale = n as f64 / (pivots.len() as f64 * 2.0);
    for score in &mut scores {
        *score *= scale;
    }

    Ok(scores)
}
