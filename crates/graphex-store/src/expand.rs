//! Bounded breadth-first neighborhood expansion.
//!
//! Two distinct operations live here: the generic distance- and budget-bounded
//! `expand`, and the unbounded single-hop `one_hop` used by the expand query.
//! They are intentionally separate contracts.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::sqlite::GraphStore;
use crate::types::{Edge, Node};
use graphex_core::{Error, MissingCenterPolicy, Result};

/// Induced subgraph around a center node, with hop distances from the center.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expansion {
    pub center_id: String,
    /// Visited nodes in discovery order, center first.
    pub nodes: Vec<Node>,
    /// Edges with both endpoints visited, in ingestion order.
    pub edges: Vec<Edge>,
    pub distances: HashMap<String, u32>,
}

impl GraphStore {
    /// Breadth-first expansion from `center_id`, layer by layer, up to
    /// `max_distance` hops and at most `max_nodes` visited nodes. The budget
    /// is a hard ceiling: once reached, traversal stops immediately, and a
    /// partially admitted final layer is allowed.
    pub fn expand(
        &self,
        center_id: &str,
        max_distance: u32,
        max_nodes: usize,
        on_missing: MissingCenterPolicy,
    ) -> Result<Expansion> {
        let center = match self.get_node(center_id)? {
            Some(n) => n,
            None => match on_missing {
                MissingCenterPolicy::Fail => {
                    return Err(Error::NotFound(format!("node '{}'", center_id)));
                }
                MissingCenterPolicy::SubstituteRandom => {
                    let substitute = self
                        .random_node()?
                        .ok_or_else(|| Error::NotFound(format!("node '{}'", center_id)))?;
                    warn!(
                        "center node '{}' not found, substituting '{}'",
                        center_id, substitute.id
                    );
                    substitute
                }
            },
        };

        if max_nodes == 0 {
            return Ok(Expansion {
                center_id: center.id,
                nodes: Vec::new(),
                edges: Vec::new(),
                distances: HashMap::new(),
            });
        }

        let mut distances: HashMap<String, u32> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        distances.insert(center.id.clone(), 0);
        order.push(center.id.clone());

        let mut frontier = vec![center.id.clone()];
        let mut distance = 0;

        'bfs: while distance < max_distance && order.len() < max_nodes && !frontier.is_empty() {
            distance += 1;
            let mut next_frontier = Vec::new();

            for node_id in &frontier {
                for neighbor in self.neighbor_ids(node_id)? {
                    if distances.contains_key(&neighbor) {
                        continue;
                    }
                    if order.len() >= max_nodes {
                        break 'bfs;
                    }
                    distances.insert(neighbor.clone(), distance);
                    order.push(neighbor.clone());
                    next_frontier.push(neighbor);
                }
            }

            frontier = next_frontier;
        }

        let visited: HashSet<&str> = order.iter().map(|s| s.as_str()).collect();

        let mut nodes = Vec::with_capacity(order.len());
        for id in &order {
            if let Some(node) = self.get_node(id)? {
                nodes.push(node);
            }
        }

        let mut seen_edges = HashSet::new();
        let mut edges = Vec::new();
        for id in &order {
            for edge in self.get_edges_incident(id)? {
                if visited.contains(edge.source.as_str())
                    && visited.contains(edge.target.as_str())
                    && seen_edges.insert(edge.id)
                {
                    edges.push(edge);
                }
            }
        }
        edges.sort_by_key(|e| e.id);

        Ok(Expansion {
            center_id: center.id,
            nodes,
            edges,
            distances,
        })
    }

    /// The full immediate neighborhood of a node: the node itself, every
    /// adjacent node, and every edge touching it. No node budget; single-hop
    /// fan-out is assumed bounded by the data set.
    pub fn one_hop(&self, id: &str) -> Result<(Vec<Node>, Vec<Edge>)> {
        let center = self
            .get_node(id)?
            .ok_or_else(|| Error::NotFound(format!("node '{}'", id)))?;

        let mut nodes = vec![center];
        for neighbor in self.neighbor_ids(id)? {
            if neighbor != id {
                if let Some(node) = self.get_node(&neighbor)? {
                    nodes.push(node);
                }
            }
        }
        let edges = self.get_edges_incident(id)?;
        Ok((nodes, edges))
    }

    /// Navigation candidates: nodes adjacent to the expanded subgraph but not
    /// in it, ranked by degree descending (ties by id), capped to `top_n`.
    /// A separate read-only hint query, never part of the subgraph itself.
    pub fn navigation_hints(&self, expansion: &Expansion, top_n: usize) -> Result<Vec<Node>> {
        let inside: HashSet<&str> = expansion.nodes.iter().map(|n| n.id.as_str()).collect();

        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        for node in &expansion.nodes {
            for neighbor in self.neighbor_ids(&node.id)? {
                if inside.contains(neighbor.as_str()) || !seen.insert(neighbor.clone()) {
                    continue;
                }
                if let Some(n) = self.get_node(&neighbor)? {
                    candidates.push(n);
                }
            }
        }

        candidates.sort_by(|a, b| b.degree.cmp(&a.degree).then_with(|| a.id.cmp(&b.id)));
        candidates.truncate(top_n);
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EdgeInput, NodeInput};
    use tempfile::TempDir;

    fn test_store() -> (GraphStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = GraphStore::create(dir.path().join("graph-0.db")).unwrap();
        (store, dir)
    }

    fn seed(store: &GraphStore, nodes: &[&str], edges: &[(&str, &str)]) {
        let node_inputs: Vec<NodeInput> = nodes
            .iter()
            .map(|id| NodeInput {
                id: id.to_string(),
                label: id.to_string(),
            })
            .collect();
        let edge_inputs: Vec<EdgeInput> = edges
            .iter()
            .map(|(s, t)| EdgeInput {
                source: s.to_string(),
                target: t.to_string(),
            })
            .collect();
        store.put_nodes(&node_inputs).unwrap();
        store.put_edges(&edge_inputs).unwrap();
        store.recompute_degrees().unwrap();
    }

    #[test]
    fn test_one_hop_around_middle_of_path() {
        let (store, _dir) = test_store();
        seed(
            &store,
            &["A", "B", "C", "D"],
            &[("A", "B"), ("B", "C"), ("C", "D")],
        );

        let expansion = store
            .expand("B", 1, 10, MissingCenterPolicy::Fail)
            .unwrap();

        let mut ids: Vec<&str> = expansion.nodes.iter().map(|n| n.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["A", "B", "C"]);

        let pairs: Vec<(&str, &str)> = expansion
            .edges
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect();
        assert_eq!(pairs, vec![("A", "B"), ("B", "C")]);

        assert_eq!(expansion.distances["B"], 0);
        assert_eq!(expansion.distances["A"], 1);
        assert_eq!(expansion.distances["C"], 1);
        assert_eq!(expansion.distances.len(), 3);
    }

    #[test]
    fn test_budget_is_hard_ceiling() {
        let (store, _dir) = test_store();
        seed(
            &store,
            &["X", "A", "B", "C", "D"],
            &[("X", "A"), ("X", "B"), ("X", "C"), ("X", "D")],
        );

        let expansion = store
            .expand("X", 3, 3, MissingCenterPolicy::Fail)
            .unwrap();
        assert_eq!(expansion.nodes.len(), 3);
        assert!(expansion.distances.values().all(|&d| d <= 3));
        // Every returned edge joins two visited nodes.
        let visited: std::collections::HashSet<&str> =
            expansion.nodes.iter().map(|n| n.id.as_str()).collect();
        for edge in &expansion.edges {
            assert!(visited.contains(edge.source.as_str()));
            assert!(visited.contains(edge.target.as_str()));
        }
    }

    #[test]
    fn test_distance_cap() {
        let (store, _dir) = test_store();
        seed(
            &store,
            &["A", "B", "C", "D"],
            &[("A", "B"), ("B", "C"), ("C", "D")],
        );

        let expansion = store
            .expand("A", 2, 100, MissingCenterPolicy::Fail)
            .unwrap();
        let mut ids: Vec<&str> = expansion.nodes.iter().map(|n| n.id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["A", "B", "C"]);
        assert_eq!(expansion.distances["C"], 2);
    }

    #[test]
    fn test_zero_budget_yields_empty_expansion() {
        let (store, _dir) = test_store();
        seed(&store, &["A", "B"], &[("A", "B")]);

        let expansion = store
            .expand("A", 1, 0, MissingCenterPolicy::Fail)
            .unwrap();
        assert!(expansion.nodes.is_empty());
        assert!(expansion.edges.is_empty());
        assert!(expansion.distances.is_empty());
    }

    #[test]
    fn test_missing_center_fails_by_default() {
        let (store, _dir) = test_store();
        seed(&store, &["A", "B"], &[("A", "B")]);

        let result = store.expand("Z", 1, 10, MissingCenterPolicy::Fail);
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_missing_center_substitutes_random_node() {
        let (store, _dir) = test_store();
        seed(&store, &["A", "B"], &[("A", "B")]);

        let expansion = store
            .expand("Z", 1, 10, MissingCenterPolicy::SubstituteRandom)
            .unwrap();
        assert!(expansion.center_id == "A" || expansion.center_id == "B");
        assert_eq!(expansion.distances[&expansion.center_id], 0);
    }

    #[test]
    fn test_missing_center_on_empty_store_is_not_found() {
        let (store, _dir) = test_store();
        let result = store.expand("Z", 1, 10, MissingCenterPolicy::SubstituteRandom);
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_one_hop_returns_full_neighborhood() {
        let (store, _dir) = test_store();
        seed(
            &store,
            &["X", "A", "B", "C"],
            &[("X", "A"), ("X", "B"), ("X", "C")],
        );

        let (nodes, edges) = store.one_hop("X").unwrap();
        assert_eq!(nodes.len(), 4);
        assert_eq!(nodes[0].id, "X");
        assert_eq!(edges.len(), 3);

        assert!(matches!(store.one_hop("Z"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_navigation_hints_rank_outside_neighbors() {
        let (store, _dir) = test_store();
        seed(
            &store,
            &["X", "A", "B", "C", "D", "E"],
            &[
                ("X", "A"),
                ("X", "B"),
                ("X", "C"),
                ("A", "D"),
                ("B", "D"),
                ("A", "E"),
            ],
        );

        let expansion = store
            .expand("X", 1, 10, MissingCenterPolicy::Fail)
            .unwrap();
        let hints = store.navigation_hints(&expansion, 10).unwrap();

        let ids: Vec<&str> = hints.iter().map(|n| n.id.as_str()).collect();
        // D (degree 2) outranks E (degree 1); subgraph members never appear.
        assert_eq!(ids, vec!["D", "E"]);

        let capped = store.navigation_hints(&expansion, 1).unwrap();
        assert_eq!(capped.len(), 1);
        assert_eq!(capped[0].id, "D");
    }
}
