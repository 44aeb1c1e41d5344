//! In-memory graph snapshot used by the ranking strategies.

use std::collections::HashMap;

use petgraph::graph::{NodeIndex, UnGraph};

/// Immutable undirected snapshot of the graph at ranking time. Node indices
/// follow first-seen order (index 0 is the first node handed in), which the
/// ranking tie-break relies on. Pure value: never touches the store.
pub struct GraphSnapshot {
    graph: UnGraph<String, ()>,
}

impl GraphSnapshot {
    /// Build a snapshot from node ids in first-seen order and an edge list.
    /// Edges naming unknown endpoints are skipped (the store filters these
    /// before they ever reach a ranking pass).
    pub fn new(node_ids: Vec<String>, edges: &[(String, String)]) -> Self {
        let mut graph = UnGraph::with_capacity(node_ids.len(), edges.len());
        let mut index_of: HashMap<String, NodeIndex> = HashMap::with_capacity(node_ids.len());

        for id in node_ids {
            if index_of.contains_key(&id) {
                continue;
            }
            let idx = graph.add_node(id.clone());
            index_of.insert(id, idx);
        }

        for (source, target) in edges {
            if let (Some(&a), Some(&b)) = (index_of.get(source), index_of.get(target)) {
                graph.add_edge(a, b, ());
            }
        }

        Self { graph }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Node id at the given first-seen position.
    pub fn id(&self, position: usize) -> &str {
        &self.graph[NodeIndex::new(position)]
    }

    /// Incident-edge count at the given first-seen position.
    pub fn degree(&self, position: usize) -> usize {
        self.graph.edges(NodeIndex::new(position)).count()
    }

    /// Neighbor positions of the node at the given position.
    pub fn neighbors(&self, position: usize) -> impl Iterator<Item = usize> + '_ {
        self.graph
            .neighbors(NodeIndex::new(position))
            .map(|idx| idx.index())
    }
}
