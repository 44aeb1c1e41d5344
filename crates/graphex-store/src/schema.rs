//! Database schema SQL for one store generation.

/// Core tables: nodes, edges, important_nodes, graph_stats.
///
/// Node rowids preserve first-seen order for deterministic tie-breaking.
/// Edge ids are dense, assigned by the store in insertion order.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS nodes (
    id TEXT PRIMARY KEY,
    label TEXT NOT NULL,
    degree INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS edges (
    id INTEGER PRIMARY KEY,
    source TEXT NOT NULL REFERENCES nodes(id),
    target TEXT NOT NULL REFERENCES nodes(id),
    UNIQUE(source, target)
);

CREATE TABLE IF NOT EXISTS important_nodes (
    id TEXT PRIMARY KEY REFERENCES nodes(id),
    rank INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS graph_stats (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Lookup indices for sub-linear incident-edge and degree-ordered queries.
pub const INDEX_SQL: &str = r#"
CREATE INDEX IF NOT EXISTS idx_edges_source ON edges(source);
CREATE INDEX IF NOT EXISTS idx_edges_target ON edges(target);
CREATE INDEX IF NOT EXISTS idx_nodes_degree ON nodes(degree);
"#;
