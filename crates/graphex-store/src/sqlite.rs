//! SQLite-backed graph store: one database file per store generation.
//!
//! Built once by the ingestion pipeline, read many times by queries. All
//! writes go through batch-friendly operations that enforce the store
//! invariants (unique node ids, deduplicated undirected edges, referential
//! integrity) regardless of how the caller splits its batches.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{info, warn};

use crate::schema::{INDEX_SQL, SCHEMA_SQL};
use crate::types::*;
use graphex_core::{Error, Result};

/// Graph store over a single SQLite connection.
pub struct GraphStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl GraphStore {
    /// Open an existing store file, or create it if absent.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        if let Some(dir) = db_path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| Error::Storage(e.to_string()))?;
        }

        let conn = Self::create_connection(&db_path)?;
        Self::init_schema(&conn)?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path,
        };

        info!(
            "GraphStore opened: {} nodes, {} edges, path={}",
            store.count_nodes()?,
            store.count_edges()?,
            store.db_path.display()
        );
        Ok(store)
    }

    /// Create a fresh store, truncating any stale file at `db_path`.
    pub fn create(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();
        for suffix in ["", "-wal", "-shm"] {
            let stale = PathBuf::from(format!("{}{}", db_path.display(), suffix));
            if stale.exists() {
                std::fs::remove_file(&stale).map_err(|e| Error::Storage(e.to_string()))?;
            }
        }
        Self::open(db_path)
    }

    fn create_connection(db_path: &Path) -> Result<Connection> {
        let conn = Connection::open(db_path).map_err(|e| Error::Database(e.to_string()))?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA case_sensitive_like = ON;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(conn)
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        let full_schema = format!("{}\n{}", SCHEMA_SQL, INDEX_SQL);
        conn.execute_batch(&full_schema)
            .map_err(|e| Error::Database(format!("Schema init failed: {}", e)))?;
        Ok(())
    }

    /// Path of the underlying database file.
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    // ---------------------------------------------------------------
    // Node writes
    // ---------------------------------------------------------------

    /// Upsert a batch of nodes. Duplicate ids resolve last-write-wins while
    /// keeping the original rowid, so first-seen order survives overwrites.
    /// The whole batch commits as one transaction.
    pub fn put_nodes(&self, records: &[NodeInput]) -> Result<NodeWriteReport> {
        let conn = self.conn.lock();
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut report = NodeWriteReport {
            seen: records.len(),
            ..Default::default()
        };

        {
            let mut exists = tx
                .prepare_cached("SELECT 1 FROM nodes WHERE id = ?1")
                .map_err(|e| Error::Database(e.to_string()))?;
            let mut upsert = tx
                .prepare_cached(
                    "INSERT INTO nodes (id, label, degree) VALUES (?1, ?2, 0) \
                     ON CONFLICT(id) DO UPDATE SET label = excluded.label",
                )
                .map_err(|e| Error::Database(e.to_string()))?;

            for rec in records {
                let already: Option<i64> = exists
                    .query_row(params![rec.id], |row| row.get(0))
                    .optional()
                    .map_err(|e| Error::Database(e.to_string()))?;
                upsert
                    .execute(params![rec.id, rec.label])
                    .map_err(|e| Error::Database(e.to_string()))?;
                if already.is_some() {
                    report.overwritten += 1;
                } else {
                    report.inserted += 1;
                }
            }
        }

        tx.commit().map_err(|e| Error::Database(e.to_string()))?;

        if report.overwritten > 0 {
            warn!(
                "{} duplicate node ids overwritten (last write wins)",
                report.overwritten
            );
        }
        Ok(report)
    }

    // ---------------------------------------------------------------
    // Edge writes
    // ---------------------------------------------------------------

    /// Write a batch of edges, applying endpoint-existence filtering and
    /// unordered-pair deduplication before insert. Ids are dense and assigned
    /// in insertion order. The checks consult the table rather than any
    /// batch-local state, so splitting the stream into batches of any size
    /// produces identical final state.
    pub fn put_edges(&self, records: &[EdgeInput]) -> Result<EdgeWriteReport> {
        let conn = self.conn.lock();
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut report = EdgeWriteReport {
            total_seen: records.len(),
            ..Default::default()
        };

        let mut next_id: i64 = tx
            .query_row("SELECT COALESCE(MAX(id) + 1, 0) FROM edges", [], |row| {
                row.get(0)
            })
            .map_err(|e| Error::Database(e.to_string()))?;

        {
            let mut node_exists = tx
                .prepare_cached("SELECT 1 FROM nodes WHERE id = ?1")
                .map_err(|e| Error::Database(e.to_string()))?;
            let mut pair_exists = tx
                .prepare_cached(
                    "SELECT 1 FROM edges WHERE (source = ?1 AND target = ?2) \
                     OR (source = ?2 AND target = ?1) LIMIT 1",
                )
                .map_err(|e| Error::Database(e.to_string()))?;
            let mut insert = tx
                .prepare_cached("INSERT INTO edges (id, source, target) VALUES (?1, ?2, ?3)")
                .map_err(|e| Error::Database(e.to_string()))?;

            for rec in records {
                let mut has_endpoint = |id: &str| -> Result<bool> {
                    Ok(node_exists
                        .query_row(params![id], |row| row.get::<_, i64>(0))
                        .optional()
                        .map_err(|e| Error::Database(e.to_string()))?
                        .is_some())
                };

                if !has_endpoint(&rec.source)? || !has_endpoint(&rec.target)? {
                    report.excluded_missing_endpoint += 1;
                    continue;
                }

                let duplicate = pair_exists
                    .query_row(params![rec.source, rec.target], |row| row.get::<_, i64>(0))
                    .optional()
                    .map_err(|e| Error::Database(e.to_string()))?
                    .is_some();
                if duplicate {
                    report.excluded_duplicate += 1;
                    continue;
                }

                insert
                    .execute(params![next_id, rec.source, rec.target])
                    .map_err(|e| Error::Database(e.to_string()))?;
                next_id += 1;
                report.inserted += 1;
            }
        }

        tx.commit().map_err(|e| Error::Database(e.to_string()))?;
        Ok(report)
    }

    /// Set every node's degree to its persisted incident-edge count. Runs
    /// after edge writes finish so cached degrees always reflect the final
    /// deduplicated edge set.
    pub fn recompute_degrees(&self) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "UPDATE nodes SET degree = (SELECT COUNT(*) FROM edges \
             WHERE edges.source = nodes.id OR edges.target = nodes.id)",
            [],
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    /// Refresh planner statistics after a bulk load.
    pub fn optimize(&self) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute_batch("ANALYZE;")
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    // ---------------------------------------------------------------
    // Node / edge reads
    // ---------------------------------------------------------------

    /// Get a node by id.
    pub fn get_node(&self, id: &str) -> Result<Option<Node>> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached("SELECT id, label, degree FROM nodes WHERE id = ?1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![id], |row| Ok(Self::row_to_node(row)))
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(row)
    }

    /// All edges touching a node, in ingestion order.
    pub fn get_edges_incident(&self, id: &str) -> Result<Vec<Edge>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT id, source, target FROM edges \
                 WHERE source = ?1 OR target = ?1 ORDER BY id",
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![id], |row| Ok(Self::row_to_edge(row)))
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// Distinct neighbors of a node, in ingestion (edge id) order.
    pub fn neighbor_ids(&self, id: &str) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT CASE WHEN source = ?1 THEN target ELSE source END \
                 FROM edges WHERE source = ?1 OR target = ?1 ORDER BY id",
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![id], |row| row.get::<_, String>(0))
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut seen = std::collections::HashSet::new();
        let mut neighbors = Vec::new();
        for nb in rows.filter_map(|r| r.ok()) {
            if seen.insert(nb.clone()) {
                neighbors.push(nb);
            }
        }
        Ok(neighbors)
    }

    /// Count of distinct nodes exactly one edge away, endpoint-symmetric.
    pub fn neighbor_count(&self, id: &str) -> Result<i64> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .prepare_cached(
                "SELECT COUNT(DISTINCT CASE WHEN source = ?1 THEN target ELSE source END) \
                 FROM edges WHERE source = ?1 OR target = ?1",
            )
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![id], |row| row.get(0))
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(count)
    }

    /// Case-sensitive substring search over labels, most-connected first.
    /// Queries shorter than 2 characters return empty without a table scan.
    pub fn search_nodes_by_label(&self, substring: &str, limit: usize) -> Result<Vec<Node>> {
        if substring.chars().count() < 2 {
            return Ok(Vec::new());
        }

        let escaped = substring
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let pattern = format!("%{}%", escaped);

        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT id, label, degree FROM nodes WHERE label LIKE ?1 ESCAPE '\\' \
                 ORDER BY degree DESC, id ASC LIMIT ?2",
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![pattern, limit as i64], |row| {
                Ok(Self::row_to_node(row))
            })
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// Random existing node, for the substitute-random missing-center policy.
    pub fn random_node(&self) -> Result<Option<Node>> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached("SELECT id, label, degree FROM nodes ORDER BY RANDOM() LIMIT 1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row([], |row| Ok(Self::row_to_node(row)))
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(row)
    }

    /// All node ids in first-seen order. Feeds the ranking snapshot.
    pub fn all_node_ids(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached("SELECT id FROM nodes ORDER BY rowid")
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// All edges in ingestion order. Feeds the ranking snapshot.
    pub fn all_edges(&self) -> Result<Vec<Edge>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached("SELECT id, source, target FROM edges ORDER BY id")
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| Ok(Self::row_to_edge(row)))
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    pub fn count_nodes(&self) -> Result<i64> {
        let conn = self.conn.lock();
        conn.query_row("SELECT COUNT(*) FROM nodes", [], |row| row.get(0))
            .map_err(|e| Error::Database(e.to_string()))
    }

    pub fn count_edges(&self) -> Result<i64> {
        let conn = self.conn.lock();
        conn.query_row("SELECT COUNT(*) FROM edges", [], |row| row.get(0))
            .map_err(|e| Error::Database(e.to_string()))
    }

    // ---------------------------------------------------------------
    // Important nodes
    // ---------------------------------------------------------------

    /// Persist the ranked important-node ids, replacing any previous set.
    pub fn set_important_nodes(&self, ranked_ids: &[String]) -> Result<()> {
        let conn = self.conn.lock();
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| Error::Database(e.to_string()))?;
        tx.execute("DELETE FROM important_nodes", [])
            .map_err(|e| Error::Database(e.to_string()))?;
        {
            let mut insert = tx
                .prepare_cached("INSERT INTO important_nodes (id, rank) VALUES (?1, ?2)")
                .map_err(|e| Error::Database(e.to_string()))?;
            for (rank, id) in ranked_ids.iter().enumerate() {
                insert
                    .execute(params![id, rank as i64])
                    .map_err(|e| Error::Database(e.to_string()))?;
            }
        }
        tx.commit().map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    /// Important nodes in the order they were ranked at ingestion time.
    pub fn get_important_nodes(&self) -> Result<Vec<Node>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT nodes.id, nodes.label, nodes.degree FROM nodes \
                 JOIN important_nodes ON nodes.id = important_nodes.id \
                 ORDER BY important_nodes.rank",
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| Ok(Self::row_to_node(row)))
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// Induced edge set restricted to pairs where both endpoints are important.
    pub fn important_edges(&self) -> Result<Vec<Edge>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT e.id, e.source, e.target FROM edges e \
                 JOIN important_nodes a ON e.source = a.id \
                 JOIN important_nodes b ON e.target = b.id \
                 ORDER BY e.id",
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| Ok(Self::row_to_edge(row)))
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    // ---------------------------------------------------------------
    // Stats
    // ---------------------------------------------------------------

    /// Persist graph statistics, replacing any previous values.
    pub fn set_stats(&self, stats: &GraphStats) -> Result<()> {
        let conn = self.conn.lock();
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| Error::Database(e.to_string()))?;
        tx.execute("DELETE FROM graph_stats", [])
            .map_err(|e| Error::Database(e.to_string()))?;
        {
            let mut insert = tx
                .prepare_cached("INSERT INTO graph_stats (key, value) VALUES (?1, ?2)")
                .map_err(|e| Error::Database(e.to_string()))?;
            let rows = [
                ("total_nodes", stats.total_nodes.to_string()),
                ("total_edges", stats.total_edges.to_string()),
                ("avg_degree", stats.avg_degree.to_string()),
            ];
            for (key, value) in rows {
                insert
                    .execute(params![key, value])
                    .map_err(|e| Error::Database(e.to_string()))?;
            }
        }
        tx.commit().map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    /// Read graph statistics. Zeros when ingestion has not run yet.
    pub fn get_stats(&self) -> Result<GraphStats> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached("SELECT key, value FROM graph_stats")
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(|e| Error::Database(e.to_string()))?;

        let map: HashMap<String, String> = rows.filter_map(|r| r.ok()).collect();
        Ok(GraphStats {
            total_nodes: map
                .get("total_nodes")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            total_edges: map
                .get("total_edges")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            avg_degree: map
                .get("avg_degree")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.0),
        })
    }

    // ---------------------------------------------------------------
    // Row mapping helpers
    // ---------------------------------------------------------------

    fn row_to_node(row: &rusqlite::Row<'_>) -> Node {
        Node {
            id: row.get(0).unwrap_or_default(),
            label: row.get(1).unwrap_or_default(),
            degree: row.get(2).unwrap_or(0),
        }
    }

    fn row_to_edge(row: &rusqlite::Row<'_>) -> Edge {
        Edge {
            id: row.get(0).unwrap_or(0),
            source: row.get(1).unwrap_or_default(),
            target: row.get(2).unwrap_or_default(),
        }
    }
}
