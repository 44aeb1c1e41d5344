//! Shared application state and the build-then-swap rebuild path.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use graphex_core::{Error, GraphexConfig, Result};
use graphex_ingest::{IngestOptions, IngestPipeline, IngestReport, RawEdgeRecord, RawNodeRecord};
use graphex_store::GraphStore;

/// Shared state accessible from all route handlers. The store handle is owned
/// here and scoped to one serve session; queries read whichever generation is
/// current, rebuilds swap in a fresh one.
pub struct AppState {
    pub config: GraphexConfig,
    store: RwLock<Arc<GraphStore>>,
    generation: AtomicU64,
    rebuild_lock: tokio::sync::Mutex<()>,
}

impl AppState {
    /// Open the highest-numbered existing store generation, or start a fresh
    /// generation 0.
    pub fn new(config: GraphexConfig) -> Result<Self> {
        let generation = latest_generation(&config.data_paths.graphdb).unwrap_or(0);
        let store = GraphStore::open(config.data_paths.generation_file(generation))?;
        info!("serving store generation {}", generation);

        Ok(Self {
            config,
            store: RwLock::new(Arc::new(store)),
            generation: AtomicU64::new(generation),
            rebuild_lock: tokio::sync::Mutex::new(()),
        })
    }

    /// Snapshot handle to the current generation. In-flight requests keep
    /// their Arc across rebuild swaps.
    pub fn store(&self) -> Arc<GraphStore> {
        self.store.read().clone()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn swap_store(&self, new_store: Arc<GraphStore>, generation: u64) -> Arc<GraphStore> {
        let mut guard = self.store.write();
        let old = std::mem::replace(&mut *guard, new_store);
        self.generation.store(generation, Ordering::SeqCst);
        old
    }
}

/// Outcome of a successful rebuild.
#[derive(Debug)]
pub struct RebuildOutcome {
    pub generation: u64,
    pub report: IngestReport,
}

/// Build a fresh store generation from the record stream, then atomically
/// repoint the serving state. On any failure the partial file is removed and
/// the prior generation remains live.
pub async fn rebuild(
    state: Arc<AppState>,
    nodes: Vec<RawNodeRecord>,
    edges: Vec<RawEdgeRecord>,
    options: IngestOptions,
) -> Result<RebuildOutcome> {
    // Single exclusive writer: rebuilds never run concurrently.
    let _guard = state.rebuild_lock.lock().await;

    let next_generation = state.generation() + 1;
    let path = state.config.data_paths.generation_file(next_generation);

    let build_path = path.clone();
    let built = tokio::task::spawn_blocking(move || -> Result<(GraphStore, IngestReport)> {
        let store = GraphStore::create(&build_path)?;
        let report = IngestPipeline::new(&store).run(nodes, edges, &options)?;
        Ok((store, report))
    })
    .await
    .map_err(|e| Error::Internal(e.to_string()))?;

    match built {
        Ok((store, report)) => {
            let old = state.swap_store(Arc::new(store), next_generation);
            remove_generation_files(old.path());
            info!("swapped to store generation {}", next_generation);
            Ok(RebuildOutcome {
                generation: next_generation,
                report,
            })
        }
        Err(err) => {
            remove_generation_files(&path);
            warn!("rebuild failed, keeping generation {}: {}", state.generation(), err);
            Err(err)
        }
    }
}

/// Highest generation number among `graph-{n}.db` files in the directory.
fn latest_generation(dir: &std::path::Path) -> Option<u64> {
    let entries = std::fs::read_dir(dir).ok()?;
    entries
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let name = e.file_name();
            let name = name.to_str()?;
            name.strip_prefix("graph-")?
                .strip_suffix(".db")?
                .parse()
                .ok()
        })
        .max()
}

fn remove_generation_files(db_path: &std::path::Path) {
    for suffix in ["", "-wal", "-shm"] {
        let path = std::path::PathBuf::from(format!("{}{}", db_path.display(), suffix));
        let _ = std::fs::remove_file(path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphex_core::GraphexConfig;
    use tempfile::TempDir;

    fn test_state() -> (Arc<AppState>, TempDir) {
        let dir = TempDir::new().unwrap();
        let config = GraphexConfig::from_env(dir.path()).unwrap();
        let state = Arc::new(AppState::new(config).unwrap());
        (state, dir)
    }

    fn path_records() -> (Vec<RawNodeRecord>, Vec<RawEdgeRecord>) {
        (
            vec![
                RawNodeRecord::new("A"),
                RawNodeRecord::new("B"),
                RawNodeRecord::new("C"),
            ],
            vec![RawEdgeRecord::new("A", "B"), RawEdgeRecord::new("B", "C")],
        )
    }

    #[tokio::test]
    async fn test_rebuild_swaps_generation() {
        let (state, _dir) = test_state();
        assert_eq!(state.generation(), 0);
        assert_eq!(state.store().count_nodes().unwrap(), 0);

        let (nodes, edges) = path_records();
        let outcome = rebuild(state.clone(), nodes, edges, IngestOptions::default())
            .await
            .unwrap();

        assert_eq!(outcome.generation, 1);
        assert_eq!(state.generation(), 1);
        assert_eq!(state.store().count_nodes().unwrap(), 3);
        assert_eq!(outcome.report.inserted_edges, 2);
    }

    #[tokio::test]
    async fn test_failed_rebuild_keeps_prior_generation() {
        let (state, _dir) = test_state();
        let (nodes, edges) = path_records();
        rebuild(state.clone(), nodes, edges, IngestOptions::default())
            .await
            .unwrap();

        // Zero valid nodes: EmptyGraph, generation 1 stays live.
        let result = rebuild(
            state.clone(),
            Vec::new(),
            Vec::new(),
            IngestOptions::default(),
        )
        .await;
        assert!(matches!(result, Err(Error::EmptyGraph)));
        assert_eq!(state.generation(), 1);
        assert_eq!(state.store().count_nodes().unwrap(), 3);

        // The partial generation file was cleaned up.
        assert!(!state.config.data_paths.generation_file(2).exists());
    }

    #[tokio::test]
    async fn test_in_flight_snapshot_survives_swap() {
        let (state, _dir) = test_state();
        let (nodes, edges) = path_records();
        rebuild(state.clone(), nodes, edges, IngestOptions::default())
            .await
            .unwrap();

        let snapshot = state.store();
        rebuild(
            state.clone(),
            vec![RawNodeRecord::new("X")],
            Vec::new(),
            IngestOptions::default(),
        )
        .await
        .unwrap();

        // The old handle still reads the old generation's data.
        assert_eq!(snapshot.count_nodes().unwrap(), 3);
        assert_eq!(state.store().count_nodes().unwrap(), 1);
    }

    #[test]
    fn test_latest_generation_scan() {
        let dir = TempDir::new().unwrap();
        assert_eq!(latest_generation(dir.path()), None);

        for n in [0, 2, 7] {
            std::fs::write(dir.path().join(format!("graph-{}.db", n)), b"").unwrap();
        }
        std::fs::write(dir.path().join("graph-x.db"), b"").unwrap();
        assert_eq!(latest_generation(dir.path()), Some(7));
    }
}
