//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Paths to Graphex data directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Graph database directory (`data/graphdb/`), one file per generation.
    pub graphdb: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates directories if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let paths = Self {
            graphdb: root.join("graphdb"),
            root,
        };
        std::fs::create_dir_all(&paths.graphdb)?;
        Ok(paths)
    }

    /// Database file for a given store generation.
    pub fn generation_file(&self, generation: u64) -> PathBuf {
        self.graphdb.join(format!("graph-{}.db", generation))
    }
}

/// Behavior when an expansion is requested for a center node that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingCenterPolicy {
    /// Return a typed not-found error.
    #[default]
    Fail,
    /// Substitute a uniformly random existing node.
    SubstituteRandom,
}

/// Top-level Graphex configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphexConfig {
    /// HTTP server port.
    pub port: u16,
    /// Data directory paths.
    pub data_paths: DataPaths,
    /// How many top-ranked nodes to persist as the initial view seed.
    pub important_top_n: usize,
    /// How many navigation candidates to surface per bounded expansion.
    pub hint_top_n: usize,
    /// Result cap for label search.
    pub search_limit: usize,
    /// Write batch size during ingestion. Tuning only, never affects final state.
    pub batch_size: usize,
    /// Default hop limit for the bounded neighborhood endpoint.
    pub expand_max_distance: u32,
    /// Default node budget for the bounded neighborhood endpoint.
    pub expand_max_nodes: usize,
    /// Policy for expansion requests naming a missing center node.
    pub on_missing_center: MissingCenterPolicy,
}

impl GraphexConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5000);

        let on_missing_center = match std::env::var("GRAPHEX_MISSING_CENTER").as_deref() {
            Ok("random") => MissingCenterPolicy::SubstituteRandom,
            _ => MissingCenterPolicy::Fail,
        };

        let data_paths = DataPaths::new(data_dir)?;

        Ok(Self {
            port,
            data_paths,
            important_top_n: 50,
            hint_top_n: 10,
            search_limit: 10,
            batch_size: 1000,
            expand_max_distance: 2,
            expand_max_nodes: 100,
            on_missing_center,
        })
    }
}
