//! Graphex Store — durable SQLite graph store with bounded neighborhood expansion.

pub mod expand;
pub mod schema;
pub mod sqlite;
pub mod types;

pub use expand::Expansion;
pub use sqlite::GraphStore;
pub use types::*;
