//! Graphex Ingest — record validation, DOT parsing, and the ingestion pipeline.

pub mod dot;
pub mod pipeline;
pub mod records;

pub use dot::parse_dot;
pub use pipeline::{IngestOptions, IngestPipeline, IngestReport};
pub use records::{RawEdgeRecord, RawNodeRecord};
