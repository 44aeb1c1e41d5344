//! Graphex Core — error types and configuration.

pub mod config;
pub mod error;

pub use config::{DataPaths, GraphexConfig, MissingCenterPolicy};
pub use error::{Error, Result};
