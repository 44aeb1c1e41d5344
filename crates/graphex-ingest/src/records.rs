//! Loose input records and their validation.
//!
//! The collaborator-facing record types accept partial data; validation turns
//! them into store inputs, counting malformed records instead of failing the
//! pass.

use serde::{Deserialize, Serialize};

use graphex_store::{EdgeInput, NodeInput};

/// A node record as handed in by a collaborator (rebuild body, parser output).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawNodeRecord {
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// An edge record as handed in by a collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEdgeRecord {
    pub source: Option<String>,
    pub target: Option<String>,
}

impl RawNodeRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            label: None,
        }
    }

    pub fn with_label(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            label: Some(label.into()),
        }
    }
}

impl RawEdgeRecord {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            target: Some(target.into()),
        }
    }
}

/// Validate node records. Missing or empty ids are malformed; the label
/// defaults to the id. Returns the valid inputs and the malformed count.
pub fn validate_nodes(records: Vec<RawNodeRecord>) -> (Vec<NodeInput>, usize) {
    let mut valid = Vec::with_capacity(records.len());
    let mut malformed = 0;

    for record in records {
        match record.id {
            Some(id) if !id.is_empty() => {
                let label = match record.label {
                    Some(label) if !label.is_empty() => label,
                    _ => id.clone(),
                };
                valid.push(NodeInput { id, label });
            }
            _ => malformed += 1,
        }
    }
    (valid, malformed)
}

/// Validate edge records. Missing or empty endpoints are malformed.
pub fn validate_edges(records: Vec<RawEdgeRecord>) -> (Vec<EdgeInput>, usize) {
    let mut valid = Vec::with_capacity(records.len());
    let mut malformed = 0;

    for record in records {
        match (record.source, record.target) {
            (Some(source), Some(target)) if !source.is_empty() && !target.is_empty() => {
                valid.push(EdgeInput { source, target });
            }
            _ => malformed += 1,
        }
    }
    (valid, malformed)
}
