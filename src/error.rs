//! Error types for the process engine

use thiserror::Error;

use crate::id::NodeId;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Construction-time and lookup errors raised by the graph and model layers.
///
/// Runtime stepping never fails: unsatisfied conditions produce a residual,
/// not an error. See the crate-level docs for the two error strata.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A node with this id is already present in the graph
    #[error("node already exists: {0}")]
    NodeAlreadyExists(NodeId),

    /// An edge between these two nodes is already present
    #[error("edge already exists: {0} -> {1}")]
    EdgeAlreadyExists(NodeId, NodeId),

    /// The edge's `from` endpoint does not name an existing node
    #[error("edge source node missing: {0}")]
    FromNodeMissing(NodeId),

    /// The edge's `to` endpoint does not name an existing node
    #[error("edge target node missing: {0}")]
    ToNodeMissing(NodeId),

    /// A lookup (e.g. `paths`, `data`) named a node absent from the graph
    #[error("node does not exist: {0}")]
    NodeDoesNotExist(NodeId),

    /// Configuration failed validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::InvalidConfig(err.to_string())
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(err: toml::de::Error) -> Self {
        EngineError::InvalidConfig(format!("TOML parse error: {err}"))
    }
}
