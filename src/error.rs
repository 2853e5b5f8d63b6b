//! Error Types
//!
//! Three layers of failure are kept apart:
//! - [`BackendError`]: what a single storage node reported for a single call.
//! - [`StoreError`]: how the distribution layer classifies that failure
//!   (unavailable target, duplicate, connect failure at startup, transient I/O).
//! - [`DocumentError`]: a document rejected before it ever reaches a node.
//!
//! Only [`StoreError::ConnectFailure`] is fatal, and only while a registry is being
//! built. Everything else is turned into a per-operation outcome by the store.

use crate::document::DocumentId;

/// Failure reported by a node handle for one call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("request timed out")]
    Timeout,

    #[error("duplicate key: {0}")]
    DuplicateKey(DocumentId),

    #[error("unexpected response status {0}")]
    Status(u16),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for BackendError {
    fn from(e: serde_json::Error) -> Self {
        BackendError::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            BackendError::Timeout
        } else if e.is_decode() {
            BackendError::Serialization(e.to_string())
        } else {
            BackendError::Connection(e.to_string())
        }
    }
}

/// Failure of a distribution-layer operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The target node has no live handle.
    #[error("node {node} is unavailable")]
    NodeUnavailable { node: String },

    /// The target node already holds a document with this id.
    #[error("document {id} already exists on node {node}")]
    DuplicateDocument { id: DocumentId, node: String },

    /// A node could not be reached while the registry was being built.
    #[error("failed to connect to node {node} at {endpoint}: {source}")]
    ConnectFailure {
        node: String,
        endpoint: String,
        #[source]
        source: BackendError,
    },

    /// A per-call I/O failure on one node.
    #[error("node {node} failed: {source}")]
    TransientNodeError {
        node: String,
        #[source]
        source: BackendError,
    },

    #[error("unknown node: {0}")]
    UnknownNode(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// A document payload that cannot be stored.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    #[error("payload must be a JSON object")]
    NotAnObject,

    #[error("payload nesting depth {depth} exceeds the maximum of {max}")]
    TooDeep { depth: usize, max: usize },

    #[error("payload size {size} bytes exceeds the maximum of {max} bytes")]
    TooLarge { size: usize, max: usize },
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
