use crate::document::{DocumentId, FoundDocument};
use crate::error::StoreError;
use serde::{Deserialize, Serialize};

/// Result of a single insert, as seen by the caller.
///
/// Inserts never raise for per-node conditions; they report one of these instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InsertOutcome {
    /// Stored on `node`.
    Inserted { node: String },
    /// The target node was unavailable; nothing was stored anywhere.
    SkippedUnavailable { node: String },
    /// The target node already held this id; nothing was overwritten.
    Duplicate { node: String },
    /// The node call failed. `node` is `None` if routing itself failed.
    Failed { node: Option<String>, error: String },
}

impl InsertOutcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, InsertOutcome::Inserted { .. })
    }

    /// The node the document was routed to, when routing succeeded.
    pub fn node(&self) -> Option<&str> {
        match self {
            InsertOutcome::Inserted { node }
            | InsertOutcome::SkippedUnavailable { node }
            | InsertOutcome::Duplicate { node } => Some(node),
            InsertOutcome::Failed { node, .. } => node.as_deref(),
        }
    }
}

impl From<Result<String, StoreError>> for InsertOutcome {
    fn from(result: Result<String, StoreError>) -> Self {
        match result {
            Ok(node) => InsertOutcome::Inserted { node },
            Err(StoreError::NodeUnavailable { node }) => InsertOutcome::SkippedUnavailable { node },
            Err(StoreError::DuplicateDocument { node, .. }) => InsertOutcome::Duplicate { node },
            Err(StoreError::TransientNodeError { node, source }) => InsertOutcome::Failed {
                node: Some(node),
                error: source.to_string(),
            },
            Err(other) => InsertOutcome::Failed {
                node: None,
                error: other.to_string(),
            },
        }
    }
}

/// What one node answered during a scatter-gather lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LookupOutcome {
    Found,
    Missing,
    /// Node unavailable, not queried.
    Skipped,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeLookup {
    pub node: String,
    #[serde(flatten)]
    pub outcome: LookupOutcome,
}

/// Every hit for an id plus the per-node trail that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindReport {
    pub id: DocumentId,
    pub matches: Vec<FoundDocument>,
    pub nodes: Vec<NodeLookup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DropOutcome {
    Dropped { documents: u64 },
    Skipped,
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDrop {
    pub node: String,
    #[serde(flatten)]
    pub outcome: DropOutcome,
}
