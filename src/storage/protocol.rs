//! Coordinator HTTP Protocol
//!
//! Public endpoints exposed by `docstore serve` on top of a [`super::DistributedStore`].
//! Lookups and stats reuse the store's own report types as response bodies.

use crate::document::DocumentId;
use serde::{Deserialize, Serialize};

use super::types::InsertOutcome;

// --- API Endpoints ---

/// `POST` a document; `GET {ENDPOINT_DOCUMENTS}/{id}` to look one up.
pub const ENDPOINT_DOCUMENTS: &str = "/documents";
/// Distribution statistics.
pub const ENDPOINT_STATS: &str = "/stats";
/// Node list; `POST {ENDPOINT_NODES}/{name}/availability` flips a node.
pub const ENDPOINT_NODES: &str = "/nodes";

// --- Data Transfer Objects ---

#[derive(Debug, Serialize, Deserialize)]
pub struct InsertRequest {
    pub id: DocumentId,
    /// Must be a JSON object.
    pub payload: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InsertResponse {
    pub id: DocumentId,
    #[serde(flatten)]
    pub outcome: InsertOutcome,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AvailabilityRequest {
    pub available: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}
