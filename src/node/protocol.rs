//! Storage Node Network Protocol
//!
//! Endpoints and Data Transfer Objects spoken between the store (through
//! [`super::http::HttpBackend`]) and a node server (see [`super::handlers`]).
//!
//! Documents travel in their stored wire form. A duplicate put answers `409 Conflict`,
//! a missing document answers `404 Not Found`, an offline node answers
//! `503 Service Unavailable`.

use crate::document::{DocumentId, StoredDocument};
use serde::{Deserialize, Serialize};

// --- API Endpoints ---

/// Liveness probe.
pub const ENDPOINT_PING: &str = "/internal/ping";
/// Stores one document (no overwrite).
pub const ENDPOINT_PUT: &str = "/internal/put";
/// Point lookup by id. POST so that the id keeps its JSON type.
pub const ENDPOINT_GET: &str = "/internal/get";
/// Document count of a collection, `/internal/count/{collection}`.
pub const ENDPOINT_COUNT: &str = "/internal/count";
/// Drops a collection, `/internal/drop/{collection}`.
pub const ENDPOINT_DROP: &str = "/internal/drop";

// --- Data Transfer Objects ---

#[derive(Debug, Serialize, Deserialize)]
pub struct PingResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PutRequest {
    pub collection: String,
    pub document: StoredDocument,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PutResponse {
    pub success: bool,
    /// Set when the put was rejected because the id already exists.
    #[serde(default)]
    pub duplicate: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetRequest {
    pub collection: String,
    pub id: DocumentId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetResponse {
    /// `None` indicates the id does not exist on this node.
    pub document: Option<StoredDocument>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CountResponse {
    pub collection: String,
    pub count: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DropResponse {
    pub collection: String,
    pub dropped: u64,
}

/// Error body returned alongside non-2xx statuses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
