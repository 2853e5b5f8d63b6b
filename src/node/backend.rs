use crate::document::{DocumentId, StoredDocument};
use crate::error::BackendError;
use crate::registry::types::NodeSpec;

use async_trait::async_trait;
use std::sync::Arc;

/// Handle to one storage node.
///
/// Implementations must be safe to share between tasks; the store calls them
/// concurrently when callers insert in parallel.
#[async_trait]
pub trait NodeBackend: Send + Sync {
    /// Cheap liveness probe used at connect time and by health checks.
    async fn ping(&self) -> Result<(), BackendError>;

    /// Stores a document. Fails with [`BackendError::DuplicateKey`] if the id is
    /// already present; existing documents are never overwritten.
    async fn put(&self, collection: &str, document: StoredDocument) -> Result<(), BackendError>;

    async fn get(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<Option<StoredDocument>, BackendError>;

    async fn count(&self, collection: &str) -> Result<u64, BackendError>;

    /// Removes the whole collection, returning how many documents it held.
    async fn drop_collection(&self, collection: &str) -> Result<u64, BackendError>;
}

/// Opens node handles from configured endpoints.
#[async_trait]
pub trait NodeConnector: Send + Sync {
    async fn open(&self, spec: &NodeSpec) -> Result<Arc<dyn NodeBackend>, BackendError>;
}
