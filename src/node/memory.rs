use super::backend::{NodeBackend, NodeConnector};
use crate::document::{DocumentId, StoredDocument};
use crate::error::BackendError;
use crate::registry::types::NodeSpec;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// In-process storage node.
///
/// Documents live in one `DashMap` per collection. The node can be switched offline,
/// after which every call fails with a connection error, the same way a crashed
/// remote node would look to the store.
pub struct MemoryBackend {
    collections: DashMap<String, DashMap<DocumentId, StoredDocument>>,
    online: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            collections: DashMap::new(),
            online: AtomicBool::new(true),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Number of documents in `collection`, regardless of the online flag.
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .get(collection)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    fn check_online(&self) -> Result<(), BackendError> {
        if self.is_online() {
            Ok(())
        } else {
            Err(BackendError::Connection("node is offline".to_string()))
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NodeBackend for MemoryBackend {
    async fn ping(&self) -> Result<(), BackendError> {
        self.check_online()
    }

    async fn put(&self, collection: &str, document: StoredDocument) -> Result<(), BackendError> {
        self.check_online()?;

        let docs = self
            .collections
            .entry(collection.to_string())
            .or_default();

        match docs.entry(document.id.clone()) {
            Entry::Occupied(_) => Err(BackendError::DuplicateKey(document.id)),
            Entry::Vacant(slot) => {
                slot.insert(document);
                Ok(())
            }
        }
    }

    async fn get(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<Option<StoredDocument>, BackendError> {
        self.check_online()?;

        Ok(self
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id).map(|doc| doc.value().clone())))
    }

    async fn count(&self, collection: &str) -> Result<u64, BackendError> {
        self.check_online()?;
        Ok(self.len(collection) as u64)
    }

    async fn drop_collection(&self, collection: &str) -> Result<u64, BackendError> {
        self.check_online()?;

        Ok(self
            .collections
            .remove(collection)
            .map(|(_, docs)| docs.len() as u64)
            .unwrap_or(0))
    }
}

/// Connector handing out in-process nodes by name.
///
/// Nodes are created on first use and shared afterwards, so a test can keep a
/// reference to a node and take it offline. Names marked unreachable fail to open.
#[derive(Default)]
pub struct MemoryConnector {
    nodes: DashMap<String, Arc<MemoryBackend>>,
    unreachable: DashSet<String>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the node registered under `name`, creating it if needed.
    pub fn backend(&self, name: &str) -> Arc<MemoryBackend> {
        self.nodes
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(MemoryBackend::new()))
            .clone()
    }

    pub fn mark_unreachable(&self, name: &str) {
        self.unreachable.insert(name.to_string());
    }
}

#[async_trait]
impl NodeConnector for MemoryConnector {
    async fn open(&self, spec: &NodeSpec) -> Result<Arc<dyn NodeBackend>, BackendError> {
        if self.unreachable.contains(&spec.name) {
            return Err(BackendError::Connection(format!(
                "no route to {}",
                spec.endpoint
            )));
        }

        let backend: Arc<dyn NodeBackend> = self.backend(&spec.name);
        Ok(backend)
    }
}
