use super::partitioner::ShardRouter;
use super::stats::{ClusterStats, StatsAggregator};
use super::types::*;
use crate::config::ClusterConfig;
use crate::document::{Document, DocumentId, FoundDocument, StoredDocument};
use crate::error::{BackendError, Result, StoreError};
use crate::node::NodeConnector;
use crate::registry::NodeRegistry;

use std::sync::Arc;

/// Routes documents to nodes and gathers them back.
///
/// Each call visits the nodes it needs one after another; callers wanting
/// throughput run calls concurrently (see [`super::batch::insert_batch`]).
pub struct DistributedStore {
    registry: Arc<NodeRegistry>,
    collection: String,
}

impl DistributedStore {
    pub fn new(registry: Arc<NodeRegistry>, collection: impl Into<String>) -> Self {
        Self {
            registry,
            collection: collection.into(),
        }
    }

    /// Builds the registry described by `config` and wraps it in a store.
    pub async fn open(config: &ClusterConfig, connector: &dyn NodeConnector) -> Result<Self> {
        config.validate()?;
        let registry = NodeRegistry::connect(
            config.nodes.clone(),
            connector,
            config.startup,
            config.connect_timeout(),
        )
        .await?;
        Ok(Self::new(registry, config.collection.clone()))
    }

    pub fn registry(&self) -> &Arc<NodeRegistry> {
        &self.registry
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Index of the node `id` is routed to under the current topology.
    pub fn target_index(&self, id: &DocumentId) -> Option<usize> {
        ShardRouter::select_node(id, self.registry.len())
    }

    /// Name of the node `id` is routed to under the current topology.
    pub fn target_node(&self, id: &DocumentId) -> Option<&str> {
        self.target_index(id)
            .and_then(|index| self.registry.name(index))
    }

    /// Routes and stores a document, returning the node that now owns it.
    ///
    /// No retry and no fallback: an unavailable target yields
    /// [`StoreError::NodeUnavailable`], an existing id yields
    /// [`StoreError::DuplicateDocument`].
    pub async fn try_insert(&self, document: Document) -> Result<String> {
        let index = self
            .target_index(document.id())
            .ok_or_else(|| StoreError::Config("registry has no nodes".to_string()))?;
        let node = self
            .registry
            .name(index)
            .ok_or_else(|| StoreError::UnknownNode(format!("#{}", index)))?
            .to_string();

        let handle = self.registry.live_handle(index)?;
        let stored = StoredDocument::assign(document, &node);

        match handle.put(&self.collection, stored).await {
            Ok(()) => Ok(node),
            Err(BackendError::DuplicateKey(id)) => Err(StoreError::DuplicateDocument { id, node }),
            Err(source) => Err(StoreError::TransientNodeError { node, source }),
        }
    }

    /// Like [`Self::try_insert`], but reports the outcome instead of failing.
    pub async fn insert(&self, document: Document) -> InsertOutcome {
        let id = document.id().clone();
        let outcome = InsertOutcome::from(self.try_insert(document).await);

        match &outcome {
            InsertOutcome::Inserted { node } => {
                tracing::debug!("Stored document {} on {}", id, node);
            }
            InsertOutcome::SkippedUnavailable { node } => {
                tracing::warn!("Node {} unavailable, skipping insert of document {}", node, id);
            }
            InsertOutcome::Duplicate { node } => {
                tracing::warn!("Document {} already exists on {}, not overwritten", id, node);
            }
            InsertOutcome::Failed { node, error } => {
                tracing::error!(
                    "Failed to insert document {} on {}: {}",
                    id,
                    node.as_deref().unwrap_or("<unrouted>"),
                    error
                );
            }
        }

        outcome
    }

    /// Queries every node in registry order and reports what each one answered.
    ///
    /// Unavailable nodes are skipped, failing nodes are logged and treated as misses.
    /// Every hit is kept and tagged with the node that returned it.
    pub async fn lookup(&self, id: &DocumentId) -> FindReport {
        let mut matches = Vec::new();
        let mut nodes = Vec::with_capacity(self.registry.len());

        for index in 0..self.registry.len() {
            let node = self.registry.name(index).unwrap_or_default().to_string();

            let outcome = match self.registry.live_handle(index) {
                Err(_) => {
                    tracing::debug!("Node {} unavailable, skipping lookup of {}", node, id);
                    LookupOutcome::Skipped
                }
                Ok(handle) => match handle.get(&self.collection, id).await {
                    Ok(Some(document)) => {
                        tracing::debug!("Found document {} on {}", id, node);
                        matches.push(FoundDocument {
                            document,
                            source_node: node.clone(),
                        });
                        LookupOutcome::Found
                    }
                    Ok(None) => LookupOutcome::Missing,
                    Err(e) => {
                        tracing::error!("Lookup of document {} on {} failed: {}", id, node, e);
                        LookupOutcome::Failed {
                            error: e.to_string(),
                        }
                    }
                },
            };

            nodes.push(NodeLookup { node, outcome });
        }

        FindReport {
            id: id.clone(),
            matches,
            nodes,
        }
    }

    /// All copies of `id` found across the cluster, normally zero or one.
    pub async fn find(&self, id: &DocumentId) -> Vec<FoundDocument> {
        self.lookup(id).await.matches
    }

    /// Drops the collection on every available node.
    pub async fn drop_collection(&self) -> Vec<NodeDrop> {
        let mut results = Vec::with_capacity(self.registry.len());

        for index in 0..self.registry.len() {
            let node = self.registry.name(index).unwrap_or_default().to_string();

            let outcome = match self.registry.live_handle(index) {
                Err(_) => {
                    tracing::warn!("Node {} unavailable, collection not dropped there", node);
                    DropOutcome::Skipped
                }
                Ok(handle) => match handle.drop_collection(&self.collection).await {
                    Ok(documents) => {
                        tracing::info!(
                            "Dropped '{}' on {} ({} documents)",
                            self.collection,
                            node,
                            documents
                        );
                        DropOutcome::Dropped { documents }
                    }
                    Err(e) => {
                        tracing::error!("Failed to drop '{}' on {}: {}", self.collection, node, e);
                        DropOutcome::Failed {
                            error: e.to_string(),
                        }
                    }
                },
            };

            results.push(NodeDrop { node, outcome });
        }

        results
    }

    pub async fn compute_stats(&self) -> ClusterStats {
        StatsAggregator::new(&self.registry, &self.collection)
            .compute_stats()
            .await
    }
}
