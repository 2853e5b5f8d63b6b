//! Parallel Batch Insertion
//!
//! Spreads a batch of documents over a small pool of tokio workers. Workers never
//! share a counter: each one sends its [`InsertOutcome`]s down an `mpsc` channel
//! and a single aggregator owns the [`BatchReport`].

use super::store::DistributedStore;
use super::types::InsertOutcome;
use crate::document::Document;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub inserted: usize,
    pub duplicates: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Successful inserts per node name.
    pub per_node: BTreeMap<String, usize>,
}

impl BatchReport {
    pub fn record(&mut self, outcome: &InsertOutcome) {
        match outcome {
            InsertOutcome::Inserted { node } => {
                self.inserted += 1;
                *self.per_node.entry(node.clone()).or_insert(0) += 1;
            }
            InsertOutcome::Duplicate { .. } => self.duplicates += 1,
            InsertOutcome::SkippedUnavailable { .. } => self.skipped += 1,
            InsertOutcome::Failed { .. } => self.failed += 1,
        }
    }

    /// Number of documents processed, whatever their outcome.
    pub fn total(&self) -> usize {
        self.inserted + self.duplicates + self.skipped + self.failed
    }
}

/// Inserts `documents` using `workers` concurrent tasks and returns the tally.
pub async fn insert_batch(
    store: Arc<DistributedStore>,
    documents: Vec<Document>,
    workers: usize,
) -> BatchReport {
    let workers = workers.max(1);
    let (tx, mut rx) = mpsc::channel::<InsertOutcome>(workers * 4);

    let mut shares: Vec<Vec<Document>> = (0..workers).map(|_| Vec::new()).collect();
    for (i, document) in documents.into_iter().enumerate() {
        shares[i % workers].push(document);
    }

    tracing::info!("Starting batch insert with {} workers", workers);

    for (worker_id, share) in shares.into_iter().enumerate() {
        if share.is_empty() {
            continue;
        }

        let store = store.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let assigned = share.len();
            for document in share {
                let outcome = store.insert(document).await;
                if tx.send(outcome).await.is_err() {
                    break;
                }
            }
            tracing::debug!("Batch worker {} finished {} documents", worker_id, assigned);
        });
    }

    // The channel closes once the last worker drops its sender.
    drop(tx);

    let mut report = BatchReport::default();
    while let Some(outcome) = rx.recv().await {
        report.record(&outcome);
    }

    tracing::info!(
        "Batch insert done: {} inserted, {} duplicates, {} skipped, {} failed",
        report.inserted,
        report.duplicates,
        report.skipped,
        report.failed
    );

    report
}
