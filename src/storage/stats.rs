//! Distribution Statistics
//!
//! Counts documents per node and derives each node's share of the total.
//!
//! Unavailable nodes stay in the report with an unknown (`None`) count rather than
//! a zero, so an empty node and an unreachable one are never confused. Shares are
//! computed over known counts only; with no documents at all the report carries no
//! percentages.

use crate::registry::NodeRegistry;

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeStats {
    pub node: String,
    pub available: bool,
    /// `None` when the node could not be asked.
    pub count: Option<u64>,
    /// Share of the cluster total in percent; `None` without data or without a count.
    pub percentage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterStats {
    pub collection: String,
    /// Sum of all known per-node counts.
    pub total: u64,
    /// One entry per registry node, in registry order.
    pub nodes: Vec<NodeStats>,
}

impl ClusterStats {
    pub fn has_data(&self) -> bool {
        self.total > 0
    }

    pub fn get(&self, node: &str) -> Option<&NodeStats> {
        self.nodes.iter().find(|stats| stats.node == node)
    }

    /// Nodes whose count could not be obtained.
    pub fn unknown_nodes(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|stats| stats.count.is_none())
            .map(|stats| stats.node.as_str())
            .collect()
    }
}

impl fmt::Display for ClusterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Distribution of '{}':", self.collection)?;

        if !self.has_data() {
            for stats in &self.nodes {
                if stats.count.is_none() {
                    writeln!(f, "- {}: unavailable, count unknown", stats.node)?;
                }
            }
            return writeln!(f, "No documents to analyze.");
        }

        writeln!(f, "Total documents: {}", self.total)?;
        writeln!(f, "---------------------------------")?;
        for stats in &self.nodes {
            match (stats.count, stats.percentage) {
                (Some(count), Some(percentage)) => {
                    writeln!(f, "- {}: {} documents ({:.2}%)", stats.node, count, percentage)?
                }
                _ => writeln!(f, "- {}: unavailable, count unknown", stats.node)?,
            }
        }
        writeln!(f, "---------------------------------")
    }
}

pub struct StatsAggregator<'a> {
    registry: &'a NodeRegistry,
    collection: &'a str,
}

impl<'a> StatsAggregator<'a> {
    pub fn new(registry: &'a NodeRegistry, collection: &'a str) -> Self {
        Self {
            registry,
            collection,
        }
    }

    /// Asks every available node for its count, one node at a time.
    pub async fn compute_stats(&self) -> ClusterStats {
        let mut nodes = Vec::with_capacity(self.registry.len());

        for index in 0..self.registry.len() {
            let node = self.registry.name(index).unwrap_or_default().to_string();

            let (available, count) = match self.registry.live_handle(index) {
                Err(_) => {
                    tracing::warn!("Node {} unavailable, count unknown", node);
                    (false, None)
                }
                Ok(handle) => match handle.count(self.collection).await {
                    Ok(count) => (true, Some(count)),
                    Err(e) => {
                        tracing::error!("Failed to count documents on {}: {}", node, e);
                        (true, None)
                    }
                },
            };

            nodes.push(NodeStats {
                node,
                available,
                count,
                percentage: None,
            });
        }

        let total: u64 = nodes.iter().filter_map(|stats| stats.count).sum();
        if total > 0 {
            for stats in &mut nodes {
                stats.percentage = stats
                    .count
                    .map(|count| count as f64 / total as f64 * 100.0);
            }
        }

        ClusterStats {
            collection: self.collection.to_string(),
            total,
            nodes,
        }
    }
}
