//! Distribution Layer
//!
//! Shards documents across the nodes of a [`crate::registry::NodeRegistry`].
//!
//! ## Core Concepts
//! - **Routing**: `ShardRouter` hashes an id onto exactly one node index. It is only
//!   consulted on writes.
//! - **Single target**: an insert goes to one node or nowhere. There is no
//!   replication and no fallback when the target is down.
//! - **Scatter-gather**: a lookup asks every available node, so it stays correct even
//!   when documents are not where the router would put them today.
//! - **Outcomes over errors**: per-node failures become `InsertOutcome`,
//!   `LookupOutcome` and `DropOutcome` values; nothing aborts a fan-out.

pub mod batch;
pub mod handlers;
pub mod partitioner;
pub mod protocol;
pub mod stats;
pub mod store;
pub mod types;

pub use batch::{BatchReport, insert_batch};
pub use partitioner::ShardRouter;
pub use stats::{ClusterStats, NodeStats, StatsAggregator};
pub use store::DistributedStore;
pub use types::*;
