//! Sharded Document Store Library
//!
//! Spreads JSON documents over several independent storage nodes by hashing their
//! ids, and gathers them back by asking every node. It serves as the foundation for
//! the binary executable (`main.rs`).
//!
//! ## Architecture Modules
//! - **`document`**: ids, validated payloads, and the records nodes persist.
//! - **`node`**: the storage-node abstraction. Nodes are reached through
//!   `NodeBackend` handles, either in-process (`MemoryBackend`) or over HTTP
//!   (`HttpBackend`, served by `node::handlers::node_router`).
//! - **`registry`**: the ordered node list with per-node availability, startup
//!   policy, and periodic health checks.
//! - **`storage`**: routing (`ShardRouter`), the `DistributedStore` insert/find
//!   operations, statistics, batch insertion, and the coordinator HTTP API.
//! - **`config`**: cluster configuration loaded from JSON.
//! - **`error`**: error taxonomy shared by every module.

pub mod config;
pub mod document;
pub mod error;
pub mod node;
pub mod registry;
pub mod storage;

pub use config::ClusterConfig;
pub use error::{Result, StoreError};
pub use storage::DistributedStore;
