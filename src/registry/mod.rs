//! Node Registry
//!
//! Holds the static, ordered list of storage nodes and their liveness.
//!
//! ## Core Concepts
//! - **Static topology**: nodes are fixed at construction; their order defines the
//!   index space the shard router maps ids into.
//! - **Startup policy**: `FailFast` aborts construction on the first unreachable node,
//!   `Degraded` starts with whatever answered and leaves the rest unavailable.
//! - **Liveness**: each node carries an atomic `available` flag, flipped by operators
//!   (`mark_available`) or by periodic health checks.

pub mod service;
pub mod types;

pub use service::NodeRegistry;
pub use types::{Node, NodeSpec, StartupPolicy};
