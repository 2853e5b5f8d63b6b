//! Storage Node Collaborator
//!
//! The distribution layer never touches documents directly; it talks to each node
//! through a [`backend::NodeBackend`] handle exposing `put`, `get`, `count` and
//! `drop_collection` on a named collection.
//!
//! ## Implementations
//! - **`memory`**: an in-process node (`DashMap` per collection), used by tests, the
//!   in-memory demo, and as the engine behind the node server.
//! - **`http`**: a `reqwest` client talking to a remote node server.
//! - **`handlers`** / **`protocol`**: the `axum` node server and its wire DTOs.

pub mod backend;
pub mod handlers;
pub mod http;
pub mod memory;
pub mod protocol;

pub use backend::{NodeBackend, NodeConnector};
pub use http::{HttpBackend, HttpConnector};
pub use memory::{MemoryBackend, MemoryConnector};

#[cfg(test)]
mod tests;
