//! Document Model
//!
//! Defines what callers submit ([`Document`]), what a node persists
//! ([`StoredDocument`], the wire schema `{_id, data, node, created_at}`), and what a
//! scatter-gather lookup hands back ([`FoundDocument`], tagged with the node that
//! actually answered).
//!
//! Payloads are schema-less JSON objects with a bounded nesting depth and encoded
//! size, checked once when the [`Payload`] is built.

pub mod sample;
pub mod types;

pub use sample::generate_sample_documents;
pub use types::*;
