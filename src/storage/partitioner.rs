use crate::document::DocumentId;

use md5::{Digest, Md5};

/// Maps document ids onto node indices.
///
/// The digest is MD5 of the id's string form, read as a big-endian 128-bit integer,
/// reduced modulo the node count. MD5 is used for its spread only; nothing here
/// relies on it being collision resistant.
///
/// Changing the node count remaps most ids. There is no rebalancing, so the
/// registry must not be resized while it holds data.
pub struct ShardRouter;

impl ShardRouter {
    pub fn digest(document_id: &DocumentId) -> u128 {
        let hash = Md5::digest(document_id.to_string().as_bytes());
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&hash);
        u128::from_be_bytes(bytes)
    }

    /// Index in `0..node_count` that owns `document_id`, or `None` when there are no
    /// nodes to choose from.
    pub fn select_node(document_id: &DocumentId, node_count: usize) -> Option<usize> {
        if node_count == 0 {
            return None;
        }
        Some((Self::digest(document_id) % node_count as u128) as usize)
    }
}
