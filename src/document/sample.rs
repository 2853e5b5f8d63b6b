//! Sample data used by the demo run and by tests.

use super::types::{Document, Payload};
use crate::error::DocumentError;

use chrono::Utc;
use serde_json::{Map, Value, json};

const SAMPLE_CATEGORIES: i64 = 5;

/// Generates `count` documents with ids `0..count`.
///
/// Each payload carries `id`, `name`, `value` (`id * 10`), `category` (one of five)
/// and a creation `timestamp`.
pub fn generate_sample_documents(count: usize) -> Result<Vec<Document>, DocumentError> {
    (0..count as i64)
        .map(|i| {
            let mut map = Map::new();
            map.insert("id".to_string(), json!(i));
            map.insert("name".to_string(), json!(format!("document_{}", i)));
            map.insert("value".to_string(), json!(i * 10));
            map.insert(
                "category".to_string(),
                json!(format!("category_{}", i % SAMPLE_CATEGORIES)),
            );
            map.insert(
                "timestamp".to_string(),
                Value::String(Utc::now().to_rfc3339()),
            );

            Ok(Document::new(i, Payload::new(map)?))
        })
        .collect()
}
