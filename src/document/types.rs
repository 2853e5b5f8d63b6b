use crate::error::DocumentError;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Maximum nesting depth of a payload (the top-level object counts as 1).
pub const MAX_PAYLOAD_DEPTH: usize = 32;
/// Maximum size of a payload once encoded as JSON.
pub const MAX_PAYLOAD_BYTES: usize = 1024 * 1024;

/// Caller-supplied document identifier.
///
/// Routing hashes the string form, so `Int(50)` and `Text("50")` land on the same
/// node, but nodes still store them under distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentId {
    Int(i64),
    Text(String),
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentId::Int(n) => write!(f, "{}", n),
            DocumentId::Text(s) => f.write_str(s),
        }
    }
}

/// Strings that parse as an `i64` become integer ids.
impl FromStr for DocumentId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<i64>() {
            Ok(n) => DocumentId::Int(n),
            Err(_) => DocumentId::Text(s.to_string()),
        })
    }
}

impl From<i64> for DocumentId {
    fn from(n: i64) -> Self {
        DocumentId::Int(n)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        DocumentId::Text(s.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(s: String) -> Self {
        DocumentId::Text(s)
    }
}

/// Schema-less key-value payload.
///
/// Deserialization is transparent so payloads read back from a node are taken as-is;
/// anything entering the store goes through [`Payload::new`] or [`Payload::from_value`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(Map<String, Value>);

impl Payload {
    pub fn new(map: Map<String, Value>) -> Result<Self, DocumentError> {
        let depth = object_depth(&map);
        if depth > MAX_PAYLOAD_DEPTH {
            return Err(DocumentError::TooDeep {
                depth,
                max: MAX_PAYLOAD_DEPTH,
            });
        }

        // Encoding a Map<String, Value> cannot fail.
        let size = serde_json::to_vec(&map).map(|v| v.len()).unwrap_or(0);
        if size > MAX_PAYLOAD_BYTES {
            return Err(DocumentError::TooLarge {
                size,
                max: MAX_PAYLOAD_BYTES,
            });
        }

        Ok(Self(map))
    }

    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        match value {
            Value::Object(map) => Self::new(map),
            _ => Err(DocumentError::NotAnObject),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn object_depth(map: &Map<String, Value>) -> usize {
    1 + map.values().map(value_depth).max().unwrap_or(0)
}

fn value_depth(value: &Value) -> usize {
    match value {
        Value::Object(map) => object_depth(map),
        Value::Array(items) => 1 + items.iter().map(value_depth).max().unwrap_or(0),
        _ => 0,
    }
}

/// A document as submitted by a caller, before it is routed.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    id: DocumentId,
    payload: Payload,
}

impl Document {
    pub fn new(id: impl Into<DocumentId>, payload: Payload) -> Self {
        Self {
            id: id.into(),
            payload,
        }
    }

    /// Builds a document from an arbitrary JSON value, validating the payload.
    pub fn from_value(id: impl Into<DocumentId>, payload: Value) -> Result<Self, DocumentError> {
        Ok(Self::new(id, Payload::from_value(payload)?))
    }

    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}

/// The record persisted on exactly one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub data: Payload,
    /// Name of the node the router assigned at insert time.
    pub node: String,
    pub created_at: DateTime<Utc>,
}

impl StoredDocument {
    /// Stamps a document with its assigned node and the current time.
    pub fn assign(document: Document, node: &str) -> Self {
        Self {
            id: document.id,
            data: document.payload,
            node: node.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// A lookup hit, tagged with the node that returned it.
///
/// `source_node` can differ from `document.node` when documents were copied across
/// nodes by hand; it always names the node that answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoundDocument {
    #[serde(flatten)]
    pub document: StoredDocument,
    pub source_node: String,
}
