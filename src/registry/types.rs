use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A configured node: unique name plus an opaque endpoint handed to the connector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    pub endpoint: String,
}

impl NodeSpec {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
        }
    }
}

/// Parses `name=endpoint`, as accepted by the `--node` flag.
impl FromStr for NodeSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((name, endpoint)) if !name.trim().is_empty() && !endpoint.trim().is_empty() => {
                Ok(Self::new(name.trim(), endpoint.trim()))
            }
            _ => Err(format!("expected NAME=ENDPOINT, got '{}'", s)),
        }
    }
}

/// Point-in-time view of a node.
///
/// `available` is true only when the node has a live handle and is not marked down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub endpoint: String,
    pub available: bool,
}

/// What to do when a node cannot be reached while the registry is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartupPolicy {
    /// Abort construction with `ConnectFailure`.
    #[default]
    FailFast,
    /// Keep going; the node starts unavailable.
    Degraded,
}
