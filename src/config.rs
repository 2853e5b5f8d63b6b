//! Cluster Configuration
//!
//! Read from a JSON file; every field is optional and falls back to the defaults
//! below. Command-line flags are applied on top by the binary.
//!
//! ```json
//! {
//!   "collection": "documents",
//!   "nodes": [
//!     { "name": "node1", "endpoint": "http://127.0.0.1:27017" },
//!     { "name": "node2", "endpoint": "http://127.0.0.1:27018" }
//!   ],
//!   "connect_timeout_ms": 5000,
//!   "startup": "fail_fast"
//! }
//! ```

use crate::error::{Result, StoreError};
use crate::registry::service::DEFAULT_CONNECT_TIMEOUT;
use crate::registry::{NodeSpec, StartupPolicy};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_COLLECTION: &str = "documents";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Collection every node stores documents in.
    pub collection: String,
    /// Nodes in routing order. Reordering or resizing remaps existing ids.
    pub nodes: Vec<NodeSpec>,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    /// Attempts per idempotent node request (puts are never retried).
    pub request_attempts: usize,
    pub startup: StartupPolicy,
    /// `0` disables periodic health checks.
    pub health_check_interval_ms: u64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            collection: DEFAULT_COLLECTION.to_string(),
            nodes: vec![
                NodeSpec::new("node1", "http://127.0.0.1:27017"),
                NodeSpec::new("node2", "http://127.0.0.1:27018"),
            ],
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT.as_millis() as u64,
            request_timeout_ms: 2000,
            request_attempts: 3,
            startup: StartupPolicy::FailFast,
            health_check_interval_ms: 5000,
        }
    }
}

impl ClusterConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            StoreError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&raw)
            .map_err(|e| StoreError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| StoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.collection.trim().is_empty() {
            return Err(StoreError::Config("collection must not be empty".to_string()));
        }
        if matches!(self.collection.as_str(), "." | "..")
            || self.collection.chars().any(char::is_control)
        {
            return Err(StoreError::Config(format!(
                "invalid collection name {:?}",
                self.collection
            )));
        }
        if self.nodes.is_empty() {
            return Err(StoreError::Config("at least one node is required".to_string()));
        }

        let mut names = HashSet::new();
        for node in &self.nodes {
            if node.name.trim().is_empty() || node.endpoint.trim().is_empty() {
                return Err(StoreError::Config(
                    "nodes need a name and an endpoint".to_string(),
                ));
            }
            if !names.insert(node.name.as_str()) {
                return Err(StoreError::Config(format!(
                    "duplicate node name '{}'",
                    node.name
                )));
            }
        }

        if self.connect_timeout_ms == 0 || self.request_timeout_ms == 0 {
            return Err(StoreError::Config("timeouts must be positive".to_string()));
        }
        if self.request_attempts == 0 {
            return Err(StoreError::Config(
                "request_attempts must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn health_check_interval(&self) -> Option<Duration> {
        (self.health_check_interval_ms > 0)
            .then(|| Duration::from_millis(self.health_check_interval_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = ClusterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.nodes.len(), 2);
        assert_eq!(config.connect_timeout(), DEFAULT_CONNECT_TIMEOUT);
        assert_eq!(config.startup, StartupPolicy::FailFast);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = ClusterConfig::from_json(
            r#"{"nodes": [{"name": "a", "endpoint": "http://10.0.0.1:7001"}], "startup": "degraded"}"#,
        )
        .unwrap();

        assert_eq!(config.collection, DEFAULT_COLLECTION);
        assert_eq!(config.nodes.len(), 1);
        assert_eq!(config.startup, StartupPolicy::Degraded);
        assert_eq!(config.request_attempts, 3);
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let result = ClusterConfig::from_json(
            r#"{"nodes": [
                {"name": "a", "endpoint": "http://x:1"},
                {"name": "a", "endpoint": "http://x:2"}
            ]}"#,
        );
        assert!(matches!(result, Err(StoreError::Config(msg)) if msg.contains("duplicate")));
    }

    #[test]
    fn test_rejects_empty_nodes_and_zero_values() {
        assert!(ClusterConfig::from_json(r#"{"nodes": []}"#).is_err());
        assert!(ClusterConfig::from_json(r#"{"connect_timeout_ms": 0}"#).is_err());
        assert!(ClusterConfig::from_json(r#"{"request_attempts": 0}"#).is_err());
        assert!(ClusterConfig::from_json(r#"{"collection": " "}"#).is_err());
    }

    #[test]
    fn test_rejects_dot_and_control_collection_names() {
        assert!(ClusterConfig::from_json(r#"{"collection": ".."}"#).is_err());
        assert!(ClusterConfig::from_json(r#"{"collection": "."}"#).is_err());
        assert!(ClusterConfig::from_json(r#"{"collection": "docs\n"}"#).is_err());

        // Reserved URL characters are fine, node clients encode them.
        let config = ClusterConfig::from_json(r#"{"collection": "shop/orders?v=2"}"#).unwrap();
        assert_eq!(config.collection, "shop/orders?v=2");
    }

    #[test]
    fn test_health_check_interval_zero_disables() {
        let config = ClusterConfig {
            health_check_interval_ms: 0,
            ..ClusterConfig::default()
        };
        assert_eq!(config.health_check_interval(), None);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"collection": "books", "nodes": [{{"name": "n1", "endpoint": "http://127.0.0.1:9000"}}]}}"#
        )
        .unwrap();

        let config = ClusterConfig::from_file(file.path()).unwrap();
        assert_eq!(config.collection, "books");
        assert_eq!(config.nodes[0].name, "n1");
    }

    #[test]
    fn test_from_missing_file() {
        let result = ClusterConfig::from_file(Path::new("/nonexistent/cluster.json"));
        assert!(matches!(result, Err(StoreError::Config(_))));
    }
}
