//! Node Collaborator Tests
//!
//! ## Test Scopes
//! - **MemoryBackend**: put/get/count/drop semantics, duplicate rejection, offline mode.
//! - **MemoryConnector**: shared handles and unreachable names.
//! - **HTTP**: `HttpBackend` against a real `axum` node server on a local port.

#[cfg(test)]
mod tests {
    use crate::document::{Document, DocumentId, StoredDocument};
    use crate::error::BackendError;
    use crate::node::handlers::node_router;
    use crate::node::{HttpBackend, HttpConnector, MemoryBackend, MemoryConnector, NodeBackend, NodeConnector};
    use crate::registry::types::NodeSpec;
    use serde_json::json;
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;

    const COLLECTION: &str = "documents";

    fn stored(id: i64, node: &str) -> StoredDocument {
        let document = Document::from_value(id, json!({"id": id, "value": id * 10})).unwrap();
        StoredDocument::assign(document, node)
    }

    async fn spawn_node_server(backend: Arc<MemoryBackend>) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, node_router(backend)).await.unwrap();
        });
        addr
    }

    fn http_backend(addr: SocketAddr) -> HttpBackend {
        HttpBackend::new(&format!("http://{}", addr), Duration::from_secs(2), 2).unwrap()
    }

    // ============================================================
    // MEMORY BACKEND TESTS
    // ============================================================

    #[tokio::test]
    async fn test_memory_put_then_get() {
        let backend = MemoryBackend::new();
        backend.put(COLLECTION, stored(1, "node1")).await.unwrap();

        let found = backend.get(COLLECTION, &DocumentId::Int(1)).await.unwrap();
        assert_eq!(found.unwrap().data.get("value"), Some(&json!(10)));

        let missing = backend.get(COLLECTION, &DocumentId::Int(2)).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_memory_rejects_duplicate_without_overwrite() {
        let backend = MemoryBackend::new();
        backend.put(COLLECTION, stored(1, "node1")).await.unwrap();

        let mut second = stored(1, "node1");
        second.node = "other".to_string();
        let err = backend.put(COLLECTION, second).await.unwrap_err();
        assert_eq!(err, BackendError::DuplicateKey(DocumentId::Int(1)));

        let kept = backend.get(COLLECTION, &DocumentId::Int(1)).await.unwrap().unwrap();
        assert_eq!(kept.node, "node1");
        assert_eq!(backend.count(COLLECTION).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_memory_collections_are_isolated() {
        let backend = MemoryBackend::new();
        backend.put("a", stored(1, "node1")).await.unwrap();
        backend.put("b", stored(1, "node1")).await.unwrap();

        assert_eq!(backend.count("a").await.unwrap(), 1);
        assert_eq!(backend.count("b").await.unwrap(), 1);
        assert_eq!(backend.count("c").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_memory_drop_collection() {
        let backend = MemoryBackend::new();
        for i in 0..5 {
            backend.put(COLLECTION, stored(i, "node1")).await.unwrap();
        }

        assert_eq!(backend.drop_collection(COLLECTION).await.unwrap(), 5);
        assert_eq!(backend.count(COLLECTION).await.unwrap(), 0);
        assert_eq!(backend.drop_collection(COLLECTION).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_memory_offline_fails_every_call() {
        let backend = MemoryBackend::new();
        backend.put(COLLECTION, stored(1, "node1")).await.unwrap();
        backend.set_online(false);

        assert!(matches!(backend.ping().await, Err(BackendError::Connection(_))));
        assert!(backend.get(COLLECTION, &DocumentId::Int(1)).await.is_err());
        assert!(backend.count(COLLECTION).await.is_err());
        assert!(backend.put(COLLECTION, stored(2, "node1")).await.is_err());

        // Data survives the outage.
        backend.set_online(true);
        assert_eq!(backend.count(COLLECTION).await.unwrap(), 1);
    }

    // ============================================================
    // MEMORY CONNECTOR TESTS
    // ============================================================

    #[tokio::test]
    async fn test_memory_connector_shares_handles() {
        let connector = MemoryConnector::new();
        let spec = NodeSpec::new("node1", "memory://node1");

        let handle = connector.open(&spec).await.unwrap();
        handle.put(COLLECTION, stored(1, "node1")).await.unwrap();

        assert_eq!(connector.backend("node1").len(COLLECTION), 1);
    }

    #[tokio::test]
    async fn test_memory_connector_unreachable() {
        let connector = MemoryConnector::new();
        connector.mark_unreachable("node2");

        let result = connector.open(&NodeSpec::new("node2", "memory://node2")).await;
        assert!(matches!(result, Err(BackendError::Connection(_))));
    }

    // ============================================================
    // HTTP BACKEND TESTS
    // ============================================================

    #[test]
    fn test_http_backend_rejects_non_http_endpoint() {
        let result = HttpBackend::new("mongodb://localhost:27017", Duration::from_secs(1), 1);
        assert!(matches!(result, Err(BackendError::Connection(_))));
    }

    #[test]
    fn test_http_backend_trims_trailing_slash() {
        let backend = HttpBackend::new("http://127.0.0.1:7001/", Duration::from_secs(1), 1).unwrap();
        assert_eq!(backend.base_url(), "http://127.0.0.1:7001");
    }

    #[tokio::test]
    async fn test_http_roundtrip_against_node_server() {
        let node = Arc::new(MemoryBackend::new());
        let addr = spawn_node_server(node.clone()).await;
        let client = http_backend(addr);

        client.ping().await.unwrap();
        client.put(COLLECTION, stored(50, "node1")).await.unwrap();
        client.put(COLLECTION, stored(51, "node1")).await.unwrap();

        let found = client
            .get(COLLECTION, &DocumentId::Int(50))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.data.get("value"), Some(&json!(500)));
        assert_eq!(found.node, "node1");

        assert!(client.get(COLLECTION, &DocumentId::Int(999)).await.unwrap().is_none());
        assert_eq!(client.count(COLLECTION).await.unwrap(), 2);
        assert_eq!(node.len(COLLECTION), 2);

        assert_eq!(client.drop_collection(COLLECTION).await.unwrap(), 2);
        assert_eq!(client.count(COLLECTION).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_http_collection_names_are_path_encoded() {
        let node = Arc::new(MemoryBackend::new());
        let addr = spawn_node_server(node.clone()).await;
        let client = http_backend(addr);

        let collection = "shop/orders?v=2 #1";
        client.put(collection, stored(1, "node1")).await.unwrap();
        client.put(COLLECTION, stored(2, "node1")).await.unwrap();

        assert_eq!(client.count(collection).await.unwrap(), 1);
        assert_eq!(node.len(collection), 1);
        assert_eq!(node.len("shop"), 0);

        assert_eq!(client.drop_collection(collection).await.unwrap(), 1);
        assert_eq!(node.len(collection), 0);
        assert_eq!(node.len(COLLECTION), 1);
    }

    #[tokio::test]
    async fn test_http_duplicate_maps_to_duplicate_key() {
        let node = Arc::new(MemoryBackend::new());
        let addr = spawn_node_server(node).await;
        let client = http_backend(addr);

        client.put(COLLECTION, stored(7, "node2")).await.unwrap();
        let err = client.put(COLLECTION, stored(7, "node2")).await.unwrap_err();
        assert_eq!(err, BackendError::DuplicateKey(DocumentId::Int(7)));
    }

    #[tokio::test]
    async fn test_http_text_ids_keep_their_type() {
        let node = Arc::new(MemoryBackend::new());
        let addr = spawn_node_server(node).await;
        let client = http_backend(addr);

        let document = Document::from_value("50", json!({"kind": "text"})).unwrap();
        client
            .put(COLLECTION, StoredDocument::assign(document, "node1"))
            .await
            .unwrap();

        assert!(client.get(COLLECTION, &DocumentId::Int(50)).await.unwrap().is_none());
        assert!(client.get(COLLECTION, &DocumentId::from("50")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_http_offline_node_reports_connection_error() {
        let node = Arc::new(MemoryBackend::new());
        let addr = spawn_node_server(node.clone()).await;
        let client = http_backend(addr);

        node.set_online(false);
        assert!(matches!(client.ping().await, Err(BackendError::Connection(_))));
        assert!(matches!(
            client.count(COLLECTION).await,
            Err(BackendError::Connection(_))
        ));
    }

    #[tokio::test]
    async fn test_http_unreachable_server() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpBackend::new(&format!("http://{}", addr), Duration::from_millis(500), 1).unwrap();
        assert!(client.ping().await.is_err());
    }

    #[tokio::test]
    async fn test_http_connector_opens_backend() {
        let connector = HttpConnector::new(Duration::from_secs(1), 1);
        let spec = NodeSpec::new("node1", "http://127.0.0.1:7001");
        assert!(connector.open(&spec).await.is_ok());

        let bad = NodeSpec::new("node1", "127.0.0.1:7001");
        assert!(connector.open(&bad).await.is_err());
    }
}
