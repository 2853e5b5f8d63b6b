use super::backend::{NodeBackend, NodeConnector};
use super::protocol::*;
use crate::document::{DocumentId, StoredDocument};
use crate::error::BackendError;
use crate::registry::types::NodeSpec;

use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;

const INITIAL_BACKOFF_MS: u64 = 150;
const MAX_BACKOFF_MS: u64 = 1200;

/// Client for a node server reachable over HTTP.
///
/// Reads are retried on transport errors with exponential backoff and jitter.
/// Puts are sent once: a lost response followed by a retry would come back as a
/// duplicate of our own write.
pub struct HttpBackend {
    http_client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    attempts: usize,
}

impl HttpBackend {
    pub fn new(endpoint: &str, timeout: Duration, attempts: usize) -> Result<Self, BackendError> {
        let base_url = endpoint.trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(BackendError::Connection(format!(
                "unsupported endpoint '{}', expected http:// or https://",
                endpoint
            )));
        }

        Ok(Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.to_string(),
            timeout,
            attempts: attempts.max(1),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `{endpoint}/{collection}` with the collection percent-encoded as one segment.
    fn collection_url(&self, endpoint: &str, collection: &str) -> Result<reqwest::Url, BackendError> {
        let mut url = reqwest::Url::parse(&self.url(endpoint))
            .map_err(|e| BackendError::Connection(format!("invalid node url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| BackendError::Connection(format!("cannot address {}", self.base_url)))?
            .push(collection);
        Ok(url)
    }

    async fn send_with_retry<F>(&self, build: F, attempts: usize) -> Result<reqwest::Response, BackendError>
    where
        F: Fn(&reqwest::Client) -> reqwest::RequestBuilder,
    {
        let mut delay_ms = INITIAL_BACKOFF_MS;

        for attempt in 0..attempts {
            let response = build(&self.http_client)
                .timeout(self.timeout)
                .send()
                .await;

            match response {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    if attempt + 1 == attempts {
                        return Err(e.into());
                    }
                    tracing::debug!(
                        "Request to {} failed (attempt {}/{}): {}",
                        self.base_url,
                        attempt + 1,
                        attempts,
                        e
                    );
                    let jitter = rand::random::<u64>() % 50;
                    tokio::time::sleep(Duration::from_millis(delay_ms + jitter)).await;
                    delay_ms = (delay_ms * 2).min(MAX_BACKOFF_MS);
                }
            }
        }

        Err(BackendError::Connection("retry attempts exhausted".to_string()))
    }
}

fn status_error(status: StatusCode) -> BackendError {
    match status {
        StatusCode::SERVICE_UNAVAILABLE => {
            BackendError::Connection("node reported itself unavailable".to_string())
        }
        StatusCode::GATEWAY_TIMEOUT => BackendError::Timeout,
        other => BackendError::Status(other.as_u16()),
    }
}

#[async_trait]
impl NodeBackend for HttpBackend {
    async fn ping(&self) -> Result<(), BackendError> {
        let url = self.url(ENDPOINT_PING);
        let response = self.send_with_retry(|c| c.get(&url), 1).await?;

        if !response.status().is_success() {
            return Err(status_error(response.status()));
        }
        Ok(())
    }

    async fn put(&self, collection: &str, document: StoredDocument) -> Result<(), BackendError> {
        let id = document.id.clone();
        let payload = PutRequest {
            collection: collection.to_string(),
            document,
        };
        let url = self.url(ENDPOINT_PUT);
        let response = self
            .send_with_retry(|c| c.post(&url).json(&payload), 1)
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(BackendError::DuplicateKey(id)),
            status => Err(status_error(status)),
        }
    }

    async fn get(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<Option<StoredDocument>, BackendError> {
        let payload = GetRequest {
            collection: collection.to_string(),
            id: id.clone(),
        };
        let url = self.url(ENDPOINT_GET);
        let response = self
            .send_with_retry(|c| c.post(&url).json(&payload), self.attempts)
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(status_error(response.status()));
        }

        let get_response: GetResponse = response.json().await?;
        Ok(get_response.document)
    }

    async fn count(&self, collection: &str) -> Result<u64, BackendError> {
        let url = self.collection_url(ENDPOINT_COUNT, collection)?;
        let response = self
            .send_with_retry(|c| c.get(url.clone()), self.attempts)
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response.status()));
        }

        let count: CountResponse = response.json().await?;
        Ok(count.count)
    }

    async fn drop_collection(&self, collection: &str) -> Result<u64, BackendError> {
        let url = self.collection_url(ENDPOINT_DROP, collection)?;
        let response = self
            .send_with_retry(|c| c.post(url.clone()), self.attempts)
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response.status()));
        }

        let dropped: DropResponse = response.json().await?;
        Ok(dropped.dropped)
    }
}

/// Opens [`HttpBackend`] handles with shared timeout and retry settings.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    pub request_timeout: Duration,
    pub attempts: usize,
}

impl HttpConnector {
    pub fn new(request_timeout: Duration, attempts: usize) -> Self {
        Self {
            request_timeout,
            attempts,
        }
    }
}

#[async_trait]
impl NodeConnector for HttpConnector {
    async fn open(&self, spec: &NodeSpec) -> Result<Arc<dyn NodeBackend>, BackendError> {
        let backend = HttpBackend::new(&spec.endpoint, self.request_timeout, self.attempts)?;
        Ok(Arc::new(backend))
    }
}
