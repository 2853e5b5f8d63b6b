use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, post},
};
use std::sync::Arc;

use super::backend::NodeBackend;
use super::memory::MemoryBackend;
use super::protocol::{
    CountResponse, DropResponse, ENDPOINT_COUNT, ENDPOINT_DROP, ENDPOINT_GET, ENDPOINT_PING,
    ENDPOINT_PUT, ErrorResponse, GetRequest, GetResponse, PingResponse, PutRequest, PutResponse,
};
use crate::error::BackendError;

type ErrorReply = (StatusCode, Json<ErrorResponse>);

/// Router serving one in-process node over HTTP.
pub fn node_router(backend: Arc<MemoryBackend>) -> Router {
    Router::new()
        .route(ENDPOINT_PING, get(handle_ping))
        .route(ENDPOINT_PUT, post(handle_put))
        .route(ENDPOINT_GET, post(handle_get))
        .route(&format!("{}/:collection", ENDPOINT_COUNT), get(handle_count))
        .route(&format!("{}/:collection", ENDPOINT_DROP), post(handle_drop))
        .layer(Extension(backend))
}

fn error_reply(e: BackendError) -> ErrorReply {
    let status = match e {
        BackendError::DuplicateKey(_) => StatusCode::CONFLICT,
        BackendError::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
        BackendError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

pub async fn handle_ping(
    Extension(backend): Extension<Arc<MemoryBackend>>,
) -> Result<Json<PingResponse>, ErrorReply> {
    backend.ping().await.map_err(error_reply)?;
    Ok(Json(PingResponse { ok: true }))
}

pub async fn handle_put(
    Extension(backend): Extension<Arc<MemoryBackend>>,
    Json(req): Json<PutRequest>,
) -> (StatusCode, Json<PutResponse>) {
    let id = req.document.id.clone();

    match backend.put(&req.collection, req.document).await {
        Ok(()) => {
            tracing::debug!("Stored document {} in '{}'", id, req.collection);
            (
                StatusCode::CREATED,
                Json(PutResponse {
                    success: true,
                    duplicate: false,
                }),
            )
        }
        Err(BackendError::DuplicateKey(_)) => {
            tracing::debug!("Rejected duplicate document {} in '{}'", id, req.collection);
            (
                StatusCode::CONFLICT,
                Json(PutResponse {
                    success: false,
                    duplicate: true,
                }),
            )
        }
        Err(e) => {
            tracing::error!("Failed to store document {}: {}", id, e);
            let (status, _) = error_reply(e);
            (
                status,
                Json(PutResponse {
                    success: false,
                    duplicate: false,
                }),
            )
        }
    }
}

pub async fn handle_get(
    Extension(backend): Extension<Arc<MemoryBackend>>,
    Json(req): Json<GetRequest>,
) -> Result<(StatusCode, Json<GetResponse>), ErrorReply> {
    match backend.get(&req.collection, &req.id).await {
        Ok(Some(document)) => Ok((
            StatusCode::OK,
            Json(GetResponse {
                document: Some(document),
            }),
        )),
        Ok(None) => Ok((StatusCode::NOT_FOUND, Json(GetResponse { document: None }))),
        Err(e) => {
            tracing::error!("Failed to read document {}: {}", req.id, e);
            Err(error_reply(e))
        }
    }
}

pub async fn handle_count(
    Extension(backend): Extension<Arc<MemoryBackend>>,
    Path(collection): Path<String>,
) -> Result<Json<CountResponse>, ErrorReply> {
    let count = backend.count(&collection).await.map_err(error_reply)?;
    Ok(Json(CountResponse { collection, count }))
}

pub async fn handle_drop(
    Extension(backend): Extension<Arc<MemoryBackend>>,
    Path(collection): Path<String>,
) -> Result<Json<DropResponse>, ErrorReply> {
    let dropped = backend
        .drop_collection(&collection)
        .await
        .map_err(error_reply)?;
    tracing::info!("Dropped collection '{}' ({} documents)", collection, dropped);
    Ok(Json(DropResponse {
        collection,
        dropped,
    }))
}
