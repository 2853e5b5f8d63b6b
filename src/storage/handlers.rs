use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, post},
};
use std::sync::Arc;

use super::protocol::{
    ApiError, AvailabilityRequest, ENDPOINT_DOCUMENTS, ENDPOINT_NODES, ENDPOINT_STATS,
    InsertRequest, InsertResponse,
};
use super::stats::ClusterStats;
use super::store::DistributedStore;
use super::types::{FindReport, InsertOutcome};
use crate::document::{Document, DocumentId};
use crate::registry::Node;

type ApiErrorReply = (StatusCode, Json<ApiError>);

/// Public API of the coordinator.
pub fn api_router(store: Arc<DistributedStore>) -> Router {
    Router::new()
        .route(ENDPOINT_DOCUMENTS, post(handle_insert))
        .route(&format!("{}/:id", ENDPOINT_DOCUMENTS), get(handle_find))
        .route(ENDPOINT_STATS, get(handle_stats))
        .route(ENDPOINT_NODES, get(handle_nodes))
        .route(
            &format!("{}/:name/availability", ENDPOINT_NODES),
            post(handle_set_availability),
        )
        .layer(Extension(store))
}

fn api_error(status: StatusCode, error: impl ToString) -> ApiErrorReply {
    (
        status,
        Json(ApiError {
            error: error.to_string(),
        }),
    )
}

pub async fn handle_insert(
    Extension(store): Extension<Arc<DistributedStore>>,
    Json(req): Json<InsertRequest>,
) -> Result<(StatusCode, Json<InsertResponse>), ApiErrorReply> {
    // Lookups read such ids back as integers, so they could never be found here.
    if let DocumentId::Text(text) = &req.id
        && text.parse::<i64>().is_ok()
    {
        tracing::warn!("Rejected text id {:?} that reads as an integer", text);
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("text id \"{}\" reads as an integer, send it as a number", text),
        ));
    }

    let document = match Document::from_value(req.id.clone(), req.payload) {
        Ok(document) => document,
        Err(e) => {
            tracing::warn!("Rejected document {}: {}", req.id, e);
            return Err(api_error(StatusCode::BAD_REQUEST, e));
        }
    };

    let outcome = store.insert(document).await;
    let status = match &outcome {
        InsertOutcome::Inserted { .. } => StatusCode::CREATED,
        InsertOutcome::Duplicate { .. } => StatusCode::CONFLICT,
        InsertOutcome::SkippedUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        InsertOutcome::Failed { .. } => StatusCode::BAD_GATEWAY,
    };

    Ok((status, Json(InsertResponse { id: req.id, outcome })))
}

/// Ids that parse as integers are looked up as integer ids.
pub async fn handle_find(
    Extension(store): Extension<Arc<DistributedStore>>,
    Path(id_str): Path<String>,
) -> (StatusCode, Json<FindReport>) {
    let id: DocumentId = match id_str.parse() {
        Ok(id) => id,
        Err(never) => match never {},
    };

    let report = store.lookup(&id).await;
    let status = if report.matches.is_empty() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    };

    (status, Json(report))
}

pub async fn handle_stats(Extension(store): Extension<Arc<DistributedStore>>) -> Json<ClusterStats> {
    Json(store.compute_stats().await)
}

pub async fn handle_nodes(Extension(store): Extension<Arc<DistributedStore>>) -> Json<Vec<Node>> {
    Json(store.registry().nodes())
}

pub async fn handle_set_availability(
    Extension(store): Extension<Arc<DistributedStore>>,
    Path(name): Path<String>,
    Json(req): Json<AvailabilityRequest>,
) -> Result<Json<Node>, ApiErrorReply> {
    let registry = store.registry();

    registry
        .mark_available(&name, req.available)
        .map_err(|e| api_error(StatusCode::NOT_FOUND, e))?;

    let node = registry
        .index_of(&name)
        .and_then(|index| registry.node(index))
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("unknown node: {}", name)))?;

    Ok(Json(node))
}
