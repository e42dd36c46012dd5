//! Route wiring and handlers for the four sync operations (spec §6).
//!
//! ## Endpoints
//! - `POST /v1/sync/push` — apply a client's buffered mutations
//! - `GET  /v1/sync/pull` — fetch everything changed since a cursor
//! - `POST /v1/sync/resolve` — apply explicit conflict resolutions
//! - `POST /v1/assets/upload` — upload the bytes for a pending asset block

use axum::extract::{Multipart, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};

use sync_engine::protocol::{PullQuery, PullResponse, PushRequest, PushResponse, ResolveRequest, ResolveResponse, UploadMetadata, UploadResponse};
use sync_engine::{ConflictResolver, PullEngine, PushEngine, UploadOrchestrator};

use crate::error::{ApiError, ApiResult};
use crate::extractors::UserId;
use crate::AppState;

/// Build the router mounted at the server root.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/sync/push", post(push))
        .route("/v1/sync/pull", get(pull))
        .route("/v1/sync/resolve", post(resolve))
        .route("/v1/assets/upload", post(upload))
        .route("/healthz", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn push(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Json(request): Json<PushRequest>,
) -> ApiResult<Json<PushResponse>> {
    let response = PushEngine::push(&state.db, request, user_id).await?;
    Ok(Json(response))
}

async fn pull(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Query(query): Query<PullQuery>,
) -> ApiResult<Json<PullResponse>> {
    let response = PullEngine::pull(
        &state.db,
        state.blob.as_ref(),
        query,
        user_id,
        state.config.sync_default_pull_max_items_per_entity,
        state.config.asset_storage_download_url_validity,
    )
    .await?;
    Ok(Json(response))
}

async fn resolve(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Json(request): Json<ResolveRequest>,
) -> ApiResult<Json<ResolveResponse>> {
    let response = ConflictResolver::resolve(&state.db, request, user_id).await?;
    Ok(Json(response))
}

/// Accepts a `multipart/form-data` body with a `metadata` field (JSON,
/// matching [`UploadMetadata`]) and a `file` field (the asset bytes).
async fn upload(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let mut metadata: Option<UploadMetadata> = None;
    let mut bytes: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        match field.name() {
            Some("metadata") => {
                let text = field.text().await.map_err(|e| ApiError::BadRequest(e.to_string()))?;
                metadata = Some(
                    serde_json::from_str(&text)
                        .map_err(|e| ApiError::BadRequest(format!("invalid metadata JSON: {e}")))?,
                );
            }
            Some("file") => {
                let data = field.bytes().await.map_err(|e| ApiError::BadRequest(e.to_string()))?;
                bytes = Some(data.to_vec());
            }
            _ => {}
        }
    }

    let metadata = metadata.ok_or_else(|| ApiError::BadRequest("missing metadata field".to_string()))?;
    let bytes = bytes.ok_or_else(|| ApiError::BadRequest("missing file field".to_string()))?;

    let response = UploadOrchestrator::upload(
        &state.db,
        state.blob.as_ref(),
        &state.config.asset_storage_container_name,
        state.config.asset_storage_max_file_size_bytes,
        state.config.asset_storage_download_url_validity,
        user_id,
        metadata,
        bytes,
    )
    .await?;

    Ok(Json(response))
}
