//! HTTP error mapping for the sync API (spec §7, §6 error-code shape).
//!
//! `ApiError` is the single point where `sync-engine::EngineError` (and the
//! `sync-core`/`sync-db` errors it wraps) turn into an HTTP status + a
//! `{code, message}` JSON body. Per-item failures never reach here — they're
//! carried inline in `PushResponse`/`ResolveResponse` (spec §7).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use sync_core::CoreError;
use sync_db::DbError;
use sync_engine::EngineError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("invalid request body: {0}")]
    BadRequest(String),
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Engine(EngineError::DeviceNotFound) => "DEVICE_NOT_FOUND",
            ApiError::Engine(EngineError::NotFound { .. }) => "NOT_FOUND",
            ApiError::Engine(EngineError::UploadFailed { .. }) => "UPLOAD_FAILED",
            ApiError::Engine(EngineError::Core(CoreError::Validation(_))) => "VALIDATION_FAILED",
            ApiError::Engine(EngineError::Core(CoreError::ParentNotFound { .. })) => "PARENT_NOT_FOUND",
            ApiError::Engine(EngineError::Core(CoreError::UnsupportedParentType(_))) => "VALIDATION_FAILED",
            ApiError::Engine(EngineError::Core(CoreError::InvalidUploadStatus { .. })) => "INVALID_UPLOAD_STATUS",
            ApiError::Engine(EngineError::Core(CoreError::EntityDeleted { .. })) => "DELETED_ON_SERVER",
            ApiError::Engine(EngineError::Db(DbError::NotFound { .. })) => "NOT_FOUND",
            ApiError::Engine(EngineError::Db(DbError::UniqueViolation { .. })) => "CONFLICT",
            ApiError::Engine(EngineError::Db(_)) => "INFRASTRUCTURE_ERROR",
            ApiError::Engine(EngineError::Blob(_)) => "INFRASTRUCTURE_ERROR",
            ApiError::Engine(EngineError::Infrastructure(_)) => "INFRASTRUCTURE_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Engine(EngineError::DeviceNotFound) => StatusCode::UNAUTHORIZED,
            ApiError::Engine(EngineError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Engine(EngineError::UploadFailed { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Engine(EngineError::Core(CoreError::Validation(_))) => StatusCode::BAD_REQUEST,
            ApiError::Engine(EngineError::Core(CoreError::ParentNotFound { .. })) => StatusCode::BAD_REQUEST,
            ApiError::Engine(EngineError::Core(CoreError::UnsupportedParentType(_))) => StatusCode::BAD_REQUEST,
            ApiError::Engine(EngineError::Core(CoreError::InvalidUploadStatus { .. })) => StatusCode::CONFLICT,
            ApiError::Engine(EngineError::Core(CoreError::EntityDeleted { .. })) => StatusCode::CONFLICT,
            ApiError::Engine(EngineError::Db(DbError::NotFound { .. })) => StatusCode::NOT_FOUND,
            ApiError::Engine(EngineError::Db(DbError::UniqueViolation { .. })) => StatusCode::CONFLICT,
            ApiError::Engine(EngineError::Db(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Engine(EngineError::Blob(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Engine(EngineError::Infrastructure(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status() == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed with an infrastructure error");
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code().to_string(),
                message: self.to_string(),
            },
        };

        (self.status(), Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
