//! # Engine Errors
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CoreError (sync-core)     DbError (sync-db)     BlobError (sync-blob) │
//! │         │                       │                       │              │
//! │         └───────────────────────┼───────────────────────┘              │
//! │                                 ▼                                      │
//! │                          EngineError (this module)                     │
//! │                                 │                                      │
//! │                                 ▼                                      │
//! │                   ApiError (apps/sync-api) → HTTP {code, message}      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Per-item failures inside a push/resolve batch (validation, conflict,
//! not-found) are *not* represented here — they are outcomes carried in the
//! response DTOs (spec §7: "per-item failures ... never raised as a request
//! failure"). `EngineError` is reserved for request-level failures: the
//! device gate, and infrastructure failures that abort the whole request.

use thiserror::Error;
use uuid::Uuid;

use sync_core::CoreError;
use sync_db::DbError;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Spec §4.1 gate: an invalid device fails the entire request, no
    /// partial application.
    #[error("device is not a valid sync principal")]
    DeviceNotFound,

    /// An entity referenced by id could not be found (or is owned by a
    /// different user — spec §3 invariant 5: collapsed with not-found).
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    /// The blob PUT in phase 3 of the asset upload workflow failed — the
    /// point of no return already transitioned `Block.UploadStatus` to
    /// `Failed` before this is returned (spec §4.4).
    #[error("asset upload failed for block {block_id}")]
    UploadFailed { block_id: Uuid },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error("blob storage error: {0}")]
    Blob(String),

    #[error("request-level infrastructure failure: {0}")]
    Infrastructure(String),
}

impl From<sync_blob::BlobError> for EngineError {
    fn from(err: sync_blob::BlobError) -> Self {
        EngineError::Blob(err.to_string())
    }
}

impl EngineError {
    /// Used by callers deciding whether to surface a 5xx as transient.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EngineError::Db(DbError::PoolExhausted) | EngineError::Db(DbError::ConnectionFailed(_))
        )
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_exhausted_is_retryable() {
        let err = EngineError::Db(DbError::PoolExhausted);
        assert!(err.is_retryable());
    }

    #[test]
    fn device_not_found_is_not_retryable() {
        assert!(!EngineError::DeviceNotFound.is_retryable());
    }
}
