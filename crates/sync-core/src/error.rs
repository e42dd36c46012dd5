//! # Error Types
//!
//! Domain-specific error types for sync-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  sync-core errors (this file)                                          │
//! │  ├── CoreError        - Domain rule / invariant violations              │
//! │  └── ValidationError  - Attribute-level validation failures            │
//! │                                                                         │
//! │  sync-db errors (separate crate)                                       │
//! │  └── DbError          - Repository / Postgres failures                  │
//! │                                                                         │
//! │  sync-engine errors (separate crate)                                   │
//! │  └── EngineError      - Wraps Core/Db plus blob-store failures          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → EngineError → ApiError → client   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (entity id, field, etc.)
//! 3. Errors are enum variants, never raw strings
//! 4. These are *domain* outcomes (see spec §7), not HTTP status codes

use thiserror::Error;
use uuid::Uuid;

// =============================================================================
// Core Error
// =============================================================================

/// Domain rule violations raised by entity operations in this crate.
///
/// These are the "domain validation" and "state-machine violation" kinds
/// from the error taxonomy; not-found/conflict/infrastructure kinds are
/// raised one layer up (`sync-db`/`sync-engine`) where repository state is
/// visible.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A mutation was attempted against a soft-deleted entity.
    #[error("entity {id} is soft-deleted; mutation rejected")]
    EntityDeleted { id: Uuid },

    /// A Block's resolved parent does not exist, is not owned by the
    /// caller, or is soft-deleted.
    #[error("parent not found for block {block_id:?}")]
    ParentNotFound { block_id: Option<Uuid> },

    /// A Block's `ParentType` is not supported (only `Note` is, per spec).
    #[error("block parent type {0:?} is not supported")]
    UnsupportedParentType(String),

    /// The Block's upload state machine rejected an operation.
    #[error("block {block_id} has upload status {status}, expected {expected}")]
    InvalidUploadStatus {
        block_id: Uuid,
        status: String,
        expected: String,
    },

    /// Attribute-level validation failure (wraps [`ValidationError`]).
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Attribute-level validation errors for Task/Note/Block/Asset/UserDevice
/// fields, raised before a mutation is applied.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value must be positive (e.g. `SizeBytes > 0`).
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Two fields that must satisfy an ordering constraint do not
    /// (e.g. `Start <= End`).
    #[error("{earlier} must not be after {later}")]
    OutOfOrder { earlier: String, later: String },

    /// Value is not in the allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience alias for results that fail with [`CoreError`].
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ValidationError::OutOfOrder {
            earlier: "start_time".to_string(),
            later: "end_time".to_string(),
        };
        assert_eq!(err.to_string(), "start_time must not be after end_time");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "title".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
