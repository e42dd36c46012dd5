//! # Validation Module
//!
//! Attribute-level validation for Task/Note/Block/Asset fields.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Client (out of scope)                                        │
//! │  └── Immediate user feedback, not trusted                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: This module                                                  │
//! │  └── Domain rule validation, runs after version/ownership checks        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Postgres (sync-db)                                           │
//! │  └── NOT NULL / FK constraints as a last line of defense                │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation runs *after* the version/ownership check (spec §4.1): a stale
//! update is rejected as `VersionMismatch` before its payload is even looked
//! at.

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_TITLE_LEN: usize = 500;

/// Validates a Task or Note title.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most 500 characters
///
/// ## Example
/// ```rust
/// use sync_core::validation::validate_title;
///
/// assert!(validate_title("Pick up dry cleaning").is_ok());
/// assert!(validate_title("   ").is_err());
/// ```
pub fn validate_title(title: &str) -> ValidationResult<()> {
    if title.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "title".to_string(),
        });
    }

    if title.len() > MAX_TITLE_LEN {
        return Err(ValidationError::TooLong {
            field: "title".to_string(),
            max: MAX_TITLE_LEN,
        });
    }

    Ok(())
}

/// Validates a Task's optional start/end time pair.
///
/// If both are present, `start` must not be after `end`. Either or both may
/// be absent.
///
/// ## Example
/// ```rust
/// use chrono::NaiveTime;
/// use sync_core::validation::validate_time_range;
///
/// let start = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
/// let end = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
/// assert!(validate_time_range(Some(start), Some(end)).is_ok());
/// assert!(validate_time_range(Some(end), Some(start)).is_err());
/// ```
pub fn validate_time_range(
    start: Option<chrono::NaiveTime>,
    end: Option<chrono::NaiveTime>,
) -> ValidationResult<()> {
    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            return Err(ValidationError::OutOfOrder {
                earlier: "start_time".to_string(),
                later: "end_time".to_string(),
            });
        }
    }
    Ok(())
}

/// Validates a Block's fractional-index `Position`.
///
/// The position is treated as an opaque, non-empty string; the engine must
/// never reinterpret or normalize it (spec §4.1).
pub fn validate_position(position: &str) -> ValidationResult<()> {
    if position.is_empty() {
        return Err(ValidationError::Required {
            field: "position".to_string(),
        });
    }
    Ok(())
}

/// Validates the client-supplied identity of an asset-backed Block.
///
/// `asset_client_id` and `file_name` must be non-empty; `size_bytes` must be
/// strictly positive (spec §4.1 domain validation for asset block types).
pub fn validate_asset_identity(
    asset_client_id: &str,
    file_name: &str,
    size_bytes: i64,
) -> ValidationResult<()> {
    if asset_client_id.is_empty() {
        return Err(ValidationError::Required {
            field: "asset_client_id".to_string(),
        });
    }
    if file_name.is_empty() {
        return Err(ValidationError::Required {
            field: "file_name".to_string(),
        });
    }
    if size_bytes <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "size_bytes".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn test_validate_title() {
        assert!(validate_title("Groceries").is_ok());
        assert!(validate_title("").is_err());
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"x".repeat(501)).is_err());
    }

    #[test]
    fn test_validate_time_range() {
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let ten = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        assert!(validate_time_range(None, None).is_ok());
        assert!(validate_time_range(Some(nine), None).is_ok());
        assert!(validate_time_range(Some(nine), Some(ten)).is_ok());
        assert!(validate_time_range(Some(nine), Some(nine)).is_ok());
        assert!(validate_time_range(Some(ten), Some(nine)).is_err());
    }

    #[test]
    fn test_validate_position() {
        assert!(validate_position("a0").is_ok());
        assert!(validate_position("").is_err());
    }

    #[test]
    fn test_validate_asset_identity() {
        assert!(validate_asset_identity("c1", "photo.jpg", 1024).is_ok());
        assert!(validate_asset_identity("", "photo.jpg", 1024).is_err());
        assert!(validate_asset_identity("c1", "", 1024).is_err());
        assert!(validate_asset_identity("c1", "photo.jpg", 0).is_err());
        assert!(validate_asset_identity("c1", "photo.jpg", -1).is_err());
    }
}
