//! Request extractors for the sync API.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::ApiError;

/// The calling user's identity, carried on every sync request.
///
/// Authentication/JWT validation is explicitly out of scope (spec §1): this
/// extractor reads `X-User-Id` as already-authenticated input, the way
/// `apps/sync-api` treats the HTTP layer per SPEC_FULL.md §6 — it performs
/// no cryptographic verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub Uuid);

impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get("X-User-Id")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::BadRequest("missing X-User-Id header".to_string()))?;

        let id = Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest("X-User-Id is not a valid UUID".to_string()))?;

        Ok(UserId(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[tokio::test]
    async fn extracts_valid_user_id_header() {
        let user_id = Uuid::new_v4();
        let req = Request::builder()
            .header("X-User-Id", user_id.to_string())
            .body(())
            .unwrap();
        let (mut parts, _) = req.into_parts();
        let extracted = UserId::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(extracted.0, user_id);
    }

    #[tokio::test]
    async fn rejects_missing_header() {
        let req = Request::builder().body(()).unwrap();
        let (mut parts, _) = req.into_parts();
        let result = UserId::from_request_parts(&mut parts, &()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn rejects_malformed_header() {
        let req = Request::builder().header("X-User-Id", "not-a-uuid").body(()).unwrap();
        let (mut parts, _) = req.into_parts();
        let result = UserId::from_request_parts(&mut parts, &()).await;
        assert!(result.is_err());
    }
}
