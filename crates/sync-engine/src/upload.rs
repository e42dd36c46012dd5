//! # Asset Upload Orchestrator (C4)
//!
//! The one workflow in this crate with a true point of no return: once the
//! blob PUT in phase 3 succeeds, the upload cannot be abandoned cleanly, so
//! everything before it is read-only and everything after it is best-effort
//! cleanup on failure (spec §4.4).
//!
//! ```text
//! 1. validate input (size, non-empty body)
//! 2. load Block untracked; ownership/type/status checks; idempotent-retry
//!    short-circuit if an Asset already exists for this Block
//! 3. blob PUT  ───────────────────────── point of no return ─────────────
//! 4. assemble Asset + updated Block in memory (best-effort blob delete on
//!    any failure here)
//! 5. commit Asset + Block + 2 outbox messages in one transaction, then
//!    sign a download URL (failure to sign is non-fatal)
//! ```

use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use sync_blob::BlobStore;
use sync_core::{Asset, BlockContent, CoreError, UploadStatus, ValidationError};
use sync_db::repository::{asset, block, outbox as outbox_repo};
use sync_db::{Database, DbError};

use crate::error::{EngineError, EngineResult};
use crate::outbox as outbox_msg;
use crate::protocol::{UploadMetadata, UploadResponse};

pub struct UploadOrchestrator;

impl UploadOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub async fn upload(
        db: &Database,
        blob: &dyn BlobStore,
        container_name: &str,
        max_size_bytes: i64,
        download_url_validity: Duration,
        user_id: Uuid,
        metadata: UploadMetadata,
        bytes: Vec<u8>,
    ) -> EngineResult<UploadResponse> {
        // Phase 1: input validation.
        if metadata.size_bytes <= 0 || metadata.size_bytes > max_size_bytes {
            return Err(EngineError::Core(CoreError::Validation(ValidationError::MustBePositive {
                field: "size_bytes".to_string(),
            })));
        }
        if bytes.is_empty() {
            return Err(EngineError::Core(CoreError::Validation(ValidationError::Required {
                field: "bytes".to_string(),
            })));
        }

        // Phase 2: state validation, loaded untracked (spec §4.4 phase 2).
        let pool = db.pool();
        let current_block = block::find_by_id(pool, metadata.block_id)
            .await?
            .ok_or(EngineError::NotFound {
                entity: "Block",
                id: metadata.block_id,
            })?;

        // Collapsed with not-found so a mismatched owner can't be
        // distinguished from a nonexistent block (spec §3 invariant 5).
        if current_block.user_id != user_id || current_block.is_deleted || !current_block.block_type.is_asset_type() {
            return Err(EngineError::NotFound {
                entity: "Block",
                id: metadata.block_id,
            });
        }

        let (expected_client_id, upload_status) = match &current_block.content {
            BlockContent::Asset {
                asset_client_id,
                upload_status,
                ..
            } => (asset_client_id.clone(), *upload_status),
            BlockContent::Text { .. } => {
                return Err(EngineError::NotFound {
                    entity: "Block",
                    id: metadata.block_id,
                })
            }
        };

        if expected_client_id != metadata.asset_client_id {
            return Err(EngineError::NotFound {
                entity: "Block",
                id: metadata.block_id,
            });
        }

        if current_block.has_uploaded_asset() {
            if let Some(existing) = asset::find_by_block_id(pool, current_block.id).await? {
                let download_url = blob.sign_url(&existing.blob_path, download_url_validity).ok();
                return Ok(UploadResponse {
                    asset_id: existing.id,
                    block_id: current_block.id,
                    download_url,
                });
            }
        }

        if upload_status != UploadStatus::Pending {
            return Err(EngineError::Core(CoreError::InvalidUploadStatus {
                block_id: current_block.id,
                status: format!("{upload_status:?}"),
                expected: "Pending".to_string(),
            }));
        }

        // Phase 3: blob PUT. Past this line, a failure leaves the Block
        // terminally Failed rather than retryable.
        let blob_path = format!(
            "{}/{}/{}/{}/{}",
            container_name,
            user_id,
            current_block.parent_id,
            current_block.id,
            sanitize_file_name(&metadata.file_name),
        );

        let now = Utc::now();

        if blob.put(&blob_path, bytes, metadata.content_type.as_deref()).await.is_err() {
            let mut failed_block = current_block.clone();
            if failed_block.set_upload_failed(now).is_ok() {
                if let Ok(mut tx) = db.begin().await {
                    let _ = block::update(&mut *tx, &failed_block, current_block.version).await;
                    let _ = tx.commit().await;
                }
            }
            return Err(EngineError::UploadFailed {
                block_id: metadata.block_id,
            });
        }

        // Phase 4: assemble Asset + updated Block in memory.
        let new_asset = match Asset::create(
            user_id,
            current_block.id,
            metadata.file_name.clone(),
            metadata.content_type.clone().unwrap_or_default(),
            metadata.size_bytes,
            blob_path.clone(),
            now,
        ) {
            Ok(a) => a,
            Err(e) => {
                let _ = blob.delete(&blob_path).await;
                return Err(EngineError::Core(e));
            }
        };

        let mut updated_block = current_block.clone();
        if let Err(e) = updated_block.set_asset_uploaded(new_asset.id, now) {
            let _ = blob.delete(&blob_path).await;
            return Err(EngineError::Core(e));
        }

        let asset_msg = outbox_msg::asset_message(&new_asset, outbox_msg::CREATED, None, now);
        let block_msg = outbox_msg::block_message(&updated_block, outbox_msg::UPDATED, None, now);

        // Phase 5: commit, then sign a download URL (non-fatal if signing fails).
        let mut tx = db.begin().await?;

        let commit_result: Result<(), DbError> = async {
            asset::insert(&mut *tx, &new_asset).await?;
            block::update(&mut *tx, &updated_block, current_block.version).await?;
            outbox_repo::append(&mut *tx, &asset_msg).await?;
            outbox_repo::append(&mut *tx, &block_msg).await?;
            Ok(())
        }
        .await;

        if let Err(e) = commit_result {
            let _ = blob.delete(&blob_path).await;
            return Err(EngineError::Db(e));
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let download_url = blob.sign_url(&blob_path, download_url_validity).ok();

        Ok(UploadResponse {
            asset_id: new_asset.id,
            block_id: updated_block.id,
            download_url,
        })
    }
}

/// Replaces anything that isn't alphanumeric/`.`/`-`/`_` with `_`; an
/// all-unsafe name collapses to `file` rather than an empty path segment.
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' })
        .collect();

    if cleaned.trim_matches('_').is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_path_separators() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "______etc_passwd");
    }

    #[test]
    fn sanitize_keeps_safe_characters() {
        assert_eq!(sanitize_file_name("photo_01.jpg"), "photo_01.jpg");
    }

    #[test]
    fn sanitize_empty_name_becomes_file() {
        assert_eq!(sanitize_file_name("///"), "file");
    }
}
