//! # Pull Engine (C2)
//!
//! Returns everything that changed since a client-supplied cursor (spec
//! §4.2). Read-only: no transaction, repositories are called against the
//! pool directly.
//!
//! ## Categorization
//! - `since_utc == None` (initial sync): every non-deleted entity, all
//!   reported as `Created`. Delete tombstones are never surfaced — a client
//!   with nothing locally has nothing to delete.
//! - `since_utc == Some(cursor)`: every entity with `updated_at_utc > cursor`,
//!   including soft-deleted ones, categorized `Deleted` (if `is_deleted`),
//!   else `Created` (if `created_at_utc > cursor`), else `Updated`.
//!
//! ## Pagination
//! The per-entity-type cap applies to `created.len() + updated.len() +
//! deleted.len()` combined, filled in that order — a type with many updates
//! can starve its own deletes out of the same page (DESIGN.md Open Question
//! 5, accepted as-is). Assets are never capped. The cursor returned to the
//! client (`server_timestamp_utc`) is captured once, at the start of the
//! read, so it is stable across however many queries this pull issues.

use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use sync_blob::BlobStore;
use sync_core::{Block, Note, Task};
use sync_db::repository::{asset, block, note, task};
use sync_db::Database;

use crate::device_gate::DeviceGate;
use crate::error::EngineResult;
use crate::protocol::{AssetDelta, AssetEntry, BlockDelta, DeletedEntry, NoteDelta, PullQuery, PullResponse, TaskDelta};

/// Oversample factor applied to the per-type cap before classification: a
/// single `list_changed_since` call can't yet tell Created from Updated from
/// Deleted, so it fetches a wider window and the cap is enforced afterward.
const OVERSAMPLE_FACTOR: i64 = 8;

pub struct PullEngine;

impl PullEngine {
    pub async fn pull(
        db: &Database,
        blob: &dyn BlobStore,
        query: PullQuery,
        user_id: Uuid,
        default_max_items_per_entity: i64,
        download_url_validity: Duration,
    ) -> EngineResult<PullResponse> {
        if let Some(device_id) = query.device_id {
            DeviceGate::authenticate(db.pool(), device_id, user_id).await?;
        }

        let server_timestamp_utc = Utc::now();
        let since = query.since_utc;
        let effective_since = since.unwrap_or(DateTime::<Utc>::MIN_UTC);
        let max_items = query.max_items_per_entity.unwrap_or(default_max_items_per_entity).max(1);
        let fetch_limit = max_items.saturating_mul(OVERSAMPLE_FACTOR).saturating_add(1);

        let pool = db.pool();

        let task_rows = task::list_changed_since(pool, user_id, effective_since, fetch_limit).await?;
        let tasks = classify(
            task_rows,
            since,
            max_items,
            |t: &Task| t.is_deleted,
            |t: &Task| t.created_at_utc,
            |t: &Task| t.updated_at_utc,
            |t: &Task| t.id,
        );

        let note_rows = note::list_changed_since(pool, user_id, effective_since, fetch_limit).await?;
        let notes = classify(
            note_rows,
            since,
            max_items,
            |n: &Note| n.is_deleted,
            |n: &Note| n.created_at_utc,
            |n: &Note| n.updated_at_utc,
            |n: &Note| n.id,
        );

        let block_rows = block::list_changed_since(pool, user_id, effective_since, fetch_limit).await?;
        let blocks = classify(
            block_rows,
            since,
            max_items,
            |b: &Block| b.is_deleted,
            |b: &Block| b.created_at_utc,
            |b: &Block| b.updated_at_utc,
            |b: &Block| b.id,
        );

        let asset_rows = asset::list_changed_since(pool, user_id, effective_since, i64::MAX).await?;
        let mut created_assets = Vec::new();
        let mut deleted_assets = Vec::new();
        for a in asset_rows {
            if a.is_deleted {
                if since.is_some() {
                    deleted_assets.push(DeletedEntry {
                        id: a.id,
                        deleted_at_utc: a.updated_at_utc,
                    });
                }
            } else {
                created_assets.push(a);
            }
        }

        let mut asset_entries = Vec::with_capacity(created_assets.len());
        for asset in created_assets {
            let download_url = match blob.sign_url(&asset.blob_path, download_url_validity) {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::warn!(error = %e, asset_id = %asset.id, "failed to sign asset download URL");
                    None
                }
            };
            asset_entries.push(AssetEntry { asset, download_url });
        }

        Ok(PullResponse {
            server_timestamp_utc,
            has_more_tasks: tasks.has_more,
            has_more_notes: notes.has_more,
            has_more_blocks: blocks.has_more,
            tasks: TaskDelta {
                created: tasks.created,
                updated: tasks.updated,
                deleted: tasks.deleted,
            },
            notes: NoteDelta {
                created: notes.created,
                updated: notes.updated,
                deleted: notes.deleted,
            },
            blocks: BlockDelta {
                created: blocks.created,
                updated: blocks.updated,
                deleted: blocks.deleted,
            },
            assets: AssetDelta {
                created: asset_entries,
                deleted: deleted_assets,
            },
        })
    }
}

struct Classified<T> {
    created: Vec<T>,
    updated: Vec<T>,
    deleted: Vec<DeletedEntry>,
    has_more: bool,
}

#[allow(clippy::too_many_arguments)]
fn classify<T>(
    rows: Vec<T>,
    since: Option<DateTime<Utc>>,
    max_items: i64,
    is_deleted: impl Fn(&T) -> bool,
    created_at: impl Fn(&T) -> DateTime<Utc>,
    updated_at: impl Fn(&T) -> DateTime<Utc>,
    id: impl Fn(&T) -> Uuid,
) -> Classified<T> {
    let mut created = Vec::new();
    let mut updated = Vec::new();
    let mut deleted = Vec::new();

    for row in rows {
        if is_deleted(&row) {
            if since.is_none() {
                continue;
            }
            deleted.push(DeletedEntry {
                id: id(&row),
                deleted_at_utc: updated_at(&row),
            });
        } else if since.map_or(true, |s| created_at(&row) > s) {
            created.push(row);
        } else {
            updated.push(row);
        }
    }

    let max = max_items.max(0) as usize;
    let mut has_more = created.len() + updated.len() + deleted.len() > max;
    let mut remaining = max;

    if created.len() > remaining {
        has_more = true;
        created.truncate(remaining);
        remaining = 0;
    } else {
        remaining -= created.len();
    }

    if updated.len() > remaining {
        has_more = true;
        updated.truncate(remaining);
        remaining = 0;
    } else {
        remaining -= updated.len();
    }

    if deleted.len() > remaining {
        has_more = true;
        deleted.truncate(remaining);
    }

    Classified { created, updated, deleted, has_more }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Row {
        id: Uuid,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        deleted: bool,
    }

    fn row(created_at: DateTime<Utc>, updated_at: DateTime<Utc>, deleted: bool) -> Row {
        Row { id: Uuid::new_v4(), created_at, updated_at, deleted }
    }

    #[test]
    fn initial_sync_drops_tombstones_and_categorizes_everything_as_created() {
        let t0 = Utc::now();
        let rows = vec![row(t0, t0, false), row(t0, t0, true)];
        let result = classify(rows, None, 10, |r: &Row| r.deleted, |r: &Row| r.created_at, |r: &Row| r.updated_at, |r: &Row| r.id);
        assert_eq!(result.created.len(), 1);
        assert!(result.updated.is_empty());
        assert!(result.deleted.is_empty());
        assert!(!result.has_more);
    }

    #[test]
    fn incremental_sync_splits_by_created_at_and_is_deleted() {
        let cursor = Utc::now();
        let later = cursor + chrono::Duration::seconds(1);
        let rows = vec![
            row(later, later, false),  // created after cursor -> Created
            row(cursor, later, false), // created at-or-before cursor, touched after -> Updated
            row(cursor, later, true),  // soft-deleted -> Deleted
        ];
        let result = classify(rows, Some(cursor), 10, |r: &Row| r.deleted, |r: &Row| r.created_at, |r: &Row| r.updated_at, |r: &Row| r.id);
        assert_eq!(result.created.len(), 1);
        assert_eq!(result.updated.len(), 1);
        assert_eq!(result.deleted.len(), 1);
    }

    #[test]
    fn cap_truncates_created_before_updated_before_deleted() {
        let cursor = Utc::now();
        let later = cursor + chrono::Duration::seconds(1);
        let rows = vec![
            row(later, later, false),
            row(later, later, false),
            row(cursor, later, false),
            row(cursor, later, true),
        ];
        let result = classify(rows, Some(cursor), 2, |r: &Row| r.deleted, |r: &Row| r.created_at, |r: &Row| r.updated_at, |r: &Row| r.id);
        assert_eq!(result.created.len(), 2);
        assert!(result.updated.is_empty());
        assert!(result.deleted.is_empty());
        assert!(result.has_more);
    }
}
