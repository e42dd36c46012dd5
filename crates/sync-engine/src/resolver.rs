//! # Conflict Resolver (C3)
//!
//! Applies a client's explicit resolution for a set of conflicts surfaced by
//! a prior push (spec §4.3). `KeepServer` is a no-op; `KeepClient`/`Merge`
//! both apply `Data` as an update guarded by a second `ExpectedVersion`
//! check — the client is expected to have re-read the server snapshot
//! returned with the original conflict before resolving. Block resolutions
//! additionally revalidate the parent note still exists and is not deleted,
//! since a resolve can race with a concurrent note deletion the same way a
//! push can.

use chrono::{DateTime, Utc};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use sync_core::{BlockContent, SyncEntity};
use sync_db::repository::{block, note, outbox as outbox_repo, task};
use sync_db::{Database, DbError};

use crate::error::EngineResult;
use crate::outbox as outbox_msg;
use crate::protocol::{
    ItemStatus, ResolveChoice, ResolveData, ResolveEntityType, ResolveItem, ResolveItemResult, ResolveRequest,
    ResolveResponse,
};

pub struct ConflictResolver;

impl ConflictResolver {
    pub async fn resolve(db: &Database, request: ResolveRequest, user_id: Uuid) -> EngineResult<ResolveResponse> {
        let now = Utc::now();
        let mut tx = db.begin().await?;

        let mut results = Vec::with_capacity(request.items.len());
        for item in &request.items {
            let result = match item.entity_type {
                ResolveEntityType::Task => resolve_task(&mut tx, user_id, now, item).await,
                ResolveEntityType::Note => resolve_note(&mut tx, user_id, now, item).await,
                ResolveEntityType::Block => resolve_block(&mut tx, user_id, now, item).await,
            };
            results.push(result);
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(ResolveResponse { results })
    }
}

fn kept_server_result(item: &ResolveItem, version: i64) -> ResolveItemResult {
    ResolveItemResult {
        entity_type: item.entity_type,
        entity_id: item.entity_id,
        status: ItemStatus::KeptServer,
        new_version: Some(version),
        errors: Vec::new(),
    }
}

fn updated_result(item: &ResolveItem, version: i64) -> ResolveItemResult {
    ResolveItemResult {
        entity_type: item.entity_type,
        entity_id: item.entity_id,
        status: ItemStatus::Updated,
        new_version: Some(version),
        errors: Vec::new(),
    }
}

fn not_found_result(item: &ResolveItem) -> ResolveItemResult {
    ResolveItemResult {
        entity_type: item.entity_type,
        entity_id: item.entity_id,
        status: ItemStatus::NotFound,
        new_version: None,
        errors: Vec::new(),
    }
}

fn conflict_result(item: &ResolveItem, server_version: i64) -> ResolveItemResult {
    ResolveItemResult {
        entity_type: item.entity_type,
        entity_id: item.entity_id,
        status: ItemStatus::Conflict,
        new_version: Some(server_version),
        errors: vec!["version mismatch".to_string()],
    }
}

fn failed_result(item: &ResolveItem, errors: Vec<String>) -> ResolveItemResult {
    ResolveItemResult {
        entity_type: item.entity_type,
        entity_id: item.entity_id,
        status: ItemStatus::Failed,
        new_version: None,
        errors,
    }
}

fn invalid_entity_type_result(item: &ResolveItem) -> ResolveItemResult {
    ResolveItemResult {
        entity_type: item.entity_type,
        entity_id: item.entity_id,
        status: ItemStatus::InvalidEntityType,
        new_version: None,
        errors: vec!["data shape does not match entity_type".to_string()],
    }
}

async fn resolve_task(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    now: DateTime<Utc>,
    item: &ResolveItem,
) -> ResolveItemResult {
    let mut current = match task::find_by_id(&mut *tx, item.entity_id).await {
        Ok(Some(t)) => t,
        Ok(None) => return not_found_result(item),
        Err(e) => return failed_result(item, vec![e.to_string()]),
    };

    // Collapsed with not-found so a mismatched owner can't be distinguished
    // from a nonexistent task (spec §3 invariant 5).
    if current.user_id != user_id {
        return not_found_result(item);
    }

    match item.choice {
        ResolveChoice::KeepServer => kept_server_result(item, current.version),
        ResolveChoice::KeepClient | ResolveChoice::Merge => {
            if current.is_deleted {
                return failed_result(item, vec!["task deleted on server".to_string()]);
            }
            if current.version != item.expected_version {
                return conflict_result(item, current.version);
            }

            let data = match &item.data {
                Some(ResolveData::Task(d)) => d,
                _ => return invalid_entity_type_result(item),
            };

            if let Err(e) = current.update(
                data.title.clone(),
                data.date,
                data.description.clone(),
                data.start_time,
                data.end_time,
                data.location.clone(),
                data.travel_time_minutes,
                now,
            ) {
                return failed_result(item, vec![e.to_string()]);
            }

            let expected_version = item.expected_version;
            if task::update(&mut *tx, &current, expected_version).await.is_err() {
                return conflict_result(item, current.version);
            }

            let msg = outbox_msg::task_message(&current, outbox_msg::UPDATED, None, now);
            if let Err(e) = outbox_repo::append(&mut *tx, &msg).await {
                tracing::warn!(error = %e, task_id = %current.id, "failed to append outbox message for Task.Updated (resolve)");
            }

            updated_result(item, current.version)
        }
    }
}

async fn resolve_note(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    now: DateTime<Utc>,
    item: &ResolveItem,
) -> ResolveItemResult {
    let mut current = match note::find_by_id(&mut *tx, item.entity_id).await {
        Ok(Some(n)) => n,
        Ok(None) => return not_found_result(item),
        Err(e) => return failed_result(item, vec![e.to_string()]),
    };

    if current.user_id != user_id {
        return not_found_result(item);
    }

    match item.choice {
        ResolveChoice::KeepServer => kept_server_result(item, current.version),
        ResolveChoice::KeepClient | ResolveChoice::Merge => {
            if current.is_deleted {
                return failed_result(item, vec!["note deleted on server".to_string()]);
            }
            if current.version != item.expected_version {
                return conflict_result(item, current.version);
            }

            let data = match &item.data {
                Some(ResolveData::Note(d)) => d,
                _ => return invalid_entity_type_result(item),
            };

            if let Err(e) = current.update(data.title.clone(), data.summary.clone(), data.tags.clone(), data.date, now) {
                return failed_result(item, vec![e.to_string()]);
            }

            let expected_version = item.expected_version;
            if note::update(&mut *tx, &current, expected_version).await.is_err() {
                return conflict_result(item, current.version);
            }

            let msg = outbox_msg::note_message(&current, outbox_msg::UPDATED, None, now);
            if let Err(e) = outbox_repo::append(&mut *tx, &msg).await {
                tracing::warn!(error = %e, note_id = %current.id, "failed to append outbox message for Note.Updated (resolve)");
            }

            updated_result(item, current.version)
        }
    }
}

async fn resolve_block(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    now: DateTime<Utc>,
    item: &ResolveItem,
) -> ResolveItemResult {
    let mut current = match block::find_by_id(&mut *tx, item.entity_id).await {
        Ok(Some(b)) => b,
        Ok(None) => return not_found_result(item),
        Err(e) => return failed_result(item, vec![e.to_string()]),
    };

    if current.user_id != user_id {
        return not_found_result(item);
    }

    match item.choice {
        ResolveChoice::KeepServer => kept_server_result(item, current.version),
        ResolveChoice::KeepClient | ResolveChoice::Merge => {
            if current.is_deleted {
                return failed_result(item, vec!["block deleted on server".to_string()]);
            }
            if current.version != item.expected_version {
                return conflict_result(item, current.version);
            }

            match note::find_by_id(&mut *tx, current.parent_id).await {
                Ok(Some(parent)) if !parent.is_deleted && parent.user_id == user_id => {}
                _ => return failed_result(item, vec!["parent note not found".to_string()]),
            }

            let data = match &item.data {
                Some(ResolveData::Block(d)) => d,
                _ => return invalid_entity_type_result(item),
            };

            if let Err(e) = sync_core::validation::validate_position(&data.position) {
                return failed_result(item, vec![e.to_string()]);
            }
            current.position = data.position.clone();
            if let Some(text) = &data.text_content {
                if let BlockContent::Text { text_content } = &mut current.content {
                    *text_content = text.clone();
                }
            }
            current.touch(now);

            let expected_version = item.expected_version;
            if block::update(&mut *tx, &current, expected_version).await.is_err() {
                return conflict_result(item, current.version);
            }

            let msg = outbox_msg::block_message(&current, outbox_msg::UPDATED, None, now);
            if let Err(e) = outbox_repo::append(&mut *tx, &msg).await {
                tracing::warn!(error = %e, block_id = %current.id, "failed to append outbox message for Block.Updated (resolve)");
            }

            updated_result(item, current.version)
        }
    }
}
