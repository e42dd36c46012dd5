//! # Push Engine (C1)
//!
//! Applies a batch of client-side mutations in one transaction (spec §4.1).
//! Processing order is fixed: `Task.Created → Task.Updated → Task.Deleted →
//! Note.Created → Note.Updated → Note.Deleted → Block.Created →
//! Block.Updated → Block.Deleted`. Blocks created in this push resolve their
//! parent against an in-memory `client_id → server_id` map built while
//! processing `Note.Created` earlier in the SAME push.
//!
//! Only the device gate can fail the whole request. Every other failure is
//! captured as a per-item [`ItemResult`] — the transaction still commits,
//! carrying whatever subset of items succeeded (spec §7, §8: "per-item
//! failures never abort the batch").

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use sync_core::{Block, BlockContent, Note, SyncEntity, Task};
use sync_db::repository::{block, note, outbox as outbox_repo, task};
use sync_db::Database;

use crate::device_gate::DeviceGate;
use crate::error::EngineResult;
use crate::outbox as outbox_msg;
use crate::protocol::{
    BlockBatch, BlockContentInput, BlockCreate, BlockUpdate, Conflict, ConflictType, EntityDelete,
    EntityResults, EntitySnapshot, ItemResult, NoteBatch, NoteCreate, NoteUpdate, PushRequest,
    PushResponse, TaskBatch, TaskCreate, TaskUpdate,
};

pub struct PushEngine;

impl PushEngine {
    pub async fn push(db: &Database, request: PushRequest, user_id: Uuid) -> EngineResult<PushResponse> {
        DeviceGate::authenticate(db.pool(), request.device_id, user_id).await?;

        let now = Utc::now();
        let origin = Some(request.device_id);
        let mut tx = db.begin().await?;

        let mut note_id_map: HashMap<Uuid, Uuid> = HashMap::new();

        let task_results = push_tasks(&mut tx, user_id, origin, now, &request.tasks).await;
        let note_results = push_notes(&mut tx, user_id, origin, now, &request.notes, &mut note_id_map).await;
        let block_results = push_blocks(&mut tx, user_id, origin, now, &request.blocks, &note_id_map).await;

        tx.commit()
            .await
            .map_err(|e| sync_db::DbError::TransactionFailed(e.to_string()))?;

        Ok(PushResponse {
            tasks: EntityResults { results: task_results },
            notes: EntityResults { results: note_results },
            blocks: EntityResults { results: block_results },
        })
    }
}

// =============================================================================
// Conflict builders
// =============================================================================

fn validation_conflict() -> Conflict {
    Conflict {
        conflict_type: ConflictType::ValidationFailed,
        client_version: None,
        server_version: None,
        server_snapshot: None,
    }
}

fn not_found_conflict() -> Conflict {
    Conflict {
        conflict_type: ConflictType::NotFound,
        client_version: None,
        server_version: None,
        server_snapshot: None,
    }
}

fn parent_not_found_conflict() -> Conflict {
    Conflict {
        conflict_type: ConflictType::ParentNotFound,
        client_version: None,
        server_version: None,
        server_snapshot: None,
    }
}

fn deleted_on_server_conflict(server_version: i64, snapshot: EntitySnapshot) -> Conflict {
    Conflict {
        conflict_type: ConflictType::DeletedOnServer,
        client_version: None,
        server_version: Some(server_version),
        server_snapshot: Some(snapshot),
    }
}

fn version_mismatch_conflict(client_version: i64, server_version: i64, snapshot: EntitySnapshot) -> Conflict {
    Conflict {
        conflict_type: ConflictType::VersionMismatch,
        client_version: Some(client_version),
        server_version: Some(server_version),
        server_snapshot: Some(snapshot),
    }
}

fn outbox_failed_conflict() -> Conflict {
    Conflict {
        conflict_type: ConflictType::OutboxFailed,
        client_version: None,
        server_version: None,
        server_snapshot: None,
    }
}

// =============================================================================
// Tasks
// =============================================================================

async fn push_tasks(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    origin: Option<Uuid>,
    now: DateTime<Utc>,
    batch: &TaskBatch,
) -> Vec<ItemResult> {
    let mut results = Vec::with_capacity(batch.created.len() + batch.updated.len() + batch.deleted.len());

    for item in &batch.created {
        results.push(create_task(tx, user_id, origin, now, item).await);
    }
    for item in &batch.updated {
        results.push(update_task(tx, user_id, origin, now, item).await);
    }
    for item in &batch.deleted {
        results.push(delete_task(tx, user_id, origin, now, item).await);
    }

    results
}

async fn create_task(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    origin: Option<Uuid>,
    now: DateTime<Utc>,
    item: &TaskCreate,
) -> ItemResult {
    let new_task = match Task::create(
        user_id,
        item.data.date,
        item.data.title.clone(),
        item.data.description.clone(),
        item.data.start_time,
        item.data.end_time,
        item.data.location.clone(),
        item.data.travel_time_minutes,
        now,
    ) {
        Ok(t) => t,
        Err(e) => return ItemResult::failed(Some(item.client_id), validation_conflict(), vec![e.to_string()]),
    };

    if let Err(e) = task::insert(&mut *tx, &new_task).await {
        return ItemResult::failed(Some(item.client_id), validation_conflict(), vec![e.to_string()]);
    }

    let msg = outbox_msg::task_message(&new_task, outbox_msg::CREATED, origin, now);
    if let Err(e) = outbox_repo::append(&mut *tx, &msg).await {
        tracing::warn!(error = %e, task_id = %new_task.id, "failed to append outbox message for Task.Created");
    }

    ItemResult::created(item.client_id, new_task.id, new_task.version)
}

async fn update_task(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    origin: Option<Uuid>,
    now: DateTime<Utc>,
    item: &TaskUpdate,
) -> ItemResult {
    let mut current = match task::find_by_id(&mut *tx, item.id).await {
        Ok(Some(t)) => t,
        Ok(None) => return ItemResult::failed(None, not_found_conflict(), vec!["task not found".to_string()]),
        Err(e) => return ItemResult::failed(None, not_found_conflict(), vec![e.to_string()]),
    };

    // Collapsed with not-found so a mismatched owner can't be distinguished
    // from a nonexistent task (spec §3 invariant 5).
    if current.user_id != user_id {
        return ItemResult::failed(None, not_found_conflict(), vec!["task not found".to_string()]);
    }

    if current.is_deleted {
        let version = current.version;
        return ItemResult::failed(
            None,
            deleted_on_server_conflict(version, EntitySnapshot::Task(current)),
            vec!["task deleted on server".to_string()],
        );
    }

    if current.version != item.expected_version {
        let version = current.version;
        return ItemResult::failed(
            None,
            version_mismatch_conflict(item.expected_version, version, EntitySnapshot::Task(current)),
            vec!["version mismatch".to_string()],
        );
    }

    if let Err(e) = current.update(
        item.data.title.clone(),
        item.data.date,
        item.data.description.clone(),
        item.data.start_time,
        item.data.end_time,
        item.data.location.clone(),
        item.data.travel_time_minutes,
        now,
    ) {
        return ItemResult::failed(None, validation_conflict(), vec![e.to_string()]);
    }

    let expected_version = item.expected_version;
    if let Err(e) = task::update(&mut *tx, &current, expected_version).await {
        let version = current.version;
        return ItemResult::failed(
            None,
            version_mismatch_conflict(expected_version, version, EntitySnapshot::Task(current)),
            vec![e.to_string()],
        );
    }

    let msg = outbox_msg::task_message(&current, outbox_msg::UPDATED, origin, now);
    if let Err(e) = outbox_repo::append(&mut *tx, &msg).await {
        tracing::warn!(error = %e, task_id = %current.id, "failed to append outbox message for Task.Updated");
    }

    ItemResult::updated(current.id, current.version)
}

async fn delete_task(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    origin: Option<Uuid>,
    now: DateTime<Utc>,
    item: &EntityDelete,
) -> ItemResult {
    let mut current = match task::find_by_id(&mut *tx, item.id).await {
        Ok(Some(t)) => t,
        Ok(None) => return ItemResult::not_found(item.id),
        Err(e) => return ItemResult::failed(None, not_found_conflict(), vec![e.to_string()]),
    };

    if current.user_id != user_id {
        return ItemResult::not_found(item.id);
    }

    if current.is_deleted {
        return ItemResult::already_deleted(current.id);
    }

    let expected_version = current.version;
    if let Err(e) = current.soft_delete(now) {
        return ItemResult::failed(None, validation_conflict(), vec![e.to_string()]);
    }

    if let Err(e) = task::update(&mut *tx, &current, expected_version).await {
        let version = current.version;
        return ItemResult::failed(
            None,
            version_mismatch_conflict(expected_version, version, EntitySnapshot::Task(current)),
            vec![e.to_string()],
        );
    }

    let msg = outbox_msg::task_message(&current, outbox_msg::DELETED, origin, now);
    if let Err(e) = outbox_repo::append(&mut *tx, &msg).await {
        tracing::warn!(error = %e, task_id = %current.id, "failed to append outbox message for Task.Deleted");
        return ItemResult::failed(None, outbox_failed_conflict(), vec![e.to_string()]);
    }

    ItemResult::deleted(current.id)
}

// =============================================================================
// Notes
// =============================================================================

async fn push_notes(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    origin: Option<Uuid>,
    now: DateTime<Utc>,
    batch: &NoteBatch,
    id_map: &mut HashMap<Uuid, Uuid>,
) -> Vec<ItemResult> {
    let mut results = Vec::with_capacity(batch.created.len() + batch.updated.len() + batch.deleted.len());

    for item in &batch.created {
        results.push(create_note(tx, user_id, origin, now, item, id_map).await);
    }
    for item in &batch.updated {
        results.push(update_note(tx, user_id, origin, now, item).await);
    }
    for item in &batch.deleted {
        results.push(delete_note(tx, user_id, origin, now, item).await);
    }

    results
}

async fn create_note(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    origin: Option<Uuid>,
    now: DateTime<Utc>,
    item: &NoteCreate,
    id_map: &mut HashMap<Uuid, Uuid>,
) -> ItemResult {
    let new_note = match Note::create(
        user_id,
        item.data.date,
        item.data.title.clone(),
        item.data.summary.clone(),
        item.data.tags.clone(),
        now,
    ) {
        Ok(n) => n,
        Err(e) => return ItemResult::failed(Some(item.client_id), validation_conflict(), vec![e.to_string()]),
    };

    if let Err(e) = note::insert(&mut *tx, &new_note).await {
        return ItemResult::failed(Some(item.client_id), validation_conflict(), vec![e.to_string()]);
    }

    id_map.insert(item.client_id, new_note.id);

    let msg = outbox_msg::note_message(&new_note, outbox_msg::CREATED, origin, now);
    if let Err(e) = outbox_repo::append(&mut *tx, &msg).await {
        tracing::warn!(error = %e, note_id = %new_note.id, "failed to append outbox message for Note.Created");
    }

    ItemResult::created(item.client_id, new_note.id, new_note.version)
}

async fn update_note(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    origin: Option<Uuid>,
    now: DateTime<Utc>,
    item: &NoteUpdate,
) -> ItemResult {
    let mut current = match note::find_by_id(&mut *tx, item.id).await {
        Ok(Some(n)) => n,
        Ok(None) => return ItemResult::failed(None, not_found_conflict(), vec!["note not found".to_string()]),
        Err(e) => return ItemResult::failed(None, not_found_conflict(), vec![e.to_string()]),
    };

    if current.user_id != user_id {
        return ItemResult::failed(None, not_found_conflict(), vec!["note not found".to_string()]);
    }

    if current.is_deleted {
        let version = current.version;
        return ItemResult::failed(
            None,
            deleted_on_server_conflict(version, EntitySnapshot::Note(current)),
            vec!["note deleted on server".to_string()],
        );
    }

    if current.version != item.expected_version {
        let version = current.version;
        return ItemResult::failed(
            None,
            version_mismatch_conflict(item.expected_version, version, EntitySnapshot::Note(current)),
            vec!["version mismatch".to_string()],
        );
    }

    if let Err(e) = current.update(
        item.data.title.clone(),
        item.data.summary.clone(),
        item.data.tags.clone(),
        item.data.date,
        now,
    ) {
        return ItemResult::failed(None, validation_conflict(), vec![e.to_string()]);
    }

    let expected_version = item.expected_version;
    if let Err(e) = note::update(&mut *tx, &current, expected_version).await {
        let version = current.version;
        return ItemResult::failed(
            None,
            version_mismatch_conflict(expected_version, version, EntitySnapshot::Note(current)),
            vec![e.to_string()],
        );
    }

    let msg = outbox_msg::note_message(&current, outbox_msg::UPDATED, origin, now);
    if let Err(e) = outbox_repo::append(&mut *tx, &msg).await {
        tracing::warn!(error = %e, note_id = %current.id, "failed to append outbox message for Note.Updated");
    }

    ItemResult::updated(current.id, current.version)
}

async fn delete_note(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    origin: Option<Uuid>,
    now: DateTime<Utc>,
    item: &EntityDelete,
) -> ItemResult {
    let mut current = match note::find_by_id(&mut *tx, item.id).await {
        Ok(Some(n)) => n,
        Ok(None) => return ItemResult::not_found(item.id),
        Err(e) => return ItemResult::failed(None, not_found_conflict(), vec![e.to_string()]),
    };

    if current.user_id != user_id {
        return ItemResult::not_found(item.id);
    }

    if current.is_deleted {
        return ItemResult::already_deleted(current.id);
    }

    let expected_version = current.version;
    if let Err(e) = current.soft_delete(now) {
        return ItemResult::failed(None, validation_conflict(), vec![e.to_string()]);
    }

    if let Err(e) = note::update(&mut *tx, &current, expected_version).await {
        let version = current.version;
        return ItemResult::failed(
            None,
            version_mismatch_conflict(expected_version, version, EntitySnapshot::Note(current)),
            vec![e.to_string()],
        );
    }

    let msg = outbox_msg::note_message(&current, outbox_msg::DELETED, origin, now);
    if let Err(e) = outbox_repo::append(&mut *tx, &msg).await {
        tracing::warn!(error = %e, note_id = %current.id, "failed to append outbox message for Note.Deleted");
        return ItemResult::failed(None, outbox_failed_conflict(), vec![e.to_string()]);
    }

    ItemResult::deleted(current.id)
}

// =============================================================================
// Blocks
// =============================================================================

async fn push_blocks(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    origin: Option<Uuid>,
    now: DateTime<Utc>,
    batch: &BlockBatch,
    note_id_map: &HashMap<Uuid, Uuid>,
) -> Vec<ItemResult> {
    let mut results = Vec::with_capacity(batch.created.len() + batch.updated.len() + batch.deleted.len());

    for item in &batch.created {
        results.push(create_block(tx, user_id, origin, now, item, note_id_map).await);
    }
    for item in &batch.updated {
        results.push(update_block(tx, user_id, origin, now, item).await);
    }
    for item in &batch.deleted {
        results.push(delete_block(tx, user_id, origin, now, item).await);
    }

    results
}

/// Resolves `ParentId` (if set) else `ParentClientId` against the map built
/// from `Note.Created` items processed earlier in this same push, then
/// confirms the parent note still exists, is not soft-deleted, and is owned
/// by the caller (spec §3 invariants 5 and 6).
async fn resolve_block_parent(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    item: &BlockCreate,
    note_id_map: &HashMap<Uuid, Uuid>,
) -> Result<Uuid, ()> {
    let parent_id = match item.parent_id {
        Some(id) => id,
        None => match item.parent_client_id.and_then(|cid| note_id_map.get(&cid).copied()) {
            Some(id) => id,
            None => return Err(()),
        },
    };

    match note::find_by_id(&mut *tx, parent_id).await {
        Ok(Some(parent)) if !parent.is_deleted && parent.user_id == user_id => Ok(parent_id),
        _ => Err(()),
    }
}

async fn create_block(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    origin: Option<Uuid>,
    now: DateTime<Utc>,
    item: &BlockCreate,
    note_id_map: &HashMap<Uuid, Uuid>,
) -> ItemResult {
    let parent_id = match resolve_block_parent(tx, user_id, item, note_id_map).await {
        Ok(id) => id,
        Err(()) => {
            return ItemResult::failed(
                Some(item.client_id),
                parent_not_found_conflict(),
                vec!["parent note not found".to_string()],
            )
        }
    };

    let built = match &item.content {
        BlockContentInput::Text { text_content } => Block::create_text_block(
            user_id,
            parent_id,
            item.parent_type,
            item.block_type,
            item.position.clone(),
            text_content.clone(),
            now,
        ),
        BlockContentInput::Asset {
            asset_client_id,
            asset_file_name,
            asset_content_type,
            asset_size_bytes,
        } => Block::create_asset_block(
            user_id,
            parent_id,
            item.parent_type,
            item.block_type,
            item.position.clone(),
            asset_client_id.clone(),
            asset_file_name.clone(),
            asset_content_type.clone(),
            *asset_size_bytes,
            now,
        ),
    };

    let new_block = match built {
        Ok(b) => b,
        Err(e) => return ItemResult::failed(Some(item.client_id), validation_conflict(), vec![e.to_string()]),
    };

    if let Err(e) = block::insert(&mut *tx, &new_block).await {
        return ItemResult::failed(Some(item.client_id), validation_conflict(), vec![e.to_string()]);
    }

    let msg = outbox_msg::block_message(&new_block, outbox_msg::CREATED, origin, now);
    if let Err(e) = outbox_repo::append(&mut *tx, &msg).await {
        tracing::warn!(error = %e, block_id = %new_block.id, "failed to append outbox message for Block.Created");
    }

    ItemResult::created(item.client_id, new_block.id, new_block.version)
}

async fn update_block(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    origin: Option<Uuid>,
    now: DateTime<Utc>,
    item: &BlockUpdate,
) -> ItemResult {
    let mut current = match block::find_by_id(&mut *tx, item.id).await {
        Ok(Some(b)) => b,
        Ok(None) => return ItemResult::failed(None, not_found_conflict(), vec!["block not found".to_string()]),
        Err(e) => return ItemResult::failed(None, not_found_conflict(), vec![e.to_string()]),
    };

    if current.user_id != user_id {
        return ItemResult::failed(None, not_found_conflict(), vec!["block not found".to_string()]);
    }

    if current.is_deleted {
        let version = current.version;
        return ItemResult::failed(
            None,
            deleted_on_server_conflict(version, EntitySnapshot::Block(current)),
            vec!["block deleted on server".to_string()],
        );
    }

    if current.version != item.expected_version {
        let version = current.version;
        return ItemResult::failed(
            None,
            version_mismatch_conflict(item.expected_version, version, EntitySnapshot::Block(current)),
            vec!["version mismatch".to_string()],
        );
    }

    if let Err(e) = current.guard_mutable() {
        return ItemResult::failed(None, validation_conflict(), vec![e.to_string()]);
    }
    if let Err(e) = sync_core::validation::validate_position(&item.position) {
        return ItemResult::failed(None, validation_conflict(), vec![e.to_string()]);
    }
    current.position = item.position.clone();

    if let Some(text) = &item.text_content {
        if let BlockContent::Text { text_content } = &mut current.content {
            *text_content = text.clone();
        }
    }

    // A single wire Block.Update carries position and (optionally) text in
    // one mutation, so `touch` runs exactly once regardless of how many
    // fields changed (spec §8: version increments by exactly 1 per mutation).
    current.touch(now);

    let expected_version = item.expected_version;
    if let Err(e) = block::update(&mut *tx, &current, expected_version).await {
        let version = current.version;
        return ItemResult::failed(
            None,
            version_mismatch_conflict(expected_version, version, EntitySnapshot::Block(current)),
            vec![e.to_string()],
        );
    }

    let msg = outbox_msg::block_message(&current, outbox_msg::UPDATED, origin, now);
    if let Err(e) = outbox_repo::append(&mut *tx, &msg).await {
        tracing::warn!(error = %e, block_id = %current.id, "failed to append outbox message for Block.Updated");
    }

    ItemResult::updated(current.id, current.version)
}

async fn delete_block(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    origin: Option<Uuid>,
    now: DateTime<Utc>,
    item: &EntityDelete,
) -> ItemResult {
    let mut current = match block::find_by_id(&mut *tx, item.id).await {
        Ok(Some(b)) => b,
        Ok(None) => return ItemResult::not_found(item.id),
        Err(e) => return ItemResult::failed(None, not_found_conflict(), vec![e.to_string()]),
    };

    if current.user_id != user_id {
        return ItemResult::not_found(item.id);
    }

    if current.is_deleted {
        return ItemResult::already_deleted(current.id);
    }

    let expected_version = current.version;
    if let Err(e) = current.soft_delete(now) {
        return ItemResult::failed(None, validation_conflict(), vec![e.to_string()]);
    }

    if let Err(e) = block::update(&mut *tx, &current, expected_version).await {
        let version = current.version;
        return ItemResult::failed(
            None,
            version_mismatch_conflict(expected_version, version, EntitySnapshot::Block(current)),
            vec![e.to_string()],
        );
    }

    let msg = outbox_msg::block_message(&current, outbox_msg::DELETED, origin, now);
    if let Err(e) = outbox_repo::append(&mut *tx, &msg).await {
        tracing::warn!(error = %e, block_id = %current.id, "failed to append outbox message for Block.Deleted");
        return ItemResult::failed(None, outbox_failed_conflict(), vec![e.to_string()]);
    }

    ItemResult::deleted(current.id)
}
