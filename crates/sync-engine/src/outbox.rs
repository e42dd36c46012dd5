//! # Outbox Message Construction
//!
//! Builds the [`OutboxMessage`] rows that push/resolve/upload append inside
//! their own transaction, alongside the entity mutation they describe (spec
//! §4.5, §3 invariant: "every accepted mutation produces exactly one outbox
//! row in the same transaction"). The process that later reads these rows
//! and forwards them downstream — the outbox *dispatcher* — is out of scope
//! (spec §1); this module only builds payloads, it never calls
//! `sync_db::repository::outbox::get_pending` or `mark_processed`.

use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use sync_core::{Asset, Block, Note, OutboxMessage, Task};

/// Message type suffixes used across entity kinds (spec §4.5: `{Entity}.Created`,
/// `{Entity}.Updated`, `{Entity}.Deleted`).
pub const CREATED: &str = "Created";
pub const UPDATED: &str = "Updated";
pub const DELETED: &str = "Deleted";

pub fn task_message(
    task: &Task,
    message_type: &str,
    origin_device_id: Option<Uuid>,
    now: DateTime<Utc>,
) -> OutboxMessage {
    OutboxMessage::new(
        task.id,
        "Task",
        format!("Task.{message_type}"),
        json!(task),
        task.user_id,
        origin_device_id,
        now,
    )
}

pub fn note_message(
    note: &Note,
    message_type: &str,
    origin_device_id: Option<Uuid>,
    now: DateTime<Utc>,
) -> OutboxMessage {
    OutboxMessage::new(
        note.id,
        "Note",
        format!("Note.{message_type}"),
        json!(note),
        note.user_id,
        origin_device_id,
        now,
    )
}

pub fn block_message(
    block: &Block,
    message_type: &str,
    origin_device_id: Option<Uuid>,
    now: DateTime<Utc>,
) -> OutboxMessage {
    OutboxMessage::new(
        block.id,
        "Block",
        format!("Block.{message_type}"),
        json!(block),
        block.user_id,
        origin_device_id,
        now,
    )
}

pub fn asset_message(
    asset: &Asset,
    message_type: &str,
    origin_device_id: Option<Uuid>,
    now: DateTime<Utc>,
) -> OutboxMessage {
    OutboxMessage::new(
        asset.id,
        "Asset",
        format!("Asset.{message_type}"),
        json!(asset),
        asset.user_id,
        origin_device_id,
        now,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_message_carries_aggregate_id_and_user_id() {
        let now = Utc::now();
        let user_id = Uuid::new_v4();
        let task = Task::create(
            user_id,
            chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            "Title".to_string(),
            None,
            None,
            None,
            None,
            None,
            now,
        )
        .unwrap();

        let msg = task_message(&task, CREATED, Some(Uuid::new_v4()), now);
        assert_eq!(msg.aggregate_id, task.id);
        assert_eq!(msg.aggregate_type, "Task");
        assert_eq!(msg.message_type, "Task.Created");
        assert_eq!(msg.user_id, user_id);
    }
}
