//! # Domain Types
//!
//! The six entity kinds that make up the sync core's data model (spec §3):
//! Task, Note, Block, Asset, UserDevice, OutboxMessage.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Task       │   │      Note       │   │      Block      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  date, title    │   │  date, title    │   │  parent_id      │       │
//! │  │  start/end      │   │  summary, tags  │   │  position       │       │
//! │  │  reminder       │   │                 │   │  Text | Asset   │       │
//! │  └─────────────────┘   └────────┬────────┘   └────────┬────────┘       │
//! │                                 │   1 Note : N Blocks  │                │
//! │                                 └──────────────────────┘                │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │      Asset      │   │   UserDevice    │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  block_id (1:1) │   │  device_token   │                             │
//! │  │  blob_path      │   │  is_active      │                             │
//! │  │  no Version     │   │                 │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants enforced here (spec §3)
//! 1. `version >= 1`, incremented by exactly 1 on every accepted mutation.
//! 2. `updated_at_utc` set on every mutation, never decreases.
//! 3. Soft-delete is terminal: every mutation other than soft-delete is
//!    rejected once `is_deleted == true`.
//! 6. A Block's parent existing/non-deleted is checked by the caller
//!    (repository lookup) before `Block::create_*` runs; these constructors
//!    only validate the *shape* of the reference, not its liveness.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::validation::{
    validate_asset_identity, validate_position, validate_time_range, validate_title,
};

// =============================================================================
// Shared entity behavior
// =============================================================================

/// Common behavior for entities carrying the `version`/`is_deleted` pair.
///
/// Centralizes invariants 1–3 so no call site can increment `version` by
/// more than one or forget to bump `updated_at_utc`. `Asset` does not
/// implement this trait — it has no `Version` (spec §3: "modified" means
/// created or soft-deleted).
pub trait SyncEntity {
    fn id(&self) -> Uuid;
    fn is_deleted(&self) -> bool;
    fn version(&self) -> i64;
    fn set_version(&mut self, version: i64);
    fn set_updated_at(&mut self, now: DateTime<Utc>);

    /// Rejects the mutation if the entity is already soft-deleted.
    fn guard_mutable(&self) -> CoreResult<()> {
        if self.is_deleted() {
            return Err(CoreError::EntityDeleted { id: self.id() });
        }
        Ok(())
    }

    /// Applies the `updated_at_utc`/`version` bump common to every
    /// accepted mutation, including soft-delete.
    fn touch(&mut self, now: DateTime<Utc>) {
        self.set_updated_at(now);
        self.set_version(self.version() + 1);
    }
}

macro_rules! impl_sync_entity {
    ($ty:ty) => {
        impl SyncEntity for $ty {
            fn id(&self) -> Uuid {
                self.id
            }
            fn is_deleted(&self) -> bool {
                self.is_deleted
            }
            fn version(&self) -> i64 {
                self.version
            }
            fn set_version(&mut self, version: i64) {
                self.version = version;
            }
            fn set_updated_at(&mut self, now: DateTime<Utc>) {
                self.updated_at_utc = now;
            }
        }
    };
}

// =============================================================================
// Task
// =============================================================================

/// A time-anchored to-do (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub title: String,
    pub description: Option<String>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub travel_time_minutes: Option<i32>,
    pub reminder_at_utc: Option<DateTime<Utc>>,
    pub reminder_acknowledged_at_utc: Option<DateTime<Utc>>,
    pub is_completed: bool,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: DateTime<Utc>,
    pub is_deleted: bool,
    pub version: i64,
}

impl_sync_entity!(Task);

#[allow(clippy::too_many_arguments)]
impl Task {
    pub fn create(
        user_id: Uuid,
        date: NaiveDate,
        title: String,
        description: Option<String>,
        start_time: Option<NaiveTime>,
        end_time: Option<NaiveTime>,
        location: Option<String>,
        travel_time_minutes: Option<i32>,
        now: DateTime<Utc>,
    ) -> CoreResult<Self> {
        validate_title(&title)?;
        validate_time_range(start_time, end_time)?;

        Ok(Task {
            id: Uuid::new_v4(),
            user_id,
            date,
            title,
            description,
            start_time,
            end_time,
            location,
            travel_time_minutes,
            reminder_at_utc: None,
            reminder_acknowledged_at_utc: None,
            is_completed: false,
            created_at_utc: now,
            updated_at_utc: now,
            is_deleted: false,
            version: 1,
        })
    }

    /// Overwrites the mutable attribute surface. Per DESIGN.md's resolution
    /// of Open Question 2, `description: None` clears the field — there is
    /// no separate "no change" sentinel.
    pub fn update(
        &mut self,
        title: String,
        date: NaiveDate,
        description: Option<String>,
        start_time: Option<NaiveTime>,
        end_time: Option<NaiveTime>,
        location: Option<String>,
        travel_time_minutes: Option<i32>,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        self.guard_mutable()?;
        validate_title(&title)?;
        validate_time_range(start_time, end_time)?;

        self.title = title;
        self.date = date;
        self.description = description;
        self.start_time = start_time;
        self.end_time = end_time;
        self.location = location;
        self.travel_time_minutes = travel_time_minutes;
        self.touch(now);
        Ok(())
    }

    /// Sets or clears the reminder. Per Open Question 3, `at = None` clears
    /// an existing reminder rather than leaving it untouched.
    pub fn set_reminder(&mut self, at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> CoreResult<()> {
        self.guard_mutable()?;
        self.reminder_at_utc = at;
        if at.is_none() {
            self.reminder_acknowledged_at_utc = None;
        }
        self.touch(now);
        Ok(())
    }

    pub fn acknowledge_reminder(&mut self, at: DateTime<Utc>, now: DateTime<Utc>) -> CoreResult<()> {
        self.guard_mutable()?;
        self.reminder_acknowledged_at_utc = Some(at);
        self.touch(now);
        Ok(())
    }

    pub fn mark_completed(&mut self, now: DateTime<Utc>) -> CoreResult<()> {
        self.guard_mutable()?;
        self.is_completed = true;
        self.touch(now);
        Ok(())
    }

    pub fn soft_delete(&mut self, now: DateTime<Utc>) -> CoreResult<()> {
        self.guard_mutable()?;
        self.is_deleted = true;
        self.touch(now);
        Ok(())
    }
}

// =============================================================================
// Note
// =============================================================================

/// A dated text record whose body is a sequence of [`Block`]s.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub title: String,
    pub summary: Option<String>,
    pub tags: Option<Vec<String>>,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: DateTime<Utc>,
    pub is_deleted: bool,
    pub version: i64,
}

impl_sync_entity!(Note);

impl Note {
    pub fn create(
        user_id: Uuid,
        date: NaiveDate,
        title: String,
        summary: Option<String>,
        tags: Option<Vec<String>>,
        now: DateTime<Utc>,
    ) -> CoreResult<Self> {
        validate_title(&title)?;

        Ok(Note {
            id: Uuid::new_v4(),
            user_id,
            date,
            title,
            summary,
            tags,
            created_at_utc: now,
            updated_at_utc: now,
            is_deleted: false,
            version: 1,
        })
    }

    pub fn update(
        &mut self,
        title: String,
        summary: Option<String>,
        tags: Option<Vec<String>>,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        self.guard_mutable()?;
        validate_title(&title)?;

        self.title = title;
        self.summary = summary;
        self.tags = tags;
        self.date = date;
        self.touch(now);
        Ok(())
    }

    pub fn soft_delete(&mut self, now: DateTime<Utc>) -> CoreResult<()> {
        self.guard_mutable()?;
        self.is_deleted = true;
        self.touch(now);
        Ok(())
    }
}

// =============================================================================
// Block
// =============================================================================

/// The only currently-supported parent kind for a Block is `Note`. `Task`
/// is reserved in the wire enum (a future revision may lift the
/// restriction) but rejected here — see DESIGN.md Open Question 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockParentType {
    Note,
    Task,
}

/// The rendered kind of a block. `Image`/`File` are asset-backed; every
/// other variant carries a text payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Paragraph,
    Heading,
    BulletList,
    NumberedList,
    Quote,
    Code,
    Image,
    File,
}

impl BlockType {
    /// `true` for block types whose content is asset metadata rather than
    /// inline text (spec §3).
    pub const fn is_asset_type(self) -> bool {
        matches!(self, BlockType::Image | BlockType::File)
    }
}

/// State machine for an asset-backed Block (spec §4.4).
///
/// ```text
///      created (asset type)
///            │
///            ▼
///        Pending ──────────────► Uploaded   (orchestrator commit succeeds)
///            │
///            └──────────────────► Failed    (blob PUT fails; terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    Pending,
    Uploaded,
    Failed,
}

/// A Block's payload: either inline text, or asset metadata pending/after
/// upload. Mutually exclusive by construction — a block is never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockContent {
    Text {
        text_content: String,
    },
    Asset {
        asset_client_id: String,
        asset_file_name: String,
        asset_content_type: Option<String>,
        asset_size_bytes: i64,
        asset_id: Option<Uuid>,
        upload_status: UploadStatus,
    },
}

/// An ordered content element belonging to a Note.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Block {
    pub id: Uuid,
    pub user_id: Uuid,
    pub parent_id: Uuid,
    pub parent_type: BlockParentType,
    pub block_type: BlockType,
    /// Opaque lexicographic fractional-index string; never reinterpreted.
    pub position: String,
    pub content: BlockContent,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: DateTime<Utc>,
    pub is_deleted: bool,
    pub version: i64,
}

impl_sync_entity!(Block);

fn guard_note_parent(parent_type: BlockParentType) -> CoreResult<()> {
    match parent_type {
        BlockParentType::Note => Ok(()),
        BlockParentType::Task => Err(CoreError::UnsupportedParentType("Task".to_string())),
    }
}

#[allow(clippy::too_many_arguments)]
impl Block {
    pub fn create_text_block(
        user_id: Uuid,
        parent_id: Uuid,
        parent_type: BlockParentType,
        block_type: BlockType,
        position: String,
        text_content: String,
        now: DateTime<Utc>,
    ) -> CoreResult<Self> {
        guard_note_parent(parent_type)?;
        validate_position(&position)?;

        Ok(Block {
            id: Uuid::new_v4(),
            user_id,
            parent_id,
            parent_type,
            block_type,
            position,
            content: BlockContent::Text { text_content },
            created_at_utc: now,
            updated_at_utc: now,
            is_deleted: false,
            version: 1,
        })
    }

    pub fn create_asset_block(
        user_id: Uuid,
        parent_id: Uuid,
        parent_type: BlockParentType,
        block_type: BlockType,
        position: String,
        asset_client_id: String,
        asset_file_name: String,
        asset_content_type: Option<String>,
        asset_size_bytes: i64,
        now: DateTime<Utc>,
    ) -> CoreResult<Self> {
        guard_note_parent(parent_type)?;
        validate_position(&position)?;
        validate_asset_identity(&asset_client_id, &asset_file_name, asset_size_bytes)?;

        Ok(Block {
            id: Uuid::new_v4(),
            user_id,
            parent_id,
            parent_type,
            block_type,
            position,
            content: BlockContent::Asset {
                asset_client_id,
                asset_file_name,
                asset_content_type,
                asset_size_bytes,
                asset_id: None,
                upload_status: UploadStatus::Pending,
            },
            created_at_utc: now,
            updated_at_utc: now,
            is_deleted: false,
            version: 1,
        })
    }

    pub fn update_position(&mut self, position: String, now: DateTime<Utc>) -> CoreResult<()> {
        self.guard_mutable()?;
        validate_position(&position)?;
        self.position = position;
        self.touch(now);
        Ok(())
    }

    pub fn update_text_content(&mut self, text_content: String, now: DateTime<Utc>) -> CoreResult<()> {
        self.guard_mutable()?;
        match &mut self.content {
            BlockContent::Text { text_content: existing } => {
                *existing = text_content;
            }
            BlockContent::Asset { .. } => {
                return Err(ValidationError::NotAllowed {
                    field: "block_type".to_string(),
                    allowed: vec!["text".to_string()],
                }
                .into());
            }
        }
        self.touch(now);
        Ok(())
    }

    /// Transitions `Pending → Failed` when the blob PUT fails (spec §4.4
    /// phase 3). Terminal: a `Failed` block is never retried through this
    /// endpoint.
    pub fn set_upload_failed(&mut self, now: DateTime<Utc>) -> CoreResult<()> {
        self.guard_mutable()?;
        self.transition_upload_status(UploadStatus::Failed, None, now)
    }

    /// Atomically sets `asset_id` and transitions `Pending → Uploaded`
    /// (spec §4.4 phase 4, `Block.SetAssetUploaded`).
    pub fn set_asset_uploaded(&mut self, asset_id: Uuid, now: DateTime<Utc>) -> CoreResult<()> {
        self.guard_mutable()?;
        self.transition_upload_status(UploadStatus::Uploaded, Some(asset_id), now)
    }

    fn transition_upload_status(
        &mut self,
        next: UploadStatus,
        asset_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> CoreResult<()> {
        match &mut self.content {
            BlockContent::Asset {
                upload_status,
                asset_id: slot,
                ..
            } => {
                if *upload_status != UploadStatus::Pending {
                    return Err(CoreError::InvalidUploadStatus {
                        block_id: self.id,
                        status: format!("{:?}", upload_status),
                        expected: "Pending".to_string(),
                    });
                }
                *upload_status = next;
                if let Some(id) = asset_id {
                    *slot = Some(id);
                }
            }
            BlockContent::Text { .. } => {
                return Err(CoreError::InvalidUploadStatus {
                    block_id: self.id,
                    status: "n/a (text block)".to_string(),
                    expected: "Pending".to_string(),
                });
            }
        }
        self.touch(now);
        Ok(())
    }

    /// `true` once an Asset exists for this Block's `asset_client_id` —
    /// the idempotent-retry short-circuit in the upload orchestrator reads
    /// this before doing any I/O.
    pub fn has_uploaded_asset(&self) -> bool {
        matches!(
            &self.content,
            BlockContent::Asset {
                asset_id: Some(_),
                ..
            }
        )
    }

    pub fn soft_delete(&mut self, now: DateTime<Utc>) -> CoreResult<()> {
        self.guard_mutable()?;
        self.is_deleted = true;
        self.touch(now);
        Ok(())
    }
}

// =============================================================================
// Asset
// =============================================================================

/// An immutable descriptor of a stored binary, 1:1 with its owning Block.
///
/// Assets have no `Version` (spec §3): "modified" means created or
/// soft-deleted, nothing in between — the descriptor never changes once
/// written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Asset {
    pub id: Uuid,
    pub user_id: Uuid,
    pub block_id: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub blob_path: String,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: DateTime<Utc>,
    pub is_deleted: bool,
}

impl Asset {
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        user_id: Uuid,
        block_id: Uuid,
        file_name: String,
        content_type: String,
        size_bytes: i64,
        blob_path: String,
        now: DateTime<Utc>,
    ) -> CoreResult<Self> {
        if file_name.is_empty() {
            return Err(CoreError::Validation(ValidationError::Required {
                field: "file_name".to_string(),
            }));
        }
        if size_bytes <= 0 {
            return Err(CoreError::Validation(ValidationError::MustBePositive {
                field: "size_bytes".to_string(),
            }));
        }

        Ok(Asset {
            id: Uuid::new_v4(),
            user_id,
            block_id,
            file_name,
            content_type,
            size_bytes,
            blob_path,
            created_at_utc: now,
            updated_at_utc: now,
            is_deleted: false,
        })
    }

    pub fn soft_delete(&mut self, now: DateTime<Utc>) -> CoreResult<()> {
        if self.is_deleted {
            return Err(CoreError::EntityDeleted { id: self.id });
        }
        self.is_deleted = true;
        self.updated_at_utc = now;
        Ok(())
    }
}

// =============================================================================
// UserDevice
// =============================================================================

/// Identifies a replica. A device is a valid sync principal only if it
/// exists, belongs to the requesting user, `is_active`, and is not
/// soft-deleted (spec §3 invariant 7) — see `DeviceGate` in `sync-engine`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserDevice {
    pub id: Uuid,
    pub user_id: Uuid,
    pub device_token: String,
    pub platform: String,
    pub display_name: String,
    pub is_active: bool,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: DateTime<Utc>,
    pub is_deleted: bool,
    pub version: i64,
}

impl_sync_entity!(UserDevice);

impl UserDevice {
    pub fn create(
        user_id: Uuid,
        device_token: String,
        platform: String,
        display_name: String,
        now: DateTime<Utc>,
    ) -> CoreResult<Self> {
        if device_token.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "device_token".to_string(),
            }
            .into());
        }

        Ok(UserDevice {
            id: Uuid::new_v4(),
            user_id,
            device_token,
            platform,
            display_name,
            is_active: true,
            created_at_utc: now,
            updated_at_utc: now,
            is_deleted: false,
            version: 1,
        })
    }

    pub fn deactivate(&mut self, now: DateTime<Utc>) -> CoreResult<()> {
        self.guard_mutable()?;
        self.is_active = false;
        self.touch(now);
        Ok(())
    }

    /// Spec §3 invariant 7, evaluated as a pure predicate so both
    /// `sync-engine`'s device gate and tests can share it.
    pub fn is_valid_sync_principal(&self, user_id: Uuid) -> bool {
        self.user_id == user_id && self.is_active && !self.is_deleted
    }
}

// =============================================================================
// OutboxMessage
// =============================================================================

/// A durable event record, co-committed with the mutation it describes
/// (spec §3, §4.5). `payload` is an opaque snapshot — consumers must treat
/// it as self-describing, never inspect its shape here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutboxMessage {
    pub id: Uuid,
    pub aggregate_id: Uuid,
    pub aggregate_type: String,
    pub message_type: String,
    pub payload: serde_json::Value,
    pub user_id: Uuid,
    pub origin_device_id: Option<Uuid>,
    pub created_at_utc: DateTime<Utc>,
    pub processed_at_utc: Option<DateTime<Utc>>,
    pub attempt_count: i32,
}

impl OutboxMessage {
    pub fn new(
        aggregate_id: Uuid,
        aggregate_type: impl Into<String>,
        message_type: impl Into<String>,
        payload: serde_json::Value,
        user_id: Uuid,
        origin_device_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Self {
        OutboxMessage {
            id: Uuid::new_v4(),
            aggregate_id,
            aggregate_type: aggregate_type.into(),
            message_type: message_type.into(),
            payload,
            user_id,
            origin_device_id,
            created_at_utc: now,
            processed_at_utc: None,
            attempt_count: 0,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_task_create_and_version() {
        let task = Task::create(Uuid::new_v4(), now().date_naive(), "T".into(), None, None, None, None, None, now())
            .unwrap();
        assert_eq!(task.version, 1);
        assert!(!task.is_deleted);
    }

    #[test]
    fn test_task_mutation_bumps_version_by_exactly_one() {
        let mut task = Task::create(Uuid::new_v4(), now().date_naive(), "T".into(), None, None, None, None, None, now())
            .unwrap();
        task.mark_completed(now()).unwrap();
        assert_eq!(task.version, 2);
        task.soft_delete(now()).unwrap();
        assert_eq!(task.version, 3);
    }

    #[test]
    fn test_soft_delete_is_terminal() {
        let mut task = Task::create(Uuid::new_v4(), now().date_naive(), "T".into(), None, None, None, None, None, now())
            .unwrap();
        task.soft_delete(now()).unwrap();
        let err = task.mark_completed(now()).unwrap_err();
        assert!(matches!(err, CoreError::EntityDeleted { .. }));
    }

    #[test]
    fn test_block_rejects_task_parent() {
        let err = Block::create_text_block(
            Uuid::new_v4(),
            Uuid::new_v4(),
            BlockParentType::Task,
            BlockType::Paragraph,
            "a0".into(),
            "x".into(),
            now(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedParentType(_)));
    }

    #[test]
    fn test_asset_block_upload_state_machine() {
        let mut block = Block::create_asset_block(
            Uuid::new_v4(),
            Uuid::new_v4(),
            BlockParentType::Note,
            BlockType::Image,
            "a0".into(),
            "c1".into(),
            "p.jpg".into(),
            Some("image/jpeg".into()),
            1024,
            now(),
        )
        .unwrap();

        let asset_id = Uuid::new_v4();
        block.set_asset_uploaded(asset_id, now()).unwrap();
        assert!(block.has_uploaded_asset());

        // Terminal: cannot transition again.
        let err = block.set_upload_failed(now()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidUploadStatus { .. }));
    }

    #[test]
    fn test_asset_block_upload_failure_is_terminal() {
        let mut block = Block::create_asset_block(
            Uuid::new_v4(),
            Uuid::new_v4(),
            BlockParentType::Note,
            BlockType::File,
            "a0".into(),
            "c1".into(),
            "doc.pdf".into(),
            None,
            2048,
            now(),
        )
        .unwrap();

        block.set_upload_failed(now()).unwrap();
        let err = block.set_asset_uploaded(Uuid::new_v4(), now()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidUploadStatus { .. }));
    }

    #[test]
    fn test_user_device_valid_sync_principal() {
        let user_id = Uuid::new_v4();
        let device = UserDevice::create(user_id, "tok".into(), "ios".into(), "iPhone".into(), now()).unwrap();
        assert!(device.is_valid_sync_principal(user_id));
        assert!(!device.is_valid_sync_principal(Uuid::new_v4()));
    }

    #[test]
    fn test_user_device_deactivate_fails_principal_check() {
        let user_id = Uuid::new_v4();
        let mut device = UserDevice::create(user_id, "tok".into(), "ios".into(), "iPhone".into(), now()).unwrap();
        device.deactivate(now()).unwrap();
        assert!(!device.is_valid_sync_principal(user_id));
    }
}
