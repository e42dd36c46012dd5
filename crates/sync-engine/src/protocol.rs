//! # Wire DTOs for Push / Pull / Resolve / Upload
//!
//! JSON request/response shapes for the four external operations (spec §6).
//! Deliberately decoupled from the `sync-core` domain types: a wire field
//! rename or an added optional field here never forces a domain-model
//! change, and vice versa.
//!
//! ## Request/Response Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP JSON body ──► protocol::PushRequest ──► push::PushEngine::push   │
//! │                                                      │                  │
//! │  HTTP JSON body ◄── protocol::PushResponse ◄─────────┘                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sync_core::{BlockParentType, BlockType};

// =============================================================================
// Shared per-item status vocabulary
// =============================================================================

/// Terminal per-item status for a push/resolve result entry (spec §4.1 table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Created,
    Updated,
    Deleted,
    AlreadyDeleted,
    NotFound,
    Failed,
    KeptServer,
    Conflict,
    InvalidEntityType,
}

/// Conflict kind embedded in a failed/conflicted item result (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    ValidationFailed,
    ParentNotFound,
    NotFound,
    DeletedOnServer,
    VersionMismatch,
    OutboxFailed,
}

/// Any entity snapshot that can be attached to a `VersionMismatch` conflict.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum EntitySnapshot {
    Task(sync_core::Task),
    Note(sync_core::Note),
    Block(sync_core::Block),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    pub conflict_type: ConflictType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_version: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_version: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_snapshot: Option<EntitySnapshot>,
}

// =============================================================================
// Push
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushRequest {
    pub device_id: Uuid,
    pub client_sync_timestamp_utc: DateTime<Utc>,
    #[serde(default)]
    pub tasks: TaskBatch,
    #[serde(default)]
    pub notes: NoteBatch,
    #[serde(default)]
    pub blocks: BlockBatch,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskBatch {
    #[serde(default)]
    pub created: Vec<TaskCreate>,
    #[serde(default)]
    pub updated: Vec<TaskUpdate>,
    #[serde(default)]
    pub deleted: Vec<EntityDelete>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteBatch {
    #[serde(default)]
    pub created: Vec<NoteCreate>,
    #[serde(default)]
    pub updated: Vec<NoteUpdate>,
    #[serde(default)]
    pub deleted: Vec<EntityDelete>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockBatch {
    #[serde(default)]
    pub created: Vec<BlockCreate>,
    #[serde(default)]
    pub updated: Vec<BlockUpdate>,
    #[serde(default)]
    pub deleted: Vec<EntityDelete>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDelete {
    pub id: Uuid,
}

/// Shared field set between `Task.Create` and `Task.Update` (spec §4.6).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskData {
    pub date: NaiveDate,
    pub title: String,
    pub description: Option<String>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub travel_time_minutes: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCreate {
    pub client_id: Uuid,
    #[serde(flatten)]
    pub data: TaskData,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    pub id: Uuid,
    pub expected_version: i64,
    #[serde(flatten)]
    pub data: TaskData,
}

/// Shared field set between `Note.Create` and `Note.Update` (spec §4.6).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteData {
    pub date: NaiveDate,
    pub title: String,
    pub summary: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteCreate {
    pub client_id: Uuid,
    #[serde(flatten)]
    pub data: NoteData,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteUpdate {
    pub id: Uuid,
    pub expected_version: i64,
    #[serde(flatten)]
    pub data: NoteData,
}

/// A Block's content as it arrives on the wire — tagged union mirroring
/// [`sync_core::BlockContent`], kept as a separate type so the wire shape
/// can evolve independently of the domain enum.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockContentInput {
    Text {
        text_content: String,
    },
    Asset {
        asset_client_id: String,
        asset_file_name: String,
        asset_content_type: Option<String>,
        asset_size_bytes: i64,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockCreate {
    pub client_id: Uuid,
    /// Resolution order (spec §4.1): `parent_id` if set, else `parent_client_id`.
    pub parent_id: Option<Uuid>,
    pub parent_client_id: Option<Uuid>,
    pub parent_type: BlockParentType,
    pub block_type: BlockType,
    pub position: String,
    pub content: BlockContentInput,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockUpdate {
    pub id: Uuid,
    pub expected_version: i64,
    pub position: String,
    /// Ignored for asset-backed blocks; only `update_text_content` targets
    /// read it (spec §4.6: `Block.UpdateTextContent`).
    pub text_content: Option<String>,
}

// =============================================================================
// Push result
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_id: Option<Uuid>,
    pub status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict: Option<Conflict>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub errors: Vec<String>,
}

impl ItemResult {
    pub fn created(client_id: Uuid, server_id: Uuid, version: i64) -> Self {
        ItemResult {
            client_id: Some(client_id),
            server_id: Some(server_id),
            status: ItemStatus::Created,
            version: Some(version),
            conflict: None,
            errors: Vec::new(),
        }
    }

    pub fn updated(server_id: Uuid, version: i64) -> Self {
        ItemResult {
            client_id: None,
            server_id: Some(server_id),
            status: ItemStatus::Updated,
            version: Some(version),
            conflict: None,
            errors: Vec::new(),
        }
    }

    pub fn deleted(server_id: Uuid) -> Self {
        ItemResult {
            client_id: None,
            server_id: Some(server_id),
            status: ItemStatus::Deleted,
            version: None,
            conflict: None,
            errors: Vec::new(),
        }
    }

    pub fn already_deleted(server_id: Uuid) -> Self {
        ItemResult {
            client_id: None,
            server_id: Some(server_id),
            status: ItemStatus::AlreadyDeleted,
            version: None,
            conflict: None,
            errors: Vec::new(),
        }
    }

    pub fn not_found(server_id: Uuid) -> Self {
        ItemResult {
            client_id: None,
            server_id: Some(server_id),
            status: ItemStatus::NotFound,
            version: None,
            conflict: None,
            errors: Vec::new(),
        }
    }

    pub fn failed(client_id: Option<Uuid>, conflict: Conflict, errors: Vec<String>) -> Self {
        ItemResult {
            client_id,
            server_id: None,
            status: ItemStatus::Failed,
            version: None,
            conflict: Some(conflict),
            errors,
        }
    }
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct EntityResults {
    pub results: Vec<ItemResult>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushResponse {
    pub tasks: EntityResults,
    pub notes: EntityResults,
    pub blocks: EntityResults,
}

// =============================================================================
// Pull
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullQuery {
    pub device_id: Option<Uuid>,
    pub since_utc: Option<DateTime<Utc>>,
    pub max_items_per_entity: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedEntry {
    pub id: Uuid,
    pub deleted_at_utc: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TaskDelta {
    pub created: Vec<sync_core::Task>,
    pub updated: Vec<sync_core::Task>,
    pub deleted: Vec<DeletedEntry>,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NoteDelta {
    pub created: Vec<sync_core::Note>,
    pub updated: Vec<sync_core::Note>,
    pub deleted: Vec<DeletedEntry>,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BlockDelta {
    pub created: Vec<sync_core::Block>,
    pub updated: Vec<sync_core::Block>,
    pub deleted: Vec<DeletedEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetEntry {
    #[serde(flatten)]
    pub asset: sync_core::Asset,
    pub download_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AssetDelta {
    pub created: Vec<AssetEntry>,
    pub deleted: Vec<DeletedEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullResponse {
    pub server_timestamp_utc: DateTime<Utc>,
    pub tasks: TaskDelta,
    pub notes: NoteDelta,
    pub blocks: BlockDelta,
    pub assets: AssetDelta,
    pub has_more_tasks: bool,
    pub has_more_notes: bool,
    pub has_more_blocks: bool,
}

// =============================================================================
// Resolve
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveEntityType {
    Task,
    Note,
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveChoice {
    KeepServer,
    KeepClient,
    Merge,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ResolveData {
    Task(TaskData),
    Note(NoteData),
    Block(BlockResolveData),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockResolveData {
    pub position: String,
    pub text_content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveItem {
    pub entity_type: ResolveEntityType,
    pub entity_id: Uuid,
    pub choice: ResolveChoice,
    pub expected_version: i64,
    pub data: Option<ResolveData>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveRequest {
    pub items: Vec<ResolveItem>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveItemResult {
    pub entity_type: ResolveEntityType,
    pub entity_id: Uuid,
    pub status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_version: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolveResponse {
    pub results: Vec<ResolveItemResult>,
}

// =============================================================================
// Asset Upload
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadMetadata {
    pub block_id: Uuid,
    pub asset_client_id: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub size_bytes: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub asset_id: Uuid,
    pub block_id: Uuid,
    pub download_url: Option<String>,
}
