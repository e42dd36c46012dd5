//! # Block Repository
//!
//! Database operations for [`sync_core::Block`]. `content_kind` discriminates
//! the stored [`BlockContent`] union between `text` and `asset` columns — see
//! `migrations/001_initial_schema.sql`.

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use sync_core::{Block, BlockContent, BlockParentType, BlockType, UploadStatus};

#[derive(Debug, sqlx::FromRow)]
struct BlockRow {
    id: Uuid,
    user_id: Uuid,
    parent_id: Uuid,
    parent_type: String,
    block_type: String,
    position: String,
    content_kind: String,
    text_content: Option<String>,
    asset_client_id: Option<String>,
    asset_file_name: Option<String>,
    asset_content_type: Option<String>,
    asset_size_bytes: Option<i64>,
    asset_id: Option<Uuid>,
    upload_status: Option<String>,
    created_at_utc: DateTime<Utc>,
    updated_at_utc: DateTime<Utc>,
    is_deleted: bool,
    version: i64,
}

fn parent_type_to_str(t: BlockParentType) -> &'static str {
    match t {
        BlockParentType::Note => "note",
        BlockParentType::Task => "task",
    }
}

fn parent_type_from_str(s: &str) -> DbResult<BlockParentType> {
    match s {
        "note" => Ok(BlockParentType::Note),
        "task" => Ok(BlockParentType::Task),
        other => Err(DbError::Internal(format!("unknown parent_type '{other}'"))),
    }
}

fn block_type_to_str(t: BlockType) -> &'static str {
    match t {
        BlockType::Paragraph => "paragraph",
        BlockType::Heading => "heading",
        BlockType::BulletList => "bullet_list",
        BlockType::NumberedList => "numbered_list",
        BlockType::Quote => "quote",
        BlockType::Code => "code",
        BlockType::Image => "image",
        BlockType::File => "file",
    }
}

fn block_type_from_str(s: &str) -> DbResult<BlockType> {
    match s {
        "paragraph" => Ok(BlockType::Paragraph),
        "heading" => Ok(BlockType::Heading),
        "bullet_list" => Ok(BlockType::BulletList),
        "numbered_list" => Ok(BlockType::NumberedList),
        "quote" => Ok(BlockType::Quote),
        "code" => Ok(BlockType::Code),
        "image" => Ok(BlockType::Image),
        "file" => Ok(BlockType::File),
        other => Err(DbError::Internal(format!("unknown block_type '{other}'"))),
    }
}

fn upload_status_to_str(s: UploadStatus) -> &'static str {
    match s {
        UploadStatus::Pending => "pending",
        UploadStatus::Uploaded => "uploaded",
        UploadStatus::Failed => "failed",
    }
}

fn upload_status_from_str(s: &str) -> DbResult<UploadStatus> {
    match s {
        "pending" => Ok(UploadStatus::Pending),
        "uploaded" => Ok(UploadStatus::Uploaded),
        "failed" => Ok(UploadStatus::Failed),
        other => Err(DbError::Internal(format!("unknown upload_status '{other}'"))),
    }
}

impl TryFrom<BlockRow> for Block {
    type Error = DbError;

    fn try_from(r: BlockRow) -> Result<Self, Self::Error> {
        let content = match r.content_kind.as_str() {
            "text" => BlockContent::Text {
                text_content: r.text_content.ok_or_else(|| {
                    DbError::Internal("text block missing text_content".to_string())
                })?,
            },
            "asset" => BlockContent::Asset {
                asset_client_id: r.asset_client_id.ok_or_else(|| {
                    DbError::Internal("asset block missing asset_client_id".to_string())
                })?,
                asset_file_name: r.asset_file_name.ok_or_else(|| {
                    DbError::Internal("asset block missing asset_file_name".to_string())
                })?,
                asset_content_type: r.asset_content_type,
                asset_size_bytes: r.asset_size_bytes.ok_or_else(|| {
                    DbError::Internal("asset block missing asset_size_bytes".to_string())
                })?,
                asset_id: r.asset_id,
                upload_status: upload_status_from_str(
                    r.upload_status.as_deref().ok_or_else(|| {
                        DbError::Internal("asset block missing upload_status".to_string())
                    })?,
                )?,
            },
            other => return Err(DbError::Internal(format!("unknown content_kind '{other}'"))),
        };

        Ok(Block {
            id: r.id,
            user_id: r.user_id,
            parent_id: r.parent_id,
            parent_type: parent_type_from_str(&r.parent_type)?,
            block_type: block_type_from_str(&r.block_type)?,
            position: r.position,
            content,
            created_at_utc: r.created_at_utc,
            updated_at_utc: r.updated_at_utc,
            is_deleted: r.is_deleted,
            version: r.version,
        })
    }
}

struct ContentColumns {
    content_kind: &'static str,
    text_content: Option<String>,
    asset_client_id: Option<String>,
    asset_file_name: Option<String>,
    asset_content_type: Option<String>,
    asset_size_bytes: Option<i64>,
    asset_id: Option<Uuid>,
    upload_status: Option<&'static str>,
}

fn content_columns(content: &BlockContent) -> ContentColumns {
    match content {
        BlockContent::Text { text_content } => ContentColumns {
            content_kind: "text",
            text_content: Some(text_content.clone()),
            asset_client_id: None,
            asset_file_name: None,
            asset_content_type: None,
            asset_size_bytes: None,
            asset_id: None,
            upload_status: None,
        },
        BlockContent::Asset {
            asset_client_id,
            asset_file_name,
            asset_content_type,
            asset_size_bytes,
            asset_id,
            upload_status,
        } => ContentColumns {
            content_kind: "asset",
            text_content: None,
            asset_client_id: Some(asset_client_id.clone()),
            asset_file_name: Some(asset_file_name.clone()),
            asset_content_type: asset_content_type.clone(),
            asset_size_bytes: Some(*asset_size_bytes),
            asset_id: *asset_id,
            upload_status: Some(upload_status_to_str(*upload_status)),
        },
    }
}

pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> DbResult<Option<Block>>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as!(
        BlockRow,
        r#"
        SELECT id, user_id, parent_id, parent_type, block_type, position,
               content_kind, text_content, asset_client_id, asset_file_name,
               asset_content_type, asset_size_bytes, asset_id, upload_status,
               created_at_utc, updated_at_utc, is_deleted, version
        FROM blocks
        WHERE id = $1
        "#,
        id
    )
    .fetch_optional(executor)
    .await?;

    row.map(Block::try_from).transpose()
}

pub async fn insert<'e, E>(executor: E, block: &Block) -> DbResult<()>
where
    E: PgExecutor<'e>,
{
    let c = content_columns(&block.content);

    sqlx::query!(
        r#"
        INSERT INTO blocks (
            id, user_id, parent_id, parent_type, block_type, position,
            content_kind, text_content, asset_client_id, asset_file_name,
            asset_content_type, asset_size_bytes, asset_id, upload_status,
            created_at_utc, updated_at_utc, is_deleted, version
        ) VALUES (
            $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18
        )
        "#,
        block.id,
        block.user_id,
        block.parent_id,
        parent_type_to_str(block.parent_type),
        block_type_to_str(block.block_type),
        block.position,
        c.content_kind,
        c.text_content,
        c.asset_client_id,
        c.asset_file_name,
        c.asset_content_type,
        c.asset_size_bytes,
        c.asset_id,
        c.upload_status,
        block.created_at_utc,
        block.updated_at_utc,
        block.is_deleted,
        block.version,
    )
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn update<'e, E>(executor: E, block: &Block, expected_version: i64) -> DbResult<()>
where
    E: PgExecutor<'e>,
{
    let c = content_columns(&block.content);

    let result = sqlx::query!(
        r#"
        UPDATE blocks SET
            position = $2, content_kind = $3, text_content = $4,
            asset_client_id = $5, asset_file_name = $6, asset_content_type = $7,
            asset_size_bytes = $8, asset_id = $9, upload_status = $10,
            updated_at_utc = $11, is_deleted = $12, version = $13
        WHERE id = $1 AND version = $14
        "#,
        block.id,
        block.position,
        c.content_kind,
        c.text_content,
        c.asset_client_id,
        c.asset_file_name,
        c.asset_content_type,
        c.asset_size_bytes,
        c.asset_id,
        c.upload_status,
        block.updated_at_utc,
        block.is_deleted,
        block.version,
        expected_version,
    )
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Block", block.id.to_string()));
    }

    Ok(())
}

pub async fn list_changed_since<'e, E>(
    executor: E,
    user_id: Uuid,
    since: DateTime<Utc>,
    limit: i64,
) -> DbResult<Vec<Block>>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as!(
        BlockRow,
        r#"
        SELECT id, user_id, parent_id, parent_type, block_type, position,
               content_kind, text_content, asset_client_id, asset_file_name,
               asset_content_type, asset_size_bytes, asset_id, upload_status,
               created_at_utc, updated_at_utc, is_deleted, version
        FROM blocks
        WHERE user_id = $1 AND updated_at_utc > $2
        ORDER BY updated_at_utc ASC, id ASC
        LIMIT $3
        "#,
        user_id,
        since,
        limit,
    )
    .fetch_all(executor)
    .await?;

    rows.into_iter().map(Block::try_from).collect()
}
