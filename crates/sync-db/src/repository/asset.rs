//! # Asset Repository
//!
//! Database operations for [`sync_core::Asset`]. Assets have no `version`
//! column — they are immutable once written (spec §3).

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::error::DbResult;
use sync_core::Asset;

#[derive(Debug, sqlx::FromRow)]
struct AssetRow {
    id: Uuid,
    user_id: Uuid,
    block_id: Uuid,
    file_name: String,
    content_type: String,
    size_bytes: i64,
    blob_path: String,
    created_at_utc: DateTime<Utc>,
    updated_at_utc: DateTime<Utc>,
    is_deleted: bool,
}

impl From<AssetRow> for Asset {
    fn from(r: AssetRow) -> Self {
        Asset {
            id: r.id,
            user_id: r.user_id,
            block_id: r.block_id,
            file_name: r.file_name,
            content_type: r.content_type,
            size_bytes: r.size_bytes,
            blob_path: r.blob_path,
            created_at_utc: r.created_at_utc,
            updated_at_utc: r.updated_at_utc,
            is_deleted: r.is_deleted,
        }
    }
}

pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> DbResult<Option<Asset>>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as!(
        AssetRow,
        r#"
        SELECT id, user_id, block_id, file_name, content_type, size_bytes,
               blob_path, created_at_utc, updated_at_utc, is_deleted
        FROM assets
        WHERE id = $1
        "#,
        id
    )
    .fetch_optional(executor)
    .await?;

    Ok(row.map(Asset::from))
}

pub async fn find_by_block_id<'e, E>(executor: E, block_id: Uuid) -> DbResult<Option<Asset>>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as!(
        AssetRow,
        r#"
        SELECT id, user_id, block_id, file_name, content_type, size_bytes,
               blob_path, created_at_utc, updated_at_utc, is_deleted
        FROM assets
        WHERE block_id = $1
        "#,
        block_id
    )
    .fetch_optional(executor)
    .await?;

    Ok(row.map(Asset::from))
}

pub async fn insert<'e, E>(executor: E, asset: &Asset) -> DbResult<()>
where
    E: PgExecutor<'e>,
{
    sqlx::query!(
        r#"
        INSERT INTO assets (
            id, user_id, block_id, file_name, content_type, size_bytes,
            blob_path, created_at_utc, updated_at_utc, is_deleted
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
        asset.id,
        asset.user_id,
        asset.block_id,
        asset.file_name,
        asset.content_type,
        asset.size_bytes,
        asset.blob_path,
        asset.created_at_utc,
        asset.updated_at_utc,
        asset.is_deleted,
    )
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn list_changed_since<'e, E>(
    executor: E,
    user_id: Uuid,
    since: DateTime<Utc>,
    limit: i64,
) -> DbResult<Vec<Asset>>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as!(
        AssetRow,
        r#"
        SELECT id, user_id, block_id, file_name, content_type, size_bytes,
               blob_path, created_at_utc, updated_at_utc, is_deleted
        FROM assets
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

    Ok(rows.into_iter().map(Asset::from).collect())
}
