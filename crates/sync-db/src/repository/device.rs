//! # UserDevice Repository
//!
//! Database operations for [`sync_core::UserDevice`]. Backs `DeviceGate`'s
//! sync-principal check in `sync-engine` (spec §3 invariant 7).

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use sync_core::UserDevice;

#[derive(Debug, sqlx::FromRow)]
struct UserDeviceRow {
    id: Uuid,
    user_id: Uuid,
    device_token: String,
    platform: String,
    display_name: String,
    is_active: bool,
    created_at_utc: DateTime<Utc>,
    updated_at_utc: DateTime<Utc>,
    is_deleted: bool,
    version: i64,
}

impl From<UserDeviceRow> for UserDevice {
    fn from(r: UserDeviceRow) -> Self {
        UserDevice {
            id: r.id,
            user_id: r.user_id,
            device_token: r.device_token,
            platform: r.platform,
            display_name: r.display_name,
            is_active: r.is_active,
            created_at_utc: r.created_at_utc,
            updated_at_utc: r.updated_at_utc,
            is_deleted: r.is_deleted,
            version: r.version,
        }
    }
}

pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> DbResult<Option<UserDevice>>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as!(
        UserDeviceRow,
        r#"
        SELECT id, user_id, device_token, platform, display_name, is_active,
               created_at_utc, updated_at_utc, is_deleted, version
        FROM user_devices
        WHERE id = $1
        "#,
        id
    )
    .fetch_optional(executor)
    .await?;

    Ok(row.map(UserDevice::from))
}

/// Looked up on every request to authenticate the calling device (spec §6).
pub async fn find_by_token<'e, E>(executor: E, device_token: &str) -> DbResult<Option<UserDevice>>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as!(
        UserDeviceRow,
        r#"
        SELECT id, user_id, device_token, platform, display_name, is_active,
               created_at_utc, updated_at_utc, is_deleted, version
        FROM user_devices
        WHERE device_token = $1
        "#,
        device_token
    )
    .fetch_optional(executor)
    .await?;

    Ok(row.map(UserDevice::from))
}

pub async fn insert<'e, E>(executor: E, device: &UserDevice) -> DbResult<()>
where
    E: PgExecutor<'e>,
{
    sqlx::query!(
        r#"
        INSERT INTO user_devices (
            id, user_id, device_token, platform, display_name, is_active,
            created_at_utc, updated_at_utc, is_deleted, version
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
        device.id,
        device.user_id,
        device.device_token,
        device.platform,
        device.display_name,
        device.is_active,
        device.created_at_utc,
        device.updated_at_utc,
        device.is_deleted,
        device.version,
    )
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn update<'e, E>(executor: E, device: &UserDevice, expected_version: i64) -> DbResult<()>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query!(
        r#"
        UPDATE user_devices SET
            display_name = $2, is_active = $3, updated_at_utc = $4,
            is_deleted = $5, version = $6
        WHERE id = $1 AND version = $7
        "#,
        device.id,
        device.display_name,
        device.is_active,
        device.updated_at_utc,
        device.is_deleted,
        device.version,
        expected_version,
    )
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("UserDevice", device.id.to_string()));
    }

    Ok(())
}
