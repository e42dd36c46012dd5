//! # Outbox Repository
//!
//! Manages the transactional outbox (spec §4.5).
//!
//! ## The Outbox Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Outbox Pattern Implementation                        │
//! │                                                                         │
//! │  PushEngine::push (single transaction)                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  1. UPDATE/INSERT tasks|notes|blocks|assets ...                 │   │
//! │  │  2. INSERT INTO outbox_messages (aggregate_type, payload, ...)  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT ← both succeed or both fail together                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Background drain (outside this crate, in sync-engine)                 │
//! │       SELECT ... WHERE processed_at_utc IS NULL ORDER BY created_at    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::error::DbResult;
use sync_core::OutboxMessage;

#[derive(Debug, sqlx::FromRow)]
struct OutboxRow {
    id: Uuid,
    aggregate_id: Uuid,
    aggregate_type: String,
    message_type: String,
    payload: serde_json::Value,
    user_id: Uuid,
    origin_device_id: Option<Uuid>,
    created_at_utc: DateTime<Utc>,
    processed_at_utc: Option<DateTime<Utc>>,
    attempt_count: i32,
}

impl From<OutboxRow> for OutboxMessage {
    fn from(r: OutboxRow) -> Self {
        OutboxMessage {
            id: r.id,
            aggregate_id: r.aggregate_id,
            aggregate_type: r.aggregate_type,
            message_type: r.message_type,
            payload: r.payload,
            user_id: r.user_id,
            origin_device_id: r.origin_device_id,
            created_at_utc: r.created_at_utc,
            processed_at_utc: r.processed_at_utc,
            attempt_count: r.attempt_count,
        }
    }
}

/// Appends an outbox row. Called from within the caller's open
/// transaction so it commits atomically with the mutation it describes.
pub async fn append<'e, E>(executor: E, message: &OutboxMessage) -> DbResult<()>
where
    E: PgExecutor<'e>,
{
    sqlx::query!(
        r#"
        INSERT INTO outbox_messages (
            id, aggregate_id, aggregate_type, message_type, payload,
            user_id, origin_device_id, created_at_utc, processed_at_utc,
            attempt_count
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
        message.id,
        message.aggregate_id,
        message.aggregate_type,
        message.message_type,
        message.payload,
        message.user_id,
        message.origin_device_id,
        message.created_at_utc,
        message.processed_at_utc,
        message.attempt_count,
    )
    .execute(executor)
    .await?;

    Ok(())
}

/// Unprocessed messages, oldest first, for the background drain.
pub async fn get_pending<'e, E>(executor: E, limit: i64) -> DbResult<Vec<OutboxMessage>>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as!(
        OutboxRow,
        r#"
        SELECT id, aggregate_id, aggregate_type, message_type, payload,
               user_id, origin_device_id, created_at_utc, processed_at_utc,
               attempt_count
        FROM outbox_messages
        WHERE processed_at_utc IS NULL
        ORDER BY created_at_utc ASC
        LIMIT $1
        "#,
        limit
    )
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(OutboxMessage::from).collect())
}

pub async fn mark_processed<'e, E>(executor: E, id: Uuid, now: DateTime<Utc>) -> DbResult<()>
where
    E: PgExecutor<'e>,
{
    sqlx::query!(
        r#"UPDATE outbox_messages SET processed_at_utc = $2 WHERE id = $1"#,
        id,
        now,
    )
    .execute(executor)
    .await?;

    Ok(())
}

/// Per spec §9 / DESIGN.md Open Question 1: a failed outbox delivery is
/// logged (attempt_count bumped) but never blocks or retries the push
/// itself — the row simply stays unprocessed for the next drain pass.
pub async fn record_attempt_failure<'e, E>(executor: E, id: Uuid) -> DbResult<()>
where
    E: PgExecutor<'e>,
{
    sqlx::query!(
        r#"UPDATE outbox_messages SET attempt_count = attempt_count + 1 WHERE id = $1"#,
        id,
    )
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn count_pending<'e, E>(executor: E) -> DbResult<i64>
where
    E: PgExecutor<'e>,
{
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM outbox_messages WHERE processed_at_utc IS NULL")
            .fetch_one(executor)
            .await?;

    Ok(count)
}
