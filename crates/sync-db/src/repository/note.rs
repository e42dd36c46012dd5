//! # Note Repository
//!
//! Database operations for [`sync_core::Note`]. Follows the same
//! generic-executor / optimistic-concurrency shape as [`crate::repository::task`].

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use sync_core::Note;

#[derive(Debug, sqlx::FromRow)]
struct NoteRow {
    id: Uuid,
    user_id: Uuid,
    date: NaiveDate,
    title: String,
    summary: Option<String>,
    tags: Option<Vec<String>>,
    created_at_utc: DateTime<Utc>,
    updated_at_utc: DateTime<Utc>,
    is_deleted: bool,
    version: i64,
}

impl From<NoteRow> for Note {
    fn from(r: NoteRow) -> Self {
        Note {
            id: r.id,
            user_id: r.user_id,
            date: r.date,
            title: r.title,
            summary: r.summary,
            tags: r.tags,
            created_at_utc: r.created_at_utc,
            updated_at_utc: r.updated_at_utc,
            is_deleted: r.is_deleted,
            version: r.version,
        }
    }
}

pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> DbResult<Option<Note>>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as!(
        NoteRow,
        r#"
        SELECT id, user_id, date, title, summary, tags,
               created_at_utc, updated_at_utc, is_deleted, version
        FROM notes
        WHERE id = $1
        "#,
        id
    )
    .fetch_optional(executor)
    .await?;

    Ok(row.map(Note::from))
}

pub async fn insert<'e, E>(executor: E, note: &Note) -> DbResult<()>
where
    E: PgExecutor<'e>,
{
    sqlx::query!(
        r#"
        INSERT INTO notes (
            id, user_id, date, title, summary, tags,
            created_at_utc, updated_at_utc, is_deleted, version
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
        note.id,
        note.user_id,
        note.date,
        note.title,
        note.summary,
        note.tags.as_deref(),
        note.created_at_utc,
        note.updated_at_utc,
        note.is_deleted,
        note.version,
    )
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn update<'e, E>(executor: E, note: &Note, expected_version: i64) -> DbResult<()>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query!(
        r#"
        UPDATE notes SET
            date = $2, title = $3, summary = $4, tags = $5,
            updated_at_utc = $6, is_deleted = $7, version = $8
        WHERE id = $1 AND version = $9
        "#,
        note.id,
        note.date,
        note.title,
        note.summary,
        note.tags.as_deref(),
        note.updated_at_utc,
        note.is_deleted,
        note.version,
        expected_version,
    )
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Note", note.id.to_string()));
    }

    Ok(())
}

pub async fn list_changed_since<'e, E>(
    executor: E,
    user_id: Uuid,
    since: DateTime<Utc>,
    limit: i64,
) -> DbResult<Vec<Note>>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as!(
        NoteRow,
        r#"
        SELECT id, user_id, date, title, summary, tags,
               created_at_utc, updated_at_utc, is_deleted, version
        FROM notes
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

    Ok(rows.into_iter().map(Note::from).collect())
}
