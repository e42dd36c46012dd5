//! # Task Repository
//!
//! Database operations for [`sync_core::Task`].
//!
//! ## Pagination
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  list_changed_since(user_id, since, limit) fills the pull page in       │
//! │  Created → Updated → Deleted order per entity (DESIGN.md Open          │
//! │  Question 5): rows are ordered by (updated_at_utc, id) so the page      │
//! │  boundary is stable even when many rows share a timestamp.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use sync_core::Task;

#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    id: Uuid,
    user_id: Uuid,
    date: NaiveDate,
    title: String,
    description: Option<String>,
    start_time: Option<NaiveTime>,
    end_time: Option<NaiveTime>,
    location: Option<String>,
    travel_time_minutes: Option<i32>,
    reminder_at_utc: Option<DateTime<Utc>>,
    reminder_acknowledged_at_utc: Option<DateTime<Utc>>,
    is_completed: bool,
    created_at_utc: DateTime<Utc>,
    updated_at_utc: DateTime<Utc>,
    is_deleted: bool,
    version: i64,
}

impl From<TaskRow> for Task {
    fn from(r: TaskRow) -> Self {
        Task {
            id: r.id,
            user_id: r.user_id,
            date: r.date,
            title: r.title,
            description: r.description,
            start_time: r.start_time,
            end_time: r.end_time,
            location: r.location,
            travel_time_minutes: r.travel_time_minutes,
            reminder_at_utc: r.reminder_at_utc,
            reminder_acknowledged_at_utc: r.reminder_acknowledged_at_utc,
            is_completed: r.is_completed,
            created_at_utc: r.created_at_utc,
            updated_at_utc: r.updated_at_utc,
            is_deleted: r.is_deleted,
            version: r.version,
        }
    }
}

pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> DbResult<Option<Task>>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as!(
        TaskRow,
        r#"
        SELECT id, user_id, date, title, description, start_time, end_time,
               location, travel_time_minutes, reminder_at_utc,
               reminder_acknowledged_at_utc, is_completed,
               created_at_utc, updated_at_utc, is_deleted, version
        FROM tasks
        WHERE id = $1
        "#,
        id
    )
    .fetch_optional(executor)
    .await?;

    Ok(row.map(Task::from))
}

pub async fn insert<'e, E>(executor: E, task: &Task) -> DbResult<()>
where
    E: PgExecutor<'e>,
{
    sqlx::query!(
        r#"
        INSERT INTO tasks (
            id, user_id, date, title, description, start_time, end_time,
            location, travel_time_minutes, reminder_at_utc,
            reminder_acknowledged_at_utc, is_completed,
            created_at_utc, updated_at_utc, is_deleted, version
        ) VALUES (
            $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16
        )
        "#,
        task.id,
        task.user_id,
        task.date,
        task.title,
        task.description,
        task.start_time,
        task.end_time,
        task.location,
        task.travel_time_minutes,
        task.reminder_at_utc,
        task.reminder_acknowledged_at_utc,
        task.is_completed,
        task.created_at_utc,
        task.updated_at_utc,
        task.is_deleted,
        task.version,
    )
    .execute(executor)
    .await?;

    Ok(())
}

/// Updates a task, guarded by the optimistic-concurrency version check
/// (spec §4.1, §4.3). `expected_version` is the version the client last
/// saw; zero affected rows means either the task doesn't exist or the
/// version has moved on, both of which the caller resolves as a conflict.
#[allow(clippy::too_many_arguments)]
pub async fn update<'e, E>(executor: E, task: &Task, expected_version: i64) -> DbResult<()>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query!(
        r#"
        UPDATE tasks SET
            date = $2, title = $3, description = $4, start_time = $5,
            end_time = $6, location = $7, travel_time_minutes = $8,
            reminder_at_utc = $9, reminder_acknowledged_at_utc = $10,
            is_completed = $11, updated_at_utc = $12, is_deleted = $13,
            version = $14
        WHERE id = $1 AND version = $15
        "#,
        task.id,
        task.date,
        task.title,
        task.description,
        task.start_time,
        task.end_time,
        task.location,
        task.travel_time_minutes,
        task.reminder_at_utc,
        task.reminder_acknowledged_at_utc,
        task.is_completed,
        task.updated_at_utc,
        task.is_deleted,
        task.version,
        expected_version,
    )
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Task", task.id.to_string()));
    }

    Ok(())
}

/// Rows touched since `since` (exclusive), ordered Created → Updated →
/// Deleted within ties by `(updated_at_utc, id)` (DESIGN.md Open Question 5).
pub async fn list_changed_since<'e, E>(
    executor: E,
    user_id: Uuid,
    since: DateTime<Utc>,
    limit: i64,
) -> DbResult<Vec<Task>>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as!(
        TaskRow,
        r#"
        SELECT id, user_id, date, title, description, start_time, end_time,
               location, travel_time_minutes, reminder_at_utc,
               reminder_acknowledged_at_utc, is_completed,
               created_at_utc, updated_at_utc, is_deleted, version
        FROM tasks
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

    Ok(rows.into_iter().map(Task::from).collect())
}
