//! # Database Pool Management
//!
//! Connection pool creation and configuration for Postgres.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Database Connection Pool                           │
//! │                                                                         │
//! │  apps/sync-api startup                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::new(url) ← configure pool settings                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::connect(config).await ← create pool, run migrations         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │                PgPool                    │                           │
//! │  │  ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐       │                           │
//! │  │  │Conn1│ │Conn2│ │Conn3│ │Conn4│ ...   │  (max_connections)        │
//! │  │  └─────┘ └─────┘ └─────┘ └─────┘       │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       │ Concurrent requests, each acquiring its own connection          │
//! │       ▼                                                                 │
//! │  Push ──► begin_transaction() ──► repositories ──► commit()            │
//! │  Pull ──► repositories (no transaction; read-only)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::postgres::{PgPoolOptions, Postgres};
use sqlx::{PgPool, Transaction};
use std::time::Duration;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::migrations;

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub run_migrations: bool,
}

impl DbConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        DbConfig {
            database_url: database_url.into(),
            max_connections: 10,
            acquire_timeout: Duration::from_secs(10),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }
}

/// Database handle wrapping a Postgres connection pool.
///
/// Repository reads take `&PgPool` (untracked, per the design note in
/// SPEC_FULL.md §9: "all reads are untracked by default"); writes go
/// through a [`Transaction`] opened by the caller (`sync-engine`'s
/// push/pull/resolve/upload components own the unit of work, not this
/// crate) so that the "entire push commits as one transaction" rule
/// (spec §4.1) is enforced at the call site, not hidden in here.
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn connect(config: DbConfig) -> DbResult<Self> {
        info!("connecting to Postgres");

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.database_url)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(max_connections = config.max_connections, "database pool created");

        let db = Database { pool };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    pub async fn run_migrations(&self) -> DbResult<()> {
        info!("checking for pending migrations");
        migrations::run_migrations(&self.pool).await?;
        info!("migrations applied");
        Ok(())
    }

    /// Pool reference for untracked reads.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Opens the unit of work a push/resolve/upload operation commits at
    /// the end (spec §4.1, §4.5: "the entire push ... commits as one
    /// transaction at the end").
    pub async fn begin(&self) -> DbResult<Transaction<'static, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }

    pub async fn close(&self) {
        info!("closing database pool");
        self.pool.close().await;
    }

    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("postgres://localhost/test")
            .max_connections(5)
            .run_migrations(false);
        assert_eq!(config.max_connections, 5);
        assert!(!config.run_migrations);
    }
}
