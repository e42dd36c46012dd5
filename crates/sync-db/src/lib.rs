//! # sync-db: Database Layer for the Sync Core
//!
//! This crate provides Postgres access for the sync core's six entity
//! kinds. It uses sqlx for async, compile-time-checked queries.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Sync Core Data Flow                            │
//! │                                                                         │
//! │  sync-engine (PushEngine / PullEngine / ...)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     sync-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (task, note,  │    │  (embedded)  │  │   │
//! │  │   │               │    │  block, ...)  │    │              │  │   │
//! │  │   │ PgPool /      │◄───│ generic over  │    │ 001_init.sql │  │   │
//! │  │   │ Transaction   │    │ PgExecutor    │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                       Postgres                                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and unit-of-work entry point
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Per-entity repository functions
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sync_db::{Database, DbConfig};
//!
//! let config = DbConfig::new(std::env::var("DATABASE_URL")?);
//! let db = Database::connect(config).await?;
//!
//! let mut tx = db.begin().await?;
//! sync_db::repository::task::insert(&mut *tx, &task).await?;
//! tx.commit().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
