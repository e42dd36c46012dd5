//! # Repository Module
//!
//! Database access for the six entity kinds (spec §3), as free functions
//! generic over `E: sqlx::PgExecutor<'e>` rather than structs each owning a
//! pool.
//!
//! ## Why free functions, not `XRepository { pool }`
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sync-engine's PushEngine::push opens ONE transaction and must run     │
//! │  every repository call against it so the whole push commits or rolls   │
//! │  back together (spec §4.1). A repository struct that owns its own      │
//! │  PgPool can't participate in a caller's transaction.                   │
//! │                                                                         │
//! │  So every write-capable function here takes `executor: E` where        │
//! │  `E: PgExecutor<'e>` — the same function runs against either:          │
//! │                                                                         │
//! │    task::insert(&pool, &task)          // untracked, for ad hoc writes │
//! │    task::insert(&mut *tx, &task)       // participates in push's UoW   │
//! │                                                                         │
//! │  Reads default to `&PgPool` call sites (untracked, per DESIGN.md).     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`task`] - Task CRUD, completion, reminders
//! - [`note`] - Note CRUD
//! - [`block`] - Block CRUD, position, upload state machine
//! - [`asset`] - Asset descriptor persistence
//! - [`device`] - UserDevice registration/lookup
//! - [`outbox`] - Transactional outbox append/drain

pub mod asset;
pub mod block;
pub mod device;
pub mod note;
pub mod outbox;
pub mod task;
