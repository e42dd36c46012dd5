//! # sync-core: Pure Domain Model for the Sync Core
//!
//! This crate is the **heart** of the sync core. It contains the Task,
//! Note, Block, Asset, UserDevice, and OutboxMessage entity types and their
//! state-changing operations as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         sync-core (THIS CRATE)                         │
//! │                                                                         │
//! │   ┌───────────┐   ┌───────────┐                                       │
//! │   │   types   │   │ validation│                                       │
//! │   │   Task    │   │   rules   │                                       │
//! │   │   Note    │   │  checks   │                                       │
//! │   │   Block   │   └───────────┘                                       │
//! │   │  Asset    │                                                        │
//! │   │UserDevice │   ┌───────────┐                                       │
//! │   │OutboxMsg  │   │   error   │                                       │
//! │   └───────────┘   └───────────┘                                       │
//! │                                                                         │
//! │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//!                                 │
//!                                 ▼
//!                         sync-db (repositories, Postgres)
//!                                 │
//!                                 ▼
//!                sync-engine (Push/Pull/Resolver/Upload/Outbox)
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain entities and their operations
//! - [`error`] - Domain error types
//! - [`validation`] - Attribute-level validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: every operation is deterministic given its
//!    arguments, including the caller-supplied `now` timestamp — no entity
//!    method reads the system clock.
//! 2. **No I/O**: repository access, blob storage, network are forbidden
//!    here; they live in `sync-db`/`sync-blob`/`sync-engine`.
//! 3. **Explicit errors**: all domain rejections are typed (`CoreError`),
//!    never strings or panics.
//!
//! ## Example
//!
//! ```rust
//! use chrono::Utc;
//! use sync_core::Task;
//! use uuid::Uuid;
//!
//! let now = Utc::now();
//! let mut task = Task::create(
//!     Uuid::new_v4(), now.date_naive(), "Pick up dry cleaning".to_string(),
//!     None, None, None, None, None, now,
//! ).unwrap();
//! assert_eq!(task.version, 1);
//!
//! task.mark_completed(now).unwrap();
//! assert_eq!(task.version, 2);
//! ```

pub mod error;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult, ValidationError};
pub use types::*;
