//! # sync-engine: Push/Pull/Resolve/Upload Orchestration
//!
//! The four externally-visible operations of the sync core (spec §2), each
//! owning its own unit of work against `sync-db` and, for uploads,
//! `sync-blob`.
//!
//! ## Modules
//! - [`device_gate`] — validates the calling device (spec §3 invariant 7)
//! - [`push`] — Push Engine (C1)
//! - [`pull`] — Pull Engine (C2)
//! - [`resolver`] — Conflict Resolver (C3)
//! - [`upload`] — Asset Upload Orchestrator (C4)
//! - [`outbox`] — outbox message construction shared by the above (C5)
//! - [`protocol`] — wire DTOs
//! - [`error`] — request-level errors
//!
//! The transactional-outbox *write* path lives in `sync-db::repository::outbox`
//! (appending a row inside the caller's transaction); this crate only builds
//! the `OutboxMessage` payloads. The outbox *dispatcher* — the process that
//! reads unprocessed rows and forwards events downstream — is out of scope
//! (spec §1).

pub mod device_gate;
pub mod error;
pub mod outbox;
pub mod protocol;
pub mod pull;
pub mod push;
pub mod resolver;
pub mod upload;

pub use device_gate::DeviceGate;
pub use error::{EngineError, EngineResult};
pub use pull::PullEngine;
pub use push::PushEngine;
pub use resolver::ConflictResolver;
pub use upload::UploadOrchestrator;
