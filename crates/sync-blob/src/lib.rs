//! # sync-blob: Blob Storage Capability
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         sync-blob (THIS CRATE)                         │
//! │                                                                         │
//! │  BlobStore trait (async, object-safe)                                  │
//! │   ├── put(path, bytes, content_type)                                   │
//! │   ├── get(path) -> bytes                                               │
//! │   ├── delete(path)                                                     │
//! │   └── sign_url(path, valid_for) -> download url                        │
//! │                                                                         │
//! │  FilesystemBlobStore: dev/test implementation                          │
//! │  (a production deployment swaps in S3/Azure behind the same trait)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Consumed by `sync-engine`'s Asset Upload Orchestrator (spec §4.4): blob
//! PUT is the workflow's point of no return, and best-effort DELETE cleans
//! up orphaned blobs when a post-upload phase fails.

pub mod error;
pub mod filesystem;

pub use error::{BlobError, BlobResult};
pub use filesystem::FilesystemBlobStore;

use async_trait::async_trait;
use std::time::Duration;

/// Capability trait for binary blob storage. Implementations must be safe to
/// share across concurrent requests (`Send + Sync`) since the orchestrator
/// holds one behind an `Arc`.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, path: &str, bytes: Vec<u8>, content_type: Option<&str>) -> BlobResult<()>;
    async fn get(&self, path: &str) -> BlobResult<Vec<u8>>;
    async fn delete(&self, path: &str) -> BlobResult<()>;

    /// Mints a time-limited download URL (spec §4.4 phase 5, §6).
    fn sign_url(&self, path: &str, valid_for: Duration) -> BlobResult<String>;
}
