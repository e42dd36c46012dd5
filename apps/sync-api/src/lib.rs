//! # Sync API
//!
//! JSON-over-HTTP server exposing the four sync operations (spec §2, §6):
//! push, pull, resolve, asset upload.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            Sync API Server                              │
//! │                                                                         │
//! │  Client ───► axum router ───► sync-engine ───► sync-db (PostgreSQL)    │
//! │                                     │                                   │
//! │                                     ▼                                   │
//! │                               sync-blob (filesystem)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `DATABASE_URL` - PostgreSQL connection string
//! - `HTTP_PORT` - HTTP server port (default: 8080)
//! - `ASSET_STORAGE_CONTAINER_NAME` - blob path prefix (default: assets)
//! - `ASSET_STORAGE_MAX_FILE_SIZE_BYTES` - upload size cap (default: 25MB)
//! - `ASSET_STORAGE_DOWNLOAD_URL_VALIDITY_SECS` - signed URL lifetime (default: 3600)
//! - `SYNC_DEFAULT_PULL_MAX_ITEMS_PER_ENTITY` - pull page size (default: 500)
//! - `ASSET_BLOB_ROOT` - filesystem root for the dev/test blob store

pub mod config;
pub mod error;
pub mod extractors;
pub mod routes;

use std::sync::Arc;

use sync_blob::{BlobStore, FilesystemBlobStore};
use sync_db::Database;

use crate::config::SyncApiConfig;

/// Shared application state handed to every handler via axum's `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub blob: Arc<dyn BlobStore>,
    pub config: Arc<SyncApiConfig>,
}

impl AppState {
    pub fn new(db: Database, config: SyncApiConfig) -> Self {
        let blob = Arc::new(FilesystemBlobStore::new(
            config.asset_blob_root.clone(),
            format!("http://localhost:{}/v1/assets/blobs", config.http_port),
        ));

        AppState {
            db,
            blob,
            config: Arc::new(config),
        }
    }
}
