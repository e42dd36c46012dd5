//! Filesystem-backed [`BlobStore`]. Suitable for local development and
//! tests; a production deployment swaps in an S3/Azure-backed implementation
//! behind the same trait without touching the Upload Orchestrator.

use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{BlobError, BlobResult};
use crate::BlobStore;

#[derive(Debug, Clone)]
pub struct FilesystemBlobStore {
    root: PathBuf,
    download_base_url: String,
}

impl FilesystemBlobStore {
    pub fn new(root: impl Into<PathBuf>, download_base_url: impl Into<String>) -> Self {
        FilesystemBlobStore {
            root: root.into(),
            download_base_url: download_base_url.into(),
        }
    }

    fn resolve(&self, path: &str) -> BlobResult<PathBuf> {
        if path.contains("..") {
            return Err(BlobError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(path))
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    async fn put(&self, path: &str, bytes: Vec<u8>, _content_type: Option<&str>) -> BlobResult<()> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).await?;
        }
        let mut file = fs::File::create(&full).await?;
        file.write_all(&bytes).await?;
        debug!(path = %full.display(), bytes = bytes.len(), "blob written");
        Ok(())
    }

    async fn get(&self, path: &str) -> BlobResult<Vec<u8>> {
        let full = self.resolve(path)?;
        fs::read(&full).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BlobError::NotFound(path.to_string())
            } else {
                BlobError::Io(e)
            }
        })
    }

    async fn delete(&self, path: &str) -> BlobResult<()> {
        let full = self.resolve(path)?;
        match fs::remove_file(&full).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BlobError::Io(e)),
        }
    }

    fn sign_url(&self, path: &str, valid_for: Duration) -> BlobResult<String> {
        if path.contains("..") {
            return Err(BlobError::InvalidPath(path.to_string()));
        }
        let expires_at = (SystemTime::now() + valid_for)
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Ok(format!(
            "{}/{}?exp={}",
            self.download_base_url.trim_end_matches('/'),
            path,
            expires_at
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempdir_like::TempDir, FilesystemBlobStore) {
        let dir = tempdir_like::TempDir::new();
        let store = FilesystemBlobStore::new(dir.path(), "https://assets.example.test");
        (dir, store)
    }

    #[tokio::test]
    async fn put_then_get_roundtrips_bytes() {
        let (_dir, store) = store();
        store
            .put("u1/p1/b1/photo.jpg", b"hello".to_vec(), Some("image/jpeg"))
            .await
            .unwrap();
        let bytes = store.get("u1/p1/b1/photo.jpg").await.unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[tokio::test]
    async fn get_missing_blob_returns_not_found() {
        let (_dir, store) = store();
        let err = store.get("does/not/exist.jpg").await.unwrap_err();
        assert!(matches!(err, BlobError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (_dir, store) = store();
        store.put("a/b.txt", b"x".to_vec(), None).await.unwrap();
        store.delete("a/b.txt").await.unwrap();
        store.delete("a/b.txt").await.unwrap();
    }

    #[tokio::test]
    async fn path_traversal_is_rejected() {
        let (_dir, store) = store();
        let err = store.get("../../etc/passwd").await.unwrap_err();
        assert!(matches!(err, BlobError::InvalidPath(_)));
    }

    #[test]
    fn sign_url_embeds_expiry_and_path() {
        let (_dir, store) = store();
        let url = store.sign_url("u1/p1/b1/photo.jpg", Duration::from_secs(3600)).unwrap();
        assert!(url.starts_with("https://assets.example.test/u1/p1/b1/photo.jpg?exp="));
    }

    /// Minimal drop-cleanup temp dir so this crate doesn't need a `tempfile`
    /// dev-dependency for five small tests.
    mod tempdir_like {
        use std::path::{Path, PathBuf};

        pub struct TempDir(PathBuf);

        impl TempDir {
            pub fn new() -> Self {
                let dir = std::env::temp_dir().join(format!(
                    "sync-blob-test-{}-{:?}",
                    std::process::id(),
                    std::thread::current().id()
                ));
                std::fs::create_dir_all(&dir).unwrap();
                TempDir(dir)
            }

            pub fn path(&self) -> &Path {
                &self.0
            }
        }

        impl Drop for TempDir {
            fn drop(&mut self) {
                let _ = std::fs::remove_dir_all(&self.0);
            }
        }
    }
}
