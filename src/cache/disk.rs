//! Disk-backed cache store.
//!
//! Cache keys contain tenant hosts, arbitrary directory text, and geometry
//! tokens, so keys are hashed to fixed-width hex names instead of being
//! mapped onto the filesystem directly. Writes are staged to a unique
//! temporary name in the cache root and renamed into place; rename is atomic
//! on a single filesystem, so readers never observe a partial entry.

use crate::cache::ByteCache;
use crate::error::{AppError, Result};
use crate::models::CacheKey;
use async_trait::async_trait;
use bytes::Bytes;
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;
use uuid::Uuid;

/// Filesystem byte store rooted at a single directory
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`, creating the directory if needed
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .map_err(|e| AppError::CacheError(format!("Failed to create cache dir: {e}")))?;
        Ok(Self { root })
    }

    fn entry_path(&self, key: &CacheKey) -> PathBuf {
        let digest = Sha256::digest(key.as_str().as_bytes());
        self.root.join(hex::encode(digest))
    }
}

#[async_trait]
impl ByteCache for FileStore {
    async fn read(&self, key: &CacheKey) -> Result<Option<Bytes>> {
        let path = self.entry_path(key);
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::CacheError(format!(
                "Failed to read cache entry {key}: {e}"
            ))),
        }
    }

    async fn write(&self, key: &CacheKey, payload: Bytes) -> Result<()> {
        let path = self.entry_path(key);
        let staging = self
            .root
            .join(format!(".staging-{}", Uuid::new_v4().simple()));

        tokio::fs::write(&staging, &payload)
            .await
            .map_err(|e| AppError::CacheError(format!("Failed to stage cache entry {key}: {e}")))?;

        if let Err(e) = tokio::fs::rename(&staging, &path).await {
            // Best-effort cleanup; the orphaned staging file is harmless
            // but should not accumulate.
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(AppError::CacheError(format!(
                "Failed to commit cache entry {key}: {e}"
            )));
        }

        debug!(%key, size = payload.len(), "cache entry written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RequestDescriptor;

    fn descriptor() -> RequestDescriptor {
        RequestDescriptor {
            tenant_host: "example.com".into(),
            directory: "avatars".into(),
            geometry: "original".into(),
            filename: "hello.gif".into(),
        }
    }

    #[tokio::test]
    async fn test_absent_key_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        let key = CacheKey::original(&descriptor());
        assert!(store.read(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_after_write() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        let key = CacheKey::original(&descriptor());

        store.write(&key, Bytes::from_static(b"payload")).await.unwrap();
        let read = store.read(&key).await.unwrap().unwrap();
        assert_eq!(&read[..], b"payload");
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        let key = CacheKey::original(&descriptor());

        store.write(&key, Bytes::from_static(b"first")).await.unwrap();
        store.write(&key, Bytes::from_static(b"second")).await.unwrap();
        let read = store.read(&key).await.unwrap().unwrap();
        assert_eq!(&read[..], b"second");
    }

    #[tokio::test]
    async fn test_no_staging_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        let key = CacheKey::original(&descriptor());

        store.write(&key, Bytes::from_static(b"payload")).await.unwrap();
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        let d = descriptor();
        let original = CacheKey::original(&d);
        let rendered = CacheKey::rendered(&d, "2x2#");

        store.write(&original, Bytes::from_static(b"orig")).await.unwrap();
        store.write(&rendered, Bytes::from_static(b"thumb")).await.unwrap();
        assert_eq!(&store.read(&original).await.unwrap().unwrap()[..], b"orig");
        assert_eq!(&store.read(&rendered).await.unwrap().unwrap()[..], b"thumb");
    }
}
