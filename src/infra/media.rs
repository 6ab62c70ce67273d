//! Filesystem media store.
//!
//! Stores uploaded media as UUID-keyed files under a base directory. This is
//! the single-node default; the [`MediaStore`] trait is the swap point for
//! object storage.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use super::{MediaStore, ProofError, Result, StoredMedia};

/// Media store backed by a local directory.
#[derive(Debug, Clone)]
pub struct FsMediaStore {
    base_dir: PathBuf,
    /// Public URL prefix the files are served under.
    url_prefix: String,
}

impl FsMediaStore {
    /// Create a store rooted at `base_dir`, creating the directory if needed.
    pub async fn new(base_dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Result<Self> {
        let base_dir = base_dir.into();
        tokio::fs::create_dir_all(&base_dir)
            .await
            .map_err(|e| ProofError::Media(format!("creating {}: {e}", base_dir.display())))?;

        let mut url_prefix = url_prefix.into();
        while url_prefix.ends_with('/') {
            url_prefix.pop();
        }

        Ok(Self {
            base_dir,
            url_prefix,
        })
    }

    fn extension_for(content_type: &str) -> &'static str {
        match content_type {
            "image/png" => "png",
            "image/webp" => "webp",
            // JPEG is what field devices send; default to it for anything odd.
            _ => "jpg",
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base_dir.join(key)
    }
}

#[async_trait]
impl MediaStore for FsMediaStore {
    async fn put(&self, bytes: &[u8], content_type: &str) -> Result<StoredMedia> {
        let key = format!("{}.{}", Uuid::new_v4(), Self::extension_for(content_type));
        let path = self.path_for(&key);

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| ProofError::Media(format!("writing {}: {e}", path.display())))?;

        debug!(key = %key, size = bytes.len(), "media stored");

        Ok(StoredMedia {
            url: format!("{}/{}", self.url_prefix, key),
            key,
        })
    }

    async fn delete(&self, key: &str) -> Result<()> {
        // Keys are generated UUIDs; reject anything path-like outright.
        if key.contains('/') || key.contains("..") {
            return Err(ProofError::Media(format!("invalid media key: {key}")));
        }

        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ProofError::Media(format!(
                "deleting {}: {e}",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_store() -> (FsMediaStore, PathBuf) {
        let dir = std::env::temp_dir().join(format!("fieldproof-media-{}", Uuid::new_v4()));
        let store = FsMediaStore::new(&dir, "/media/").await.unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn put_then_delete_round_trip() {
        let (store, dir) = temp_store().await;

        let stored = store.put(b"jpeg-bytes", "image/jpeg").await.unwrap();
        assert!(stored.url.starts_with("/media/"));
        assert!(stored.key.ends_with(".jpg"));
        assert!(dir.join(&stored.key).exists());

        store.delete(&stored.key).await.unwrap();
        assert!(!dir.join(&stored.key).exists());

        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn delete_of_unknown_key_is_idempotent() {
        let (store, dir) = temp_store().await;
        store.delete("00000000-0000-0000-0000-000000000000.jpg").await.unwrap();
        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn delete_rejects_path_traversal() {
        let (store, dir) = temp_store().await;
        assert!(store.delete("../etc/passwd").await.is_err());
        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[test]
    fn content_type_maps_to_extension() {
        assert_eq!(FsMediaStore::extension_for("image/png"), "png");
        assert_eq!(FsMediaStore::extension_for("image/jpeg"), "jpg");
        assert_eq!(FsMediaStore::extension_for("application/octet-stream"), "jpg");
    }
}
