//! Binary media storage.
//!
//! Uploads are addressed by an opaque reference string; callers persist the
//! reference on the owning record and resolve it back through `retrieve`.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use uuid::Uuid;

/// Storage backend for uploaded images.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Persist the bytes and return an opaque reference for later retrieval.
    async fn store(&self, bytes: &[u8], content_type: &str) -> Result<String>;

    /// Resolve a reference to its bytes and content type.
    ///
    /// Returns `None` when the reference does not exist.
    async fn retrieve(&self, reference: &str) -> Result<Option<(Vec<u8>, String)>>;
}

/// Filesystem-backed store rooted at a single directory.
pub struct FsMediaStore {
    root: PathBuf,
}

impl FsMediaStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// References are single flat filenames; anything that could escape the
    /// root directory is rejected before touching the filesystem.
    fn resolve(&self, reference: &str) -> Result<PathBuf> {
        if reference.is_empty()
            || reference.contains('/')
            || reference.contains('\\')
            || reference.contains("..")
        {
            return Err(anyhow!("invalid media reference: {}", reference));
        }
        Ok(self.root.join(reference))
    }
}

#[async_trait]
impl MediaStore for FsMediaStore {
    async fn store(&self, bytes: &[u8], content_type: &str) -> Result<String> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .context("failed to create media root")?;

        let extension = mime_guess::get_mime_extensions_str(content_type)
            .and_then(|exts| exts.first())
            .copied()
            .unwrap_or("bin");

        let reference = format!("{}.{}", Uuid::new_v4(), extension);
        let path = self.resolve(&reference)?;

        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("failed to write media file {}", path.display()))?;

        Ok(reference)
    }

    async fn retrieve(&self, reference: &str) -> Result<Option<(Vec<u8>, String)>> {
        let path = self.resolve(reference)?;

        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let content_type = mime_guess::from_path(&path)
                    .first_or_octet_stream()
                    .to_string();
                Ok(Some((bytes, content_type)))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("failed to read media file {}", reference)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> FsMediaStore {
        let root = std::env::temp_dir().join(format!("media-test-{}", Uuid::new_v4()));
        FsMediaStore::new(root)
    }

    #[tokio::test]
    async fn store_then_retrieve() {
        let store = temp_store();
        let reference = store.store(b"fake image bytes", "image/png").await.unwrap();
        assert!(reference.ends_with(".png"));

        let (bytes, content_type) = store.retrieve(&reference).await.unwrap().unwrap();
        assert_eq!(bytes, b"fake image bytes");
        assert_eq!(content_type, "image/png");
    }

    #[tokio::test]
    async fn unknown_reference_is_none() {
        let store = temp_store();
        let result = store.retrieve("missing.png").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn traversal_references_are_rejected() {
        let store = temp_store();
        assert!(store.retrieve("../etc/passwd").await.is_err());
        assert!(store.retrieve("a/b.png").await.is_err());
        assert!(store.retrieve("").await.is_err());
    }

    #[tokio::test]
    async fn unknown_content_type_falls_back_to_bin() {
        let store = temp_store();
        let reference = store.store(b"data", "application/x-unknown-thing").await.unwrap();
        assert!(reference.ends_with(".bin"));
    }
}
