use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use super::{BlobError, BlobStore, sanitize_file_name};

/// Stores blobs as files in one directory; the HTTP layer serves that directory
/// under `public_base`.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_base: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        let public_base = public_base.into().trim_end_matches('/').to_string();
        Self {
            root: root.into(),
            public_base,
        }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    fn key_for(&self, url: &str) -> Result<String, BlobError> {
        let key = url
            .strip_prefix(&self.public_base)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| BlobError::ForeignUrl(url.to_string()))?;
        if key.is_empty() || key.contains('/') || key.contains('\\') || key.starts_with('.') {
            return Err(BlobError::ForeignUrl(url.to_string()));
        }
        Ok(key.to_string())
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn store(&self, name: &str, bytes: Vec<u8>) -> Result<String, BlobError> {
        fs::create_dir_all(&self.root).await?;
        let key = format!("{}-{}", Uuid::new_v4(), sanitize_file_name(name));
        fs::write(self.root.join(&key), bytes).await?;
        tracing::debug!(key = %key, "stored blob");
        Ok(format!("{}/{}", self.public_base, key))
    }

    async fn delete(&self, url: &str) -> Result<(), BlobError> {
        let key = self.key_for(url)?;
        match fs::remove_file(self.root.join(&key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(BlobError::Missing(url.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_then_delete_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "/uploads/");

        let url = store.store("shoe.png", b"png".to_vec()).await.unwrap();
        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with("-shoe.png"));

        let key = url.trim_start_matches("/uploads/");
        assert_eq!(std::fs::read(dir.path().join(key)).unwrap(), b"png");

        store.delete(&url).await.unwrap();
        assert!(!dir.path().join(key).exists());
        assert!(matches!(
            store.delete(&url).await,
            Err(BlobError::Missing(_))
        ));
    }

    #[tokio::test]
    async fn delete_rejects_urls_outside_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "/uploads");

        for url in [
            "https://cdn.example.com/a.png",
            "/uploads/../secret",
            "/uploads/nested/a.png",
            "/uploads/",
        ] {
            assert!(matches!(
                store.delete(url).await,
                Err(BlobError::ForeignUrl(_))
            ));
        }
    }
}
