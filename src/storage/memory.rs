use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::{BlobError, BlobStore, sanitize_file_name};

const BASE: &str = "memory://blobs";

/// Process-local store for development and tests.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.blobs
            .lock()
            .map(|blobs| blobs.contains_key(url))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().map(|blobs| blobs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn store(&self, name: &str, bytes: Vec<u8>) -> Result<String, BlobError> {
        let url = format!("{BASE}/{}-{}", Uuid::new_v4(), sanitize_file_name(name));
        let mut blobs = self
            .blobs
            .lock()
            .map_err(|_| BlobError::Io(std::io::Error::other("blob map poisoned")))?;
        blobs.insert(url.clone(), bytes);
        Ok(url)
    }

    async fn delete(&self, url: &str) -> Result<(), BlobError> {
        if !url.starts_with(BASE) {
            return Err(BlobError::ForeignUrl(url.to_string()));
        }
        let mut blobs = self
            .blobs
            .lock()
            .map_err(|_| BlobError::Io(std::io::Error::other("blob map poisoned")))?;
        match blobs.remove(url) {
            Some(_) => Ok(()),
            None => Err(BlobError::Missing(url.to_string())),
        }
    }
}
