//! Content store for product images.
//!
//! The admin core only needs two operations: put bytes somewhere and get back a
//! public URL, and later forget that URL. Deletion failures are never fatal to
//! callers; see `product_service`.

use async_trait::async_trait;
use thiserror::Error;

mod local;
mod memory;

pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("url is not managed by this store: {0}")]
    ForeignUrl(String),

    #[error("blob not found: {0}")]
    Missing(String),
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist `bytes` under a name derived from `name` and return its public URL.
    async fn store(&self, name: &str, bytes: Vec<u8>) -> Result<String, BlobError>;

    async fn delete(&self, url: &str) -> Result<(), BlobError>;
}

/// Reduce an uploaded file name to a safe single path segment.
pub(crate) fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}
