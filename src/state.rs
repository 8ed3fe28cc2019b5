use std::sync::Arc;

use crate::{db::OrmConn, revalidate::Revalidator, storage::BlobStore};

#[derive(Clone)]
pub struct AppState {
    pub orm: OrmConn,
    pub blobs: Arc<dyn BlobStore>,
    pub views: Revalidator,
}

impl AppState {
    pub fn new(orm: OrmConn, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            orm,
            blobs,
            views: Revalidator::default(),
        }
    }
}
