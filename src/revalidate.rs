use serde::Serialize;
use tokio::sync::broadcast;
use utoipa::ToSchema;

/// Listing views that go stale after a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum ViewPath {
    #[serde(rename = "/admin/categories")]
    Categories,
    #[serde(rename = "/admin/products")]
    Products,
    #[serde(rename = "/admin/orders")]
    Orders,
}

impl ViewPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewPath::Categories => "/admin/categories",
            ViewPath::Products => "/admin/products",
            ViewPath::Orders => "/admin/orders",
        }
    }
}

/// Fire-and-forget fan-out of invalidated view paths.
#[derive(Debug, Clone)]
pub struct Revalidator {
    tx: broadcast::Sender<ViewPath>,
}

impl Revalidator {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn revalidate(&self, path: ViewPath) {
        // No subscribers is the normal case outside of an open admin page.
        let receivers = self.tx.send(path).unwrap_or(0);
        tracing::debug!(path = path.as_str(), receivers, "view invalidated");
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewPath> {
        self.tx.subscribe()
    }
}

impl Default for Revalidator {
    fn default() -> Self {
        Self::new(64)
    }
}
