use serde::Deserialize;
use utoipa::ToSchema;

use crate::pagination::PageRequest;
use crate::routes::params::Pagination;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UserListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Matches user number or address.
    pub search: Option<String>,
}

impl UserListQuery {
    pub fn page_request(&self) -> PageRequest {
        Pagination::new(self.page, self.per_page).normalize()
    }
}
