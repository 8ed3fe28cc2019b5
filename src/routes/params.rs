use serde::Deserialize;
use utoipa::ToSchema;

use crate::pagination::{DEFAULT_PAGE_SIZE, PageRequest};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

impl Pagination {
    pub fn new(page: Option<u64>, per_page: Option<u64>) -> Self {
        Self { page, per_page }
    }

    pub fn normalize(&self) -> PageRequest {
        PageRequest::new(
            self.page.unwrap_or(1),
            self.per_page.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_values_use_defaults() {
        let request = Pagination::default().normalize();
        assert_eq!(request.page, 1);
        assert_eq!(request.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn explicit_values_are_kept() {
        let request = Pagination::new(Some(4), Some(25)).normalize();
        assert_eq!(request.offset(), 75);
    }
}
