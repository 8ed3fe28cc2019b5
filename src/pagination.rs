use serde::Serialize;
use utoipa::ToSchema;

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;
/// Highest page whose offset still fits a Postgres `bigint`.
pub const MAX_PAGE: u64 = i64::MAX as u64 / MAX_PAGE_SIZE;

/// A normalized page window: `page` is 1-based and `page_size` is within `1..=MAX_PAGE_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.clamp(1, MAX_PAGE),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn total_pages(&self, total_count: u64) -> u64 {
        total_count.div_ceil(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub total_pages: u64,
    pub current_page: u64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total_count: u64, request: PageRequest) -> Self {
        Self {
            items,
            total_count,
            total_pages: request.total_pages(total_count),
            current_page: request.page,
        }
    }

    /// The page rendered when a listing could not be read.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            total_pages: 0,
            current_page: 1,
        }
    }
}

impl<T> Default for Paginated<T> {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_starts_at_zero_for_first_page() {
        assert_eq!(PageRequest::new(1, 10).offset(), 0);
        assert_eq!(PageRequest::new(3, 10).offset(), 20);
    }

    #[test]
    fn out_of_range_inputs_are_clamped() {
        let request = PageRequest::new(0, 0);
        assert_eq!(request.page, 1);
        assert_eq!(request.page_size, 1);
        assert_eq!(PageRequest::new(2, 10_000).page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn huge_page_numbers_keep_offset_in_bigint_range() {
        let request = PageRequest::new(u64::MAX, 100);
        assert_eq!(request.page, MAX_PAGE);
        assert!(request.offset() <= i64::MAX as u64);

        let page = Paginated::<u8>::new(Vec::new(), 5, request);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn total_pages_rounds_up() {
        let request = PageRequest::new(1, 10);
        assert_eq!(request.total_pages(0), 0);
        assert_eq!(request.total_pages(1), 1);
        assert_eq!(request.total_pages(10), 1);
        assert_eq!(request.total_pages(11), 2);
        assert_eq!(request.total_pages(95), 10);
    }

    #[test]
    fn empty_page_reports_first_page() {
        let page: Paginated<u8> = Paginated::empty();
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.current_page, 1);
    }

    #[test]
    fn new_page_carries_request_page() {
        let page = Paginated::new(vec![1, 2, 3], 23, PageRequest::new(3, 10));
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 3);
        assert_eq!(page.items.len(), 3);
    }
}
