use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::pagination::PageRequest;
use crate::routes::params::Pagination;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub user_id: String,
    pub product_id: Uuid,
    pub quantity: i32,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub status: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub selected_details: Option<Value>,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    pub quantity: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    pub status: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub selected_details: Option<Value>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Matches status, user number, user address, or product name.
    pub search: Option<String>,
    pub user_id: Option<String>,
}

impl OrderListQuery {
    pub fn page_request(&self) -> PageRequest {
        Pagination::new(self.page, self.per_page).normalize()
    }
}
