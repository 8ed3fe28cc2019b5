use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::details::{DetailField, SelectedDetails};
use crate::entity::products::QuantityType;

pub const UNKNOWN_PRODUCT_NAME: &str = "Unknown Product";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: String,
    pub number: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub order_count: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UserPage {
    pub items: Vec<User>,
    pub total_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub product_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryChoice {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub quantity: i32,
    pub quantity_type: QuantityType,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub images: Vec<String>,
    pub info: String,
    pub details: Vec<DetailField>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductChoice {
    pub id: Uuid,
    pub name: String,
    #[schema(value_type = String)]
    pub price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserChoice {
    pub id: String,
    pub number: Option<String>,
}

/// The user side of an order row; an empty `id` marks a user that no longer resolves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderUser {
    pub id: String,
    pub number: Option<String>,
    pub address: Option<String>,
}

impl OrderUser {
    pub fn placeholder() -> Self {
        Self {
            id: String::new(),
            number: None,
            address: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderCategory {
    pub id: Uuid,
    pub name: String,
}

/// The product side of an order row; an empty `id` marks a product that no longer resolves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderProduct {
    pub id: String,
    pub name: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub category: Option<OrderCategory>,
}

impl OrderProduct {
    pub fn placeholder() -> Self {
        Self {
            id: String::new(),
            name: UNKNOWN_PRODUCT_NAME.to_string(),
            price: Decimal::ZERO,
            category: None,
        }
    }
}

/// A bare order row as stored.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderRecord {
    pub id: Uuid,
    pub user_id: String,
    pub product_id: Option<Uuid>,
    pub quantity: i32,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub status: String,
    #[schema(value_type = Object)]
    pub selected_details: SelectedDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An order joined with its user, product, and the product's category.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: String,
    pub product_id: Option<Uuid>,
    pub quantity: i32,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub status: String,
    #[schema(value_type = Object)]
    pub selected_details: SelectedDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: OrderUser,
    pub product: OrderProduct,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_serialize_like_missing_rows() {
        let product = serde_json::to_value(OrderProduct::placeholder()).unwrap();
        assert_eq!(product["id"], "");
        assert_eq!(product["name"], "Unknown Product");
        assert_eq!(product["price"], "0");
        assert!(product["category"].is_null());

        let user = serde_json::to_value(OrderUser::placeholder()).unwrap();
        assert_eq!(user["id"], "");
        assert!(user["number"].is_null());
        assert!(user["address"].is_null());
    }
}
