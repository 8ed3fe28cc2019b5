use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    details::{DetailField, DetailFieldKind},
    dto::{
        categories::{CreateCategoryRequest, UpdateCategoryRequest},
        orders::{CreateOrderRequest, UpdateOrderRequest},
        products::DeleteImageRequest,
    },
    entity::products::QuantityType,
    models::{
        Category, CategoryChoice, Order, OrderCategory, OrderProduct, OrderRecord, OrderUser,
        Product, ProductChoice, User, UserChoice, UserPage,
    },
    response::Meta,
    revalidate::ViewPath,
    routes::{categories, events, health, orders, products, users},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        categories::list_categories,
        categories::get_category,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        products::list_products,
        products::list_category_choices,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        products::delete_product_image,
        orders::list_orders,
        orders::list_user_choices,
        orders::list_product_choices,
        orders::get_order,
        orders::create_order,
        orders::update_order,
        orders::delete_order,
        users::list_users,
        users::list_users_paged,
        events::view_events,
    ),
    components(
        schemas(
            User,
            UserPage,
            UserChoice,
            Category,
            CategoryChoice,
            Product,
            ProductChoice,
            QuantityType,
            DetailField,
            DetailFieldKind,
            Order,
            OrderRecord,
            OrderUser,
            OrderProduct,
            OrderCategory,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            CreateOrderRequest,
            UpdateOrderRequest,
            DeleteImageRequest,
            ViewPath,
            Meta,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Categories", description = "Category management"),
        (name = "Products", description = "Product catalog and images"),
        (name = "Orders", description = "Order management"),
        (name = "Users", description = "Customer directory"),
        (name = "Events", description = "View invalidation stream"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_admin_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/admin/categories",
            "/api/admin/categories/{id}",
            "/api/admin/products",
            "/api/admin/products/choices",
            "/api/admin/products/{id}",
            "/api/admin/products/{id}/images",
            "/api/admin/orders",
            "/api/admin/orders/choices/users",
            "/api/admin/orders/choices/products",
            "/api/admin/orders/{id}",
            "/api/admin/users",
            "/api/admin/users/paged",
            "/api/admin/events",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
