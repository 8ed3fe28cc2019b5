use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::orders::{CreateOrderRequest, OrderListQuery, UpdateOrderRequest},
    error::AppResult,
    models::{Order, OrderRecord, ProductChoice, UserChoice},
    pagination::Paginated,
    response::{ApiResponse, Meta},
    routes::fail_soft,
    services::order_service,
    state::AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct DeletedOrder {
    pub id: Uuid,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/choices/users", get(list_user_choices))
        .route("/choices/products", get(list_product_choices))
        .route(
            "/{id}",
            get(get_order).patch(update_order).delete(delete_order),
        )
}

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    params(
        ("page" = Option<u64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<u64>, Query, description = "Items per page, default 10"),
        ("search" = Option<String>, Query, description = "Status, user number, user address, or product name"),
        ("user_id" = Option<String>, Query, description = "Only this user's orders"),
    ),
    responses(
        (status = 200, description = "Orders, newest first", body = ApiResponse<Paginated<Order>>)
    ),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Json<ApiResponse<Paginated<Order>>> {
    let request = query.page_request();
    let page = fail_soft(
        order_service::list_orders(
            &state,
            request,
            query.search.as_deref(),
            query.user_id.as_deref(),
        )
        .await,
        "orders",
    );
    let meta = Meta::for_page(&page, request.page_size);
    Json(ApiResponse::success("Orders", page, Some(meta)))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders/choices/users",
    responses(
        (status = 200, description = "Users for the order form", body = ApiResponse<Vec<UserChoice>>)
    ),
    tag = "Orders"
)]
pub async fn list_user_choices(
    State(state): State<AppState>,
) -> Json<ApiResponse<Vec<UserChoice>>> {
    let items = fail_soft(
        order_service::list_users_for_select(&state).await,
        "user choices",
    );
    Json(ApiResponse::success("User choices", items, None))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders/choices/products",
    responses(
        (status = 200, description = "Products for the order form", body = ApiResponse<Vec<ProductChoice>>)
    ),
    tag = "Orders"
)]
pub async fn list_product_choices(
    State(state): State<AppState>,
) -> Json<ApiResponse<Vec<ProductChoice>>> {
    let items = fail_soft(
        order_service::list_products_for_select(&state).await,
        "product choices",
    );
    Json(ApiResponse::success("Product choices", items, None))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order with user and product", body = ApiResponse<Order>),
        (status = 404, description = "Order not found"),
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = order_service::get_order_by_id(&state, id).await?;
    Ok(Json(ApiResponse::success("OK", order, Some(Meta::empty()))))
}

#[utoipa::path(
    post,
    path = "/api/admin/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = ApiResponse<OrderRecord>),
        (status = 400, description = "Invalid order"),
    ),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<OrderRecord>>)> {
    let order = order_service::create_order(&state, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Order created", order, None)),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/admin/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = ApiResponse<OrderRecord>),
        (status = 400, description = "Invalid update"),
        (status = 404, description = "Order not found"),
    ),
    tag = "Orders"
)]
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderRequest>,
) -> AppResult<Json<ApiResponse<OrderRecord>>> {
    let order = order_service::update_order(&state, id, payload).await?;
    Ok(Json(ApiResponse::success("Order updated", order, None)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/orders/{id}",
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order deleted, or already gone", body = ApiResponse<DeletedOrder>),
    ),
    tag = "Orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<DeletedOrder>>> {
    order_service::delete_order(&state, id).await?;
    Ok(Json(ApiResponse::success(
        "Deleted",
        DeletedOrder { id },
        Some(Meta::empty()),
    )))
}
