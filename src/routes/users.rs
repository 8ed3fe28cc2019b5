use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::users::UserListQuery,
    models::{User, UserPage},
    response::{ApiResponse, Meta},
    routes::fail_soft,
    services::user_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/paged", get(list_users_paged))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "All users with order counts", body = ApiResponse<Vec<User>>)
    ),
    tag = "Users"
)]
pub async fn list_users(State(state): State<AppState>) -> Json<ApiResponse<Vec<User>>> {
    let items = fail_soft(user_service::list_users(&state).await, "users");
    Json(ApiResponse::success("Users", items, None))
}

#[utoipa::path(
    get,
    path = "/api/admin/users/paged",
    params(
        ("page" = Option<u64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<u64>, Query, description = "Items per page, default 10"),
        ("search" = Option<String>, Query, description = "Number or address contains"),
    ),
    responses(
        (status = 200, description = "A page of users, oldest first", body = ApiResponse<UserPage>)
    ),
    tag = "Users"
)]
pub async fn list_users_paged(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Json<ApiResponse<UserPage>> {
    let request = query.page_request();
    let page = fail_soft(
        user_service::list_users_paginated(&state, request, query.search.as_deref()).await,
        "users",
    );
    let total_pages = request.total_pages(page.total_count);
    let meta = Meta::new(request.page, request.page_size, page.total_count, total_pages);
    Json(ApiResponse::success("Users", page, Some(meta)))
}
