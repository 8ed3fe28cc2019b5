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
    dto::categories::{CategorySearchQuery, CreateCategoryRequest, UpdateCategoryRequest},
    error::AppResult,
    models::Category,
    response::{ApiResponse, Meta},
    routes::fail_soft,
    services::category_service,
    state::AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct DeletedCategory {
    pub id: Uuid,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
}

#[utoipa::path(
    get,
    path = "/api/admin/categories",
    params(
        ("q" = Option<String>, Query, description = "Search name or description"),
    ),
    responses(
        (status = 200, description = "Categories with product counts, newest first", body = ApiResponse<Vec<Category>>)
    ),
    tag = "Categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<CategorySearchQuery>,
) -> Json<ApiResponse<Vec<Category>>> {
    let term = query.q.unwrap_or_default();
    let items = fail_soft(
        category_service::search_categories(&state, &term).await,
        "categories",
    );
    Json(ApiResponse::success("Categories", items, Some(Meta::empty())))
}

#[utoipa::path(
    get,
    path = "/api/admin/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category", body = ApiResponse<Category>),
        (status = 404, description = "Category not found"),
    ),
    tag = "Categories"
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let category = category_service::get_category_by_id(&state, id).await?;
    Ok(Json(ApiResponse::success("Category", category, None)))
}

#[utoipa::path(
    post,
    path = "/api/admin/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<Category>),
        (status = 400, description = "Missing name"),
        (status = 409, description = "Category name already exists"),
    ),
    tag = "Categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Category>>)> {
    let category = category_service::create_category(&state, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Category created",
            category,
            Some(Meta::empty()),
        )),
    ))
}

#[utoipa::path(
    put,
    path = "/api/admin/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<Category>),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Category name already exists"),
    ),
    tag = "Categories"
)]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let category = category_service::update_category(&state, id, payload).await?;
    Ok(Json(ApiResponse::success(
        "Category updated",
        category,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/admin/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category deleted", body = ApiResponse<DeletedCategory>),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Category still has products"),
    ),
    tag = "Categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<DeletedCategory>>> {
    category_service::delete_category(&state, id).await?;
    Ok(Json(ApiResponse::success(
        "Deleted",
        DeletedCategory { id },
        Some(Meta::empty()),
    )))
}
