use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::products::{DeleteImageRequest, ProductForm, ProductListQuery},
    error::{AppError, AppResult},
    models::{CategoryChoice, Product},
    pagination::Paginated,
    response::{ApiResponse, Meta},
    routes::fail_soft,
    services::product_service,
    state::AppState,
};

/// Five full-size photos plus the text fields.
pub const UPLOAD_BODY_LIMIT: usize = 25 * 1024 * 1024;

#[derive(Debug, Serialize, ToSchema)]
pub struct DeletedProduct {
    pub id: Uuid,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/choices", get(list_category_choices))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/{id}/images", delete(delete_product_image))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
}

#[utoipa::path(
    get,
    path = "/api/admin/products",
    params(
        ("page" = Option<u64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<u64>, Query, description = "Items per page, default 10"),
        ("search" = Option<String>, Query, description = "Name contains, case-insensitive"),
        ("category_id" = Option<Uuid>, Query, description = "Only this category"),
    ),
    responses(
        (status = 200, description = "Products, newest first", body = ApiResponse<Paginated<Product>>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Json<ApiResponse<Paginated<Product>>> {
    let request = query.page_request();
    let page = fail_soft(
        product_service::list_products(
            &state,
            request,
            query.search.as_deref(),
            query.category_id,
        )
        .await,
        "products",
    );
    let meta = Meta::for_page(&page, request.page_size);
    Json(ApiResponse::success("Products", page, Some(meta)))
}

#[utoipa::path(
    get,
    path = "/api/admin/products/choices",
    responses(
        (status = 200, description = "Categories for the product form", body = ApiResponse<Vec<CategoryChoice>>)
    ),
    tag = "Products"
)]
pub async fn list_category_choices(
    State(state): State<AppState>,
) -> Json<ApiResponse<Vec<CategoryChoice>>> {
    let items = fail_soft(
        product_service::list_categories_for_select(&state).await,
        "category choices",
    );
    Json(ApiResponse::success("Category choices", items, None))
}

#[utoipa::path(
    get,
    path = "/api/admin/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product", body = ApiResponse<Product>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let product = product_service::get_product_by_id(&state, id).await?;
    Ok(Json(ApiResponse::success("Product", product, None)))
}

#[utoipa::path(
    post,
    path = "/api/admin/products",
    request_body(content_type = "multipart/form-data", description = "name, description, price, quantity, quantityType, categoryId, info, details, images[]"),
    responses(
        (status = 201, description = "Product created", body = ApiResponse<Product>),
        (status = 400, description = "Invalid form"),
    ),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<Product>>)> {
    let form = read_product_form(multipart).await?;
    let product = product_service::create_product(&state, form).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Product created",
            product,
            Some(Meta::empty()),
        )),
    ))
}

#[utoipa::path(
    put,
    path = "/api/admin/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body(content_type = "multipart/form-data", description = "Product fields plus existingImages (JSON list of URLs to keep) and images[]"),
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<Product>),
        (status = 400, description = "Invalid form"),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<Product>>> {
    let form = read_product_form(multipart).await?;
    let product = product_service::update_product(&state, id, form).await?;
    Ok(Json(ApiResponse::success(
        "Product updated",
        product,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/admin/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deleted", body = ApiResponse<DeletedProduct>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<DeletedProduct>>> {
    product_service::delete_product(&state, id).await?;
    Ok(Json(ApiResponse::success(
        "Deleted",
        DeletedProduct { id },
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/admin/products/{id}/images",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = DeleteImageRequest,
    responses(
        (status = 200, description = "Image removed", body = ApiResponse<Product>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn delete_product_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DeleteImageRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let product = product_service::delete_product_image(&state, id, &payload.url).await?;
    Ok(Json(ApiResponse::success("Image removed", product, None)))
}

async fn read_product_form(mut multipart: Multipart) -> AppResult<ProductForm> {
    let mut form = ProductForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "images" || name == "images[]" {
            let file_name = field.file_name().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Read error: {e}")))?;
            form.push_image(file_name.as_deref(), bytes.to_vec());
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(format!("Read error: {e}")))?;
            form.set_text_field(&name, value)?;
        }
    }

    Ok(form)
}
