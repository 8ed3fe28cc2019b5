use std::str::FromStr;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::prelude::{DateTimeWithTimeZone, Json};
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbErr, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Set, SqlErr,
};
use uuid::Uuid;

use crate::{
    details::{
        DetailField, decode_detail_fields, decode_image_list, detail_fields_from_json,
        images_from_json,
    },
    dto::products::{ImageUpload, ProductForm},
    entity::{
        categories::{Column as CatCol, Entity as Categories},
        products::{self, ActiveModel, Column as ProdCol, Entity as Products, QuantityType},
    },
    error::{AppError, AppResult},
    models::{CategoryChoice, Product},
    pagination::{PageRequest, Paginated},
    revalidate::ViewPath,
    services::{checked_money, like_pattern, non_blank},
    state::AppState,
};

pub const MAX_IMAGES: usize = 5;
pub const NAME_AND_PRICE_REQUIRED: &str = "Name and price are required";

#[derive(Debug, FromQueryResult)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    price: Decimal,
    quantity: i32,
    quantity_type: QuantityType,
    category_id: Option<Uuid>,
    category_name: Option<String>,
    images: Json,
    info: String,
    details: Json,
    created_at: DateTimeWithTimeZone,
    updated_at: DateTimeWithTimeZone,
}

/// A newest-first page of products, optionally narrowed by a name substring and a category.
pub async fn list_products(
    state: &AppState,
    request: PageRequest,
    search: Option<&str>,
    category_id: Option<Uuid>,
) -> AppResult<Paginated<Product>> {
    let mut condition = Condition::all();
    if let Some(pattern) = search.and_then(like_pattern) {
        condition = condition.add(Expr::col((Products, ProdCol::Name)).ilike(pattern));
    }
    if let Some(category_id) = category_id {
        condition = condition.add(ProdCol::CategoryId.eq(category_id));
    }

    let total = Products::find()
        .filter(condition.clone())
        .count(&state.orm)
        .await?;

    let items = with_category()
        .filter(condition)
        .order_by_desc(ProdCol::CreatedAt)
        .order_by_desc(ProdCol::Id)
        .limit(request.page_size)
        .offset(request.offset())
        .into_model::<ProductRow>()
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_row)
        .collect();

    Ok(Paginated::new(items, total, request))
}

pub async fn get_product_by_id(state: &AppState, id: Uuid) -> AppResult<Product> {
    with_category()
        .filter(ProdCol::Id.eq(id))
        .into_model::<ProductRow>()
        .one(&state.orm)
        .await?
        .map(product_from_row)
        .ok_or(AppError::NotFound("Product"))
}

/// Category choices for product forms, alphabetical.
pub async fn list_categories_for_select(state: &AppState) -> AppResult<Vec<CategoryChoice>> {
    let categories = Categories::find()
        .order_by_asc(CatCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|c| CategoryChoice {
            id: c.id,
            name: c.name,
            description: c.description,
        })
        .collect();
    Ok(categories)
}

pub async fn create_product(state: &AppState, form: ProductForm) -> AppResult<Product> {
    let (name, price) = validate(&form)?;
    let details = details_to_json(lenient_details(form.details.as_deref()))?;

    let images = upload_all(state, uploads_that_fit(0, &form.images)).await?;

    let inserted = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        description: Set(non_blank(form.description)),
        price: Set(price),
        quantity: Set(form.quantity),
        quantity_type: Set(form.quantity_type.unwrap_or_default()),
        category_id: Set(form.category_id),
        images: Set(Json::from(images.clone())),
        info: Set(form.info.unwrap_or_default()),
        details: Set(details),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await;

    let product = match inserted {
        Ok(p) => p,
        Err(err) => {
            discard_blobs(state, &images).await;
            return Err(map_write_err(err));
        }
    };

    tracing::info!(product_id = %product.id, images = images.len(), "product created");
    state.views.revalidate(ViewPath::Products);

    get_product_by_id(state, product.id).await
}

/// Replace a product's fields. Images are the caller's kept URLs followed by new
/// uploads, never more than `MAX_IMAGES`.
pub async fn update_product(state: &AppState, id: Uuid, form: ProductForm) -> AppResult<Product> {
    let (name, price) = validate(&form)?;

    let existing = Products::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound("Product")),
    };

    let details = details_to_json(lenient_details(form.details.as_deref()))?;
    let mut images = kept_images(
        lenient_existing_images(form.existing_images.as_deref()),
        &images_from_json(&existing.images),
    );
    images.truncate(MAX_IMAGES);

    let uploaded = upload_all(state, uploads_that_fit(images.len(), &form.images)).await?;
    images.extend(uploaded.iter().cloned());

    let mut active: ActiveModel = existing.into();
    active.name = Set(name);
    active.description = Set(non_blank(form.description));
    active.price = Set(price);
    active.quantity = Set(form.quantity);
    active.quantity_type = Set(form.quantity_type.unwrap_or_default());
    active.category_id = Set(form.category_id);
    active.images = Set(Json::from(images));
    active.info = Set(form.info.unwrap_or_default());
    active.details = Set(details);
    active.updated_at = Set(Utc::now().into());

    if let Err(err) = active.update(&state.orm).await {
        discard_blobs(state, &uploaded).await;
        return Err(map_write_err(err));
    }

    tracing::info!(product_id = %id, new_images = uploaded.len(), "product updated");
    state.views.revalidate(ViewPath::Products);

    get_product_by_id(state, id).await
}

/// Delete a product and, best-effort, every image it owns. Image cleanup never
/// blocks the row deletion.
pub async fn delete_product(state: &AppState, id: Uuid) -> AppResult<()> {
    let product = Products::find_by_id(id).one(&state.orm).await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFound("Product")),
    };

    discard_blobs(state, &images_from_json(&product.images)).await;

    let result = Products::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Product"));
    }

    tracing::info!(product_id = %id, "product deleted");
    state.views.revalidate(ViewPath::Products);
    state.views.revalidate(ViewPath::Orders);
    Ok(())
}

/// Drop one image URL from a product. Removing a URL that is not listed is a no-op
/// on the list and leaves the content store alone.
pub async fn delete_product_image(
    state: &AppState,
    product_id: Uuid,
    image_url: &str,
) -> AppResult<Product> {
    let product = Products::find_by_id(product_id).one(&state.orm).await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFound("Product")),
    };

    let mut images = images_from_json(&product.images);
    let before = images.len();
    images.retain(|url| url != image_url);
    if images.len() != before {
        discard_blobs(state, &[image_url.to_string()]).await;
    }

    let mut active: ActiveModel = product.into();
    active.images = Set(Json::from(images));
    active.updated_at = Set(Utc::now().into());
    active.update(&state.orm).await?;

    tracing::info!(product_id = %product_id, url = %image_url, "product image removed");
    state.views.revalidate(ViewPath::Products);

    get_product_by_id(state, product_id).await
}

fn with_category() -> Select<Products> {
    Products::find()
        .column_as(CatCol::Name, "category_name")
        .join(JoinType::LeftJoin, products::Relation::Categories.def())
}

fn validate(form: &ProductForm) -> AppResult<(String, Decimal)> {
    let name = form.name.trim();
    let price = form.price.trim();
    if name.is_empty() || price.is_empty() {
        return Err(AppError::BadRequest(NAME_AND_PRICE_REQUIRED.into()));
    }
    Ok((name.to_string(), parse_price(price)?))
}

pub(crate) fn parse_price(raw: &str) -> AppResult<Decimal> {
    let price = Decimal::from_str(raw.trim())
        .map_err(|_| AppError::BadRequest("Price must be a decimal number".into()))?;
    checked_money(price)
}

fn lenient_details(raw: Option<&str>) -> Vec<DetailField> {
    match decode_detail_fields(raw.unwrap_or_default()) {
        Ok(fields) => fields,
        Err(err) => {
            tracing::warn!(error = %err, "invalid details document, storing no detail fields");
            Vec::new()
        }
    }
}

fn lenient_existing_images(raw: Option<&str>) -> Vec<String> {
    match decode_image_list(raw.unwrap_or_default()) {
        Ok(urls) => urls,
        Err(err) => {
            tracing::warn!(error = %err, "invalid existing images document, keeping none");
            Vec::new()
        }
    }
}

fn details_to_json(details: Vec<DetailField>) -> AppResult<Json> {
    serde_json::to_value(details).map_err(|err| AppError::Internal(err.into()))
}

/// The requested URLs this product actually owns, in request order, without repeats.
fn kept_images(requested: Vec<String>, stored: &[String]) -> Vec<String> {
    let mut kept: Vec<String> = Vec::with_capacity(requested.len());
    for url in requested {
        if !stored.contains(&url) {
            tracing::warn!(url = %url, "ignoring kept image the product does not own");
            continue;
        }
        if !kept.contains(&url) {
            kept.push(url);
        }
    }
    kept
}

/// The non-empty uploads that still fit next to `kept` images.
fn uploads_that_fit(kept: usize, uploads: &[ImageUpload]) -> Vec<&ImageUpload> {
    uploads
        .iter()
        .filter(|upload| !upload.bytes.is_empty())
        .take(MAX_IMAGES.saturating_sub(kept))
        .collect()
}

/// Upload in order; if one fails, the earlier ones are removed again.
async fn upload_all(state: &AppState, uploads: Vec<&ImageUpload>) -> AppResult<Vec<String>> {
    let mut urls = Vec::with_capacity(uploads.len());
    for upload in uploads {
        match state
            .blobs
            .store(&upload.file_name, upload.bytes.clone())
            .await
        {
            Ok(url) => urls.push(url),
            Err(err) => {
                tracing::error!(error = %err, file = %upload.file_name, "image upload failed");
                discard_blobs(state, &urls).await;
                return Err(err.into());
            }
        }
    }
    Ok(urls)
}

async fn discard_blobs(state: &AppState, urls: &[String]) {
    for url in urls {
        if let Err(err) = state.blobs.delete(url).await {
            tracing::warn!(error = %err, url = %url, "failed to delete image");
        }
    }
}

fn map_write_err(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
            AppError::BadRequest("Category does not exist".into())
        }
        _ => err.into(),
    }
}

fn product_from_row(row: ProductRow) -> Product {
    Product {
        id: row.id,
        name: row.name,
        description: row.description,
        price: row.price,
        quantity: row.quantity,
        quantity_type: row.quantity_type,
        category_id: row.category_id,
        category_name: row.category_name,
        images: images_from_json(&row.images),
        info: row.info,
        details: detail_fields_from_json(&row.details),
        created_at: row.created_at.with_timezone(&Utc),
        updated_at: row.updated_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str, len: usize) -> ImageUpload {
        ImageUpload {
            file_name: name.to_string(),
            bytes: vec![7; len],
        }
    }

    #[test]
    fn name_and_price_are_required() {
        let mut form = ProductForm {
            name: "Mug".into(),
            price: "  ".into(),
            ..Default::default()
        };
        assert!(matches!(
            validate(&form),
            Err(AppError::BadRequest(msg)) if msg == NAME_AND_PRICE_REQUIRED
        ));

        form.name = " ".into();
        form.price = "12.50".into();
        assert!(validate(&form).is_err());

        form.name = " Mug ".into();
        let (name, price) = validate(&form).unwrap();
        assert_eq!(name, "Mug");
        assert_eq!(price.to_string(), "12.50");
    }

    #[test]
    fn prices_are_exact_decimals() {
        assert_eq!(parse_price("19.999").unwrap().to_string(), "20.00");
        assert_eq!(parse_price("0").unwrap(), Decimal::ZERO);
        assert!(parse_price("abc").is_err());
        assert!(parse_price("-1").is_err());
        assert!(parse_price("100000000").is_err());
        assert_eq!(parse_price("99999999.994").unwrap().to_string(), "99999999.99");
        assert!(parse_price("99999999.999").is_err());
    }

    #[test]
    fn only_owned_images_can_be_kept() {
        let stored = vec!["/uploads/a".to_string(), "/uploads/b".to_string()];
        let requested = vec![
            "/uploads/b".to_string(),
            "/uploads/other-product".to_string(),
            "/uploads/a".to_string(),
            "/uploads/b".to_string(),
        ];
        assert_eq!(kept_images(requested, &stored), ["/uploads/b", "/uploads/a"]);
        assert!(kept_images(Vec::new(), &stored).is_empty());
    }

    #[test]
    fn create_takes_at_most_five_non_empty_uploads() {
        let uploads: Vec<ImageUpload> = (0..8)
            .map(|i| upload(&format!("{i}.png"), if i == 1 { 0 } else { 3 }))
            .collect();
        let fit = uploads_that_fit(0, &uploads);
        let names: Vec<&str> = fit.iter().map(|u| u.file_name.as_str()).collect();
        assert_eq!(names, ["0.png", "2.png", "3.png", "4.png", "5.png"]);
    }

    #[test]
    fn update_fills_only_the_remaining_slots() {
        let uploads = vec![upload("a.png", 1), upload("b.png", 1)];
        assert_eq!(uploads_that_fit(2, &uploads).len(), 2);
        assert_eq!(uploads_that_fit(4, &uploads).len(), 1);
        assert!(uploads_that_fit(5, &uploads).is_empty());
        assert!(uploads_that_fit(7, &uploads).is_empty());
    }

    #[test]
    fn malformed_documents_degrade_to_empty_lists() {
        assert!(lenient_details(Some("{oops")).is_empty());
        assert!(lenient_details(None).is_empty());
        assert_eq!(
            lenient_details(Some(r#"[{"type":"text","label":"Name"}]"#)).len(),
            1
        );
        assert!(lenient_existing_images(Some("not json")).is_empty());
        assert_eq!(
            lenient_existing_images(Some(r#"["/uploads/a.png"]"#)),
            vec!["/uploads/a.png".to_string()]
        );
    }
}
