use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbErr, EntityTrait, FromQueryResult, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Set, SqlErr,
};
use uuid::Uuid;

use crate::{
    dto::categories::{CreateCategoryRequest, UpdateCategoryRequest},
    entity::{
        categories::{self, ActiveModel, Column as CatCol, Entity as Categories},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    models::Category,
    revalidate::ViewPath,
    services::{like_pattern, non_blank},
    state::AppState,
};

pub const DUPLICATE_NAME: &str = "Category name already exists";
pub const HAS_PRODUCTS: &str = "Cannot delete category with existing products";
pub const NAME_REQUIRED: &str = "Category name is required";

#[derive(Debug, FromQueryResult)]
struct CategoryRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    created_at: DateTimeWithTimeZone,
    updated_at: DateTimeWithTimeZone,
    product_count: i64,
}

/// All categories with a live count of the products that reference them, newest first.
pub async fn list_categories(state: &AppState) -> AppResult<Vec<Category>> {
    let rows = with_product_count()
        .order_by_desc(CatCol::CreatedAt)
        .into_model::<CategoryRow>()
        .all(&state.orm)
        .await?;
    Ok(rows.into_iter().map(category_from_row).collect())
}

/// Categories whose name or description contains `term`, ignoring case.
/// A blank term lists everything.
pub async fn search_categories(state: &AppState, term: &str) -> AppResult<Vec<Category>> {
    let pattern = match like_pattern(term) {
        Some(p) => p,
        None => return list_categories(state).await,
    };

    let rows = with_product_count()
        .filter(
            Condition::any()
                .add(Expr::col((Categories, CatCol::Name)).ilike(pattern.clone()))
                .add(Expr::col((Categories, CatCol::Description)).ilike(pattern)),
        )
        .order_by_desc(CatCol::CreatedAt)
        .into_model::<CategoryRow>()
        .all(&state.orm)
        .await?;
    Ok(rows.into_iter().map(category_from_row).collect())
}

pub async fn get_category_by_id(state: &AppState, id: Uuid) -> AppResult<Category> {
    with_product_count()
        .filter(CatCol::Id.eq(id))
        .into_model::<CategoryRow>()
        .one(&state.orm)
        .await?
        .map(category_from_row)
        .ok_or(AppError::NotFound("Category"))
}

pub async fn create_category(
    state: &AppState,
    payload: CreateCategoryRequest,
) -> AppResult<Category> {
    let name = required_name(&payload.name)?;

    // Exact, case-sensitive match; the unique index backs this up under races.
    let existing = Categories::find()
        .filter(CatCol::Name.eq(name.clone()))
        .one(&state.orm)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(DUPLICATE_NAME.into()));
    }

    let category = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        description: Set(non_blank(payload.description)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(map_write_err)?;

    tracing::info!(category_id = %category.id, name = %category.name, "category created");
    state.views.revalidate(ViewPath::Categories);

    Ok(Category {
        id: category.id,
        name: category.name,
        description: category.description,
        created_at: category.created_at.with_timezone(&Utc),
        updated_at: category.updated_at.with_timezone(&Utc),
        product_count: 0,
    })
}

pub async fn update_category(
    state: &AppState,
    id: Uuid,
    payload: UpdateCategoryRequest,
) -> AppResult<Category> {
    let name = required_name(&payload.name)?;

    let existing = Categories::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(c) => c,
        None => return Err(AppError::NotFound("Category")),
    };

    let clash = Categories::find()
        .filter(
            Condition::all()
                .add(CatCol::Name.eq(name.clone()))
                .add(CatCol::Id.ne(id)),
        )
        .one(&state.orm)
        .await?;
    if clash.is_some() {
        return Err(AppError::Conflict(DUPLICATE_NAME.into()));
    }

    let mut active: ActiveModel = existing.into();
    active.name = Set(name);
    active.description = Set(non_blank(payload.description));
    active.updated_at = Set(Utc::now().into());
    active.update(&state.orm).await.map_err(map_write_err)?;

    tracing::info!(category_id = %id, "category updated");
    state.views.revalidate(ViewPath::Categories);

    get_category_by_id(state, id).await
}

/// Delete a category that no product references.
pub async fn delete_category(state: &AppState, id: Uuid) -> AppResult<()> {
    let dependents = Products::find()
        .filter(ProdCol::CategoryId.eq(id))
        .count(&state.orm)
        .await?;
    if dependents > 0 {
        return Err(AppError::Conflict(HAS_PRODUCTS.into()));
    }

    let result = Categories::delete_by_id(id)
        .exec(&state.orm)
        .await
        .map_err(map_write_err)?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Category"));
    }

    tracing::info!(category_id = %id, "category deleted");
    state.views.revalidate(ViewPath::Categories);
    Ok(())
}

fn with_product_count() -> Select<Categories> {
    Categories::find()
        .column_as(Expr::col((Products, ProdCol::Id)).count(), "product_count")
        .join(JoinType::LeftJoin, categories::Relation::Products.def())
        .group_by(CatCol::Id)
}

fn required_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest(NAME_REQUIRED.into()));
    }
    Ok(name.to_string())
}

/// Constraint violations that slipped past the pre-checks surface as the same conflicts.
fn map_write_err(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Conflict(DUPLICATE_NAME.into()),
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => AppError::Conflict(HAS_PRODUCTS.into()),
        _ => err.into(),
    }
}

fn category_from_row(row: CategoryRow) -> Category {
    Category {
        id: row.id,
        name: row.name,
        description: row.description,
        created_at: row.created_at.with_timezone(&Utc),
        updated_at: row.updated_at.with_timezone(&Utc),
        product_count: row.product_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed_and_required() {
        assert_eq!(required_name("  Shoes ").unwrap(), "Shoes");
        assert!(matches!(required_name("   "), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn unrelated_store_errors_pass_through() {
        let err = map_write_err(DbErr::Custom("connection reset".into()));
        assert!(matches!(err, AppError::OrmError(_)));
    }
}
