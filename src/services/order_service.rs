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
use serde_json::Value;
use uuid::Uuid;

use crate::{
    details::{decode_selected_details, selected_details_from_json},
    dto::orders::{CreateOrderRequest, UpdateOrderRequest},
    entity::{
        categories::Column as CatCol,
        orders::{self, ActiveModel, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::{self, Column as ProdCol, Entity as Products},
        users::{Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    models::{
        Order, OrderCategory, OrderProduct, OrderRecord, OrderUser, ProductChoice, UserChoice,
    },
    pagination::{PageRequest, Paginated},
    revalidate::ViewPath,
    services::{checked_money, like_pattern, non_blank},
    state::AppState,
};

pub const DEFAULT_STATUS: &str = "checking order";

/// Conventional statuses offered by the admin UI; the column itself accepts any text.
pub const KNOWN_STATUSES: [&str; 5] = [
    "checking order",
    "confirmed",
    "shipped",
    "completed",
    "cancelled",
];

#[derive(Debug, FromQueryResult)]
struct OrderRow {
    id: Uuid,
    user_id: String,
    product_id: Option<Uuid>,
    quantity: i32,
    price: Decimal,
    status: String,
    selected_details: Json,
    created_at: DateTimeWithTimeZone,
    updated_at: DateTimeWithTimeZone,
    user_ref_id: Option<String>,
    user_number: Option<String>,
    user_address: Option<String>,
    product_ref_id: Option<Uuid>,
    product_name: Option<String>,
    product_price: Option<Decimal>,
    category_ref_id: Option<Uuid>,
    category_name: Option<String>,
}

/// A newest-first page of orders with their user, product, and category resolved.
///
/// `search` matches status, user number, user address, or product name; `user_id`
/// narrows to one user. Both may be combined.
pub async fn list_orders(
    state: &AppState,
    request: PageRequest,
    search: Option<&str>,
    user_id: Option<&str>,
) -> AppResult<Paginated<Order>> {
    let condition = order_filter(search, user_id);

    let total = joined()
        .filter(condition.clone())
        .count(&state.orm)
        .await?;

    let items = with_relations()
        .filter(condition)
        .order_by_desc(OrderCol::CreatedAt)
        .order_by_desc(OrderCol::Id)
        .limit(request.page_size)
        .offset(request.offset())
        .into_model::<OrderRow>()
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_row)
        .collect();

    Ok(Paginated::new(items, total, request))
}

pub async fn get_order_by_id(state: &AppState, id: Uuid) -> AppResult<Order> {
    with_relations()
        .filter(OrderCol::Id.eq(id))
        .into_model::<OrderRow>()
        .one(&state.orm)
        .await?
        .map(order_from_row)
        .ok_or(AppError::NotFound("Order"))
}

/// Record an order. Foreign keys are checked by the store, not here.
pub async fn create_order(state: &AppState, payload: CreateOrderRequest) -> AppResult<OrderRecord> {
    if payload.user_id.trim().is_empty() {
        return Err(AppError::BadRequest("User is required".into()));
    }
    validate_quantity(payload.quantity)?;
    let price = checked_money(payload.price)?;
    let selected_details = selected_details(payload.selected_details.unwrap_or(Value::Null))?;

    let order = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(payload.user_id),
        product_id: Set(Some(payload.product_id)),
        quantity: Set(payload.quantity),
        price: Set(price),
        status: Set(non_blank(payload.status).unwrap_or_else(|| DEFAULT_STATUS.to_string())),
        selected_details: Set(Json::Object(selected_details)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(map_write_err)?;

    tracing::info!(order_id = %order.id, user_id = %order.user_id, "order created");
    state.views.revalidate(ViewPath::Orders);

    Ok(record_from_entity(order))
}

/// Apply only the supplied fields; `updated_at` always moves.
pub async fn update_order(
    state: &AppState,
    id: Uuid,
    payload: UpdateOrderRequest,
) -> AppResult<OrderRecord> {
    let existing = Orders::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(o) => o,
        None => return Err(AppError::NotFound("Order")),
    };

    let mut active: ActiveModel = existing.into();
    if let Some(quantity) = payload.quantity {
        validate_quantity(quantity)?;
        active.quantity = Set(quantity);
    }
    if let Some(price) = payload.price {
        active.price = Set(checked_money(price)?);
    }
    if let Some(status) = non_blank(payload.status) {
        active.status = Set(status);
    }
    if let Some(details) = payload.selected_details {
        active.selected_details = Set(Json::Object(selected_details(details)?));
    }
    active.updated_at = Set(Utc::now().into());

    let order = active.update(&state.orm).await.map_err(map_write_err)?;

    tracing::info!(order_id = %order.id, status = %order.status, "order updated");
    state.views.revalidate(ViewPath::Orders);

    Ok(record_from_entity(order))
}

/// Delete by id. Deleting an id that is already gone still succeeds.
pub async fn delete_order(state: &AppState, id: Uuid) -> AppResult<()> {
    let result = Orders::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        tracing::debug!(order_id = %id, "order already absent");
    } else {
        tracing::info!(order_id = %id, "order deleted");
    }
    state.views.revalidate(ViewPath::Orders);
    Ok(())
}

/// User choices for order forms, oldest account first.
pub async fn list_users_for_select(state: &AppState) -> AppResult<Vec<UserChoice>> {
    let users = Users::find()
        .select_only()
        .columns([UserCol::Id, UserCol::Number])
        .order_by_asc(UserCol::CreatedAt)
        .into_tuple::<(String, Option<String>)>()
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(id, number)| UserChoice { id, number })
        .collect();
    Ok(users)
}

/// Product choices for order forms, alphabetical.
pub async fn list_products_for_select(state: &AppState) -> AppResult<Vec<ProductChoice>> {
    let products = Products::find()
        .select_only()
        .columns([ProdCol::Id, ProdCol::Name, ProdCol::Price])
        .order_by_asc(ProdCol::Name)
        .into_tuple::<(Uuid, String, Decimal)>()
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(id, name, price)| ProductChoice { id, name, price })
        .collect();
    Ok(products)
}

fn joined() -> Select<Orders> {
    Orders::find()
        .join(JoinType::LeftJoin, orders::Relation::Users.def())
        .join(JoinType::LeftJoin, orders::Relation::Products.def())
        .join(JoinType::LeftJoin, products::Relation::Categories.def())
}

fn with_relations() -> Select<Orders> {
    joined()
        .column_as(UserCol::Id, "user_ref_id")
        .column_as(UserCol::Number, "user_number")
        .column_as(UserCol::Address, "user_address")
        .column_as(ProdCol::Id, "product_ref_id")
        .column_as(ProdCol::Name, "product_name")
        .column_as(ProdCol::Price, "product_price")
        .column_as(CatCol::Id, "category_ref_id")
        .column_as(CatCol::Name, "category_name")
}

fn order_filter(search: Option<&str>, user_id: Option<&str>) -> Condition {
    let mut condition = Condition::all();
    if let Some(user_id) = user_id.filter(|u| !u.is_empty()) {
        condition = condition.add(OrderCol::UserId.eq(user_id));
    }
    if let Some(pattern) = search.and_then(like_pattern) {
        condition = condition.add(
            Condition::any()
                .add(Expr::col((Orders, OrderCol::Status)).ilike(pattern.clone()))
                .add(Expr::col((Users, UserCol::Number)).ilike(pattern.clone()))
                .add(Expr::col((Users, UserCol::Address)).ilike(pattern.clone()))
                .add(Expr::col((Products, ProdCol::Name)).ilike(pattern)),
        );
    }
    condition
}

fn validate_quantity(quantity: i32) -> AppResult<()> {
    if quantity < 1 {
        return Err(AppError::BadRequest("Quantity must be at least 1".into()));
    }
    Ok(())
}

fn selected_details(value: Value) -> AppResult<serde_json::Map<String, Value>> {
    decode_selected_details(value)
        .map_err(|err| AppError::BadRequest(format!("Invalid selected details: {err}")))
}

fn map_write_err(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
            AppError::BadRequest("Referenced user or product does not exist".into())
        }
        _ => err.into(),
    }
}

fn order_from_row(row: OrderRow) -> Order {
    let user = match row.user_ref_id {
        Some(id) => OrderUser {
            id,
            number: row.user_number,
            address: row.user_address,
        },
        None => OrderUser::placeholder(),
    };

    let product = match (row.product_ref_id, row.product_name, row.product_price) {
        (Some(id), Some(name), Some(price)) => OrderProduct {
            id: id.to_string(),
            name,
            price,
            category: match (row.category_ref_id, row.category_name) {
                (Some(id), Some(name)) => Some(OrderCategory { id, name }),
                _ => None,
            },
        },
        _ => OrderProduct::placeholder(),
    };

    Order {
        id: row.id,
        user_id: row.user_id,
        product_id: row.product_id,
        quantity: row.quantity,
        price: row.price,
        status: row.status,
        selected_details: selected_details_from_json(row.selected_details),
        created_at: row.created_at.with_timezone(&Utc),
        updated_at: row.updated_at.with_timezone(&Utc),
        user,
        product,
    }
}

fn record_from_entity(model: OrderModel) -> OrderRecord {
    OrderRecord {
        id: model.id,
        user_id: model.user_id,
        product_id: model.product_id,
        quantity: model.quantity,
        price: model.price,
        status: model.status,
        selected_details: selected_details_from_json(model.selected_details),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row() -> OrderRow {
        OrderRow {
            id: Uuid::new_v4(),
            user_id: "user-1".into(),
            product_id: None,
            quantity: 2,
            price: Decimal::new(1999, 2),
            status: "shipped".into(),
            selected_details: json!({"Size": "M"}),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
            user_ref_id: None,
            user_number: None,
            user_address: None,
            product_ref_id: None,
            product_name: None,
            product_price: None,
            category_ref_id: None,
            category_name: None,
        }
    }

    #[test]
    fn missing_relations_become_placeholders() {
        let order = order_from_row(row());
        assert_eq!(order.user, OrderUser::placeholder());
        assert_eq!(order.product.name, "Unknown Product");
        assert_eq!(order.product.price, Decimal::ZERO);
        assert_eq!(order.product.id, "");
        assert!(order.product.category.is_none());
        assert_eq!(order.price.to_string(), "19.99");
        assert_eq!(order.selected_details.get("Size"), Some(&json!("M")));
    }

    #[test]
    fn resolved_relations_are_nested() {
        let product_id = Uuid::new_v4();
        let category_id = Uuid::new_v4();
        let order = order_from_row(OrderRow {
            product_id: Some(product_id),
            user_ref_id: Some("user-1".into()),
            user_number: Some("+62 811".into()),
            product_ref_id: Some(product_id),
            product_name: Some("Ferris Mug".into()),
            product_price: Some(Decimal::new(1200, 2)),
            category_ref_id: Some(category_id),
            category_name: Some("Mugs".into()),
            ..row()
        });
        assert_eq!(order.user.id, "user-1");
        assert_eq!(order.user.number.as_deref(), Some("+62 811"));
        assert!(order.user.address.is_none());
        assert_eq!(order.product.id, product_id.to_string());
        assert_eq!(order.product.name, "Ferris Mug");
        assert_eq!(
            order.product.category,
            Some(OrderCategory {
                id: category_id,
                name: "Mugs".into()
            })
        );
    }

    #[test]
    fn uncategorized_product_has_no_category() {
        let product_id = Uuid::new_v4();
        let order = order_from_row(OrderRow {
            product_ref_id: Some(product_id),
            product_name: Some("Sticker".into()),
            product_price: Some(Decimal::ONE),
            ..row()
        });
        assert_eq!(order.product.name, "Sticker");
        assert!(order.product.category.is_none());
    }

    #[test]
    fn quantity_and_price_are_checked() {
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(1).is_ok());
        assert!(checked_money(Decimal::new(-1, 0)).is_err());
        assert!(checked_money(Decimal::ZERO).is_ok());
        assert!(matches!(
            checked_money(Decimal::from(1_000_000_000)),
            Err(AppError::BadRequest(_))
        ));
        assert_eq!(checked_money(Decimal::new(12346, 3)).unwrap().to_string(), "12.35");
    }

    #[test]
    fn selected_details_reject_non_objects() {
        assert!(selected_details(json!(["M"])).is_err());
        assert!(selected_details(Value::Null).unwrap().is_empty());
    }

    #[test]
    fn default_status_is_a_known_status() {
        assert!(KNOWN_STATUSES.contains(&DEFAULT_STATUS));
    }
}
