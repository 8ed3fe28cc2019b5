use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    Condition, EntityTrait, FromQueryResult, JoinType, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Select,
};

use crate::{
    entity::{
        orders::{Column as OrderCol, Entity as Orders},
        users::{self, Column as UserCol, Entity as Users},
    },
    error::AppResult,
    models::{User, UserPage},
    pagination::PageRequest,
    services::like_pattern,
    state::AppState,
};

#[derive(Debug, FromQueryResult)]
struct UserRow {
    id: String,
    number: Option<String>,
    address: Option<String>,
    created_at: DateTimeWithTimeZone,
    updated_at: DateTimeWithTimeZone,
    order_count: i64,
}

/// Every user with a live count of their orders, oldest account first.
pub async fn list_users(state: &AppState) -> AppResult<Vec<User>> {
    let rows = with_order_count()
        .order_by_asc(UserCol::CreatedAt)
        .into_model::<UserRow>()
        .all(&state.orm)
        .await?;
    Ok(rows.into_iter().map(user_from_row).collect())
}

/// A page of users, oldest first, optionally narrowed by number or address.
pub async fn list_users_paginated(
    state: &AppState,
    request: PageRequest,
    search: Option<&str>,
) -> AppResult<UserPage> {
    let mut condition = Condition::all();
    if let Some(pattern) = search.and_then(like_pattern) {
        condition = condition.add(
            Condition::any()
                .add(Expr::col((Users, UserCol::Number)).ilike(pattern.clone()))
                .add(Expr::col((Users, UserCol::Address)).ilike(pattern)),
        );
    }

    let total_count = Users::find()
        .filter(condition.clone())
        .count(&state.orm)
        .await?;

    let items = with_order_count()
        .filter(condition)
        .order_by_asc(UserCol::CreatedAt)
        .order_by_asc(UserCol::Id)
        .limit(request.page_size)
        .offset(request.offset())
        .into_model::<UserRow>()
        .all(&state.orm)
        .await?
        .into_iter()
        .map(user_from_row)
        .collect();

    Ok(UserPage { items, total_count })
}

fn with_order_count() -> Select<Users> {
    Users::find()
        .column_as(Expr::col((Orders, OrderCol::Id)).count(), "order_count")
        .join(JoinType::LeftJoin, users::Relation::Orders.def())
        .group_by(UserCol::Id)
}

fn user_from_row(row: UserRow) -> User {
    User {
        id: row.id,
        number: row.number,
        address: row.address,
        created_at: row.created_at.with_timezone(&Utc),
        updated_at: row.updated_at.with_timezone(&Utc),
        order_count: row.order_count,
    }
}
