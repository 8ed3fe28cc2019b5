use axum::Router;

use crate::{error::AppResult, state::AppState};

pub mod categories;
pub mod doc;
pub mod events;
pub mod health;
pub mod orders;
pub mod params;
pub mod products;
pub mod users;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    let admin = Router::new()
        .nest("/categories", categories::router())
        .nest("/products", products::router())
        .nest("/orders", orders::router())
        .nest("/users", users::router())
        .nest("/events", events::router());

    Router::new().nest("/admin", admin)
}

/// Listings render "no data" instead of failing the page; the cause is logged.
pub(crate) fn fail_soft<T: Default>(result: AppResult<T>, what: &str) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            tracing::error!(error = ?err, "failed to fetch {what}");
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::pagination::Paginated;

    #[test]
    fn fail_soft_keeps_values_and_swallows_errors() {
        assert_eq!(fail_soft(Ok(vec![1, 2]), "numbers"), vec![1, 2]);

        let page: Paginated<u8> = fail_soft(
            Err(AppError::OrmError(sea_orm::DbErr::Custom("down".into()))),
            "products",
        );
        assert_eq!(page.total_count, 0);
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.current_page, 1);
    }
}
