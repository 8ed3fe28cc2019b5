use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::response::{ApiResponse, Meta};
use crate::storage::BlobError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error")]
    DbError(#[from] sqlx::Error),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Storage error")]
    Blob(#[from] BlobError),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::DbError(_)
            | AppError::OrmError(_)
            | AppError::Blob(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True for store, storage, and other failures the caller cannot fix by changing input.
    pub fn is_infrastructure(&self) -> bool {
        self.status().is_server_error()
    }
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.is_infrastructure() {
            tracing::error!(error = ?self, "request failed");
        }

        let message = self.to_string();
        let body = ApiResponse {
            success: false,
            message: message.clone(),
            data: Some(ErrorData { error: message }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_human_readable() {
        assert_eq!(AppError::NotFound("Product").to_string(), "Product not found");
        assert_eq!(
            AppError::Conflict("Category name already exists".into()).to_string(),
            "Category name already exists"
        );
    }

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(AppError::NotFound("Order").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::BadRequest("Name and price are required".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        let db = AppError::OrmError(sea_orm::DbErr::Custom("boom".into()));
        assert_eq!(db.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(db.is_infrastructure());
        assert_eq!(db.to_string(), "ORM error");
        assert!(AppError::from(sqlx::Error::PoolTimedOut).is_infrastructure());
    }
}
