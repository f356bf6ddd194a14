use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use log::error;
use serde_json::json;

use crate::errors::AdminError;

/// Everything a handler can fail with, mapped to an HTTP status
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Admin(#[from] AdminError),

    #[error("missing or invalid token")]
    Unauthorized,

    #[error("insufficient privileges")]
    Forbidden,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<r2d2::Error> for ApiError {
    fn from(err: r2d2::Error) -> Self {
        ApiError::Internal(anyhow::Error::new(err).context("DB Connection Error"))
    }
}

fn internal(err: &anyhow::Error) -> Response {
    error!("Request failed: {err:?}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Database error" })),
    )
        .into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Admin(AdminError::Validation(fields)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": "Validation failed", "fields": fields })),
            )
                .into_response(),
            ApiError::Admin(AdminError::Conflict(message)) => {
                (StatusCode::CONFLICT, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Admin(AdminError::Referential { entity, dependents }) => (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": format!("Cannot delete {entity}: {dependents} dependent record(s) exist."),
                    "dependents": dependents,
                })),
            )
                .into_response(),
            ApiError::Admin(AdminError::NotFound(what)) | ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": format!("{what} not found") })),
            )
                .into_response(),
            ApiError::Admin(AdminError::Database(err)) | ApiError::Internal(err) => internal(&err),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Unauthorized" })),
            )
                .into_response(),
            ApiError::Forbidden => {
                (StatusCode::FORBIDDEN, Json(json!({ "error": "Forbidden" }))).into_response()
            }
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
        }
    }
}
