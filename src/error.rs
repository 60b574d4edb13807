use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("no jokes for category {0}")]
    CategoryNotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<rusqlite::Error> for AppError {
    fn from(error: rusqlite::Error) -> Self {
        AppError::Storage(error.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            // The jokebook contract reports unknown categories in a 200 body.
            AppError::CategoryNotFound { .. } => StatusCode::OK,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
