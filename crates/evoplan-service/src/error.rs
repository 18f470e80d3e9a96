use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use evoplan_core::EvoError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not Found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Internal Server Error: {0}")]
    Any(#[from] anyhow::Error),
}

impl From<EvoError> for AppError {
    fn from(e: EvoError) -> Self {
        match e {
            EvoError::Validation(msg) => AppError::Validation(msg),
            EvoError::Infeasible(msg) => AppError::Conflict(msg),
            other => AppError::Any(anyhow::anyhow!(other)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            AppError::Validation(s) => (StatusCode::BAD_REQUEST, s),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Resource not found".to_string()),
            AppError::Conflict(s) => (StatusCode::CONFLICT, s),
            AppError::Serde(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::Any(e) => {
                tracing::error!("Internal Error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": msg }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
