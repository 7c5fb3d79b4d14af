use axum::{http::StatusCode, response::Json};
use serde::Serialize;
use std::sync::Arc;

use crate::store::StoreError;

pub type AppState<S> = Arc<S>;

pub type ApiError = (StatusCode, Json<ErrorResponse>);
pub type ApiResult<T> = Result<Json<T>, ApiError>;

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Error body shared by every endpoint
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str) -> Self {
        Self {
            success: false,
            error: error.to_string(),
            message: message.to_string(),
        }
    }
}

pub fn api_error(status: StatusCode, error: &str, message: &str) -> ApiError {
    (status, Json(ErrorResponse::new(error, message)))
}

pub fn not_found(error: &str, message: &str) -> ApiError {
    api_error(StatusCode::NOT_FOUND, error, message)
}

pub fn bad_request(error: &str, message: &str) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, error, message)
}

/// Map a store failure to a response. Invalid updates are the client's
/// fault; everything else is logged and reported as a server error.
pub fn store_failure(e: StoreError, error: &str, message: &str) -> ApiError {
    match e {
        StoreError::InvalidUpdate(detail) => {
            log::warn!("{}: {}", error, detail);
            api_error(StatusCode::BAD_REQUEST, "INVALID_UPDATE", &detail)
        }
        other => {
            log::error!("{}: {}", error, other);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, error, message)
        }
    }
}
