//! Error types for shelf-api
//!
//! Every error leaves the service as the uniform envelope
//! `{"status": false, "statusCode": <code>, "message": <text>}` with the
//! HTTP status line set to the same code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use shelf_common::ImportError;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Internal server error (500)
    #[error("{0}")]
    Internal(String),

    /// Structural CSV failure (400)
    #[error(transparent)]
    Import(#[from] ImportError),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::Import(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) | ApiError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!("{}", message);
        } else {
            tracing::debug!("Request rejected ({}): {}", status.as_u16(), message);
        }

        let body = Json(json!({
            "status": false,
            "statusCode": status.as_u16(),
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
