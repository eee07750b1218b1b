//! HTTP API handlers for shelf-api

pub mod books;
pub mod envelope;
pub mod health;
pub mod import;

pub use books::book_routes;
pub use envelope::Envelope;
pub use health::health_routes;
pub use import::import_routes;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// Fallback for unknown routes
pub async fn route_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "status": "error",
            "message": "Route not found",
        })),
    )
}
