//! Service banner and health check endpoints

use axum::{routing::get, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};

use crate::api::route_not_found;
use crate::AppState;

/// Health check response with build identification
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    pub git_hash: String,
    pub build_timestamp: String,
    pub build_profile: String,
}

/// GET /
pub async fn banner() -> Json<Value> {
    Json(json!({
        "status": "success",
        "message": "Book Management API is running",
    }))
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "shelf-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: env!("GIT_HASH").to_string(),
        build_timestamp: env!("BUILD_TIMESTAMP").to_string(),
        build_profile: env!("BUILD_PROFILE").to_string(),
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(banner).fallback(route_not_found))
        .route("/health", get(health_check).fallback(route_not_found))
}
