//! shelf-api library - book record service
//!
//! CRUD over book records plus bulk CSV import, served over HTTP and
//! backed by SQLite.

pub mod api;
pub mod db;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use sqlx::SqlitePool;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Pinned calendar year; `None` follows the wall clock
    fixed_year: Option<i32>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            fixed_year: None,
        }
    }

    /// State whose year-dependent validation uses `year` instead of the clock
    pub fn with_fixed_year(db: SqlitePool, year: i32) -> Self {
        Self {
            db,
            fixed_year: Some(year),
        }
    }

    /// Upper bound for published-year validation
    pub fn current_year(&self) -> i32 {
        self.fixed_year
            .unwrap_or_else(shelf_common::time::current_year)
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::book_routes())
        .merge(api::import_routes())
        .fallback(api::route_not_found)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
