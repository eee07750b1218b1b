//! Single-record book endpoints
//!
//! GET/POST `/books`, GET/PUT/DELETE `/books/:id`

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::api::{route_not_found, Envelope};
use crate::db::Book;
use crate::services::{self, BookInput};
use crate::{ApiError, ApiResult, AppState};

/// GET /books
pub async fn list_books(State(state): State<AppState>) -> ApiResult<Envelope<Vec<Book>>> {
    let books = services::books::get_all_books(&state.db).await?;
    Ok(Envelope::ok("Book records fetched successfully", books))
}

/// GET /books/:id
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Envelope<Book>> {
    let book = services::books::get_book_by_id(&state.db, &id).await?;
    Ok(Envelope::ok("Book record fetched successfully", book))
}

/// POST /books
pub async fn create_book(
    State(state): State<AppState>,
    payload: Result<Json<BookInput>, JsonRejection>,
) -> ApiResult<Envelope<Book>> {
    let input = json_body(payload)?;
    let book = services::books::create_book(&state.db, input, state.current_year()).await?;

    Ok(Envelope::with_status(
        StatusCode::CREATED,
        "Book record created successfully",
        Some(book),
    ))
}

/// PUT /books/:id
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<BookInput>, JsonRejection>,
) -> ApiResult<Envelope<Book>> {
    let input = json_body(payload)?;
    let book = services::books::update_book(&state.db, &id, input, state.current_year()).await?;
    Ok(Envelope::ok("Book record updated successfully", book))
}

/// DELETE /books/:id
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Envelope<()>> {
    services::books::delete_book(&state.db, &id).await?;
    Ok(Envelope::message("Book record deleted successfully"))
}

fn json_body(payload: Result<Json<BookInput>, JsonRejection>) -> ApiResult<BookInput> {
    payload
        .map(|Json(input)| input)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Build book CRUD routes
pub fn book_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/books",
            get(list_books).post(create_book).fallback(route_not_found),
        )
        .route(
            "/books/:id",
            get(get_book)
                .put(update_book)
                .delete(delete_book)
                .fallback(route_not_found),
        )
}
