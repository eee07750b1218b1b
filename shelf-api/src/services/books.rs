//! Book business rules
//!
//! Sits between the HTTP handlers and `db::books`. Storage failures are
//! reported as 500s carrying the upstream message; rule violations as 400s;
//! missing records as 404s.

use serde::Deserialize;
use serde_json::Value;
use shelf_common::import::year_range_message;
use shelf_common::ValidatedBook;
use sqlx::SqlitePool;

use crate::db::{self, Book};
use crate::{ApiError, ApiResult};

/// Earliest published year accepted when creating a single book
pub const MIN_CREATE_YEAR: i64 = 1800;

/// Book fields as sent by clients
///
/// `publishedYear` stays a raw JSON value so a string or float can be
/// rejected with a rule message instead of a deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub published_year: Option<Value>,
}

/// List every book
///
/// An empty collection is reported as not found.
pub async fn get_all_books(pool: &SqlitePool) -> ApiResult<Vec<Book>> {
    let books = db::books::find_all(pool)
        .await
        .map_err(|e| storage_error("fetch book", e))?;

    if books.is_empty() {
        return Err(ApiError::NotFound("Book records not found".to_string()));
    }

    Ok(books)
}

pub async fn get_book_by_id(pool: &SqlitePool, id: &str) -> ApiResult<Book> {
    db::books::find_by_pk(pool, id)
        .await
        .map_err(|e| storage_error("fetch book", e))?
        .ok_or_else(book_not_found)
}

/// Create one book
///
/// All three fields are required; the year must be an integer in
/// `[1800, current_year]`.
pub async fn create_book(
    pool: &SqlitePool,
    input: BookInput,
    current_year: i32,
) -> ApiResult<Book> {
    let title = input.title.filter(|t| !t.is_empty());
    let author = input.author.filter(|a| !a.is_empty());
    let year = input.published_year.filter(|y| !is_blank(y));

    let (Some(title), Some(author), Some(year)) = (title, author, year) else {
        return Err(ApiError::BadRequest(
            "Title, author, and publishedYear are required".to_string(),
        ));
    };

    let published_year = json_integer(&year)
        .filter(|y| (MIN_CREATE_YEAR..=i64::from(current_year)).contains(y))
        .and_then(|y| i32::try_from(y).ok())
        .ok_or_else(|| {
            ApiError::BadRequest(format!(
                "Published year must be a valid number between {} and {}",
                MIN_CREATE_YEAR, current_year
            ))
        })?;

    let fields = ValidatedBook {
        title,
        author,
        published_year,
    };

    let book = db::books::create(pool, &fields)
        .await
        .map_err(|e| storage_error("create book", e))?;

    tracing::info!("Created book {} ({})", book.id, book.title);
    Ok(book)
}

/// Partially update a book
///
/// Omitted or empty title/author and an omitted year keep stored values.
/// A supplied year must be an integer in `[1000, current_year]`.
pub async fn update_book(
    pool: &SqlitePool,
    id: &str,
    input: BookInput,
    current_year: i32,
) -> ApiResult<Book> {
    let book = db::books::find_by_pk(pool, id)
        .await
        .map_err(|e| storage_error("update book", e))?
        .ok_or_else(book_not_found)?;

    let published_year = match input.published_year {
        None => book.published_year,
        Some(value) => {
            let year = json_integer(&value).ok_or_else(|| {
                ApiError::BadRequest("Published year must be a valid number".to_string())
            })?;

            if year < shelf_common::import::MIN_IMPORT_YEAR || year > i64::from(current_year) {
                return Err(ApiError::BadRequest(year_range_message(current_year)));
            }

            i32::try_from(year).map_err(|e| ApiError::Internal(e.to_string()))?
        }
    };

    let fields = ValidatedBook {
        title: input
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| book.title.clone()),
        author: input
            .author
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| book.author.clone()),
        published_year,
    };

    let updated = db::books::update(pool, &book, &fields)
        .await
        .map_err(|e| storage_error("update book", e))?;

    tracing::info!("Updated book {}", updated.id);
    Ok(updated)
}

/// Soft-delete a book, returning the record as it was
pub async fn delete_book(pool: &SqlitePool, id: &str) -> ApiResult<Book> {
    let book = db::books::find_by_pk(pool, id)
        .await
        .map_err(|e| storage_error("delete book", e))?
        .ok_or_else(book_not_found)?;

    db::books::destroy(pool, &book)
        .await
        .map_err(|e| storage_error("delete book", e))?;

    tracing::info!("Deleted book {}", book.id);
    Ok(book)
}

/// Bulk-insert validated import rows
pub async fn import_books(pool: &SqlitePool, rows: &[ValidatedBook]) -> ApiResult<Vec<Book>> {
    db::books::bulk_create(pool, rows)
        .await
        .map_err(|e| storage_error("import books", e))
}

fn book_not_found() -> ApiError {
    ApiError::NotFound("Book record not found".to_string())
}

fn storage_error(operation: &str, err: anyhow::Error) -> ApiError {
    ApiError::Internal(format!("Failed to {}: {}", operation, err))
}

/// Integer value of a JSON number; fractional numbers and non-numbers are `None`
fn json_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

/// Values a client may send for "nothing": `false`, `0`, `""`
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}
