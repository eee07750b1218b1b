//! CSV import endpoint
//!
//! POST `/books/import` with a multipart form whose `file` part holds the
//! CSV. Accepted rows are inserted in one transaction; rejected rows come
//! back in `errors`. The upload size is not limited.

use axum::{
    body::Bytes,
    extract::{
        multipart::MultipartRejection, rejection::JsonRejection, DefaultBodyLimit, Multipart,
        Path, State,
    },
    routing::post,
    Json, Router,
};
use serde::Serialize;
use shelf_common::import::{parse_csv, RowError};
use tracing::{debug, info};

use crate::api::{books, route_not_found, Envelope};
use crate::db::Book;
use crate::services::{self, BookInput};
use crate::{ApiError, ApiResult, AppState};

/// Multipart field carrying the CSV file
pub const FILE_FIELD: &str = "file";

/// `data` payload of a successful import
#[derive(Debug, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    /// Rejected rows, `null` when every row was accepted
    pub errors: Option<Vec<RowError>>,
}

struct CsvUpload {
    file_name: String,
    content_type: Option<String>,
    bytes: Bytes,
}

impl CsvUpload {
    /// Either the declared media type or the file extension must say CSV
    ///
    /// Media type parameters and case are ignored: `Text/CSV; charset=utf-8`
    /// counts as `text/csv`.
    fn is_csv(&self) -> bool {
        let essence = self
            .content_type
            .as_deref()
            .and_then(|ct| ct.split(';').next())
            .map(str::trim);

        essence.is_some_and(|ct| ct.eq_ignore_ascii_case("text/csv"))
            || self.file_name.ends_with(".csv")
    }
}

/// POST /books/import
pub async fn import_books(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Envelope<ImportSummary>> {
    let upload = match multipart {
        Ok(multipart) => read_file_field(multipart).await?,
        Err(rejection) => {
            debug!("Import request is not multipart: {}", rejection.body_text());
            None
        }
    };

    let upload = upload.ok_or_else(|| ApiError::BadRequest("CSV file is required".to_string()))?;
    if !upload.is_csv() {
        return Err(ApiError::BadRequest("Only CSV files are allowed".to_string()));
    }

    let result = parse_csv(&upload.bytes, state.current_year())?;

    let imported = if result.data.is_empty() {
        0
    } else {
        services::books::import_books(&state.db, &result.data)
            .await?
            .len()
    };

    info!(
        "Imported {} books from {} ({} rows rejected)",
        imported,
        upload.file_name,
        result.errors.len()
    );

    let errors = (!result.errors.is_empty()).then_some(result.errors);
    Ok(Envelope::ok(
        "Book records imported successfully",
        ImportSummary { imported, errors },
    ))
}

/// Find the first `file` part that carries a filename
async fn read_file_field(mut multipart: Multipart) -> ApiResult<Option<CsvUpload>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        return Ok(Some(CsvUpload {
            file_name,
            content_type,
            bytes,
        }));
    }

    Ok(None)
}

/// Path segment shared with `/books/:id`
const IMPORT_SEGMENT: &str = "import";

// Other methods on `/books/import` address a book whose id is "import"
async fn get_import_segment(state: State<AppState>) -> ApiResult<Envelope<Book>> {
    books::get_book(state, Path(IMPORT_SEGMENT.to_string())).await
}

async fn update_import_segment(
    state: State<AppState>,
    payload: Result<Json<BookInput>, JsonRejection>,
) -> ApiResult<Envelope<Book>> {
    books::update_book(state, Path(IMPORT_SEGMENT.to_string()), payload).await
}

async fn delete_import_segment(state: State<AppState>) -> ApiResult<Envelope<()>> {
    books::delete_book(state, Path(IMPORT_SEGMENT.to_string())).await
}

/// Build import routes
pub fn import_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/books/import",
            post(import_books)
                .get(get_import_segment)
                .put(update_import_segment)
                .delete(delete_import_segment)
                .fallback(route_not_found),
        )
        .layer(DefaultBodyLimit::disable())
}
