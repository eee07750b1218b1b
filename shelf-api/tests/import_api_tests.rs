//! Integration tests for POST /books/import
//!
//! Uploads are built by hand as multipart/form-data bodies.

mod helpers;

use axum::http::StatusCode;
use helpers::{
    create_test_app, create_test_app_with_year, empty_request, extract_json, json_request,
    multipart_request, Part,
};
use serde_json::{json, Value};
use tower::util::ServiceExt;

async fn import(app: &axum::Router, parts: &[Part<'_>]) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(multipart_request("/books/import", parts))
        .await
        .unwrap();
    let status = response.status();
    (status, extract_json(response).await)
}

async fn book_count(pool: &sqlx::SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE deleted_at IS NULL")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_import_valid_file() {
    let (app, pool) = create_test_app().await;
    let csv = b"title,author,publishedyear\nDune,Frank Herbert,1965\nEmma,Jane Austen,1815\n";

    let (status, body) = import(&app, &[Part::csv(csv)]).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], true);
    assert_eq!(body["msg"], "Book records imported successfully");
    assert_eq!(body["data"]["imported"], 2);
    assert!(body["data"]["errors"].is_null());
    assert_eq!(book_count(&pool).await, 2);

    let response = app.oneshot(empty_request("GET", "/books")).await.unwrap();
    let listed = extract_json(response).await;
    assert_eq!(listed["data"][0]["title"], "Dune");
    assert_eq!(listed["data"][1]["publishedYear"], 1815);
}

#[tokio::test]
async fn test_import_partial_failure() {
    let (app, pool) = create_test_app().await;
    let csv = b"title,author,publishedyear\nDune,Frank Herbert,1965\n,,\nA Title,An Author,notayear\n";

    let (status, body) = import(&app, &[Part::csv(csv)]).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["imported"], 1);
    assert_eq!(
        body["data"]["errors"],
        json!([{
            "row": 4,
            "data": {"title": "A Title", "author": "An Author", "publishedYear": "notayear"},
            "error": "Published year must be a valid number"
        }])
    );
    assert_eq!(book_count(&pool).await, 1);
}

#[tokio::test]
async fn test_import_all_rows_rejected_inserts_nothing() {
    let (app, pool) = create_test_app().await;
    let csv = b"title,author,publishedyear\n,,1965\nX,Y,999\n";

    let (status, body) = import(&app, &[Part::csv(csv)]).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["imported"], 0);
    let errors = body["data"]["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0]["error"], "Title is required; Author is required");
    assert_eq!(errors[1]["error"], "Published year must be between 1000 and 2024");
    assert_eq!(book_count(&pool).await, 0);
}

#[tokio::test]
async fn test_import_year_bound_uses_state_year() {
    let (app, _pool) = create_test_app_with_year(2000).await;
    let csv = b"title,author,publishedyear\nNew Book,Someone,2010\n";

    let (_, body) = import(&app, &[Part::csv(csv)]).await;

    assert_eq!(
        body["data"]["errors"][0]["error"],
        "Published year must be between 1000 and 2000"
    );
}

#[tokio::test]
async fn test_import_without_file_part() {
    let (app, _pool) = create_test_app().await;
    let note = Part {
        name: "note",
        file_name: None,
        content_type: None,
        content: b"hello",
    };

    let (status, body) = import(&app, &[note]).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], false);
    assert_eq!(body["message"], "CSV file is required");
}

#[tokio::test]
async fn test_import_file_field_without_filename_is_not_a_file() {
    let (app, _pool) = create_test_app().await;
    let field = Part {
        name: "file",
        file_name: None,
        content_type: None,
        content: b"title,author,publishedyear\nDune,Frank Herbert,1965\n",
    };

    let (status, body) = import(&app, &[field]).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "CSV file is required");
}

#[tokio::test]
async fn test_import_non_multipart_request() {
    let (app, _pool) = create_test_app().await;

    let response = app
        .oneshot(json_request("POST", "/books/import", &json!({"file": "x"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(extract_json(response).await["message"], "CSV file is required");
}

#[tokio::test]
async fn test_import_rejects_non_csv_file() {
    let (app, pool) = create_test_app().await;
    let part = Part {
        name: "file",
        file_name: Some("books.txt"),
        content_type: Some("text/plain"),
        content: b"title,author,publishedyear\nDune,Frank Herbert,1965\n",
    };

    let (status, body) = import(&app, &[part]).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Only CSV files are allowed");
    assert_eq!(book_count(&pool).await, 0);
}

#[tokio::test]
async fn test_import_accepts_csv_by_extension_or_media_type() {
    let (app, pool) = create_test_app().await;
    let content = b"title,author,publishedyear\nDune,Frank Herbert,1965\n";

    let by_extension = Part {
        name: "file",
        file_name: Some("export.csv"),
        content_type: Some("application/vnd.ms-excel"),
        content,
    };
    let (status, _) = import(&app, &[by_extension]).await;
    assert_eq!(status, StatusCode::OK);

    let by_media_type = Part {
        name: "file",
        file_name: Some("export.data"),
        content_type: Some("text/csv"),
        content,
    };
    let (status, _) = import(&app, &[by_media_type]).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(book_count(&pool).await, 2);
}

#[tokio::test]
async fn test_import_missing_columns() {
    let (app, pool) = create_test_app().await;
    let csv = b"title,writer,year\nDune,Frank Herbert,1965\n";

    let (status, body) = import(&app, &[Part::csv(csv)]).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["statusCode"], 400);
    assert_eq!(body["message"], "Missing required columns: author, publishedyear");
    assert_eq!(book_count(&pool).await, 0);
}

#[tokio::test]
async fn test_import_header_only_is_malformed() {
    let (app, _pool) = create_test_app().await;

    let (status, body) = import(&app, &[Part::csv(b"title,author,publishedyear\n")]).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "CSV file must contain header and at least one data row"
    );
}

#[tokio::test]
async fn test_import_skips_leading_unrelated_parts() {
    let (app, pool) = create_test_app().await;
    let note = Part {
        name: "note",
        file_name: None,
        content_type: None,
        content: b"weekly upload",
    };
    let csv = Part::csv(b"title,author,publishedyear\nDune,Frank Herbert,1965\n");

    let (status, body) = import(&app, &[note, csv]).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["imported"], 1);
    assert_eq!(book_count(&pool).await, 1);
}

#[tokio::test]
async fn test_import_is_not_size_limited() {
    let (app, pool) = create_test_app().await;

    // Larger than axum's default 2 MB body limit
    let mut csv = b"title,author,publishedyear,notes\n".to_vec();
    csv.extend_from_slice(b"Dune,Frank Herbert,1965,");
    csv.extend(std::iter::repeat(b'x').take(3 * 1024 * 1024));
    csv.push(b'\n');

    let (status, body) = import(&app, &[Part::csv(&csv)]).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["imported"], 1);
    assert_eq!(book_count(&pool).await, 1);
}
