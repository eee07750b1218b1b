//! Shared helpers for shelf-api integration tests

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use shelf_api::{build_router, db, AppState};
use sqlx::SqlitePool;

/// Year pinned for every test app so year-bound messages are stable
pub const TEST_YEAR: i32 = 2024;

const BOUNDARY: &str = "shelf-test-boundary";

/// Test app over a fresh in-memory database
pub async fn create_test_app() -> (Router, SqlitePool) {
    create_test_app_with_year(TEST_YEAR).await
}

pub async fn create_test_app_with_year(year: i32) -> (Router, SqlitePool) {
    let pool = db::init_memory_pool()
        .await
        .expect("Failed to create in-memory database");
    let app = build_router(AppState::with_fixed_year(pool.clone(), year));
    (app, pool)
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

/// One multipart part: field name, optional filename and content type
pub struct Part<'a> {
    pub name: &'a str,
    pub file_name: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub content: &'a [u8],
}

impl<'a> Part<'a> {
    /// `file` part named `books.csv` declared as `text/csv`
    pub fn csv(content: &'a [u8]) -> Self {
        Self {
            name: "file",
            file_name: Some("books.csv"),
            content_type: Some("text/csv"),
            content,
        }
    }
}

pub fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();

    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());

        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(file_name) = part.file_name {
            disposition.push_str(&format!("; filename=\"{}\"", file_name));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");

        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Extract JSON body from response
pub async fn extract_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}
