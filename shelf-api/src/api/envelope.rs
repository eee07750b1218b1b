//! Success response envelope
//!
//! `{"status": true, "msg": ..., "data": ..., "statusCode": ...}` with the
//! HTTP status line matching `statusCode`. `data` is omitted when absent.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T: Serialize> {
    pub status: bool,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub status_code: u16,
}

impl<T: Serialize> Envelope<T> {
    /// 200 envelope carrying `data`
    pub fn ok(msg: &str, data: T) -> Self {
        Self::with_status(StatusCode::OK, msg, Some(data))
    }

    pub fn with_status(status: StatusCode, msg: &str, data: Option<T>) -> Self {
        Self {
            status: true,
            msg: msg.to_string(),
            data,
            status_code: status.as_u16(),
        }
    }
}

impl Envelope<()> {
    /// 200 envelope without a payload
    pub fn message(msg: &str) -> Self {
        Self::with_status(StatusCode::OK, msg, None)
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}
