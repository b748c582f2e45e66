//! JSON response rendering.
//!
//! Bodies are serialized pretty-printed with a trailing newline and carry
//! `Cache-Control: no-cache`; the tail of a log is expected to change
//! between requests.

use axum::body::Body;
use axum::http::{StatusCode, header};
use axum::response::Response;
use serde::Serialize;

/// Response body for a local-mode query.
#[derive(Debug, Serialize)]
pub struct TailResponse {
    /// Accepted lines, newest first.
    pub entries: Vec<String>,

    /// Continuation token, present iff the scan left older lines unread.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cont: Option<String>,
}

/// Error body shape shared by all non-200 responses.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Renders `body` as the canonical JSON response.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    let mut text =
        serde_json::to_string_pretty(body).expect("response serialization should not fail");
    text.push('\n');

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from(text))
        .expect("response construction should not fail")
}

/// Renders an `{"error": ...}` body with the given status.
pub fn error_response(status: StatusCode, message: String) -> Response {
    json_response(status, &ErrorBody { error: message })
}
