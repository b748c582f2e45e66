//! HTTP error types for the LogServ server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::response::error_response;
use crate::Error;

/// Error wrapper for converting LogServ errors to HTTP responses.
///
/// Error responses have the format:
/// ```json
/// { "error": "..." }
/// ```
pub struct ApiError(pub Error);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            Error::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            Error::InvalidInput(_) => (StatusCode::BAD_REQUEST, self.0.to_string()),
            Error::Io(_) | Error::Internal(_) => {
                tracing::error!("Request failed: {}", self.0);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        error_response(status, message)
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl From<&str> for ApiError {
    fn from(msg: &str) -> Self {
        ApiError(Error::InvalidInput(msg.to_string()))
    }
}
