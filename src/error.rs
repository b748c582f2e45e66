//! Error types for LogServ operations.
//!
//! This module defines [`Error`], the primary error type for all scan and
//! query operations, along with a convenient [`Result`] type alias.

/// Error type for LogServ operations.
///
/// This enum captures all error conditions that can occur when serving a
/// query, from missing files to malformed request parameters.
///
/// # Error Categories
///
/// - [`NotFound`](Error::NotFound): The requested file does not exist, is
///   not a regular file, or resolves outside the serve root.
/// - [`InvalidInput`](Error::InvalidInput): The caller provided invalid
///   parameters, such as a malformed result count or an oversized
///   continuation token.
/// - [`Io`](Error::Io): Filesystem failures from the underlying read path.
/// - [`Internal`](Error::Internal): Unexpected internal errors that indicate
///   bugs or invariant violations, such as a file shrinking mid-scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The requested file could not be resolved.
    NotFound,

    /// Invalid input or parameter errors.
    ///
    /// These errors indicate that the caller provided invalid arguments
    /// and surface as HTTP 400 responses.
    InvalidInput(String),

    /// I/O errors from the underlying filesystem.
    Io(String),

    /// Internal errors indicating bugs or invariant violations.
    Internal(String),
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::NotFound => write!(f, "Not Found"),
            Error::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Error::Io(msg) => write!(f, "I/O error: {}", msg),
            Error::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            // A file the process cannot see is indistinguishable from a
            // missing one.
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => Error::NotFound,
            _ => Error::Io(err.to_string()),
        }
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::InvalidInput(msg.to_string())
    }
}

/// Result type alias for LogServ operations.
///
/// This is a convenience alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
