//! Error types for the driveflow client library
//!
//! Remote failures are never collapsed into sentinels: every operation
//! returns a typed error carrying the failure class, so callers can decide
//! whether to abort, surface, or retry.

use thiserror::Error;

pub mod api;
pub mod validation;

pub use api::ApiError;
pub use validation::ValidationError;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the driveflow client library
///
/// Errors are categorized into three main types:
/// - API errors: remote Google API failures, classified by cause
/// - Validation errors: input validation and configuration errors
/// - I/O errors: local file system operations
#[derive(Error, Debug)]
pub enum Error {
    /// Remote API related errors
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Validation related errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Local I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(source: reqwest::Error) -> Self {
        Self::Api(ApiError::from_transport(&source))
    }
}

impl From<csv::Error> for Error {
    fn from(source: csv::Error) -> Self {
        Self::Validation(ValidationError::invalid_parameter(
            "rows",
            &format!("CSV serialization failed: {source}"),
        ))
    }
}
