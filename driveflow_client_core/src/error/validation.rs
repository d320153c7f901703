//! Validation related error types

use thiserror::Error;

/// Validation and configuration errors
///
/// These are raised before any network call is made.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid or unusable credential material
    #[error("Invalid credentials: {message}")]
    InvalidCredentials { message: String },

    /// Invalid input parameter
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter { parameter: String, reason: String },

    /// Missing required field
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Row batch rows have differing lengths
    #[error("Row batch is not rectangular: row {row} has {found} cells, expected {expected}")]
    RaggedRowBatch {
        row: usize,
        found: usize,
        expected: usize,
    },
}

impl ValidationError {
    /// Create an invalid credentials error
    pub fn invalid_credentials(message: &str) -> Self {
        Self::InvalidCredentials {
            message: message.to_string(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(parameter: &str, reason: &str) -> Self {
        Self::InvalidParameter {
            parameter: parameter.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: &str) -> Self {
        Self::MissingField {
            field: field.to_string(),
        }
    }

    /// Create a ragged row batch error
    pub fn ragged_row_batch(row: usize, found: usize, expected: usize) -> Self {
        Self::RaggedRowBatch {
            row,
            found,
            expected,
        }
    }
}
