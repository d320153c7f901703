//! CLI error type with semantic exit codes
//!
//! Core errors keep their failure class all the way to the process exit
//! code, so schedulers invoking this binary can distinguish a missing
//! identifier from a permission problem or a transient outage.

use colored::*;
use driveflow_client_core::{ApiError, Error as CoreError};
use std::error::Error as StdError;
use std::fmt;

/// CLI-specific error carrying a category, suggestions, and source
#[derive(Debug)]
pub struct CliError {
    message: String,
    category: ErrorCategory,
    pub suggestions: Vec<String>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

/// Error categories that map to exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorCategory {
    General,
    Misuse,
    Network,
    NotFound,
    Permission,
}

/// Semantic exit codes for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    Misuse = 2,
    NetworkError = 3,
    NotFound = 4,
    PermissionDenied = 5,
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Create a general error
    pub fn general(message: &str) -> Self {
        Self {
            message: message.to_string(),
            category: ErrorCategory::General,
            suggestions: Vec::new(),
            source: None,
        }
    }

    /// Create a command misuse error (missing or invalid parameters)
    pub fn misuse(message: &str) -> Self {
        Self {
            message: message.to_string(),
            category: ErrorCategory::Misuse,
            suggestions: vec!["Run 'driveflow --help' for usage information".to_string()],
            source: None,
        }
    }

    /// Create a network/transient error
    pub fn network(message: &str) -> Self {
        Self {
            message: message.to_string(),
            category: ErrorCategory::Network,
            suggestions: vec![
                "Check your internet connection".to_string(),
                "The Google API may be temporarily unavailable; try again later".to_string(),
            ],
            source: None,
        }
    }

    /// Create a not-found error
    pub fn not_found(message: &str) -> Self {
        Self {
            message: message.to_string(),
            category: ErrorCategory::NotFound,
            suggestions: vec!["Verify the identifier and that it is shared with the service account".to_string()],
            source: None,
        }
    }

    /// Create a permission error
    pub fn permission(message: &str) -> Self {
        Self {
            message: message.to_string(),
            category: ErrorCategory::Permission,
            suggestions: vec![
                "Share the file or spreadsheet with the service account email".to_string(),
            ],
            source: None,
        }
    }

    /// Create an authentication error (fatal before any operation)
    pub fn auth(message: &str) -> Self {
        Self {
            message: message.to_string(),
            category: ErrorCategory::Permission,
            suggestions: vec![
                "Pass --credentials <path> or set GOOGLE_APPLICATION_CREDENTIALS".to_string(),
                "Inline JSON can be supplied via GOOGLE_CREDENTIALS_JSON".to_string(),
            ],
            source: None,
        }
    }

    /// Attach a source error
    pub fn with_source(mut self, source: Box<dyn StdError + Send + Sync>) -> Self {
        self.source = Some(source);
        self
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self.category {
            ErrorCategory::General => ExitCode::GeneralError,
            ErrorCategory::Misuse => ExitCode::Misuse,
            ErrorCategory::Network => ExitCode::NetworkError,
            ErrorCategory::NotFound => ExitCode::NotFound,
            ErrorCategory::Permission => ExitCode::PermissionDenied,
        }
    }

    /// Format the error for user display
    pub fn format_for_user(&self, debug: bool) -> String {
        let mut output = String::new();

        let prefix = match self.category {
            ErrorCategory::General => "Error".red(),
            ErrorCategory::Misuse => "Usage Error".yellow(),
            ErrorCategory::Network => "Network Error".red(),
            ErrorCategory::NotFound => "Not Found".red(),
            ErrorCategory::Permission => "Permission Error".red(),
        };
        output.push_str(&format!("{}: {}\n", prefix, self.message));

        if debug && let Some(source) = &self.source {
            output.push_str("\nCaused by:\n");
            let mut current: Option<&dyn StdError> = Some(source.as_ref());
            let mut level = 1;
            while let Some(err) = current {
                output.push_str(&format!("  {level}: {err}\n"));
                current = err.source();
                level += 1;
            }
        }

        if !self.suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in &self.suggestions {
                output.push_str(&format!("  - {suggestion}\n"));
            }
        }

        output
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for CliError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<CoreError> for CliError {
    fn from(error: CoreError) -> Self {
        let message = error.to_string();
        let cli_error = match &error {
            CoreError::Api(api) => match api {
                ApiError::AuthenticationFailed { .. } => Self::auth(&message),
                ApiError::PermissionDenied { .. } => Self::permission(&message),
                ApiError::NotFound { .. } => Self::not_found(&message),
                ApiError::Transient { .. } => Self::network(&message),
                ApiError::Server { code, .. } if (500..=504).contains(code) => {
                    Self::network(&message)
                }
                ApiError::Server { .. } => Self::general(&message),
            },
            CoreError::Validation(_) => Self::misuse(&message),
            CoreError::Io(_) => Self::general(&message),
        };
        cli_error.with_source(Box::new(error))
    }
}

impl From<anyhow::Error> for CliError {
    fn from(error: anyhow::Error) -> Self {
        Self::general(&format!("{error:#}"))
    }
}
