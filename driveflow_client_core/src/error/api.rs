//! Remote API error types

use thiserror::Error;

/// Failures reported by the Google APIs, classified by cause
///
/// Classification follows the workflow error taxonomy: authentication
/// failures stop everything, permission and not-found failures abort the
/// current operation, transient failures abort without retry.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Credential was rejected or could not be exchanged for a token
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    /// Credential is valid but lacks access to the resource
    #[error("Permission denied for {resource}")]
    PermissionDenied { resource: String },

    /// Identifier does not resolve on the remote service
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// Network failure or server-side unavailability
    #[error("Transient API failure: {message}")]
    Transient { message: String },

    /// Any other remote error with its HTTP status code
    #[error("API error: {code} - {message}")]
    Server { code: u16, message: String },
}

impl ApiError {
    /// Create an authentication failure
    pub fn authentication_failed(reason: impl Into<String>) -> Self {
        Self::AuthenticationFailed {
            reason: reason.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Classify an HTTP error status returned by a Google API
    pub fn from_status(status: u16, resource: &str, body: &str) -> Self {
        let message = summarize_body(body);
        match status {
            401 => Self::AuthenticationFailed { reason: message },
            403 => Self::PermissionDenied {
                resource: resource.to_string(),
            },
            404 => Self::NotFound {
                resource: resource.to_string(),
            },
            408 | 429 | 500..=504 => Self::Transient {
                message: format!("{status}: {message}"),
            },
            code => Self::Server { code, message },
        }
    }

    /// Classify a transport-level failure (no HTTP status available)
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_status(status.as_u16(), "request", &err.to_string());
        }
        if err.is_timeout() || err.is_connect() {
            return Self::Transient {
                message: err.to_string(),
            };
        }
        Self::Server {
            code: 0,
            message: err.to_string(),
        }
    }

    /// Check if this error is transient and could succeed on a later run
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transient { .. } => true,
            Self::Server { code, .. } => matches!(code, 500..=504),
            _ => false,
        }
    }

    /// Check if this error indicates a permanent failure
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed { .. } | Self::PermissionDenied { .. } | Self::NotFound { .. }
        )
    }
}

/// Google error bodies are JSON with a nested message; fall back to the raw
/// body when they are not.
fn summarize_body(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body)
        && let Some(message) = value
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
    {
        return message.to_string();
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no response body".to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_401_is_authentication_failure() {
        let error = ApiError::from_status(401, "token", "invalid_grant");
        assert!(matches!(error, ApiError::AuthenticationFailed { .. }));
        assert!(error.is_permanent());
        assert!(!error.is_transient());
    }

    #[test]
    fn test_status_403_is_permission_denied() {
        let error = ApiError::from_status(403, "spreadsheet abc", "");
        assert!(error.to_string().contains("spreadsheet abc"));
        assert!(error.is_permanent());
    }

    #[test]
    fn test_status_404_is_not_found() {
        let error = ApiError::from_status(404, "file xyz", "");
        assert!(matches!(error, ApiError::NotFound { .. }));
        assert!(error.is_permanent());
        assert!(!error.is_transient());
    }

    #[test]
    fn test_status_503_is_transient() {
        let error = ApiError::from_status(503, "file xyz", "backend unavailable");
        assert!(error.is_transient());
        assert!(!error.is_permanent());
    }

    #[test]
    fn test_status_429_is_transient() {
        let error = ApiError::from_status(429, "sheet", "rate limit exceeded");
        assert!(error.is_transient());
    }

    #[test]
    fn test_unclassified_status_keeps_code() {
        let error = ApiError::from_status(409, "file", "conflict");
        match error {
            ApiError::Server { code, .. } => assert_eq!(code, 409),
            _ => panic!("Expected Server error"),
        }
    }

    #[test]
    fn test_google_json_error_body_is_summarized() {
        let body = r#"{"error": {"code": 404, "message": "File not found: abc", "errors": []}}"#;
        let error = ApiError::from_status(500, "file", body);
        assert!(error.to_string().contains("File not found: abc"));
    }

    #[test]
    fn test_empty_body_summary() {
        let error = ApiError::from_status(500, "file", "   ");
        assert!(error.to_string().contains("no response body"));
    }
}
