//! Driveflow Client Core Library
//!
//! This is the core library for the driveflow client, providing
//! service-account authentication and thin clients over the Google Drive v3
//! and Google Sheets v4 REST APIs, plus a workflow layer composing the two.

pub mod auth;
pub mod error;
mod http;
pub mod storage;
pub mod tabular;
pub mod workflow;

// Re-export main types
pub use auth::{AccessToken, Credentials, ServiceAccountKey};
pub use error::{ApiError, Error, Result, ValidationError};
pub use storage::{FileRef, StorageClient};
pub use tabular::{RowBatch, SheetInfo, TabularClient, UpdateSummary, ValueInput};
pub use workflow::{DelimitedRows, FileLocator, LineRows, Transform, Workflow};

/// MIME type Drive assigns to folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Core client configuration
///
/// Base endpoints default to the public Google API hosts and are
/// overridable so tests can point the clients at a local server.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ClientConfig {
    pub drive_base_url: String,
    pub drive_upload_url: String,
    pub sheets_base_url: String,
    pub timeout_seconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            drive_base_url: "https://www.googleapis.com/drive/v3".to_string(),
            drive_upload_url: "https://www.googleapis.com/upload/drive/v3".to_string(),
            sheets_base_url: "https://sheets.googleapis.com/v4".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl ClientConfig {
    /// Point every endpoint at a single base URL (used by tests against a
    /// local mock server).
    pub fn with_base_url(base: &str) -> Self {
        Self {
            drive_base_url: base.to_string(),
            drive_upload_url: format!("{base}/upload"),
            sheets_base_url: base.to_string(),
            timeout_seconds: 30,
        }
    }
}
