//! Storage client for Google Drive v3
//!
//! Thin wrapper over the Drive REST surface: list, lookup, download,
//! upload, update, delete, and folder creation. Every operation is a single
//! HTTP call; failures come back as classified [`crate::ApiError`]s.

use crate::error::{Error, Result};
use crate::http::{build_client, ensure_success};
use crate::{ClientConfig, Credentials, FOLDER_MIME_TYPE};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;

const FILE_FIELDS: &str = "id,name,mimeType,size,modifiedTime,parents";
const PAGE_SIZE: u32 = 100;
const MULTIPART_BOUNDARY: &str = "driveflow_multipart";

/// Reference to a remote stored file
///
/// Identifiers are opaque strings assigned by Drive. `size` stays a string
/// because that is how the API serializes 64-bit values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub parents: Option<Vec<String>>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub modified_time: Option<String>,
}

impl FileRef {
    /// Whether this entry is a Drive folder
    pub fn is_folder(&self) -> bool {
        self.mime_type.as_deref() == Some(FOLDER_MIME_TYPE)
    }
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileRef>,
}

/// Client for the Drive v3 API
pub struct StorageClient {
    http: reqwest::Client,
    config: ClientConfig,
    credentials: Arc<Credentials>,
}

impl StorageClient {
    /// Create a new storage client using the given credentials
    pub fn new(config: ClientConfig, credentials: Arc<Credentials>) -> Result<Self> {
        let http = build_client(&config)?;
        Ok(Self {
            http,
            config,
            credentials,
        })
    }

    /// List files, optionally scoped to a folder and filtered by a Drive
    /// query expression
    pub async fn list(
        &self,
        folder_id: Option<&str>,
        query: Option<&str>,
    ) -> Result<Vec<FileRef>> {
        let mut query_parts = Vec::new();
        if let Some(folder) = folder_id {
            query_parts.push(format!("'{}' in parents", escape_query_value(folder)));
        }
        if let Some(q) = query {
            query_parts.push(q.to_string());
        }

        let url = format!("{}/files", self.config.drive_base_url);
        let mut request = self
            .http
            .get(&url)
            .bearer_auth(self.credentials.bearer())
            .query(&[
                ("pageSize", PAGE_SIZE.to_string()),
                ("fields", format!("nextPageToken,files({FILE_FIELDS})")),
            ]);
        if !query_parts.is_empty() {
            request = request.query(&[("q", query_parts.join(" and "))]);
        }

        debug!("Listing files (folder: {folder_id:?}, query: {query:?})");
        let response = request.send().await?;
        let listing: FileList = ensure_success(response, "file listing")
            .await?
            .json()
            .await?;
        Ok(listing.files)
    }

    /// Look up a file by exact name, optionally within a folder
    ///
    /// A clean miss is `Ok(None)`, distinct from transport or permission
    /// failures.
    pub async fn find_by_name(
        &self,
        name: &str,
        folder_id: Option<&str>,
    ) -> Result<Option<FileRef>> {
        let query = format!("name='{}'", escape_query_value(name));
        let mut files = self.list(folder_id, Some(&query)).await?;
        if files.is_empty() {
            Ok(None)
        } else {
            Ok(Some(files.remove(0)))
        }
    }

    /// Download a file's content into memory
    pub async fn download_bytes(&self, file_id: &str) -> Result<Vec<u8>> {
        let url = format!("{}/files/{}", self.config.drive_base_url, file_id);
        let response = self
            .http
            .get(&url)
            .bearer_auth(self.credentials.bearer())
            .query(&[("alt", "media")])
            .send()
            .await?;
        let resource = format!("file {file_id}");
        let bytes = ensure_success(response, &resource).await?.bytes().await?;
        debug!("Downloaded {} bytes from file {file_id}", bytes.len());
        Ok(bytes.to_vec())
    }

    /// Download a file to a local path
    pub async fn download(&self, file_id: &str, dest: &Path) -> Result<()> {
        let content = self.download_bytes(file_id).await?;
        tokio::fs::write(dest, content).await?;
        debug!("Wrote file {file_id} to {}", dest.display());
        Ok(())
    }

    /// Upload in-memory content as a new Drive file
    pub async fn upload_bytes(
        &self,
        content: Vec<u8>,
        name: &str,
        folder_id: Option<&str>,
        mime_type: Option<&str>,
    ) -> Result<FileRef> {
        let mut metadata = json!({ "name": name });
        if let Some(folder) = folder_id {
            metadata["parents"] = json!([folder]);
        }
        if let Some(mime) = mime_type {
            metadata["mimeType"] = json!(mime);
        }

        let body = multipart_related_body(
            &metadata.to_string(),
            mime_type.unwrap_or("application/octet-stream"),
            &content,
        );

        let url = format!("{}/files", self.config.drive_upload_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(self.credentials.bearer())
            .query(&[("uploadType", "multipart"), ("fields", FILE_FIELDS)])
            .header(
                "Content-Type",
                format!("multipart/related; boundary={MULTIPART_BOUNDARY}"),
            )
            .body(body)
            .send()
            .await?;

        let resource = format!("upload of '{name}'");
        let file: FileRef = ensure_success(response, &resource).await?.json().await?;
        debug!("Uploaded '{name}' as file {}", file.id);
        Ok(file)
    }

    /// Upload a local file to Drive
    ///
    /// The Drive name defaults to the local file name when not given.
    pub async fn upload(
        &self,
        local_path: &Path,
        folder_id: Option<&str>,
        name: Option<&str>,
        mime_type: Option<&str>,
    ) -> Result<FileRef> {
        let content = tokio::fs::read(local_path).await.map_err(Error::from)?;
        let name = match name {
            Some(n) => n.to_string(),
            None => local_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload".to_string()),
        };
        self.upload_bytes(content, &name, folder_id, mime_type)
            .await
    }

    /// Replace the content of an existing Drive file
    pub async fn update(
        &self,
        file_id: &str,
        local_path: &Path,
        mime_type: Option<&str>,
    ) -> Result<()> {
        let content = tokio::fs::read(local_path).await?;
        let url = format!("{}/files/{}", self.config.drive_upload_url, file_id);
        let mut request = self
            .http
            .patch(&url)
            .bearer_auth(self.credentials.bearer())
            .query(&[("uploadType", "media")])
            .body(content);
        if let Some(mime) = mime_type {
            request = request.header("Content-Type", mime.to_string());
        }
        let response = request.send().await?;
        let resource = format!("file {file_id}");
        ensure_success(response, &resource).await?;
        debug!("Updated content of file {file_id}");
        Ok(())
    }

    /// Delete a file
    pub async fn delete(&self, file_id: &str) -> Result<()> {
        let url = format!("{}/files/{}", self.config.drive_base_url, file_id);
        let response = self
            .http
            .delete(&url)
            .bearer_auth(self.credentials.bearer())
            .send()
            .await?;
        let resource = format!("file {file_id}");
        ensure_success(response, &resource).await?;
        debug!("Deleted file {file_id}");
        Ok(())
    }

    /// Create a folder, optionally nested under a parent
    pub async fn create_folder(&self, name: &str, parent: Option<&str>) -> Result<FileRef> {
        let mut metadata = json!({ "name": name, "mimeType": FOLDER_MIME_TYPE });
        if let Some(parent_id) = parent {
            metadata["parents"] = json!([parent_id]);
        }

        let url = format!("{}/files", self.config.drive_base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(self.credentials.bearer())
            .query(&[("fields", FILE_FIELDS)])
            .json(&metadata)
            .send()
            .await?;
        let resource = format!("folder '{name}'");
        let folder: FileRef = ensure_success(response, &resource).await?.json().await?;
        debug!("Created folder '{name}' with id {}", folder.id);
        Ok(folder)
    }
}

/// Drive query values are single-quoted; escape embedded quotes and
/// backslashes.
fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Assemble a `multipart/related` body: JSON metadata part followed by the
/// media part, as the Drive multipart upload endpoint expects.
fn multipart_related_body(metadata: &str, mime_type: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(content.len() + metadata.len() + 256);
    body.extend_from_slice(
        format!(
            "--{MULTIPART_BOUNDARY}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n--{MULTIPART_BOUNDARY}\r\nContent-Type: {mime_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--").as_bytes());
    body
}
