//! Workflow layer composing the storage and tabular clients
//!
//! Each composed operation is a straight-line sequence of at most two
//! remote calls plus one local transform. There is no partial-failure
//! recovery: when the first step fails its error is returned and the second
//! step never runs.

use crate::error::{ApiError, Result};
use crate::storage::{FileRef, StorageClient};
use crate::tabular::{RowBatch, TabularClient, UpdateSummary, ValueInput};
use crate::{ClientConfig, Credentials};
use log::{debug, info};
use std::path::Path;
use std::sync::Arc;

/// How to locate a file in the remote store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileLocator {
    /// Direct identifier
    Id(String),
    /// Lookup by name, optionally within a folder
    Name {
        name: String,
        folder_id: Option<String>,
    },
}

/// Strategy turning raw file content into a row batch
///
/// Fixed contract: bytes in, rectangular-ish table out. Implementations are
/// plain values so callers can plug their own without touching the
/// workflow.
pub trait Transform: Send + Sync {
    fn apply(&self, raw: &[u8]) -> Result<RowBatch>;
}

/// One single-cell row per input line
#[derive(Debug, Clone, Copy, Default)]
pub struct LineRows;

impl Transform for LineRows {
    fn apply(&self, raw: &[u8]) -> Result<RowBatch> {
        Ok(RowBatch::from_lines(raw))
    }
}

/// Parse delimited content (CSV by default)
#[derive(Debug, Clone, Copy)]
pub struct DelimitedRows {
    delimiter: u8,
}

impl DelimitedRows {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }
}

impl Default for DelimitedRows {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl Transform for DelimitedRows {
    fn apply(&self, raw: &[u8]) -> Result<RowBatch> {
        RowBatch::from_delimited(raw, self.delimiter)
    }
}

/// Orchestrates the storage and tabular clients into named multi-step
/// operations
pub struct Workflow {
    storage: StorageClient,
    tabular: TabularClient,
}

impl Workflow {
    /// Create a workflow with one client per remote store, both sharing the
    /// same credentials
    pub fn new(config: ClientConfig, credentials: Arc<Credentials>) -> Result<Self> {
        let storage = StorageClient::new(config.clone(), Arc::clone(&credentials))?;
        let tabular = TabularClient::new(config, credentials)?;
        Ok(Self { storage, tabular })
    }

    pub fn storage(&self) -> &StorageClient {
        &self.storage
    }

    pub fn tabular(&self) -> &TabularClient {
        &self.tabular
    }

    /// Resolve a locator to a concrete file id
    ///
    /// A name that does not resolve is a [`ApiError::NotFound`] failure, so
    /// composed operations stop before touching the tabular store.
    pub async fn resolve_file(&self, locator: &FileLocator) -> Result<String> {
        match locator {
            FileLocator::Id(id) => Ok(id.clone()),
            FileLocator::Name { name, folder_id } => {
                let found = self
                    .storage
                    .find_by_name(name, folder_id.as_deref())
                    .await?;
                match found {
                    Some(file) => {
                        debug!("Resolved '{name}' to file {}", file.id);
                        Ok(file.id)
                    }
                    None => Err(ApiError::not_found(format!("file named '{name}'")).into()),
                }
            }
        }
    }

    /// Fetch a file from storage, transform it, and write the rows to a
    /// spreadsheet range
    pub async fn fetch_and_tabulate(
        &self,
        locator: &FileLocator,
        spreadsheet_id: &str,
        range: &str,
        transform: &dyn Transform,
    ) -> Result<UpdateSummary> {
        let file_id = self.resolve_file(locator).await?;
        let raw = self.storage.download_bytes(&file_id).await?;
        let batch = transform.apply(&raw)?;
        info!(
            "Tabulating {} rows from file {file_id} into {spreadsheet_id} {range}",
            batch.len()
        );
        self.tabular
            .write_range(spreadsheet_id, range, &batch, ValueInput::Raw)
            .await
    }

    /// Read a spreadsheet range, serialize it to CSV, and upload the result
    /// to storage
    ///
    /// With no range, the whole first sheet (or the named sheet) is read.
    pub async fn tabulate_and_store(
        &self,
        spreadsheet_id: &str,
        source_range: Option<&str>,
        sheet_name: Option<&str>,
        folder_id: Option<&str>,
        output_name: &str,
    ) -> Result<FileRef> {
        let batch = match source_range {
            Some(range) => self.tabular.read_range(spreadsheet_id, range).await?,
            None => self.tabular.read_sheet(spreadsheet_id, sheet_name).await?,
        };
        let csv_bytes = batch.to_csv()?;
        info!(
            "Exporting {} rows from {spreadsheet_id} as '{output_name}'",
            batch.len()
        );
        self.storage
            .upload_bytes(csv_bytes, output_name, folder_id, Some("text/csv"))
            .await
    }

    /// Download a file to a local path, resolving it first if needed
    pub async fn read_file_from_store(&self, locator: &FileLocator, dest: &Path) -> Result<()> {
        let file_id = self.resolve_file(locator).await?;
        self.storage.download(&file_id, dest).await
    }

    /// Upload a local file to storage
    pub async fn write_file_to_store(
        &self,
        local_path: &Path,
        folder_id: Option<&str>,
        name: Option<&str>,
    ) -> Result<FileRef> {
        self.storage.upload(local_path, folder_id, name, None).await
    }

    /// Read rows from a range or whole sheet
    pub async fn read_rows(
        &self,
        spreadsheet_id: &str,
        range: Option<&str>,
        sheet_name: Option<&str>,
    ) -> Result<RowBatch> {
        match range {
            Some(range) => self.tabular.read_range(spreadsheet_id, range).await,
            None => self.tabular.read_sheet(spreadsheet_id, sheet_name).await,
        }
    }

    /// Write rows to a range, either overwriting or appending
    pub async fn write_rows(
        &self,
        spreadsheet_id: &str,
        range: &str,
        batch: &RowBatch,
        append: bool,
        value_input: ValueInput,
    ) -> Result<UpdateSummary> {
        if append {
            self.tabular
                .append_rows(spreadsheet_id, range, batch, value_input)
                .await
        } else {
            self.tabular
                .write_range(spreadsheet_id, range, batch, value_input)
                .await
        }
    }
}
