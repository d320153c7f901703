//! Orchestrator for the list-storage command

use crate::error::{CliError, CliResult};
use crate::output::OutputFormatter;
use driveflow_client_core::Workflow;
use log::info;

pub struct StorageOrchestrator<'a> {
    workflow: &'a Workflow,
}

impl<'a> StorageOrchestrator<'a> {
    pub fn new(workflow: &'a Workflow) -> Self {
        Self { workflow }
    }

    /// List files, optionally scoped to a folder and filtered by a query
    pub async fn list(
        &self,
        folder_id: Option<&str>,
        query: Option<&str>,
        formatter: &dyn OutputFormatter,
    ) -> CliResult<()> {
        let files = self.workflow.storage().list(folder_id, query).await?;
        info!("Listed {} files", files.len());
        let rendered = formatter
            .format_files(&files)
            .map_err(|e| CliError::general(&e.to_string()))?;
        print!("{rendered}");
        Ok(())
    }
}
