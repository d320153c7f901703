//! Orchestrator for the cross-store transfer commands
//!
//! fetch-to-tabular and tabulate-to-store are fixed two-step sequences; a
//! failing first step surfaces its error and the second step never runs.

use crate::error::CliResult;
use driveflow_client_core::{FileLocator, Transform, Workflow};
use log::info;

pub struct TransferOrchestrator<'a> {
    workflow: &'a Workflow,
}

impl<'a> TransferOrchestrator<'a> {
    pub fn new(workflow: &'a Workflow) -> Self {
        Self { workflow }
    }

    /// Fetch a file from storage, transform it, write rows to a spreadsheet
    pub async fn fetch_to_tabular(
        &self,
        locator: &FileLocator,
        spreadsheet_id: &str,
        range: &str,
        transform: &dyn Transform,
    ) -> CliResult<()> {
        info!("Fetching {locator:?} into {spreadsheet_id} {range}");
        let summary = self
            .workflow
            .fetch_and_tabulate(locator, spreadsheet_id, range, transform)
            .await?;
        println!(
            "Wrote {} cells to {spreadsheet_id} {range}",
            summary.updated_cells
        );
        Ok(())
    }

    /// Export a spreadsheet range as CSV into storage
    pub async fn tabulate_to_store(
        &self,
        spreadsheet_id: &str,
        range: Option<&str>,
        sheet_name: Option<&str>,
        folder_id: Option<&str>,
        output_name: &str,
    ) -> CliResult<()> {
        let file = self
            .workflow
            .tabulate_and_store(spreadsheet_id, range, sheet_name, folder_id, output_name)
            .await?;
        println!("Exported to '{}' (file ID: {})", file.name, file.id);
        Ok(())
    }
}
