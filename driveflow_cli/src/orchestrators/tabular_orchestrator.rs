//! Orchestrator for the read-tabular and write-tabular commands

use crate::error::{CliError, CliResult};
use crate::output::OutputFormatter;
use driveflow_client_core::{RowBatch, ValueInput, Workflow};
use log::{debug, info};

pub struct TabularOrchestrator<'a> {
    workflow: &'a Workflow,
}

impl<'a> TabularOrchestrator<'a> {
    pub fn new(workflow: &'a Workflow) -> Self {
        Self { workflow }
    }

    /// Read a range or whole sheet and print it with the given formatter
    pub async fn read(
        &self,
        spreadsheet_id: &str,
        range: Option<&str>,
        sheet_name: Option<&str>,
        formatter: &dyn OutputFormatter,
    ) -> CliResult<()> {
        debug!("Reading from spreadsheet {spreadsheet_id} (range: {range:?}, sheet: {sheet_name:?})");
        let batch = self
            .workflow
            .read_rows(spreadsheet_id, range, sheet_name)
            .await?;
        info!("Read {} rows from {spreadsheet_id}", batch.len());
        let rendered = formatter
            .format_rows(&batch)
            .map_err(|e| CliError::general(&e.to_string()))?;
        print!("{rendered}");
        Ok(())
    }

    /// Write or append a batch to a range
    pub async fn write(
        &self,
        spreadsheet_id: &str,
        range: &str,
        batch: &RowBatch,
        append: bool,
        value_input: ValueInput,
    ) -> CliResult<()> {
        let summary = self
            .workflow
            .write_rows(spreadsheet_id, range, batch, append, value_input)
            .await?;
        if append {
            println!("Appended {} cells", summary.updated_cells);
        } else {
            println!("Updated {} cells", summary.updated_cells);
        }
        Ok(())
    }
}
