//! Tabular client for Google Sheets v4
//!
//! Thin wrapper over the Sheets values and spreadsheet surfaces. Reads and
//! writes exchange [`RowBatch`] fragments; writes are validated as
//! rectangular before any network call.

use crate::error::{Result, ValidationError};
use crate::http::{build_client, ensure_success};
use crate::{ClientConfig, Credentials};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;

/// How written values are interpreted by Sheets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueInput {
    /// Store values as-is
    #[default]
    Raw,
    /// Parse values as if typed into the UI (formulas, dates)
    UserEntered,
}

impl ValueInput {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raw => "RAW",
            Self::UserEntered => "USER_ENTERED",
        }
    }
}

/// Rectangular table fragment exchanged with the tabular store
///
/// Rows are ordered sequences of JSON scalars. Reads may return short rows
/// (Sheets trims trailing empty cells); writes must be rectangular.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowBatch {
    rows: Vec<Vec<Value>>,
}

impl RowBatch {
    pub fn new(rows: Vec<Vec<Value>>) -> Self {
        Self { rows }
    }

    /// Build a batch from string cells
    pub fn from_strings<R, C>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = C>,
        C: Into<String>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(|cell| json!(cell.into())).collect())
            .collect();
        Self { rows }
    }

    /// One single-cell row per input line (the default file transform)
    pub fn from_lines(raw: &[u8]) -> Self {
        let text = String::from_utf8_lossy(raw);
        let rows = text
            .lines()
            .map(|line| vec![json!(line.trim_end())])
            .collect();
        Self { rows }
    }

    /// Parse delimited content into a batch
    ///
    /// Rows may be ragged in the source; the batch is returned as parsed
    /// and only validated on write.
    pub fn from_delimited(raw: &[u8], delimiter: u8) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(raw);
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(|cell| json!(cell)).collect());
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<Value>> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_rectangular(&self) -> bool {
        self.ensure_rectangular().is_ok()
    }

    /// Validate that every row has the same width
    pub fn ensure_rectangular(&self) -> std::result::Result<(), ValidationError> {
        let Some(first) = self.rows.first() else {
            return Ok(());
        };
        let expected = first.len();
        for (index, row) in self.rows.iter().enumerate().skip(1) {
            if row.len() != expected {
                return Err(ValidationError::ragged_row_batch(
                    index,
                    row.len(),
                    expected,
                ));
            }
        }
        Ok(())
    }

    /// Serialize the batch as CSV
    pub fn to_csv(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in &self.rows {
            let record: Vec<String> = row.iter().map(cell_to_string).collect();
            writer.write_record(&record)?;
        }
        writer
            .into_inner()
            .map_err(|e| ValidationError::invalid_parameter("rows", &e.to_string()).into())
    }
}

/// Render a cell for delimited output; strings stay bare, other scalars use
/// their JSON form.
fn cell_to_string(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Cell/row counts reported back by a write
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSummary {
    #[serde(default)]
    pub updated_range: Option<String>,
    #[serde(default)]
    pub updated_rows: u32,
    #[serde(default)]
    pub updated_columns: u32,
    #[serde(default)]
    pub updated_cells: u32,
}

#[derive(Debug, Deserialize)]
struct AppendResponse {
    #[serde(default)]
    updates: UpdateSummary,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Metadata for one sheet within a spreadsheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetInfo {
    pub sheet_id: i64,
    pub title: String,
    pub row_count: u32,
    pub column_count: u32,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    #[serde(default)]
    sheet_id: i64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    grid_properties: GridProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridProperties {
    #[serde(default)]
    row_count: u32,
    #[serde(default)]
    column_count: u32,
}

/// Client for the Sheets v4 API
pub struct TabularClient {
    http: reqwest::Client,
    config: ClientConfig,
    credentials: Arc<Credentials>,
}

impl TabularClient {
    /// Create a new tabular client using the given credentials
    pub fn new(config: ClientConfig, credentials: Arc<Credentials>) -> Result<Self> {
        let http = build_client(&config)?;
        Ok(Self {
            http,
            config,
            credentials,
        })
    }

    fn values_url(&self, spreadsheet_id: &str, range: &str, suffix: &str) -> String {
        format!(
            "{}/spreadsheets/{}/values/{}{}",
            self.config.sheets_base_url,
            spreadsheet_id,
            urlencoding::encode(range),
            suffix
        )
    }

    /// Read a range in A1 notation
    ///
    /// A range with no stored values comes back as an empty batch.
    pub async fn read_range(&self, spreadsheet_id: &str, range: &str) -> Result<RowBatch> {
        let url = self.values_url(spreadsheet_id, range, "");
        let response = self
            .http
            .get(&url)
            .bearer_auth(self.credentials.bearer())
            .send()
            .await?;
        let resource = format!("range {range} of spreadsheet {spreadsheet_id}");
        let value_range: ValueRange = ensure_success(response, &resource).await?.json().await?;
        debug!(
            "Read {} rows from {spreadsheet_id} {range}",
            value_range.values.len()
        );
        Ok(RowBatch::new(value_range.values))
    }

    /// Read a whole sheet (`A:Z`), defaulting to the first sheet
    pub async fn read_sheet(
        &self,
        spreadsheet_id: &str,
        sheet_name: Option<&str>,
    ) -> Result<RowBatch> {
        let title = match sheet_name {
            Some(name) => name.to_string(),
            None => self
                .sheet_metadata(spreadsheet_id)
                .await?
                .first()
                .map(|sheet| sheet.title.clone())
                .unwrap_or_else(|| "Sheet1".to_string()),
        };
        self.read_range(spreadsheet_id, &format!("{title}!A:Z"))
            .await
    }

    /// Overwrite a range with a batch
    ///
    /// Replaces the addressed range exactly; padding or truncating is the
    /// caller's responsibility.
    pub async fn write_range(
        &self,
        spreadsheet_id: &str,
        range: &str,
        batch: &RowBatch,
        value_input: ValueInput,
    ) -> Result<UpdateSummary> {
        batch.ensure_rectangular()?;
        let url = self.values_url(spreadsheet_id, range, "");
        let response = self
            .http
            .put(&url)
            .bearer_auth(self.credentials.bearer())
            .query(&[("valueInputOption", value_input.as_str())])
            .json(&json!({ "values": batch }))
            .send()
            .await?;
        let resource = format!("range {range} of spreadsheet {spreadsheet_id}");
        let summary: UpdateSummary = ensure_success(response, &resource).await?.json().await?;
        debug!("Updated {} cells in {spreadsheet_id}", summary.updated_cells);
        Ok(summary)
    }

    /// Append a batch after the last populated row of the addressed sheet
    ///
    /// Appending the same batch twice stores two copies; nothing is merged.
    pub async fn append_rows(
        &self,
        spreadsheet_id: &str,
        range: &str,
        batch: &RowBatch,
        value_input: ValueInput,
    ) -> Result<UpdateSummary> {
        batch.ensure_rectangular()?;
        let url = self.values_url(spreadsheet_id, range, ":append");
        let response = self
            .http
            .post(&url)
            .bearer_auth(self.credentials.bearer())
            .query(&[
                ("valueInputOption", value_input.as_str()),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({ "values": batch }))
            .send()
            .await?;
        let resource = format!("range {range} of spreadsheet {spreadsheet_id}");
        let appended: AppendResponse = ensure_success(response, &resource).await?.json().await?;
        debug!(
            "Appended {} cells to {spreadsheet_id}",
            appended.updates.updated_cells
        );
        Ok(appended.updates)
    }

    /// Clear the values in a range
    pub async fn clear_range(&self, spreadsheet_id: &str, range: &str) -> Result<()> {
        let url = self.values_url(spreadsheet_id, range, ":clear");
        let response = self
            .http
            .post(&url)
            .bearer_auth(self.credentials.bearer())
            .json(&json!({}))
            .send()
            .await?;
        let resource = format!("range {range} of spreadsheet {spreadsheet_id}");
        ensure_success(response, &resource).await?;
        debug!("Cleared {range} in {spreadsheet_id}");
        Ok(())
    }

    /// Fetch metadata for every sheet in the spreadsheet
    pub async fn sheet_metadata(&self, spreadsheet_id: &str) -> Result<Vec<SheetInfo>> {
        let url = format!(
            "{}/spreadsheets/{}",
            self.config.sheets_base_url, spreadsheet_id
        );
        let response = self
            .http
            .get(&url)
            .bearer_auth(self.credentials.bearer())
            .query(&[("fields", "sheets.properties")])
            .send()
            .await?;
        let resource = format!("spreadsheet {spreadsheet_id}");
        let meta: SpreadsheetMeta = ensure_success(response, &resource).await?.json().await?;
        Ok(meta
            .sheets
            .into_iter()
            .map(|sheet| SheetInfo {
                sheet_id: sheet.properties.sheet_id,
                title: sheet.properties.title,
                row_count: sheet.properties.grid_properties.row_count,
                column_count: sheet.properties.grid_properties.column_count,
            })
            .collect())
    }

    /// Add a sheet with the given title
    pub async fn create_sheet(&self, spreadsheet_id: &str, title: &str) -> Result<()> {
        let request = json!({
            "requests": [{ "addSheet": { "properties": { "title": title } } }]
        });
        self.batch_update(spreadsheet_id, &request).await
    }

    /// Delete a sheet by its numeric id
    pub async fn delete_sheet(&self, spreadsheet_id: &str, sheet_id: i64) -> Result<()> {
        let request = json!({
            "requests": [{ "deleteSheet": { "sheetId": sheet_id } }]
        });
        self.batch_update(spreadsheet_id, &request).await
    }

    async fn batch_update(&self, spreadsheet_id: &str, body: &Value) -> Result<()> {
        let url = format!(
            "{}/spreadsheets/{}:batchUpdate",
            self.config.sheets_base_url, spreadsheet_id
        );
        let response = self
            .http
            .post(&url)
            .bearer_auth(self.credentials.bearer())
            .json(body)
            .send()
            .await?;
        let resource = format!("spreadsheet {spreadsheet_id}");
        ensure_success(response, &resource).await?;
        Ok(())
    }
}
