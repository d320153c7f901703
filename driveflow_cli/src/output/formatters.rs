use super::OutputFormatter;
use anyhow::Result;
use colored::*;
use driveflow_client_core::{FileRef, RowBatch};
use serde_json::{Value, json};

/// Text formatter for human-readable output
pub struct TextFormatter {
    use_color: bool,
}

impl TextFormatter {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    fn colorize(&self, text: &str, color: fn(&str) -> ColoredString) -> String {
        if self.use_color {
            color(text).to_string()
        } else {
            text.to_string()
        }
    }
}

fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl OutputFormatter for TextFormatter {
    fn format_rows(&self, batch: &RowBatch) -> Result<String> {
        let mut output = String::new();
        for (index, row) in batch.rows().iter().enumerate() {
            let label = self.colorize(&format!("Row {}", index + 1), |s| s.yellow());
            let cells: Vec<String> = row.iter().map(cell_text).collect();
            output.push_str(&format!("{label}: {}\n", cells.join(" | ")));
        }
        output.push_str(&format!("\n{} row(s)\n", batch.len()));
        Ok(output)
    }

    fn format_files(&self, files: &[FileRef]) -> Result<String> {
        let mut output = String::new();
        for file in files {
            let name = self.colorize(&file.name, |s| s.cyan());
            output.push_str(&format!("  - {name} (ID: {})", file.id));
            if let Some(mime) = &file.mime_type {
                output.push_str(&format!(" [{mime}]"));
            }
            output.push('\n');
        }
        output.push_str(&format!("\n{} file(s)\n", files.len()));
        Ok(output)
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn render(&self, value: &Value) -> Result<String> {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(rendered)
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_rows(&self, batch: &RowBatch) -> Result<String> {
        self.render(&json!(batch))
    }

    fn format_files(&self, files: &[FileRef]) -> Result<String> {
        self.render(&json!(files))
    }
}

/// CSV formatter for piping into other tools
pub struct CsvFormatter;

impl OutputFormatter for CsvFormatter {
    fn format_rows(&self, batch: &RowBatch) -> Result<String> {
        let bytes = batch.to_csv()?;
        Ok(String::from_utf8(bytes)?)
    }

    fn format_files(&self, files: &[FileRef]) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["id", "name", "mime_type", "size", "modified_time"])?;
        for file in files {
            writer.write_record([
                file.id.as_str(),
                file.name.as_str(),
                file.mime_type.as_deref().unwrap_or(""),
                file.size.as_deref().unwrap_or(""),
                file.modified_time.as_deref().unwrap_or(""),
            ])?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("CSV write failed: {e}"))?;
        Ok(String::from_utf8(bytes)?)
    }
}
