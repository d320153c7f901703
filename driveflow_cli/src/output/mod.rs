//! Output formatting for tabular data and file listings

mod formatters;

pub use formatters::{CsvFormatter, JsonFormatter, TextFormatter};

use anyhow::Result;
use driveflow_client_core::{FileRef, RowBatch};

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

impl OutputFormat {
    /// Parse output format from string
    pub fn from_string(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => anyhow::bail!("Unknown output format: {}", s),
        }
    }

    /// Build the formatter for this format
    pub fn formatter(&self, use_color: bool) -> Box<dyn OutputFormatter> {
        match self {
            Self::Text => Box::new(TextFormatter::new(use_color)),
            Self::Json => Box::new(JsonFormatter::new(true)),
            Self::Csv => Box::new(CsvFormatter),
        }
    }
}

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Format a batch of rows read from the tabular store
    fn format_rows(&self, batch: &RowBatch) -> Result<String>;

    /// Format a file listing from the storage store
    fn format_files(&self, files: &[FileRef]) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_string() {
        assert_eq!(OutputFormat::from_string("text").unwrap(), OutputFormat::Text);
        assert_eq!(OutputFormat::from_string("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_string("csv").unwrap(), OutputFormat::Csv);
        assert!(OutputFormat::from_string("yaml").is_err());
    }
}
