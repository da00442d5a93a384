//! Tabular writers for the consolidated table.
//!
//! Every writer produces the 12 columns of [`COLUMNS`](crate::table::COLUMNS)
//! as a header followed by one row per record, with no index column.

mod delimited;
mod json;
mod xlsx;

pub use delimited::CsvWriter;
pub use json::JsonWriter;
pub use xlsx::XlsxWriter;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SinkError;
use crate::models::config::OutputConfig;
use crate::table::ConsolidatedTable;

/// Persists a consolidated table.
pub trait TabularWriter {
    /// Write `table` to `destination`, replacing any existing file.
    fn write(&self, table: &ConsolidatedTable, destination: &Path) -> Result<(), SinkError>;
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Excel workbook.
    #[default]
    Xlsx,
    /// Comma-separated values.
    Csv,
    /// JSON array of row objects.
    Json,
}

impl OutputFormat {
    /// Guess the format from a destination's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }

    /// File extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    /// Build the writer for this format.
    pub fn writer(self, config: &OutputConfig) -> Box<dyn TabularWriter + Send + Sync> {
        match self {
            Self::Xlsx => Box::new(XlsxWriter::new(&config.sheet_name)),
            Self::Csv => Box::new(CsvWriter::new()),
            Self::Json => Box::new(JsonWriter::new().with_pretty(config.pretty_json)),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xlsx" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
