//! Invoice field extraction module.

pub mod address;
mod extractor;

pub use address::{extract_address, read_address};
pub use extractor::{DocumentExtractor, HEADER_PATHS};

use std::path::Path;

use crate::error::ExtractionError;
use crate::models::record::InvoiceRecord;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Outcome of extracting a single file.
pub type FileOutcome = Result<InvoiceRecord>;

/// Trait for invoice record extractors.
pub trait InvoiceExtractor {
    /// Extract a record from raw XML bytes.
    fn extract(&self, bytes: &[u8], file_name: &str) -> FileOutcome;

    /// Read a file and extract a record from it.
    fn extract_file(&self, path: &Path) -> FileOutcome {
        let file_name = base_name(path);
        let bytes = std::fs::read(path).map_err(|source| ExtractionError::Io {
            file_name: file_name.clone(),
            source,
        })?;
        self.extract(&bytes, &file_name)
    }
}

/// Final path component as a string, or the whole path when there is none.
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}
