//! Error types for the nfe-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the nfe library.
#[derive(Error, Debug)]
pub enum NfeError {
    /// No record survived extraction, so there is nothing to persist.
    #[error("no valid records produced ({failed} file(s) failed or were ignored)")]
    EmptyBatch { failed: usize },

    /// The run was interrupted before every candidate was processed.
    #[error("cancelled after {processed} of {total} file(s)")]
    Cancelled { processed: usize, total: usize },

    /// The tabular writer could not persist the table.
    #[error("output error: {0}")]
    Sink(#[from] SinkError),

    /// Candidate discovery error.
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    /// Single-document extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors produced while turning one XML file into a record.
///
/// Every variant carries the base name of the file it belongs to, which is
/// what a batch reports back to its caller.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The bytes are not well-formed XML.
    #[error("failed to parse XML in {file_name}: {reason}")]
    Parse { file_name: String, reason: String },

    /// Well-formed XML, but neither `nfeProc.NFe.infNFe` nor `NFe.infNFe`
    /// holds an invoice header.
    #[error("{file_name} does not look like an NFe document")]
    StructuralMismatch { file_name: String },

    /// The file could not be read.
    #[error("failed to read {file_name}: {source}")]
    Io {
        file_name: String,
        #[source]
        source: std::io::Error,
    },
}

impl ExtractionError {
    /// Base name of the file that failed.
    pub fn file_name(&self) -> &str {
        match self {
            Self::Parse { file_name, .. }
            | Self::StructuralMismatch { file_name }
            | Self::Io { file_name, .. } => file_name,
        }
    }

    /// Whether this is the expected "not an invoice" outcome rather than a
    /// broken file.
    pub fn is_structural_mismatch(&self) -> bool {
        matches!(self, Self::StructuralMismatch { .. })
    }
}

/// Errors related to candidate discovery.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The input path does not exist or is not a directory.
    #[error("input folder does not exist or is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// The input folder holds no file with the configured extension.
    #[error("no .{extension} files found in {}", .dir.display())]
    NoCandidates { dir: PathBuf, extension: String },

    /// The search pattern built from the input path is invalid.
    #[error("invalid search pattern: {0}")]
    Pattern(String),
}

/// Errors raised by a tabular writer.
#[derive(Error, Debug)]
pub enum SinkError {
    /// The output format was compiled out of this build.
    #[error("writing {format} requires the `{feature}` feature, which is not enabled in this build")]
    MissingCapability {
        format: &'static str,
        feature: &'static str,
    },

    /// I/O error while writing the destination.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The encoder for the output format failed.
    #[error("failed to encode {format}: {reason}")]
    Encode { format: &'static str, reason: String },
}

impl SinkError {
    /// Whether installing/enabling a capability would fix this error.
    pub fn is_missing_capability(&self) -> bool {
        matches!(self, Self::MissingCapability { .. })
    }
}

/// Result type for the nfe library.
pub type Result<T> = std::result::Result<T, NfeError>;
