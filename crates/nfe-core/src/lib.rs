//! Core library for consolidating NFe invoice XML files into one table.
//!
//! This crate provides:
//! - An untyped XML document tree with dotted-path lookup
//! - Header-level invoice extraction with shape and address fallbacks
//! - Candidate discovery and best-effort batch processing
//! - Table consolidation and XLSX/CSV/JSON writers

pub mod batch;
pub mod document;
pub mod error;
pub mod invoice;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod scan;
pub mod table;

pub use batch::{BatchOutcome, BatchProcessor, NoProgress, ProgressObserver};
pub use document::{Node, RawDocument};
pub use error::{ExtractionError, NfeError, Result, ScanError, SinkError};
pub use invoice::{DocumentExtractor, FileOutcome, InvoiceExtractor};
pub use models::config::NfeConfig;
pub use models::record::{AddressFields, InvoiceRecord};
pub use output::{OutputFormat, TabularWriter};
pub use pipeline::{run, RunSummary};
pub use scan::CorpusScanner;
pub use table::{ConsolidatedTable, COLUMNS};
