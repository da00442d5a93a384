//! Data models shared across the pipeline.

pub mod config;
pub mod record;

pub use config::{ExtractionConfig, KeyStrip, NfeConfig, OutputConfig, ScanConfig};
pub use record::{AddressFields, InvoiceRecord};
