//! NFe document to [`InvoiceRecord`] extraction.

use tracing::debug;

use crate::document::{resolve_text, Node, RawDocument};
use crate::error::ExtractionError;
use crate::models::config::ExtractionConfig;
use crate::models::record::InvoiceRecord;

use super::address::extract_address;
use super::{FileOutcome, InvoiceExtractor};

/// Known locations of the `infNFe` header block, tried in order.
///
/// Authorized invoices are wrapped in an `nfeProc` envelope; bare `NFe`
/// documents are not.
pub const HEADER_PATHS: [&str; 2] = ["nfeProc.NFe.infNFe", "NFe.infNFe"];

/// Extracts header-level fields from NFe-like XML documents.
#[derive(Debug, Clone, Default)]
pub struct DocumentExtractor {
    config: ExtractionConfig,
}

impl DocumentExtractor {
    /// Create an extractor with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given extraction configuration.
    pub fn with_config(mut self, config: ExtractionConfig) -> Self {
        self.config = config;
        self
    }

    /// Locate the header block using the first shape that matches.
    pub fn header_block(document: &RawDocument) -> Option<&Node> {
        HEADER_PATHS
            .iter()
            .filter_map(|path| document.resolve(path))
            .find(|node| node.is_map())
    }

    /// Build a record from a located header block.
    pub fn record_from_header(&self, info: &Node, file_name: &str) -> InvoiceRecord {
        let note_id = resolve_text(info, "@Id").to_string();
        let key = self.config.derive_key(&note_id);

        InvoiceRecord {
            key,
            note_id,
            issuer_name: resolve_text(info, "emit.xNome").to_string(),
            recipient_name: resolve_text(info, "dest.xNome").to_string(),
            file_name: file_name.to_string(),
            ..Default::default()
        }
        .with_address(extract_address(info))
    }
}

impl InvoiceExtractor for DocumentExtractor {
    fn extract(&self, bytes: &[u8], file_name: &str) -> FileOutcome {
        let document = RawDocument::parse(bytes).map_err(|e| ExtractionError::Parse {
            file_name: file_name.to_string(),
            reason: e.to_string(),
        })?;

        let Some(info) = Self::header_block(&document) else {
            debug!("Ignored (doesn't look like NFe): {}", file_name);
            return Err(ExtractionError::StructuralMismatch {
                file_name: file_name.to_string(),
            });
        };

        let record = self.record_from_header(info, file_name);
        debug!("Extracted key '{}' from {}", record.key, file_name);
        Ok(record)
    }
}
