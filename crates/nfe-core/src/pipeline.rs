//! End-to-end conversion: batch, consolidate, write once.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::batch::{BatchProcessor, ProgressObserver};
use crate::error::{NfeError, Result};
use crate::invoice::InvoiceExtractor;
use crate::output::TabularWriter;
use crate::table::ConsolidatedTable;

/// What a successful run reports back to its host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Rows written.
    pub total_valid_records: usize,
    /// Base names of files that failed or were ignored.
    pub failed_file_names: Vec<String>,
    /// Where the table was written.
    pub destination: PathBuf,
}

/// Extract every candidate and write the consolidated table to `destination`.
///
/// Per-file failures only show up in [`RunSummary::failed_file_names`]. The
/// run itself fails with [`NfeError::EmptyBatch`] when no record survives, in
/// which case nothing is written, and with [`NfeError::Sink`] when the writer
/// fails. A cancelled batch is never written either.
pub fn run<E: InvoiceExtractor>(
    processor: &BatchProcessor<E>,
    candidates: &[PathBuf],
    observer: &dyn ProgressObserver,
    writer: &dyn TabularWriter,
    destination: &Path,
) -> Result<RunSummary> {
    let outcome = processor.process(candidates, observer);

    if outcome.cancelled {
        return Err(NfeError::Cancelled {
            processed: outcome.total_valid_records() + outcome.failed_file_names.len(),
            total: outcome.total_candidates,
        });
    }

    if outcome.is_empty() {
        return Err(NfeError::EmptyBatch {
            failed: outcome.failed_file_names.len(),
        });
    }

    let table = ConsolidatedTable::assemble(outcome.records);
    writer.write(&table, destination)?;

    info!(
        "Records: {} | Files with error/ignored: {}",
        table.len(),
        outcome.failed_file_names.len()
    );
    if !outcome.failed_file_names.is_empty() {
        debug!("Files with error: {}", outcome.failed_file_names.join(", "));
    }

    Ok(RunSummary {
        total_valid_records: table.len(),
        failed_file_names: outcome.failed_file_names,
        destination: destination.to_path_buf(),
    })
}
