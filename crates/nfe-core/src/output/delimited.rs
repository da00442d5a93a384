//! CSV output.

use std::path::Path;

use crate::error::SinkError;
use crate::table::ConsolidatedTable;

use super::TabularWriter;

/// Writes the table as RFC 4180 CSV.
#[derive(Debug, Clone, Default)]
pub struct CsvWriter;

impl CsvWriter {
    pub fn new() -> Self {
        Self
    }

    /// Encode the table into memory.
    pub fn to_bytes(&self, table: &ConsolidatedTable) -> Result<Vec<u8>, SinkError> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        write_rows(&mut wtr, table)?;
        wtr.into_inner()
            .map_err(|e| SinkError::Io(e.into_error()))
    }
}

impl TabularWriter for CsvWriter {
    fn write(&self, table: &ConsolidatedTable, destination: &Path) -> Result<(), SinkError> {
        let mut wtr = csv::Writer::from_path(destination).map_err(sink_error)?;
        write_rows(&mut wtr, table)?;
        wtr.flush()?;
        Ok(())
    }
}

fn write_rows<W: std::io::Write>(
    wtr: &mut csv::Writer<W>,
    table: &ConsolidatedTable,
) -> Result<(), SinkError> {
    wtr.write_record(table.columns()).map_err(sink_error)?;
    for row in table.iter_values() {
        wtr.write_record(row).map_err(sink_error)?;
    }
    Ok(())
}

fn sink_error(e: csv::Error) -> SinkError {
    match e.into_kind() {
        csv::ErrorKind::Io(e) => SinkError::Io(e),
        other => SinkError::Encode {
            format: "csv",
            reason: format!("{other:?}"),
        },
    }
}
