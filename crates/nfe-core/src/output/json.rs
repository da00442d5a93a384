//! JSON output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::SinkError;
use crate::table::ConsolidatedTable;

use super::TabularWriter;

/// Writes the table as a JSON array of row objects, keys in column order.
#[derive(Debug, Clone, Default)]
pub struct JsonWriter {
    pretty: bool,
}

impl JsonWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretty-print the output.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl TabularWriter for JsonWriter {
    fn write(&self, table: &ConsolidatedTable, destination: &Path) -> Result<(), SinkError> {
        let mut out = BufWriter::new(File::create(destination)?);
        let result = if self.pretty {
            serde_json::to_writer_pretty(&mut out, table.rows())
        } else {
            serde_json::to_writer(&mut out, table.rows())
        };
        result.map_err(|e| SinkError::Encode {
            format: "json",
            reason: e.to_string(),
        })?;
        out.write_all(b"\n")?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::InvoiceRecord;

    #[test]
    fn test_json_keys_in_column_order() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("out.json");
        let table = ConsolidatedTable::assemble(vec![InvoiceRecord {
            key: "9".to_string(),
            file_name: "n.xml".to_string(),
            ..Default::default()
        }]);

        JsonWriter::new().write(&table, &destination).unwrap();
        let text = std::fs::read_to_string(&destination).unwrap();

        let key_pos = text.find("\"key\"").unwrap();
        let note_pos = text.find("\"note_id\"").unwrap();
        let file_pos = text.find("\"file_name\"").unwrap();
        assert!(key_pos < note_pos && note_pos < file_pos);

        let back: Vec<InvoiceRecord> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, table.rows());
    }
}
