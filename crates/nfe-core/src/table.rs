//! Consolidation of extracted records into one ordered table.

use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::models::record::InvoiceRecord;

/// Output columns, in order.
pub const COLUMNS: [&str; 12] = [
    "key",
    "note_id",
    "issuer_name",
    "recipient_name",
    "dest_street",
    "dest_number",
    "dest_district",
    "dest_city",
    "dest_state",
    "dest_zip",
    "dest_country",
    "file_name",
];

/// Records sorted by `(key, file_name)`, rows without a key last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsolidatedTable {
    rows: Vec<InvoiceRecord>,
}

impl ConsolidatedTable {
    /// Build the table from extracted records.
    pub fn assemble(records: Vec<InvoiceRecord>) -> Self {
        let mut rows = records;
        rows.sort_by(compare_rows);
        Self { rows }
    }

    /// Build the table from loosely-typed rows.
    ///
    /// Missing columns are filled with `""`, unknown keys are dropped and
    /// non-string values are rendered as their JSON text.
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = Map<String, Value>>,
    {
        let records = rows.into_iter().map(|row| record_from_row(&row)).collect();
        Self::assemble(records)
    }

    /// Column names, in output order.
    pub fn columns(&self) -> &'static [&'static str; 12] {
        &COLUMNS
    }

    /// Rows in output order.
    pub fn rows(&self) -> &[InvoiceRecord] {
        &self.rows
    }

    /// Cell values of row `index`, in column order.
    pub fn row_values(&self, index: usize) -> Option<[&str; 12]> {
        self.rows.get(index).map(values)
    }

    /// Iterate over all rows as cell values.
    pub fn iter_values(&self) -> impl Iterator<Item = [&str; 12]> + '_ {
        self.rows.iter().map(values)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Cell values of one record, in column order.
pub fn values(record: &InvoiceRecord) -> [&str; 12] {
    [
        &record.key,
        &record.note_id,
        &record.issuer_name,
        &record.recipient_name,
        &record.dest_street,
        &record.dest_number,
        &record.dest_district,
        &record.dest_city,
        &record.dest_state,
        &record.dest_zip,
        &record.dest_country,
        &record.file_name,
    ]
}

fn compare_rows(a: &InvoiceRecord, b: &InvoiceRecord) -> Ordering {
    // `false < true`, so keyed rows come first.
    a.key
        .is_empty()
        .cmp(&b.key.is_empty())
        .then_with(|| a.key.cmp(&b.key))
        .then_with(|| a.file_name.cmp(&b.file_name))
}

fn record_from_row(row: &Map<String, Value>) -> InvoiceRecord {
    let cell = |column: &str| match row.get(column) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };

    InvoiceRecord {
        key: cell("key"),
        note_id: cell("note_id"),
        issuer_name: cell("issuer_name"),
        recipient_name: cell("recipient_name"),
        dest_street: cell("dest_street"),
        dest_number: cell("dest_number"),
        dest_district: cell("dest_district"),
        dest_city: cell("dest_city"),
        dest_state: cell("dest_state"),
        dest_zip: cell("dest_zip"),
        dest_country: cell("dest_country"),
        file_name: cell("file_name"),
    }
}
