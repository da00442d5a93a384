//! Excel (.xlsx) output.
//!
//! The workbook is a single worksheet of inline strings. Archive entries are
//! stamped with a fixed timestamp, so the same table always produces the same
//! bytes.

use std::path::Path;

use crate::error::SinkError;
use crate::table::ConsolidatedTable;

use super::TabularWriter;

/// Longest sheet name Excel accepts.
const MAX_SHEET_NAME: usize = 31;

/// Writes the table as an Excel workbook.
#[derive(Debug, Clone)]
pub struct XlsxWriter {
    sheet_name: String,
}

impl Default for XlsxWriter {
    fn default() -> Self {
        Self::new("Invoices")
    }
}

impl XlsxWriter {
    /// Create a writer using `sheet_name` for the worksheet.
    pub fn new(sheet_name: &str) -> Self {
        Self {
            sheet_name: sanitize_sheet_name(sheet_name),
        }
    }
}

impl TabularWriter for XlsxWriter {
    #[cfg(feature = "xlsx")]
    fn write(&self, table: &ConsolidatedTable, destination: &Path) -> Result<(), SinkError> {
        let file = std::fs::File::create(destination)?;
        package::write_workbook(std::io::BufWriter::new(file), &self.sheet_name, table)
    }

    #[cfg(not(feature = "xlsx"))]
    fn write(&self, _table: &ConsolidatedTable, _destination: &Path) -> Result<(), SinkError> {
        Err(SinkError::MissingCapability {
            format: "xlsx",
            feature: "xlsx",
        })
    }
}

fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(MAX_SHEET_NAME)
        .collect();
    let cleaned = cleaned.trim_matches('\'').trim();
    if cleaned.is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Spreadsheet column letters for a zero-based index (`0 -> A`, `26 -> AA`).
#[cfg_attr(not(feature = "xlsx"), allow(dead_code))]
fn column_letters(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Worksheet XML for the table, header row first.
#[cfg_attr(not(feature = "xlsx"), allow(dead_code))]
fn sheet_xml(table: &ConsolidatedTable) -> String {
    let mut xml = String::from(concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    ));

    let header = std::iter::once(*table.columns());
    for (row_index, row) in header.chain(table.iter_values()).enumerate() {
        let row_number = row_index + 1;
        xml.push_str(&format!(r#"<row r="{row_number}">"#));
        for (col_index, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            xml.push_str(&format!(
                r#"<c r="{}{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                column_letters(col_index),
                row_number,
                quick_xml::escape::escape(*value)
            ));
        }
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

#[cfg(feature = "xlsx")]
mod package {
    use std::io::{Seek, Write};

    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, DateTime, ZipWriter};

    use super::sheet_xml;
    use crate::error::SinkError;
    use crate::table::ConsolidatedTable;

    const CONTENT_TYPES: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
        r#"<Default Extension="xml" ContentType="application/xml"/>"#,
        r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
        r#"<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
        r#"</Types>"#,
    );

    const ROOT_RELS: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
        r#"</Relationships>"#,
    );

    const WORKBOOK_RELS: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>"#,
        r#"</Relationships>"#,
    );

    fn workbook_xml(sheet_name: &str) -> String {
        format!(
            concat!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
                r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
                r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
                r#"<sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
            ),
            quick_xml::escape::escape(sheet_name)
        )
    }

    pub(super) fn write_workbook<W: Write + Seek>(
        out: W,
        sheet_name: &str,
        table: &ConsolidatedTable,
    ) -> Result<(), SinkError> {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());

        let parts = [
            ("[Content_Types].xml", CONTENT_TYPES.to_string()),
            ("_rels/.rels", ROOT_RELS.to_string()),
            ("xl/workbook.xml", workbook_xml(sheet_name)),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.to_string()),
            ("xl/worksheets/sheet1.xml", sheet_xml(table)),
        ];

        let mut zip = ZipWriter::new(out);
        for (name, content) in parts {
            zip.start_file(name, options.clone()).map_err(zip_error)?;
            zip.write_all(content.as_bytes())?;
        }
        let mut out = zip.finish().map_err(zip_error)?;
        out.flush()?;
        Ok(())
    }

    fn zip_error(e: zip::result::ZipError) -> SinkError {
        match e {
            zip::result::ZipError::Io(e) => SinkError::Io(e),
            other => SinkError::Encode {
                format: "xlsx",
                reason: other.to_string(),
            },
        }
    }
}
