//! CSV reader, yielding the same sheet model as workbooks

use crate::error::ImportError;
use crate::sheet::{Cell, Sheet};

/// Read CSV bytes as a single sheet; a UTF-8 BOM is ignored
pub fn read_csv(bytes: &[u8]) -> Result<Sheet, ImportError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF".as_slice()).unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(Cell::infer).collect());
    }

    Ok(Sheet {
        name: "csv".to_string(),
        rows,
    })
}
