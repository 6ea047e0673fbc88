//! Workbook reader (xlsx, xls, xlsb, ods) backed by calamine

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;

use crate::error::ImportError;
use crate::sheet::{Cell, Sheet};

/// Read the first sheet of a workbook held in memory
pub fn read_workbook(bytes: Vec<u8>) -> Result<Sheet, ImportError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let first_sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ImportError::NoSheets)?;

    let range = workbook.worksheet_range(&first_sheet)?;

    // Ranges start at the first used cell; pad so column indices match the sheet
    let col_offset = range.start().map(|(_, col)| col as usize).unwrap_or(0);

    let rows = range
        .rows()
        .map(|row| {
            let mut cells = vec![Cell::Empty; col_offset];
            cells.extend(row.iter().map(convert_cell));
            cells
        })
        .collect();

    log::debug!("Read workbook sheet '{}' (offset col {})", first_sheet, col_offset);

    Ok(Sheet {
        name: first_sheet,
        rows,
    })
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            if s.trim().is_empty() {
                Cell::Empty
            } else {
                Cell::Text(s.trim().to_string())
            }
        }
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::Error(_) => Cell::Empty,
    }
}
