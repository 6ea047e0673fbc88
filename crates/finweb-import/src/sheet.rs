//! Sheet model shared by all readers

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ImportError;

/// A single spreadsheet cell, reduced to what the import pipeline needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Infer a cell from raw text: blank, numeric or plain text
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Cell::Empty
        } else if let Ok(n) = trimmed.parse::<f64>() {
            if n.is_finite() {
                Cell::Number(n)
            } else {
                Cell::Text(trimmed.to_string())
            }
        } else {
            Cell::Text(trimmed.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

/// First sheet of an uploaded file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Rows after the header row
    pub fn data_rows(&self) -> impl Iterator<Item = &Vec<Cell>> {
        self.rows.iter().skip(1)
    }
}

/// Input file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetFormat {
    /// xlsx, xlsm, xlsb, xls or ods
    Workbook,
    Csv,
}

impl SheetFormat {
    /// Pick the format from a file name or path extension
    pub fn from_path(path: &Path) -> Result<Self, ImportError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();
        extension.parse()
    }
}

impl std::str::FromStr for SheetFormat {
    type Err = ImportError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_start_matches('.').to_lowercase().as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" | "workbook" => Ok(SheetFormat::Workbook),
            "csv" => Ok(SheetFormat::Csv),
            other => Err(ImportError::UnsupportedFormat {
                extension: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for SheetFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetFormat::Workbook => write!(f, "workbook"),
            SheetFormat::Csv => write!(f, "csv"),
        }
    }
}
