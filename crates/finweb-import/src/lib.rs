//! Spreadsheet and CSV readers
//!
//! Uploaded files are reduced to the first sheet as rows of [`Cell`]s; turning
//! those rows into movements is the tracker's job.

use async_trait::async_trait;
use std::sync::Arc;

pub mod csv_sheet;
pub mod error;
pub mod sheet;
pub mod workbook;

pub use error::ImportError;
pub use sheet::{Cell, Sheet, SheetFormat};

/// Reader reference type
pub type SheetReaderRef = Arc<dyn SheetReader>;

/// Trait for sheet readers
#[async_trait]
pub trait SheetReader: Send + Sync {
    /// Read the first sheet from in-memory file contents
    async fn read_bytes(&self, bytes: Vec<u8>, format: SheetFormat) -> Result<Sheet, ImportError>;
}

/// Default reader: calamine for workbooks, csv for delimited text
#[derive(Debug, Default)]
pub struct DefaultSheetReader;

#[async_trait]
impl SheetReader for DefaultSheetReader {
    async fn read_bytes(&self, bytes: Vec<u8>, format: SheetFormat) -> Result<Sheet, ImportError> {
        log::debug!("Reading {} bytes as {}", bytes.len(), format);
        tokio::task::spawn_blocking(move || match format {
            SheetFormat::Workbook => workbook::read_workbook(bytes),
            SheetFormat::Csv => csv_sheet::read_csv(&bytes),
        })
        .await
        .map_err(|_| ImportError::InternalError)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_csv_bytes() {
        let bytes = "Fecha,Descripción,Monto\n2026-10-01,Nómina,15000\n".as_bytes().to_vec();
        let sheet = DefaultSheetReader.read_bytes(bytes, SheetFormat::Csv).await.unwrap();
        assert_eq!(sheet.row_count(), 2);
        assert_eq!(sheet.rows[1][2], Cell::Number(15000.0));
    }

    #[tokio::test]
    async fn test_garbage_workbook_rejected() {
        let result = DefaultSheetReader
            .read_bytes(b"not a workbook".to_vec(), SheetFormat::Workbook)
            .await;
        assert!(matches!(result, Err(ImportError::Workbook { .. })));
    }
}
