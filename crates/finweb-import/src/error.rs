//! Error types for finweb-import

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Unsupported file format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Workbook error: {message}")]
    Workbook { message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Workbook has no sheets")]
    NoSheets,

    #[error("Internal error")]
    InternalError,
}

impl From<calamine::Error> for ImportError {
    fn from(error: calamine::Error) -> Self {
        ImportError::Workbook {
            message: error.to_string(),
        }
    }
}
