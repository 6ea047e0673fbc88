//! Error types for finweb-core
//!
//! Every tracker failure carries a stable code, a severity and, through
//! [`CoreError::to_details`], suggestions suitable for API responses.

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Account not found
    AccountNotFound,
    /// Movement not found
    MovementNotFound,
    /// Validation error
    ValidationError,
    /// Invalid data format (backups, stored slots)
    InvalidFormat,
    /// Storage read/write failure
    StorageError,
    /// IO error
    IoError,
    /// Spreadsheet could not be read
    ImportError,
    /// Nothing pending to confirm
    NothingToImport,
    /// Cloud sync not configured
    SyncDisabled,
    /// Cloud sync request failed
    SyncError,
    /// Internal error
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::AccountNotFound => write!(f, "ACCOUNT_NOT_FOUND"),
            ErrorCode::MovementNotFound => write!(f, "MOVEMENT_NOT_FOUND"),
            ErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
            ErrorCode::InvalidFormat => write!(f, "INVALID_FORMAT"),
            ErrorCode::StorageError => write!(f, "STORAGE_ERROR"),
            ErrorCode::IoError => write!(f, "IO_ERROR"),
            ErrorCode::ImportError => write!(f, "IMPORT_ERROR"),
            ErrorCode::NothingToImport => write!(f, "NOTHING_TO_IMPORT"),
            ErrorCode::SyncDisabled => write!(f, "SYNC_DISABLED"),
            ErrorCode::SyncError => write!(f, "SYNC_ERROR"),
            ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Debug,
    Info,
    /// Operation rejected, state unchanged
    Warning,
    /// Operation failed
    Error,
    /// Application may be unstable
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Debug => write!(f, "debug"),
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Main error type for finweb-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Account not found: {id}")]
    AccountNotFound { id: String },

    #[error("Movement not found: {id}")]
    MovementNotFound { id: i64 },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    #[error("Storage error on '{key}': {message}")]
    StorageError { key: String, message: String },

    #[error("IO error: {message}")]
    IoError { message: String },

    #[error("Import failed: {message}")]
    ImportError { message: String },

    #[error("No imported rows pending confirmation")]
    NothingToImport,

    #[error("Cloud sync is disabled")]
    SyncDisabled,

    #[error("Cloud sync failed: {message}")]
    SyncError { message: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::ValidationError {
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::AccountNotFound { .. } => ErrorCode::AccountNotFound,
            CoreError::MovementNotFound { .. } => ErrorCode::MovementNotFound,
            CoreError::ValidationError { .. } => ErrorCode::ValidationError,
            CoreError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            CoreError::StorageError { .. } => ErrorCode::StorageError,
            CoreError::IoError { .. } => ErrorCode::IoError,
            CoreError::ImportError { .. } => ErrorCode::ImportError,
            CoreError::NothingToImport => ErrorCode::NothingToImport,
            CoreError::SyncDisabled => ErrorCode::SyncDisabled,
            CoreError::SyncError { .. } => ErrorCode::SyncError,
            CoreError::InternalError { .. } => ErrorCode::InternalError,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::AccountNotFound { .. } => ErrorSeverity::Info,
            CoreError::MovementNotFound { .. } => ErrorSeverity::Info,
            CoreError::ValidationError { .. } => ErrorSeverity::Warning,
            CoreError::InvalidFormat { .. } => ErrorSeverity::Warning,
            CoreError::StorageError { .. } => ErrorSeverity::Error,
            CoreError::IoError { .. } => ErrorSeverity::Error,
            CoreError::ImportError { .. } => ErrorSeverity::Warning,
            CoreError::NothingToImport => ErrorSeverity::Info,
            CoreError::SyncDisabled => ErrorSeverity::Info,
            CoreError::SyncError { .. } => ErrorSeverity::Error,
            CoreError::InternalError { .. } => ErrorSeverity::Critical,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::AccountNotFound { id } => {
                details = details.with_suggestion(format!(
                    "Check that the account '{}' has not been deleted.",
                    id
                ));
                details = details
                    .with_suggestion("Use the /api/accounts endpoint to list all accounts.".to_string());
            }
            CoreError::MovementNotFound { .. } => {
                details = details
                    .with_suggestion("Use the /api/transactions endpoint to list all movements.".to_string());
            }
            CoreError::ValidationError { message } => {
                details = details.with_detail(serde_json::json!({ "validation_message": message }));
            }
            CoreError::InvalidFormat { message } => {
                details = details.with_detail(serde_json::json!({ "format_message": message }));
                details = details.with_suggestion(
                    "Backups must contain both 'expenses' and 'initialBalances'.".to_string(),
                );
            }
            CoreError::ImportError { .. } => {
                details = details.with_suggestion(
                    "Use an .xlsx, .xls, .ods or .csv file with columns Fecha, Descripción, Monto, Tipo, Tarjeta, MSI."
                        .to_string(),
                );
            }
            CoreError::SyncDisabled => {
                details = details.with_suggestion(
                    "Set sync.enabled, sync.base_url and sync.user_id in the config file.".to_string(),
                );
            }
            CoreError::StorageError { key, .. } => {
                details = details.with_detail(serde_json::json!({ "key": key }));
                details = details
                    .with_suggestion("Check that data.path exists and is writable.".to_string());
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<io::Error> for CoreError {
    fn from(error: io::Error) -> Self {
        CoreError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<finweb_import::ImportError> for CoreError {
    fn from(error: finweb_import::ImportError) -> Self {
        CoreError::ImportError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for CoreError {
    fn from(error: csv::Error) -> Self {
        CoreError::InternalError {
            message: format!("CSV writer: {}", error),
        }
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(error: reqwest::Error) -> Self {
        CoreError::SyncError {
            message: error.to_string(),
        }
    }
}

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    pub operation: String,
    pub data: serde_json::Value,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            data: serde_json::json!({}),
        }
    }

    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data[key] = value;
        self
    }
}

/// Error logger trait
pub trait ErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
    fn log_warning(&self, message: &str, context: &ErrorContext);
}

/// Default error logger using the log crate
#[derive(Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        match error.severity() {
            ErrorSeverity::Debug | ErrorSeverity::Info => log::info!(
                target: "finweb::error",
                "[{}] {} - Operation: {}",
                error.code(),
                error,
                context.operation
            ),
            ErrorSeverity::Warning => log::warn!(
                target: "finweb::error",
                "[{}] {} - Operation: {} - Data: {}",
                error.code(),
                error,
                context.operation,
                context.data
            ),
            ErrorSeverity::Error | ErrorSeverity::Critical => log::error!(
                target: "finweb::error",
                "ERROR {} - Operation: {} - Data: {}",
                error.to_details(),
                context.operation,
                context.data
            ),
        }
    }

    fn log_warning(&self, message: &str, context: &ErrorContext) {
        log::warn!(
            target: "finweb::error",
            "WARNING: {} - Operation: {}",
            message,
            context.operation
        );
    }
}
