//! Error types for finweb-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use finweb_core::error::{DefaultErrorLogger, ErrorCode, ErrorContext, ErrorDetails, ErrorLogger};
use finweb_core::CoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Payload too large: {size} bytes (limit {limit})")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Internal server error")]
    InternalError,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Core(e) => match e.code() {
                ErrorCode::AccountNotFound | ErrorCode::MovementNotFound => StatusCode::NOT_FOUND,
                ErrorCode::ValidationError | ErrorCode::InvalidFormat => StatusCode::BAD_REQUEST,
                ErrorCode::ImportError => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::NothingToImport => StatusCode::CONFLICT,
                ErrorCode::SyncDisabled => StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::SyncError => StatusCode::BAD_GATEWAY,
                ErrorCode::StorageError | ErrorCode::IoError | ErrorCode::InternalError => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    /// Body sent to API clients
    pub fn details(&self) -> ErrorDetails {
        match self {
            ApiError::Core(e) => e.to_details(),
            ApiError::NotFound { .. } => ErrorDetails::new(ErrorCode::InternalError, self.to_string()),
            other => ErrorDetails::new(ErrorCode::ValidationError, other.to_string()),
        }
    }

    /// Logging context: the operation plus the HTTP status it maps to
    pub fn context(&self, operation: &str) -> ErrorContext {
        ErrorContext::new(operation).with_data("status", serde_json::json!(self.status().as_u16()))
    }

    /// Log the error against the operation that produced it
    pub fn log(&self, operation: &str) {
        let context = self.context(operation);
        match self {
            ApiError::Core(e) => DefaultErrorLogger.log_error(e, &context),
            other => DefaultErrorLogger.log_warning(&other.to_string(), &context),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.details())).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Log a failure against its operation on the way to the response
pub trait LogFailure<T> {
    fn log_failure(self, operation: &str) -> ApiResult<T>;
}

impl<T, E: Into<ApiError>> LogFailure<T> for Result<T, E> {
    fn log_failure(self, operation: &str) -> ApiResult<T> {
        self.map_err(|e| {
            let e = e.into();
            e.log(operation);
            e
        })
    }
}
