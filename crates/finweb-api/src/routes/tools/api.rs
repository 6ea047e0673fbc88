//! Tools API endpoints
//!
//! Endpoints:
//! - api_backup / api_restore: JSON backup file
//! - api_report_csv: CSV report download
//! - api_import_*: Spreadsheet import preview and confirmation

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use finweb_core::backup::backup_file_name;
use finweb_core::import::normalize_rows;
use finweb_core::report::report_file_name;
use finweb_core::{Backup, CoreError, ImportPreview, PreviewRow};
use finweb_import::SheetFormat;

use crate::error::{ApiError, ApiResult, LogFailure};
use crate::{today, AppState};

fn check_size(size: usize, limit: usize) -> ApiResult<()> {
    if size > limit {
        return Err(ApiError::PayloadTooLarge { size, limit });
    }
    Ok(())
}

fn attachment(content_type: &str, file_name: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", file_name)),
        ],
        body,
    )
        .into_response()
}

/// Download the whole state as a JSON backup
pub async fn api_backup(State(state): State<AppState>) -> ApiResult<Response> {
    let tracker = state.tracker.read().await;
    let json = tracker.backup().to_json().log_failure("backup")?;
    Ok(attachment("application/json", &backup_file_name(today()), json))
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RestoreResponse {
    pub movements: usize,
    pub accounts: usize,
}

/// Replace the state with an uploaded backup file
pub async fn api_restore(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<RestoreResponse>> {
    check_size(body.len(), state.config.import.max_upload_bytes).log_failure("restore")?;
    let content = std::str::from_utf8(&body)
        .map_err(|_| ApiError::bad_request("backup file is not UTF-8 text"))
        .log_failure("restore")?;
    let backup = Backup::from_json(content).log_failure("restore")?;

    let mut tracker = state.tracker.write().await;
    tracker.restore(backup).log_failure("restore")?;
    Ok(Json(RestoreResponse {
        movements: tracker.movements().len(),
        accounts: tracker.accounts().len(),
    }))
}

pub async fn api_report_csv(State(state): State<AppState>) -> ApiResult<Response> {
    let tracker = state.tracker.read().await;
    let csv = tracker.report_csv().log_failure("report")?;
    Ok(attachment("text/csv; charset=utf-8", &report_file_name(today()), csv))
}

/// How an uploaded file should be read: explicit `format`, else the `filename` extension
#[derive(Debug, Default, Clone, Deserialize)]
pub struct UploadQuery {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
}

impl UploadQuery {
    pub fn sheet_format(&self) -> ApiResult<SheetFormat> {
        let parsed = match (&self.format, &self.filename) {
            (Some(format), _) => format.parse(),
            (None, Some(name)) => SheetFormat::from_path(std::path::Path::new(name)),
            (None, None) => return Err(ApiError::bad_request("filename or format is required")),
        };
        parsed.map_err(|e| ApiError::from(CoreError::from(e)))
    }
}

/// Read an uploaded spreadsheet into a pending preview, replacing any earlier one
pub async fn api_import_preview(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> ApiResult<Json<ImportPreview>> {
    check_size(body.len(), state.config.import.max_upload_bytes).log_failure("import_preview")?;
    let format = query.sheet_format().log_failure("import_preview")?;
    let sheet = state
        .reader
        .read_bytes(body.to_vec(), format)
        .await
        .map_err(CoreError::from)
        .log_failure("import_preview")?;

    let rows = {
        let tracker = state.tracker.read().await;
        normalize_rows(&sheet, tracker.accounts(), today())
    };
    let preview = ImportPreview::from_rows(rows).log_failure("import_preview")?;
    log::info!(
        "Import preview ready: {} rows from {}",
        preview.len(),
        query.filename.as_deref().unwrap_or("upload")
    );

    *state.import.write().await = Some(preview.clone());
    Ok(Json(preview))
}

/// Pending preview, `null` when there is none
pub async fn api_import(State(state): State<AppState>) -> Json<Option<ImportPreview>> {
    Json(state.import.read().await.clone())
}

/// Account for every pending row; `null` moves them back to cash
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyAccountRequest {
    #[serde(default)]
    pub card_id: Option<String>,
}

pub async fn api_import_apply_account(
    State(state): State<AppState>,
    Json(request): Json<ApplyAccountRequest>,
) -> ApiResult<Json<ImportPreview>> {
    let card_id = request.card_id.filter(|id| !id.is_empty());
    if let Some(id) = &card_id {
        let tracker = state.tracker.read().await;
        if tracker.account(id).is_none() {
            return Err(CoreError::AccountNotFound { id: id.clone() }).log_failure("import_apply_account");
        }
    }

    let mut pending = state.import.write().await;
    let preview = pending.as_mut().ok_or(CoreError::NothingToImport)?;
    preview.apply_account(card_id.as_deref());
    Ok(Json(preview.clone()))
}

pub async fn api_import_update_row(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(row): Json<PreviewRow>,
) -> ApiResult<Json<ImportPreview>> {
    let mut pending = state.import.write().await;
    let preview = pending.as_mut().ok_or(CoreError::NothingToImport)?;
    preview.update_row(index, row).log_failure("import_update_row")?;
    Ok(Json(preview.clone()))
}

pub async fn api_import_remove_row(State(state): State<AppState>, Path(index): Path<usize>) -> ApiResult<Json<ImportPreview>> {
    let mut pending = state.import.write().await;
    let preview = pending.as_mut().ok_or(CoreError::NothingToImport)?;
    preview.remove_row(index).log_failure("import_remove_row")?;
    Ok(Json(preview.clone()))
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConfirmResponse {
    pub imported: usize,
}

/// Append the pending rows as movements and clear the preview
pub async fn api_import_confirm(State(state): State<AppState>) -> ApiResult<Json<ConfirmResponse>> {
    let mut pending = state.import.write().await;
    let preview = pending.as_ref().ok_or(CoreError::NothingToImport).log_failure("import_confirm")?;

    let mut tracker = state.tracker.write().await;
    let added = tracker.confirm_import(preview).log_failure("import_confirm")?;
    *pending = None;
    Ok(Json(ConfirmResponse { imported: added.len() }))
}

pub async fn api_import_cancel(State(state): State<AppState>) -> StatusCode {
    if state.import.write().await.take().is_some() {
        log::info!("Import preview discarded");
    }
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_query_format() {
        let query = UploadQuery {
            filename: Some("movimientos.XLSX".to_string()),
            format: None,
        };
        assert_eq!(query.sheet_format().unwrap(), SheetFormat::Workbook);

        let query = UploadQuery {
            filename: Some("movimientos.xlsx".to_string()),
            format: Some("csv".to_string()),
        };
        assert_eq!(query.sheet_format().unwrap(), SheetFormat::Csv);

        let query = UploadQuery {
            filename: Some("notas.txt".to_string()),
            format: None,
        };
        assert_eq!(query.sheet_format().unwrap_err().status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(UploadQuery::default().sheet_format().is_err());
    }

    #[test]
    fn test_check_size() {
        assert!(check_size(10, 10).is_ok());
        assert_eq!(check_size(11, 10).unwrap_err().status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
