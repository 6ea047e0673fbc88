//! Tool routes - Backup, restore, report and spreadsheet import
//!
//! Features:
//! - JSON backup download and restore
//! - CSV report of every movement
//! - Spreadsheet import with a reviewable preview: reassign the account,
//!   edit or drop rows, then confirm or cancel
//!
//! Structure:
//! - api.rs: JSON API endpoints and downloads
//! - page.rs: Tools page and the import preview fragment

pub mod api;
pub mod page;

pub use api::{
    api_backup,
    api_import,
    api_import_apply_account,
    api_import_cancel,
    api_import_confirm,
    api_import_preview,
    api_import_remove_row,
    api_import_update_row,
    api_report_csv,
    api_restore,
    ApplyAccountRequest,
    ConfirmResponse,
    RestoreResponse,
    UploadQuery,
};
pub use page::{htmx_import_preview, page_tools};
