//! Route modules for the API server
//!
//! - dashboard: Overview page, whole state, balances and alerts
//! - accounts: Account CRUD, initial balances, payments
//! - transactions: Movement list and CRUD
//! - tools: Backup/restore, CSV report, spreadsheet import
//! - sync: Cloud push/pull
//! - settings: Settings page, theme toggle, reset
//!
//! Each module follows a consistent structure:
//! - mod.rs: Module declaration and exports
//! - api.rs: JSON API endpoints
//! - page.rs: HTMX page rendering and form posts

pub mod accounts;
pub mod dashboard;
pub mod settings;
pub mod sync;
pub mod tools;
pub mod transactions;
