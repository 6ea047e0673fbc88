//! Sync routes - Manual cloud backup
//!
//! Push uploads a snapshot of the whole state; pull replaces the local parts
//! present in the stored snapshot.

pub mod api;
pub mod page;

pub use api::{api_sync_pull, api_sync_push, api_sync_status, PullResponse};
pub use page::{htmx_sync_panel, htmx_sync_pull, htmx_sync_push, render_sync_panel};
