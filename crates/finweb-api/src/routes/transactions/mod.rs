//! Transaction routes - Movement list and CRUD
//!
//! Features:
//! - List movements filtered by month and account, newest first
//! - Create, edit and delete movements
//! - Bulk delete of selected movements
//! - HTMX partial updates of the list when filters change
//!
//! Structure:
//! - api.rs: JSON API endpoints
//! - page.rs: Full page rendering, HTML fragments and form posts

pub mod api;
pub mod page;

pub use api::{
    api_create_transaction,
    api_delete_transaction,
    api_delete_transactions,
    api_transaction_months,
    api_transactions,
    api_update_transaction,
    DeleteRequest,
    DeleteResponse,
    FilterQuery,
};
pub use page::{
    form_create_movement,
    form_delete_movement,
    htmx_transactions_list,
    page_transactions,
    render_movement_form,
    render_movement_table,
    MovementForm,
};
