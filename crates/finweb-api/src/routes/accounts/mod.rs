//! Account routes - Account management
//!
//! Features:
//! - Account list with debit availability or credit debt
//! - Create, edit and delete accounts (movements survive deletion)
//! - Initial balance / initial debt per account
//! - Card payments logged as "PAGO A TARJETA" movements
//! - Billing cycle derived from one real statement's dates
//!
//! Structure:
//! - api.rs: JSON API endpoints
//! - page.rs: Full page rendering and form posts

pub mod api;
pub mod page;

pub use api::{
    api_accounts,
    api_create_account,
    api_delete_account,
    api_derive_cycle,
    api_record_payment,
    api_set_initial_balance,
    api_update_account,
    DeriveCycleRequest,
    InitialBalanceRequest,
    InitialBalanceResponse,
    PaymentRequest,
};
pub use page::{
    form_create_account,
    form_delete_account,
    form_initial_balance,
    form_payment,
    page_accounts,
    AccountForm,
    AmountForm,
};
