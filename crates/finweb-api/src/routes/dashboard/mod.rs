//! Dashboard routes - Overview of the whole tracker
//!
//! Features:
//! - Headline totals (available funds, card debt, cash net)
//! - Credit card payment alerts, soonest due first
//! - Account summary cards
//! - Quick movement form and latest movements
//!
//! Structure:
//! - api.rs: JSON API endpoints
//! - page.rs: Full page rendering

pub mod api;
pub mod page;

pub use api::{api_alerts, api_balances, api_state, AlertsQuery};
pub use page::{page_dashboard, render_account_cards, render_alerts};
