//! Settings routes - Configuration display, theme and reset

pub mod api;
pub mod page;

pub use api::{api_reset, api_settings, api_toggle_theme, public_settings, ThemeResponse};
pub use page::{form_reset, form_toggle_theme, page_settings};
