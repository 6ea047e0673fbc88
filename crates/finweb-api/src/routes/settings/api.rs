//! Settings API endpoints - JSON API

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use finweb_config::Config;
use finweb_core::Theme;

use crate::error::{ApiResult, LogFailure};
use crate::AppState;

/// Config as JSON with the sync token masked
pub fn public_settings(config: &Config) -> serde_json::Value {
    let mut value = serde_json::to_value(config).unwrap_or_default();
    if let Some(sync) = value.get_mut("sync").and_then(|s| s.as_object_mut()) {
        let masked = if config.sync.token.is_empty() { "" } else { "********" };
        sync.insert("token".to_string(), serde_json::Value::String(masked.to_string()));
    }
    value
}

pub async fn api_settings(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(public_settings(&state.config))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeResponse {
    pub theme: Theme,
}

pub async fn api_toggle_theme(State(state): State<AppState>) -> ApiResult<Json<ThemeResponse>> {
    let mut tracker = state.tracker.write().await;
    let theme = tracker.toggle_theme().log_failure("toggle_theme")?;
    Ok(Json(ThemeResponse { theme }))
}

/// Delete every movement and zero the initial balances; accounts are kept
pub async fn api_reset(State(state): State<AppState>) -> ApiResult<StatusCode> {
    let mut tracker = state.tracker.write().await;
    tracker.reset().log_failure("reset")?;
    Ok(StatusCode::NO_CONTENT)
}
