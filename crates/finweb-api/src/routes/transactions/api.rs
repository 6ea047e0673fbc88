//! Transactions API endpoints
//!
//! Endpoints:
//! - api_transactions: Filtered movement list (JSON)
//! - api_create_transaction / api_update_transaction / api_delete_transaction
//! - api_delete_transactions: Bulk delete by id
//! - api_transaction_months: Options for the month selector

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use finweb_core::filter::month_options;
use finweb_core::report::MovementsResponse;
use finweb_core::{MonthOption, Movement, MovementDraft, MovementFilter};

use crate::error::{ApiResult, LogFailure};
use crate::{today, AppState};

/// Month/account selection from the query string; blanks fall back to a default
#[derive(Debug, Default, Clone, Deserialize)]
pub struct FilterQuery {
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub card: Option<String>,
}

impl FilterQuery {
    pub fn resolve(self, fallback: MovementFilter) -> MovementFilter {
        MovementFilter {
            month: self.month.filter(|m| !m.trim().is_empty()).unwrap_or(fallback.month),
            card: self.card.filter(|c| !c.trim().is_empty()).unwrap_or(fallback.card),
        }
    }
}

/// Movements matching the filter; no filter means everything
pub async fn api_transactions(State(state): State<AppState>, Query(query): Query<FilterQuery>) -> Json<MovementsResponse> {
    let tracker = state.tracker.read().await;
    let filter = query.resolve(MovementFilter::default());
    let movements = tracker.filtered(&filter);
    Json(MovementsResponse {
        total_count: movements.len(),
        filter,
        movements,
    })
}

pub async fn api_create_transaction(
    State(state): State<AppState>,
    Json(draft): Json<MovementDraft>,
) -> ApiResult<(StatusCode, Json<Movement>)> {
    let mut tracker = state.tracker.write().await;
    let movement = tracker.add_movement(draft).log_failure("create_transaction")?;
    Ok((StatusCode::CREATED, Json(movement)))
}

pub async fn api_update_transaction(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(draft): Json<MovementDraft>,
) -> ApiResult<Json<Movement>> {
    let mut tracker = state.tracker.write().await;
    let movement = tracker.update_movement(id, draft).log_failure("update_transaction")?;
    Ok(Json(movement))
}

pub async fn api_delete_transaction(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Movement>> {
    let mut tracker = state.tracker.write().await;
    let movement = tracker.delete_movement(id).log_failure("delete_transaction")?;
    Ok(Json(movement))
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeleteRequest {
    pub ids: Vec<i64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeleteResponse {
    pub deleted: usize,
}

/// Delete every listed movement; unknown ids are skipped
pub async fn api_delete_transactions(
    State(state): State<AppState>,
    Json(request): Json<DeleteRequest>,
) -> ApiResult<Json<DeleteResponse>> {
    let mut tracker = state.tracker.write().await;
    let deleted = tracker.delete_movements(&request.ids).log_failure("delete_transactions")?;
    Ok(Json(DeleteResponse { deleted }))
}

pub async fn api_transaction_months() -> Json<Vec<MonthOption>> {
    Json(month_options(today()))
}
