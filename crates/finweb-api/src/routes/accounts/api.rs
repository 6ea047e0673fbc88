//! Accounts API endpoints - JSON API

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use finweb_core::{AccountDraft, AccountSummary, BillingCycle, Card, Movement, Tracker};

use crate::error::{ApiResult, LogFailure};
use crate::{today, AppState};

/// Every account with its computed balance, ordered by id
pub async fn api_accounts(State(state): State<AppState>) -> Json<Vec<AccountSummary>> {
    let tracker = state.tracker.read().await;
    Json(tracker.summaries())
}

pub async fn api_create_account(
    State(state): State<AppState>,
    Json(draft): Json<AccountDraft>,
) -> ApiResult<(StatusCode, Json<Card>)> {
    let mut tracker = state.tracker.write().await;
    let card = tracker.add_account(draft).log_failure("create_account")?;
    Ok((StatusCode::CREATED, Json(card)))
}

pub async fn api_update_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<AccountDraft>,
) -> ApiResult<Json<Card>> {
    let mut tracker = state.tracker.write().await;
    let card = tracker.edit_account(&id, draft).log_failure("update_account")?;
    Ok(Json(card))
}

/// Remove an account; movements charged to it are kept
pub async fn api_delete_account(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Card>> {
    let mut tracker = state.tracker.write().await;
    let card = tracker.delete_account(&id).log_failure("delete_account")?;
    Ok(Json(card))
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InitialBalanceRequest {
    pub value: Decimal,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InitialBalanceResponse {
    pub id: String,
    pub value: Decimal,
}

pub async fn api_set_initial_balance(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<InitialBalanceRequest>,
) -> ApiResult<Json<InitialBalanceResponse>> {
    let mut tracker = state.tracker.write().await;
    let value = tracker
        .set_initial_balance(&id, request.value)
        .log_failure("set_initial_balance")?;
    Ok(Json(InitialBalanceResponse { id, value }))
}

/// Payment toward a card; date defaults to today
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentRequest {
    pub amount: Decimal,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

pub async fn api_record_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<PaymentRequest>,
) -> ApiResult<(StatusCode, Json<Movement>)> {
    let mut tracker = state.tracker.write().await;
    let movement = tracker
        .record_payment(&id, request.amount, request.date.unwrap_or_else(today))
        .log_failure("record_payment")?;
    Ok((StatusCode::CREATED, Json(movement)))
}

/// A real statement: its cutoff date and its payment deadline
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeriveCycleRequest {
    pub cutoff_date: NaiveDate,
    pub payment_date: NaiveDate,
}

pub async fn api_derive_cycle(Json(request): Json<DeriveCycleRequest>) -> Json<BillingCycle> {
    Json(Tracker::grace_from_dates(request.cutoff_date, request.payment_date))
}
