//! Dashboard API endpoints

use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use finweb_core::report::{BalancesResponse, StateResponse};
use finweb_core::PaymentAlert;

use crate::{today, AppState};

/// Whole persisted state: movements, initial balances, accounts and theme
pub async fn api_state(State(state): State<AppState>) -> Json<StateResponse> {
    let tracker = state.tracker.read().await;
    Json(StateResponse {
        expenses: tracker.movements().to_vec(),
        initial_balances: tracker.initial_balances().clone(),
        cards: tracker.accounts().clone(),
        theme: tracker.theme(),
    })
}

pub async fn api_balances(State(state): State<AppState>) -> Json<BalancesResponse> {
    let tracker = state.tracker.read().await;
    Json(BalancesResponse {
        accounts: tracker.summaries(),
        totals: tracker.totals(),
    })
}

/// Query for `/api/alerts`; `today` overrides the server date
#[derive(Debug, Default, Deserialize)]
pub struct AlertsQuery {
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

pub async fn api_alerts(State(state): State<AppState>, Query(query): Query<AlertsQuery>) -> Json<Vec<PaymentAlert>> {
    let tracker = state.tracker.read().await;
    Json(tracker.alerts(query.today.unwrap_or_else(today)))
}
