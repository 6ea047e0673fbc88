//! Sync API endpoints

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use finweb_core::{CoreResult, SyncState};

use crate::error::{ApiResult, LogFailure};
use crate::AppState;

pub async fn api_sync_status(State(state): State<AppState>) -> Json<SyncState> {
    Json(state.sync.lock().await.state().clone())
}

/// Upload the current state
pub(crate) async fn push(state: &AppState) -> CoreResult<SyncState> {
    let snapshot = state.tracker.read().await.snapshot();
    let mut sync = state.sync.lock().await;
    sync.push(snapshot).await?;
    Ok(sync.state().clone())
}

/// Download the stored snapshot and apply it; `false` when nothing was stored
pub(crate) async fn pull(state: &AppState) -> CoreResult<(bool, SyncState)> {
    let mut sync = state.sync.lock().await;
    let applied = match sync.pull().await? {
        Some(snapshot) => {
            state.tracker.write().await.apply_snapshot(snapshot)?;
            log::info!("Applied cloud snapshot");
            true
        }
        None => false,
    };
    Ok((applied, sync.state().clone()))
}

pub async fn api_sync_push(State(state): State<AppState>) -> ApiResult<Json<SyncState>> {
    let sync_state = push(&state).await.log_failure("sync_push")?;
    Ok(Json(sync_state))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullResponse {
    pub applied: bool,
    pub state: SyncState,
}

pub async fn api_sync_pull(State(state): State<AppState>) -> ApiResult<Json<PullResponse>> {
    let (applied, sync_state) = pull(&state).await.log_failure("sync_pull")?;
    Ok(Json(PullResponse {
        applied,
        state: sync_state,
    }))
}
