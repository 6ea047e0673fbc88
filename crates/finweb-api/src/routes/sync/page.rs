//! Sync panel fragment, embedded in the settings page

use axum::extract::State;
use axum::response::Html;

use finweb_core::{SyncState, SyncStatus};
use finweb_utils::escape_html;

use super::api::{pull, push};
use crate::AppState;

/// Status panel with push/pull buttons; `message` reports the last action
pub fn render_sync_panel(sync: &SyncState, message: Option<&str>) -> String {
    if !sync.enabled || sync.user_id.is_none() {
        return r#"<div id='sync-panel' class='text-sm text-gray-500'>
    La sincronización está desactivada. Configura <code>sync.enabled</code>, <code>sync.base_url</code> y <code>sync.user_id</code>.
</div>"#
            .to_string();
    }

    let (badge, tone) = match sync.status {
        SyncStatus::Idle => ("Listo", "bg-green-100 text-green-700"),
        SyncStatus::Saving => ("Guardando…", "bg-blue-100 text-blue-700"),
        SyncStatus::Loading => ("Cargando…", "bg-blue-100 text-blue-700"),
        SyncStatus::Error => ("Error", "bg-red-100 text-red-700"),
    };
    let last_sync = sync
        .last_sync
        .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "nunca".to_string());
    let error = sync
        .last_error
        .as_deref()
        .map(|e| format!("<p class='text-sm text-red-600'>{}</p>", escape_html(e)))
        .unwrap_or_default();
    let message = message
        .map(|m| format!("<p class='text-sm text-indigo-600'>{}</p>", escape_html(m)))
        .unwrap_or_default();

    format!(
        r#"<div id='sync-panel' class='space-y-3'>
    <div class='flex items-center gap-3'>
        <span class='px-2 py-0.5 rounded text-xs {}'>{}</span>
        <span class='text-sm'>Usuario {}</span>
        <span class='text-sm text-gray-500'>Última sincronización: {}</span>
    </div>
    {}{}
    <div class='flex gap-3'>
        <button hx-post='/sync/push' hx-target='#sync-panel' hx-swap='outerHTML' class='px-3 py-2 bg-indigo-600 text-white rounded-lg'>Subir a la nube</button>
        <button hx-post='/sync/pull' hx-target='#sync-panel' hx-swap='outerHTML' hx-confirm='¿Reemplazar los datos locales con los de la nube?' class='px-3 py-2 border rounded-lg'>Descargar de la nube</button>
    </div>
</div>"#,
        tone,
        badge,
        escape_html(sync.user_id.as_deref().unwrap_or_default()),
        last_sync,
        error,
        message
    )
}

pub async fn htmx_sync_panel(State(state): State<AppState>) -> Html<String> {
    let sync = state.sync.lock().await;
    Html(render_sync_panel(sync.state(), None))
}

pub async fn htmx_sync_push(State(state): State<AppState>) -> Html<String> {
    let (sync_state, message) = match push(&state).await {
        Ok(sync_state) => (sync_state, "Datos guardados en la nube"),
        Err(e) => {
            log::warn!("Sync push from panel failed: {}", e);
            (state.sync.lock().await.state().clone(), "No se pudo subir")
        }
    };
    Html(render_sync_panel(&sync_state, Some(message)))
}

pub async fn htmx_sync_pull(State(state): State<AppState>) -> Html<String> {
    let (sync_state, message) = match pull(&state).await {
        Ok((true, sync_state)) => (sync_state, "Datos descargados de la nube"),
        Ok((false, sync_state)) => (sync_state, "No hay datos guardados en la nube"),
        Err(e) => {
            log::warn!("Sync pull from panel failed: {}", e);
            (state.sync.lock().await.state().clone(), "No se pudo descargar")
        }
    };
    Html(render_sync_panel(&sync_state, Some(message)))
}
