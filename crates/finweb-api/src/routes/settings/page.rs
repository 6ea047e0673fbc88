//! Settings page rendering - configuration, theme, reset and cloud sync

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{Html, Response};

use finweb_core::Theme;
use finweb_utils::escape_html;

use crate::error::ApiError;
use crate::{form_outcome, page_response, AppState};

pub async fn page_settings(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let config = &state.config;
    let theme = state.tracker.read().await.theme();

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Ajustes</h2></div>
<div class='bg-white dark:bg-slate-800 rounded-xl shadow-sm p-6 mb-6'>
    <h3 class='text-lg font-semibold mb-4'>Apariencia</h3>
    <form method='post' action='/settings/theme'>
        <button class='px-3 py-2 border rounded-lg'>{}</button>
    </form>
</div>
<div class='bg-white dark:bg-slate-800 rounded-xl shadow-sm p-6 mb-6'>
    <h3 class='text-lg font-semibold mb-4'>Nube</h3>
    <div hx-get='/sync/panel' hx-trigger='load' hx-swap='outerHTML'></div>
</div>
<div class='bg-white dark:bg-slate-800 rounded-xl shadow-sm p-6 mb-6'>
    <h3 class='text-lg font-semibold mb-4'>Configuración</h3>
    <div class='grid grid-cols-2 gap-4'>
        <div><p class='text-sm text-gray-500'>Servidor</p><p class='font-medium'>{}:{}</p></div>
        <div><p class='text-sm text-gray-500'>Directorio de datos</p><p class='font-medium'>{}</p></div>
        <div><p class='text-sm text-gray-500'>Moneda</p><p class='font-medium'>{} ({})</p></div>
        <div><p class='text-sm text-gray-500'>Alertas</p><p class='font-medium'>{} días antes, {} días después</p></div>
        <div><p class='text-sm text-gray-500'>Sincronización</p><p class='font-medium'>{}</p></div>
        <div><p class='text-sm text-gray-500'>Importación máxima</p><p class='font-medium'>{} KB</p></div>
    </div>
</div>
<div class='bg-white dark:bg-slate-800 rounded-xl shadow-sm p-6 border border-red-200'>
    <h3 class='text-lg font-semibold mb-2 text-red-600'>Borrar datos</h3>
    <p class='text-sm text-gray-500 mb-4'>Elimina todos los movimientos y pone en cero los saldos iniciales. Las cuentas se conservan.</p>
    <form method='post' action='/settings/reset' onsubmit="return confirm('¿Borrar todos los movimientos? Esta acción no se puede deshacer.')">
        <button class='px-3 py-2 bg-red-600 text-white rounded-lg'>Borrar todo</button>
    </form>
</div>"#,
        match theme {
            Theme::Light => "🌙 Modo oscuro",
            Theme::Dark => "☀️ Modo claro",
        },
        escape_html(&config.server.host),
        config.server.port,
        escape_html(&config.data.path.display().to_string()),
        escape_html(&config.currency.default_currency),
        escape_html(&config.currency.symbol),
        config.alerts.horizon_days,
        config.alerts.overdue_window_days,
        if config.is_feature_enabled("sync") { "Activada" } else { "Desactivada" },
        config.import.max_upload_bytes / 1024
    );

    Html(page_response(&headers, "Ajustes", "/settings", theme, &inner_content))
}

pub async fn form_toggle_theme(State(state): State<AppState>) -> Response {
    let mut tracker = state.tracker.write().await;
    let result = tracker.toggle_theme().map(|_| ()).map_err(ApiError::from);
    form_outcome(result, "toggle_theme", "/settings", tracker.theme())
}

pub async fn form_reset(State(state): State<AppState>) -> Response {
    let mut tracker = state.tracker.write().await;
    let result = tracker.reset().map_err(ApiError::from);
    form_outcome(result, "reset", "/settings", tracker.theme())
}
