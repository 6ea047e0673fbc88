//! HTTP API server with HTMX support
//!
//! Routes are organized into modules:
//! - routes::dashboard: Alerts, account summaries and the movement form
//! - routes::accounts: Account management, initial balances and payments
//! - routes::transactions: Movement list, filters and bulk delete
//! - routes::tools: Backup, restore, CSV report and spreadsheet import
//! - routes::sync: Manual cloud push/pull
//! - routes::settings: Configuration display, theme and reset

pub mod error;
pub mod routes;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderMap,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post, put},
    Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, RwLock};
use tower_http::cors::CorsLayer;

use finweb_config::Config;
use finweb_core::{CloudSync, ImportPreview, Theme, Tracker};
use finweb_import::{DefaultSheetReader, SheetReaderRef};
use finweb_utils::{escape_html, format_money, MoneyFormat};

pub use error::{ApiError, ApiResult};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<RwLock<Tracker>>,
    pub config: Config,
    pub sync: Arc<Mutex<CloudSync>>,
    /// Rows read from the last uploaded spreadsheet, waiting for confirmation
    pub import: Arc<RwLock<Option<ImportPreview>>>,
    pub reader: SheetReaderRef,
}

impl AppState {
    pub fn new(config: Config, tracker: Tracker, sync: CloudSync) -> Self {
        Self {
            tracker: Arc::new(RwLock::new(tracker)),
            config,
            sync: Arc::new(Mutex::new(sync)),
            import: Arc::new(RwLock::new(None)),
            reader: Arc::new(DefaultSheetReader),
        }
    }

    pub fn with_reader(mut self, reader: SheetReaderRef) -> Self {
        self.reader = reader;
        self
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::accounts::{
        api_accounts, api_create_account, api_delete_account, api_derive_cycle, api_record_payment,
        api_set_initial_balance, api_update_account, form_create_account, form_delete_account,
        form_initial_balance, form_payment, page_accounts,
    };
    use routes::dashboard::{api_alerts, api_balances, api_state, page_dashboard};
    use routes::settings::{api_reset, api_settings, api_toggle_theme, form_reset, form_toggle_theme, page_settings};
    use routes::sync::{api_sync_pull, api_sync_push, api_sync_status, htmx_sync_panel, htmx_sync_pull, htmx_sync_push};
    use routes::tools::{
        api_backup, api_import, api_import_apply_account, api_import_cancel, api_import_confirm, api_import_preview,
        api_import_remove_row, api_import_update_row, api_report_csv, api_restore, htmx_import_preview, page_tools,
    };
    use routes::transactions::{
        api_create_transaction, api_delete_transaction, api_delete_transactions, api_transaction_months,
        api_transactions, api_update_transaction, form_create_movement, form_delete_movement,
        htmx_transactions_list, page_transactions,
    };

    let upload_limit = state.config.import.max_upload_bytes;

    Router::new()
        // API endpoints
        .route("/api/health", get(health_check))
        .route("/api/state", get(api_state))
        .route("/api/accounts", get(api_accounts).post(api_create_account))
        .route("/api/accounts/derive-cycle", post(api_derive_cycle))
        .route("/api/accounts/:id", put(api_update_account).delete(api_delete_account))
        .route("/api/accounts/:id/initial-balance", put(api_set_initial_balance))
        .route("/api/accounts/:id/payments", post(api_record_payment))
        .route("/api/balances", get(api_balances))
        .route("/api/alerts", get(api_alerts))
        .route("/api/transactions", get(api_transactions).post(api_create_transaction))
        .route("/api/transactions/months", get(api_transaction_months))
        .route("/api/transactions/delete", post(api_delete_transactions))
        .route("/api/transactions/:id", put(api_update_transaction).delete(api_delete_transaction))
        .route("/api/backup", get(api_backup))
        .route("/api/restore", post(api_restore))
        .route("/api/report.csv", get(api_report_csv))
        .route("/api/import", get(api_import))
        .route("/api/import/preview", post(api_import_preview))
        .route("/api/import/apply-account", post(api_import_apply_account))
        .route("/api/import/rows/:index", put(api_import_update_row).delete(api_import_remove_row))
        .route("/api/import/confirm", post(api_import_confirm))
        .route("/api/import/cancel", post(api_import_cancel))
        .route("/api/theme/toggle", post(api_toggle_theme))
        .route("/api/reset", post(api_reset))
        .route("/api/sync", get(api_sync_status))
        .route("/api/sync/push", post(api_sync_push))
        .route("/api/sync/pull", post(api_sync_pull))
        .route("/api/settings", get(api_settings))
        // HTMX page routes
        .route("/", get(page_dashboard))
        .route("/accounts", get(page_accounts).post(form_create_account))
        .route("/transactions", get(page_transactions).post(form_create_movement))
        .route("/tools", get(page_tools))
        .route("/settings", get(page_settings))
        // HTMX partials and form posts
        .route("/accounts/:id/delete", post(form_delete_account))
        .route("/accounts/:id/initial-balance", post(form_initial_balance))
        .route("/accounts/:id/payment", post(form_payment))
        .route("/transactions/list", get(htmx_transactions_list))
        .route("/transactions/:id/delete", post(form_delete_movement))
        .route("/tools/import", get(htmx_import_preview))
        .route("/sync/panel", get(htmx_sync_panel))
        .route("/sync/push", post(htmx_sync_push))
        .route("/sync/pull", post(htmx_sync_pull))
        .route("/settings/theme", post(form_toggle_theme))
        .route("/settings/reset", post(form_reset))
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Local calendar date
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Format an amount with the configured currency settings
pub fn money(format: &MoneyFormat, amount: Decimal) -> String {
    format_money(amount, format)
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, theme: Theme, content: &str) -> String {
    let (html_class, body_class) = match theme {
        Theme::Dark => ("dark", "bg-slate-900 text-slate-100"),
        Theme::Light => ("", "bg-gray-50 text-gray-900"),
    };
    format!(
        r#"<!DOCTYPE html>
<html lang="es" class="{}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{} - Finanzas</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.tailwindcss.com"></script>
    <script>tailwind.config = {{ darkMode: 'class' }}</script>
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
    </style>
</head>
<body class="{}">
    {}
</body>
</html>"#,
        html_class,
        escape_html(title),
        body_class,
        content
    )
}

/// Navigation sidebar
pub fn nav_sidebar(current_path: &str) -> String {
    let links = [
        ("/", "Resumen", "dashboard"),
        ("/accounts", "Cuentas", "accounts"),
        ("/transactions", "Movimientos", "transactions"),
        ("/tools", "Herramientas", "tools"),
        ("/settings", "Ajustes", "settings"),
    ];

    let mut nav = String::from("<div class='bg-white dark:bg-slate-800 border-r dark:border-slate-700 h-screen flex flex-col'><div class='p-4 border-b dark:border-slate-700'><h1 class='text-xl font-bold text-indigo-600'>Finanzas</h1></div><ul class='flex-1 py-2 space-y-1 px-2'>");

    for (path, label, id) in &links {
        let is_active = if *path == "/" {
            current_path == "/"
        } else {
            current_path.starts_with(path)
        };
        let active_class = if is_active {
            "bg-indigo-50 text-indigo-600 dark:bg-slate-700"
        } else {
            "text-gray-600 dark:text-slate-300 hover:bg-gray-50 dark:hover:bg-slate-700"
        };
        let icon = match *id {
            "dashboard" => "📊",
            "accounts" => "💳",
            "transactions" => "📋",
            "tools" => "🧰",
            "settings" => "⚙️",
            _ => "📄",
        };
        nav.push_str(&format!(
            r#"<li><a href='{}' class='flex items-center gap-2 px-3 py-2 rounded-lg {}'>{}<span>{}</span></a></li>"#,
            path, active_class, icon, label
        ));
    }
    nav.push_str("</ul></div>");
    nav
}

fn is_htmx_request(headers: &HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Full page, or only the main content for HTMX navigation
pub fn page_response(headers: &HeaderMap, title: &str, current_path: &str, theme: Theme, inner_content: &str) -> String {
    if is_htmx_request(headers) {
        format!(r#"<main class='flex-1 overflow-auto p-6'>{}</main>"#, inner_content)
    } else {
        base_html(
            title,
            theme,
            &format!(
                r#"<div class='flex flex-col h-screen'>
    <div class='flex flex-1 overflow-hidden'>
        <aside class='w-64 flex-shrink-0'>{}</aside>
        <main class='flex-1 overflow-auto p-6'>{}</main>
    </div>
</div>"#,
                nav_sidebar(current_path),
                inner_content
            ),
        )
    }
}

/// Result of an HTML form post: back to `back` on success, an error page otherwise
pub fn form_outcome(result: ApiResult<()>, operation: &str, back: &str, theme: Theme) -> Response {
    match result {
        Ok(()) => Redirect::to(back).into_response(),
        Err(e) => {
            e.log(operation);
            let content = format!(
                r#"<div class='max-w-xl mx-auto mt-12 bg-red-50 border border-red-200 text-red-700 rounded-xl p-6'>
    <h2 class='text-lg font-semibold mb-2'>No se pudo completar la operación</h2>
    <p class='mb-4'>{}</p>
    <a href='{}' class='text-indigo-600 hover:underline'>Volver</a>
</div>"#,
                escape_html(&e.to_string()),
                back
            );
            (e.status(), Html(base_html("Error", theme, &content))).into_response()
        }
    }
}

/// Start the server and block until it stops
pub async fn start_server(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.bind_address();
    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting finweb server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - / (Dashboard)");
    log::info!("  - /accounts (Account management)");
    log::info!("  - /transactions (Movement list)");
    log::info!("  - /tools (Backup, report and import)");
    log::info!("  - /settings (Configuration and sync)");
    log::info!("  - /api/* (JSON API endpoints)");

    axum::serve(listener, router).await?;
    log::info!("Server stopped gracefully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nav_marks_active_link() {
        let nav = nav_sidebar("/accounts");
        assert!(nav.contains("href='/accounts' class='flex items-center gap-2 px-3 py-2 rounded-lg bg-indigo-50"));
        assert!(!nav.contains("href='/' class='flex items-center gap-2 px-3 py-2 rounded-lg bg-indigo-50"));
    }

    #[test]
    fn test_page_response_htmx_partial() {
        let mut headers = HeaderMap::new();
        let full = page_response(&headers, "Resumen", "/", Theme::Dark, "<p>hola</p>");
        assert!(full.starts_with("<!DOCTYPE html>"));
        assert!(full.contains(r#"class="dark""#));

        headers.insert("hx-request", "true".parse().unwrap());
        let partial = page_response(&headers, "Resumen", "/", Theme::Dark, "<p>hola</p>");
        assert!(!partial.contains("<aside"));
        assert!(partial.contains("<p>hola</p>"));
    }
}
