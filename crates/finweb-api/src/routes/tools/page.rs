//! Tools page rendering and import preview fragment

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Html;
use std::collections::BTreeMap;

use finweb_core::{Card, ImportPreview, MovementKind, PaymentMethod};
use finweb_utils::{escape_html, short_date_es, MoneyFormat};

use crate::{money, page_response, AppState};

fn render_preview(preview: &ImportPreview, accounts: &BTreeMap<String, Card>, format: &MoneyFormat) -> String {
    let rows: String = preview
        .rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let (sign, tone) = match row.kind {
                MovementKind::Expense => ("-", "text-red-600"),
                MovementKind::Income => ("+", "text-green-600"),
            };
            let account = match (&row.payment_method, &row.card_id) {
                (PaymentMethod::Card, Some(id)) => accounts
                    .get(id)
                    .map(|c| escape_html(&c.name))
                    .unwrap_or_else(|| escape_html(id)),
                _ => "Efectivo".to_string(),
            };
            format!(
                r#"<tr class='border-b dark:border-slate-700'><td class='px-2 py-1 text-sm'>{}</td><td class='px-2 py-1'>{}</td><td class='px-2 py-1 text-sm'>{}</td><td class='px-2 py-1 text-xs'>{}</td><td class='px-2 py-1 text-right {}'>{}{}</td><td class='px-2 py-1 text-right'><button onclick='removeImportRow({})' class='text-xs text-red-600 hover:underline'>Quitar</button></td></tr>"#,
                short_date_es(row.date),
                escape_html(&row.description),
                account,
                if row.installments > 0 { format!("{} MSI", row.installments) } else { String::new() },
                tone,
                sign,
                money(format, row.amount),
                index
            )
        })
        .collect();

    let options: String = accounts
        .values()
        .map(|c| format!("<option value='{}'>{}</option>", escape_html(&c.id), escape_html(&c.name)))
        .collect();

    format!(
        r#"<div class='flex items-center gap-3 mb-3'>
    <span class='text-sm text-gray-500'>{} movimientos por importar</span>
    <div class='flex-1'></div>
    <select onchange='applyImportAccount(this.value)' class='px-2 py-1.5 text-sm border rounded-lg dark:bg-slate-700'>
        <option value='' selected disabled>Asignar cuenta a todos…</option>
        <option value='cash'>Efectivo</option>
        {}
    </select>
</div>
<table class='w-full mb-4'><tbody>{}</tbody></table>
<div class='flex gap-3'>
    <button onclick='confirmImport()' class='px-3 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Confirmar importación</button>
    <button onclick='cancelImport()' class='px-3 py-2 border rounded-lg'>Cancelar</button>
</div>"#,
        preview.len(),
        options,
        rows
    )
}

/// Pending import preview fragment (HTMX)
pub async fn htmx_import_preview(State(state): State<AppState>) -> Html<String> {
    let pending = state.import.read().await;
    match pending.as_ref() {
        Some(preview) => {
            let tracker = state.tracker.read().await;
            Html(render_preview(preview, tracker.accounts(), &tracker.money_format()))
        }
        None => Html("<p class='text-sm text-gray-500'>No hay importación pendiente.</p>".to_string()),
    }
}

pub async fn page_tools(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let theme = state.tracker.read().await.theme();

    let inner_content = r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Herramientas</h2></div>
<div class='grid grid-cols-1 md:grid-cols-3 gap-4 mb-6'>
    <div class='bg-white dark:bg-slate-800 rounded-xl shadow-sm p-6'>
        <h3 class='font-semibold mb-2'>Respaldo</h3>
        <p class='text-sm text-gray-500 mb-4'>Descarga todos tus movimientos, saldos y cuentas en un archivo JSON.</p>
        <a href='/api/backup' class='inline-block px-3 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Descargar respaldo</a>
    </div>
    <div class='bg-white dark:bg-slate-800 rounded-xl shadow-sm p-6'>
        <h3 class='font-semibold mb-2'>Restaurar</h3>
        <p class='text-sm text-gray-500 mb-4'>Reemplaza los datos actuales con un respaldo.</p>
        <input type='file' accept='.json,application/json' onchange='restoreBackup(this)' class='text-sm'>
    </div>
    <div class='bg-white dark:bg-slate-800 rounded-xl shadow-sm p-6'>
        <h3 class='font-semibold mb-2'>Reporte</h3>
        <p class='text-sm text-gray-500 mb-4'>Todos los movimientos en CSV para abrir en una hoja de cálculo.</p>
        <a href='/api/report.csv' class='inline-block px-3 py-2 border rounded-lg'>Descargar CSV</a>
    </div>
</div>
<div class='bg-white dark:bg-slate-800 rounded-xl shadow-sm p-6'>
    <h3 class='font-semibold mb-2'>Importar desde Excel</h3>
    <p class='text-sm text-gray-500 mb-4'>Columnas: Fecha, Descripción, Monto, Tipo, Tarjeta, MSI. Formatos .xlsx, .xls, .ods o .csv.</p>
    <input type='file' accept='.xlsx,.xls,.xlsm,.ods,.csv' onchange='uploadImport(this)' class='text-sm mb-4'>
    <div id='import-preview' hx-get='/tools/import' hx-trigger='load'></div>
</div>
<script>
function refreshImport() { htmx.ajax('GET', '/tools/import', '#import-preview'); }
function send(method, url, body, contentType) {
    return fetch(url, { method, headers: { 'Content-Type': contentType || 'application/json' }, body })
        .then(r => r.ok ? r : r.json().then(e => Promise.reject(e.message)));
}
function restoreBackup(input) {
    const file = input.files[0];
    if (!file || !confirm('¿Reemplazar todos los datos con este respaldo?')) return;
    send('POST', '/api/restore', file).then(() => { alert('Respaldo restaurado'); location.reload(); }).catch(alert);
}
function uploadImport(input) {
    const file = input.files[0];
    if (!file) return;
    send('POST', '/api/import/preview?filename=' + encodeURIComponent(file.name), file, 'application/octet-stream')
        .then(refreshImport).catch(alert);
    input.value = '';
}
function applyImportAccount(value) {
    const cardId = value === 'cash' ? null : value;
    send('POST', '/api/import/apply-account', JSON.stringify({ cardId })).then(refreshImport).catch(alert);
}
function removeImportRow(index) {
    send('DELETE', '/api/import/rows/' + index).then(refreshImport).catch(alert);
}
function confirmImport() {
    send('POST', '/api/import/confirm').then(r => r.json()).then(r => { alert(r.imported + ' movimientos importados'); refreshImport(); }).catch(alert);
}
function cancelImport() { send('POST', '/api/import/cancel').then(refreshImport).catch(alert); }
</script>"#;

    Html(page_response(&headers, "Herramientas", "/tools", theme, inner_content))
}
