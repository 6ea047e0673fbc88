//! Transaction page rendering - movement list, filters and movement form

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{Html, Response};
use axum::Form;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;

use finweb_core::filter::{month_options, ALL};
use finweb_core::{Card, Movement, MovementDraft, MovementFilter, MovementKind, PaymentMethod};
use finweb_utils::{escape_html, short_date_es, MoneyFormat};

use super::api::FilterQuery;
use crate::error::{ApiError, ApiResult};
use crate::{form_outcome, money, page_response, today, AppState};

/// Movement form as posted by the browser; every field arrives as text
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovementForm {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub card_id: String,
    #[serde(default)]
    pub installments: String,
    #[serde(default)]
    pub date: String,
}

impl MovementForm {
    /// Parse the text fields; blank date means `today`
    pub fn into_draft(self, today: NaiveDate) -> ApiResult<MovementDraft> {
        let cleaned: String = self.amount.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
        let amount: Decimal = cleaned
            .trim_start_matches('$')
            .parse()
            .map_err(|_| ApiError::bad_request(format!("invalid amount '{}'", self.amount)))?;

        let kind = match self.kind.trim() {
            "" => MovementKind::Expense,
            other => other.parse().map_err(ApiError::bad_request)?,
        };
        let payment_method = match self.payment_method.trim() {
            "" => PaymentMethod::Cash,
            other => other.parse().map_err(ApiError::bad_request)?,
        };
        let installments = match self.installments.trim() {
            "" => 0,
            other => other
                .parse()
                .map_err(|_| ApiError::bad_request(format!("invalid installments '{}'", other)))?,
        };
        let date = match self.date.trim() {
            "" => today,
            other => NaiveDate::parse_from_str(other, "%Y-%m-%d")
                .map_err(|_| ApiError::bad_request(format!("invalid date '{}'", other)))?,
        };
        let card_id = Some(self.card_id.trim().to_string()).filter(|c| !c.is_empty());

        Ok(MovementDraft {
            description: self.description,
            amount,
            kind,
            payment_method,
            card_id,
            installments,
            date,
        })
    }
}

fn account_options(accounts: &BTreeMap<String, Card>, selected: &str) -> String {
    accounts
        .values()
        .map(|card| {
            format!(
                "<option value='{}' {}>{}</option>",
                escape_html(&card.id),
                if card.id == selected { "selected" } else { "" },
                escape_html(&card.name)
            )
        })
        .collect()
}

/// Form for logging a new movement
pub fn render_movement_form(accounts: &BTreeMap<String, Card>, today: NaiveDate) -> String {
    format!(
        r#"<form method='post' action='/transactions' class='space-y-3'>
    <input name='description' required placeholder='Descripción' class='w-full px-3 py-2 border rounded-lg dark:bg-slate-700'>
    <div class='grid grid-cols-2 gap-3'>
        <input name='amount' required inputmode='decimal' placeholder='Monto' class='px-3 py-2 border rounded-lg dark:bg-slate-700'>
        <select name='kind' class='px-3 py-2 border rounded-lg dark:bg-slate-700'>
            <option value='expense'>Gasto</option>
            <option value='income'>Ingreso</option>
        </select>
    </div>
    <div class='grid grid-cols-2 gap-3'>
        <select name='payment_method' class='px-3 py-2 border rounded-lg dark:bg-slate-700'>
            <option value='cash'>Efectivo</option>
            <option value='card'>Tarjeta</option>
        </select>
        <select name='card_id' class='px-3 py-2 border rounded-lg dark:bg-slate-700'>
            <option value=''>Sin tarjeta</option>
            {}
        </select>
    </div>
    <div class='grid grid-cols-2 gap-3'>
        <input name='installments' type='number' min='0' value='0' title='Meses sin intereses' class='px-3 py-2 border rounded-lg dark:bg-slate-700'>
        <input name='date' type='date' value='{}' class='px-3 py-2 border rounded-lg dark:bg-slate-700'>
    </div>
    <button type='submit' class='w-full px-3 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Guardar</button>
</form>"#,
        account_options(accounts, ""),
        today.format("%Y-%m-%d")
    )
}

fn account_label(movement: &Movement, accounts: &BTreeMap<String, Card>) -> String {
    match (&movement.payment_method, &movement.card_id) {
        (PaymentMethod::Card, Some(id)) => match accounts.get(id) {
            Some(card) => escape_html(&card.name),
            None => format!("<span class='text-gray-400'>{} (eliminada)</span>", escape_html(id)),
        },
        _ => "Efectivo".to_string(),
    }
}

/// Movement rows; `selectable` adds checkboxes and delete buttons
pub fn render_movement_table(
    movements: &[Movement],
    accounts: &BTreeMap<String, Card>,
    format: &MoneyFormat,
    selectable: bool,
) -> String {
    if movements.is_empty() {
        return "<p class='text-sm text-gray-500 py-4'>No hay movimientos.</p>".to_string();
    }

    let rows: String = movements
        .iter()
        .map(|m| {
            let tone = if m.is_expense() { "text-red-600" } else { "text-green-600" };
            let installments = match m.installments() {
                0 => String::new(),
                n => format!("{} MSI", n),
            };
            let (select, actions) = if selectable {
                (
                    format!("<td class='px-2'><input type='checkbox' class='movement-select' value='{}'></td>", m.id),
                    format!(
                        "<td class='px-2 text-right'><form method='post' action='/transactions/{}/delete' onsubmit=\"return confirm('¿Eliminar este movimiento?')\"><button class='text-xs text-red-600 hover:underline'>Eliminar</button></form></td>",
                        m.id
                    ),
                )
            } else {
                (String::new(), String::new())
            };
            format!(
                r#"<tr class='border-b dark:border-slate-700'>{}<td class='px-2 py-2 text-sm whitespace-nowrap'>{}</td><td class='px-2 py-2'>{}</td><td class='px-2 py-2 text-sm'>{}</td><td class='px-2 py-2 text-xs'>{}</td><td class='px-2 py-2 text-right font-medium {}'>{}</td>{}</tr>"#,
                select,
                short_date_es(m.date),
                escape_html(&m.description),
                account_label(m, accounts),
                installments,
                tone,
                money(format, m.amount),
                actions
            )
        })
        .collect();

    format!("<table class='w-full'><tbody>{}</tbody></table>", rows)
}

fn render_filter_bar(filter: &MovementFilter, accounts: &BTreeMap<String, Card>, today: NaiveDate) -> String {
    let months: String = month_options(today)
        .into_iter()
        .map(|option| {
            format!(
                "<option value='{}' {}>{}</option>",
                option.value,
                if option.value == filter.month { "selected" } else { "" },
                option.label
            )
        })
        .collect();

    format!(
        r#"<form class='flex items-center gap-3 mb-4' hx-get='/transactions/list' hx-target='#movement-list' hx-trigger='change'>
    <select name='month' class='px-2 py-1.5 text-sm border rounded-lg dark:bg-slate-700'>
        <option value='{all}' {all_months}>Todos los meses</option>
        {months}
    </select>
    <select name='card' class='px-2 py-1.5 text-sm border rounded-lg dark:bg-slate-700'>
        <option value='{all}' {all_cards}>Todas las cuentas</option>
        {cards}
    </select>
    <div class='flex-1'></div>
    <button type='button' onclick='deleteSelected()' class='px-3 py-1.5 text-sm border border-red-300 text-red-600 rounded-lg hover:bg-red-50'>Eliminar seleccionados</button>
</form>"#,
        all = ALL,
        all_months = if filter.month == ALL { "selected" } else { "" },
        months = months,
        all_cards = if filter.card == ALL { "selected" } else { "" },
        cards = account_options(accounts, &filter.card),
    )
}

fn render_list(movements: &[Movement], filter: &MovementFilter, accounts: &BTreeMap<String, Card>, format: &MoneyFormat) -> String {
    let net: Decimal = movements.iter().map(|m| m.amount).sum();
    format!(
        r#"<div class='flex justify-between text-sm text-gray-500 mb-2'><span>{} · {} movimientos</span><span>Neto {}</span></div>{}"#,
        escape_html(&filter.description()),
        movements.len(),
        money(format, net),
        render_movement_table(movements, accounts, format, true)
    )
}

/// Movement list page, current month by default
pub async fn page_transactions(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
    headers: HeaderMap,
) -> Html<String> {
    let tracker = state.tracker.read().await;
    let today = today();
    let filter = query.resolve(MovementFilter::current_month(today));
    let movements = tracker.filtered(&filter);
    let format = tracker.money_format();

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Movimientos</h2></div>
<div class='bg-white dark:bg-slate-800 rounded-xl shadow-sm p-6'>
    {}
    <div id='movement-list'>{}</div>
</div>
<script>
function deleteSelected() {{
    const ids = Array.from(document.querySelectorAll('.movement-select:checked')).map(c => Number(c.value));
    if (ids.length === 0 || !confirm('¿Eliminar ' + ids.length + ' movimientos?')) return;
    fetch('/api/transactions/delete', {{
        method: 'POST',
        headers: {{ 'Content-Type': 'application/json' }},
        body: JSON.stringify({{ ids }})
    }}).then(() => htmx.trigger(document.querySelector('form[hx-get]'), 'change'));
}}
</script>"#,
        render_filter_bar(&filter, tracker.accounts(), today),
        render_list(&movements, &filter, tracker.accounts(), &format)
    );

    Html(page_response(&headers, "Movimientos", "/transactions", tracker.theme(), &inner_content))
}

/// Movement list fragment (HTMX)
pub async fn htmx_transactions_list(State(state): State<AppState>, Query(query): Query<FilterQuery>) -> Html<String> {
    let tracker = state.tracker.read().await;
    let filter = query.resolve(MovementFilter::current_month(today()));
    let movements = tracker.filtered(&filter);
    Html(render_list(&movements, &filter, tracker.accounts(), &tracker.money_format()))
}

pub async fn form_create_movement(State(state): State<AppState>, Form(form): Form<MovementForm>) -> Response {
    let mut tracker = state.tracker.write().await;
    let result = form
        .into_draft(today())
        .and_then(|draft| tracker.add_movement(draft).map(|_| ()).map_err(ApiError::from));
    form_outcome(result, "create_movement", "/", tracker.theme())
}

pub async fn form_delete_movement(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    let mut tracker = state.tracker.write().await;
    let result = tracker.delete_movement(id).map(|_| ()).map_err(ApiError::from);
    form_outcome(result, "delete_movement", "/transactions", tracker.theme())
}
