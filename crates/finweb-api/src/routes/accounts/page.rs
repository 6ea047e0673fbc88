//! Accounts page rendering and form posts

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{Html, Response};
use axum::Form;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use finweb_core::{AccountDraft, AccountSummary, Balance, CardType, Tracker};
use finweb_utils::{escape_html, MoneyFormat};

use crate::error::{ApiError, ApiResult};
use crate::{form_outcome, money, page_response, today, AppState};

/// Background classes offered for new accounts
const COLORS: [(&str, &str); 8] = [
    ("bg-slate-800", "Grafito"),
    ("bg-blue-600", "Azul"),
    ("bg-red-600", "Rojo"),
    ("bg-pink-500", "Rosa"),
    ("bg-emerald-500", "Verde"),
    ("bg-amber-500", "Ámbar"),
    ("bg-purple-600", "Morado"),
    ("bg-cyan-600", "Cian"),
];

fn parse_optional<T: std::str::FromStr>(field: &str, value: &str) -> ApiResult<Option<T>> {
    match value.trim() {
        "" => Ok(None),
        v => v
            .parse()
            .map(Some)
            .map_err(|_| ApiError::bad_request(format!("invalid {} '{}'", field, v))),
    }
}

/// Account form as posted by the browser
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub card_type: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub cutoff_day: String,
    #[serde(default)]
    pub grace_period: String,
    #[serde(default)]
    pub interest_rate: String,
    #[serde(default)]
    pub initial_balance: String,
    /// Sample statement dates; when both are set they replace cutoff day and grace period
    #[serde(default)]
    pub cutoff_date: String,
    #[serde(default)]
    pub payment_date: String,
}

impl AccountForm {
    pub fn into_draft(self) -> ApiResult<AccountDraft> {
        let card_type = match self.card_type.trim() {
            "credit" => CardType::Credit,
            "debit" | "" => CardType::Debit,
            other => return Err(ApiError::bad_request(format!("invalid account type '{}'", other))),
        };

        let mut cutoff_day = parse_optional::<u32>("cutoff day", &self.cutoff_day)?;
        let mut grace_period = parse_optional::<u32>("grace period", &self.grace_period)?;
        let cutoff_date = parse_optional::<NaiveDate>("cutoff date", &self.cutoff_date)?;
        let payment_date = parse_optional::<NaiveDate>("payment date", &self.payment_date)?;
        if let (Some(cutoff), Some(payment)) = (cutoff_date, payment_date) {
            let cycle = Tracker::grace_from_dates(cutoff, payment);
            cutoff_day = Some(cycle.cutoff_day);
            grace_period = cycle.grace_period;
        }

        Ok(AccountDraft {
            name: self.name,
            card_type,
            color: Some(self.color).filter(|c| !c.trim().is_empty()),
            cutoff_day,
            grace_period,
            interest_rate: parse_optional("interest rate", &self.interest_rate)?,
            initial_balance: parse_optional("initial balance", &self.initial_balance)?,
        })
    }
}

/// Amount (and optional date) for payments and initial balances
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AmountForm {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub date: String,
}

impl AmountForm {
    fn amount(&self) -> ApiResult<Decimal> {
        parse_optional::<Decimal>("amount", &self.amount.replace(',', ""))?
            .ok_or_else(|| ApiError::bad_request("amount is required"))
    }

    fn date(&self, today: NaiveDate) -> ApiResult<NaiveDate> {
        Ok(parse_optional("date", &self.date)?.unwrap_or(today))
    }
}

fn render_account_row(summary: &AccountSummary, format: &MoneyFormat) -> String {
    let card = &summary.account;
    let id = escape_html(&card.id);

    let (kind, figures, payment_form) = match &summary.balance {
        Balance::Debit { available } => (
            "Débito",
            format!("Disponible <span class='font-semibold'>{}</span>", money(format, *available)),
            String::new(),
        ),
        Balance::Credit { debt, spent, paid, .. } => {
            let cycle = match card.billing_cycle() {
                Some((cutoff, grace)) => format!(" · corte día {}, {} días para pagar", cutoff, grace),
                None => card
                    .cutoff_day
                    .map(|c| format!(" · corte día {}", c))
                    .unwrap_or_default(),
            };
            (
                "Crédito",
                format!(
                    "Deuda <span class='font-semibold'>{}</span> · gastado {} · pagado {}{}",
                    money(format, *debt),
                    money(format, *spent),
                    money(format, *paid),
                    cycle
                ),
                format!(
                    r#"<form method='post' action='/accounts/{}/payment' class='flex gap-2'>
            <input name='amount' required inputmode='decimal' placeholder='Pago' class='w-28 px-2 py-1 text-sm border rounded dark:bg-slate-700'>
            <input name='date' type='date' class='px-2 py-1 text-sm border rounded dark:bg-slate-700'>
            <button class='px-2 py-1 text-sm bg-green-600 text-white rounded'>Registrar pago</button>
        </form>"#,
                    id
                ),
            )
        }
    };

    format!(
        r#"<div class='bg-white dark:bg-slate-800 rounded-xl shadow-sm p-4 flex flex-col gap-3'>
    <div class='flex items-center gap-3'>
        <span class='w-3 h-10 rounded {}'></span>
        <div class='flex-1'>
            <p class='font-semibold'>{} <span class='text-xs text-gray-500'>{} · {} movimientos</span></p>
            <p class='text-sm text-gray-600 dark:text-slate-300'>{}</p>
        </div>
        <form method='post' action='/accounts/{}/delete' onsubmit="return confirm('¿Eliminar la cuenta? Sus movimientos se conservan.')">
            <button class='text-xs text-red-600 hover:underline'>Eliminar</button>
        </form>
    </div>
    <div class='flex flex-wrap gap-4'>
        <form method='post' action='/accounts/{}/initial-balance' class='flex gap-2'>
            <input name='amount' inputmode='decimal' value='{}' class='w-28 px-2 py-1 text-sm border rounded dark:bg-slate-700'>
            <button class='px-2 py-1 text-sm border rounded'>Saldo inicial</button>
        </form>
        {}
    </div>
</div>"#,
        escape_html(&card.color),
        escape_html(&card.name),
        kind,
        summary.movement_count,
        figures,
        id,
        id,
        summary.initial_balance,
        payment_form
    )
}

fn render_account_form() -> String {
    let colors: String = COLORS
        .iter()
        .map(|(class, label)| format!("<option value='{}'>{}</option>", class, label))
        .collect();
    format!(
        r#"<form method='post' action='/accounts' class='space-y-3'>
    <input name='name' required placeholder='Nombre' class='w-full px-3 py-2 border rounded-lg dark:bg-slate-700'>
    <div class='grid grid-cols-2 gap-3'>
        <select name='card_type' class='px-3 py-2 border rounded-lg dark:bg-slate-700'>
            <option value='debit'>Débito</option>
            <option value='credit'>Crédito</option>
        </select>
        <select name='color' class='px-3 py-2 border rounded-lg dark:bg-slate-700'>{}</select>
    </div>
    <input name='initial_balance' inputmode='decimal' placeholder='Saldo o deuda inicial' class='w-full px-3 py-2 border rounded-lg dark:bg-slate-700'>
    <fieldset class='border rounded-lg p-3 space-y-2'>
        <legend class='text-sm text-gray-500 px-1'>Solo tarjetas de crédito</legend>
        <div class='grid grid-cols-3 gap-2'>
            <input name='cutoff_day' type='number' min='1' max='31' placeholder='Día de corte' class='px-2 py-1 border rounded dark:bg-slate-700'>
            <input name='grace_period' type='number' min='1' placeholder='Días para pagar' class='px-2 py-1 border rounded dark:bg-slate-700'>
            <input name='interest_rate' inputmode='decimal' placeholder='Tasa anual %' class='px-2 py-1 border rounded dark:bg-slate-700'>
        </div>
        <p class='text-xs text-gray-500'>O toma las fechas de un estado de cuenta:</p>
        <div class='grid grid-cols-2 gap-2'>
            <label class='text-xs'>Fecha de corte <input name='cutoff_date' type='date' class='w-full px-2 py-1 border rounded dark:bg-slate-700'></label>
            <label class='text-xs'>Fecha límite de pago <input name='payment_date' type='date' class='w-full px-2 py-1 border rounded dark:bg-slate-700'></label>
        </div>
    </fieldset>
    <button type='submit' class='w-full px-3 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Agregar cuenta</button>
</form>"#,
        colors
    )
}

pub async fn page_accounts(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let tracker = state.tracker.read().await;
    let format = tracker.money_format();
    let rows: String = tracker
        .summaries()
        .iter()
        .map(|summary| render_account_row(summary, &format))
        .collect();

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Cuentas</h2></div>
<div class='grid grid-cols-1 lg:grid-cols-3 gap-6'>
    <div class='lg:col-span-2 space-y-4'>{}</div>
    <div class='bg-white dark:bg-slate-800 rounded-xl shadow-sm p-6 h-fit'>
        <h3 class='text-lg font-semibold mb-4'>Nueva cuenta</h3>
        {}
    </div>
</div>"#,
        rows,
        render_account_form()
    );

    Html(page_response(&headers, "Cuentas", "/accounts", tracker.theme(), &inner_content))
}

pub async fn form_create_account(State(state): State<AppState>, Form(form): Form<AccountForm>) -> Response {
    let mut tracker = state.tracker.write().await;
    let result = form
        .into_draft()
        .and_then(|draft| tracker.add_account(draft).map(|_| ()).map_err(ApiError::from));
    form_outcome(result, "create_account", "/accounts", tracker.theme())
}

pub async fn form_delete_account(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let mut tracker = state.tracker.write().await;
    let result = tracker.delete_account(&id).map(|_| ()).map_err(ApiError::from);
    form_outcome(result, "delete_account", "/accounts", tracker.theme())
}

pub async fn form_initial_balance(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<AmountForm>,
) -> Response {
    let mut tracker = state.tracker.write().await;
    let result = form
        .amount()
        .and_then(|amount| tracker.set_initial_balance(&id, amount).map(|_| ()).map_err(ApiError::from));
    form_outcome(result, "set_initial_balance", "/accounts", tracker.theme())
}

pub async fn form_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<AmountForm>,
) -> Response {
    let mut tracker = state.tracker.write().await;
    let result = form.amount().and_then(|amount| {
        let date = form.date(today())?;
        tracker.record_payment(&id, amount, date).map(|_| ()).map_err(ApiError::from)
    });
    form_outcome(result, "record_payment", "/accounts", tracker.theme())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_form_credit_with_statement_dates() {
        let draft = AccountForm {
            name: "Nu".to_string(),
            card_type: "credit".to_string(),
            cutoff_day: "3".to_string(),
            interest_rate: "45.5".to_string(),
            cutoff_date: "2026-09-15".to_string(),
            payment_date: "2026-10-05".to_string(),
            ..AccountForm::default()
        }
        .into_draft()
        .unwrap();
        assert_eq!(draft.card_type, CardType::Credit);
        assert_eq!(draft.cutoff_day, Some(15));
        assert_eq!(draft.grace_period, Some(20));
        assert_eq!(draft.interest_rate, Some("45.5".parse().unwrap()));
        assert_eq!(draft.color, None);
    }

    #[test]
    fn test_account_form_rejects_bad_input() {
        let bad_type = AccountForm {
            name: "X".to_string(),
            card_type: "prepaid".to_string(),
            ..AccountForm::default()
        };
        assert!(bad_type.into_draft().is_err());

        let bad_day = AccountForm {
            name: "X".to_string(),
            cutoff_day: "quince".to_string(),
            ..AccountForm::default()
        };
        assert!(matches!(bad_day.into_draft(), Err(ApiError::BadRequest { .. })));
    }

    #[test]
    fn test_amount_form() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        let form = AmountForm {
            amount: "1,500.25".to_string(),
            date: String::new(),
        };
        assert_eq!(form.amount().unwrap(), "1500.25".parse::<Decimal>().unwrap());
        assert_eq!(form.date(today).unwrap(), today);
        assert!(AmountForm::default().amount().is_err());
    }
}
