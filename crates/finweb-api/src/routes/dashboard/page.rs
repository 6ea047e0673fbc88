//! Dashboard page rendering

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Html;

use finweb_core::{AccountSummary, AlertStatus, Balance, MovementFilter, PaymentAlert};
use finweb_utils::{escape_html, long_date_es, MoneyFormat};

use crate::routes::transactions::{render_movement_form, render_movement_table};
use crate::{money, page_response, today, AppState};

/// Latest movements listed under the form
const RECENT_MOVEMENTS: usize = 5;

/// Alert cards, or a quiet notice when nothing is due soon
pub fn render_alerts(alerts: &[PaymentAlert], format: &MoneyFormat) -> String {
    if alerts.is_empty() {
        return "<p class='text-sm text-gray-500'>Sin pagos de tarjeta próximos.</p>".to_string();
    }

    alerts
        .iter()
        .map(|alert| {
            let tone = match alert.status {
                AlertStatus::Overdue(_) | AlertStatus::DueToday => "border-red-300 bg-red-50 text-red-800",
                AlertStatus::Upcoming(_) if alert.urgent => "border-orange-300 bg-orange-50 text-orange-800",
                AlertStatus::Upcoming(_) => "border-blue-200 bg-blue-50 text-blue-800",
            };
            let interest = alert
                .estimated_interest
                .map(|i| {
                    format!(
                        "<p class='text-xs mt-1'>Interés estimado si no pagas: {}</p>",
                        money(format, i)
                    )
                })
                .unwrap_or_default();
            format!(
                r#"<div class='border rounded-lg p-4 {}'>
    <div class='flex justify-between items-center'>
        <span class='font-semibold'>{}</span>
        <span class='text-xs font-bold uppercase'>{}</span>
    </div>
    <p class='text-sm mt-1'>Pago antes del {} (corte {})</p>
    <p class='text-lg font-bold mt-2'>{}</p>
    <p class='text-xs'>Deuda total: {}</p>
    {}
</div>"#,
                tone,
                escape_html(&alert.account.name),
                alert.status.label(),
                long_date_es(alert.due_date),
                long_date_es(alert.cutoff_date),
                money(format, alert.statement_balance),
                money(format, alert.total_debt),
                interest
            )
        })
        .collect()
}

/// One colored card per account with its headline figure
pub fn render_account_cards(summaries: &[AccountSummary], format: &MoneyFormat) -> String {
    summaries
        .iter()
        .map(|summary| {
            let (label, detail) = match &summary.balance {
                Balance::Debit { .. } => ("Disponible", String::new()),
                Balance::Credit {
                    spent,
                    paid,
                    monthly_installments,
                    ..
                } => {
                    let msi = if monthly_installments.is_zero() {
                        String::new()
                    } else {
                        format!(" · MSI al mes {}", money(format, *monthly_installments))
                    };
                    (
                        "Deuda",
                        format!(
                            "<p class='text-xs opacity-80'>Gastado {} · Pagado {}{}</p>",
                            money(format, *spent),
                            money(format, *paid),
                            msi
                        ),
                    )
                }
            };
            format!(
                r#"<div class='{} text-white rounded-xl p-4 shadow'>
    <p class='text-sm opacity-80'>{}</p>
    <p class='text-xs uppercase opacity-70'>{}</p>
    <p class='text-2xl font-bold mt-2'>{}</p>
    {}
</div>"#,
                escape_html(&summary.account.color),
                escape_html(&summary.account.name),
                label,
                money(format, summary.headline()),
                detail
            )
        })
        .collect()
}

pub async fn page_dashboard(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let tracker = state.tracker.read().await;
    let format = tracker.money_format();
    let today = today();
    let totals = tracker.totals();
    let alerts = tracker.alerts(today);
    let recent: Vec<_> = MovementFilter::default()
        .apply(tracker.movements())
        .into_iter()
        .take(RECENT_MOVEMENTS)
        .cloned()
        .collect();

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Resumen</h2><p class='text-sm text-gray-500'>{}</p></div>
<div class='grid grid-cols-1 md:grid-cols-3 gap-4 mb-6'>
    <div class='bg-green-50 p-4 rounded-lg border border-green-200'><p class='text-sm text-green-600'>Disponible en débito</p><p class='text-2xl font-bold text-green-700'>{}</p></div>
    <div class='bg-red-50 p-4 rounded-lg border border-red-200'><p class='text-sm text-red-600'>Deuda en tarjetas</p><p class='text-2xl font-bold text-red-700'>{}</p></div>
    <div class='bg-blue-50 p-4 rounded-lg border border-blue-200'><p class='text-sm text-blue-600'>Efectivo (neto)</p><p class='text-2xl font-bold text-blue-700'>{}</p></div>
</div>
<div class='bg-white dark:bg-slate-800 rounded-xl shadow-sm p-6 mb-6'>
    <h3 class='text-lg font-semibold mb-4'>Pagos de tarjeta</h3>
    <div class='grid grid-cols-1 md:grid-cols-2 gap-4'>{}</div>
</div>
<div class='grid grid-cols-1 md:grid-cols-3 gap-4 mb-6'>{}</div>
<div class='grid grid-cols-1 lg:grid-cols-2 gap-6'>
    <div class='bg-white dark:bg-slate-800 rounded-xl shadow-sm p-6'>
        <h3 class='text-lg font-semibold mb-4'>Nuevo movimiento</h3>
        {}
    </div>
    <div class='bg-white dark:bg-slate-800 rounded-xl shadow-sm p-6'>
        <h3 class='text-lg font-semibold mb-4'>Últimos movimientos</h3>
        {}
        <a href='/transactions' class='text-sm text-indigo-600 hover:underline'>Ver todos</a>
    </div>
</div>"#,
        long_date_es(today),
        money(&format, totals.available),
        money(&format, totals.debt),
        money(&format, totals.cash.net),
        render_alerts(&alerts, &format),
        render_account_cards(&tracker.summaries(), &format),
        render_movement_form(tracker.accounts(), today),
        render_movement_table(&recent, tracker.accounts(), &format, false)
    );

    Html(page_response(&headers, "Resumen", "/", tracker.theme(), &inner_content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use finweb_core::{Card, CardType};
    use rust_decimal::Decimal;

    fn format() -> MoneyFormat {
        MoneyFormat::default()
    }

    fn card() -> Card {
        Card {
            id: "banamex_joy".to_string(),
            name: "Banamex <Joy>".to_string(),
            card_type: CardType::Credit,
            color: "bg-pink-500".to_string(),
            cutoff_day: Some(15),
            grace_period: Some(20),
            interest_rate: None,
        }
    }

    #[test]
    fn test_render_alerts_empty() {
        assert!(render_alerts(&[], &format()).contains("Sin pagos"));
    }

    #[test]
    fn test_render_alert_escapes_name_and_shows_status() {
        let alert = PaymentAlert {
            account: card(),
            due_date: NaiveDate::from_ymd_opt(2026, 10, 17).unwrap(),
            cutoff_date: NaiveDate::from_ymd_opt(2026, 9, 27).unwrap(),
            days_until_due: 2,
            statement_balance: Decimal::from(1500),
            total_debt: Decimal::from(2000),
            estimated_interest: None,
            status: AlertStatus::Upcoming(2),
            urgent: true,
        };
        let html = render_alerts(&[alert], &format());
        assert!(html.contains("Banamex &lt;Joy&gt;"));
        assert!(html.contains("Faltan 2 días"));
        assert!(html.contains("border-orange-300"));
    }

    #[test]
    fn test_render_account_cards_credit_detail() {
        let summary = AccountSummary {
            account: card(),
            initial_balance: Decimal::ZERO,
            movement_count: 1,
            balance: Balance::Credit {
                spent: Decimal::from(1200),
                paid: Decimal::ZERO,
                debt: Decimal::from(1200),
                monthly_installments: Decimal::from(100),
            },
        };
        let html = render_account_cards(&[summary], &format());
        assert!(html.contains("bg-pink-500"));
        assert!(html.contains("Deuda"));
        assert!(html.contains("MSI al mes"));
    }
}
