//! Credit card payment alerts
//!
//! For each credit card with a known billing cycle the next relevant due date
//! is projected from today's date, and the statement balance owed at that
//! date is estimated from the movements charged before the cutoff.

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use finweb_config::AlertsConfig;

use crate::models::{Card, Movement};

/// Days until due at or below which an alert is urgent
pub const URGENT_DAYS: i64 = 3;

/// Where a due date stands relative to today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "days", rename_all = "snake_case")]
pub enum AlertStatus {
    DueToday,
    Overdue(i64),
    Upcoming(i64),
}

impl AlertStatus {
    fn from_days(days: i64) -> Self {
        match days {
            0 => AlertStatus::DueToday,
            d if d < 0 => AlertStatus::Overdue(-d),
            d => AlertStatus::Upcoming(d),
        }
    }

    /// Spanish badge text
    pub fn label(&self) -> String {
        match self {
            AlertStatus::DueToday => "¡Vence hoy!".to_string(),
            AlertStatus::Overdue(days) => format!("Venció hace {} días", days),
            AlertStatus::Upcoming(days) => format!("Faltan {} días", days),
        }
    }
}

/// A projected upcoming (or just missed) card payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentAlert {
    pub account: Card,
    pub due_date: NaiveDate,
    pub cutoff_date: NaiveDate,
    pub days_until_due: i64,
    /// Owed at the cutoff: initial debt plus charges up to the cutoff minus all payments
    pub statement_balance: Decimal,
    /// Everything owed on the card right now
    pub total_debt: Decimal,
    /// Monthly interest plus tax if the statement is not paid, when the card has a rate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_interest: Option<Decimal>,
    pub status: AlertStatus,
    pub urgent: bool,
}

/// Date for `day` of the month `month0` (zero based, may be out of range)
/// months away from January of `year`; out-of-range days roll into the next
/// month, so February 30 becomes March 2.
pub fn calendar_date(year: i32, month0: i32, day: u32) -> Option<NaiveDate> {
    let total = year * 12 + month0;
    let first = NaiveDate::from_ymd_opt(total.div_euclid(12), total.rem_euclid(12) as u32 + 1, 1)?;
    first.checked_add_signed(Duration::days(i64::from(day) - 1))
}

/// Pick the billing cycle that matters today: `(cutoff, due)`
pub fn project_cycle(
    cutoff_day: u32,
    grace_period: u32,
    today: NaiveDate,
    overdue_window_days: i64,
) -> Option<(NaiveDate, NaiveDate)> {
    let grace = Duration::days(i64::from(grace_period));
    let month0 = today.month0() as i32;

    let mut candidates: Vec<(NaiveDate, NaiveDate)> = (-1..=1)
        .filter_map(|offset| calendar_date(today.year(), month0 + offset, cutoff_day))
        .filter_map(|cutoff| cutoff.checked_add_signed(grace).map(|due| (cutoff, due)))
        .collect();
    candidates.sort_by_key(|(_, due)| *due);

    candidates
        .iter()
        .find(|(_, due)| (*due - today).num_days() >= -overdue_window_days)
        .or_else(|| candidates.last())
        .copied()
}

/// Compute the alert for one card, if any
pub fn payment_alert(
    account: &Card,
    initial_balance: Decimal,
    movements: &[Movement],
    today: NaiveDate,
    config: &AlertsConfig,
) -> Option<PaymentAlert> {
    let (cutoff_day, grace_period) = account.billing_cycle()?;
    let (cutoff_date, due_date) = project_cycle(cutoff_day, grace_period, today, config.overdue_window_days)?;

    let days_until_due = (due_date - today).num_days();
    if days_until_due > config.horizon_days {
        return None;
    }

    let own: Vec<&Movement> = movements
        .iter()
        .filter(|m| m.card_id.as_deref() == Some(account.id.as_str()))
        .collect();

    let paid: Decimal = own.iter().filter(|m| m.is_income()).map(|m| m.amount).sum();
    let spent: Decimal = own.iter().filter(|m| m.is_expense()).map(|m| m.amount.abs()).sum();
    let spent_to_cutoff: Decimal = own
        .iter()
        .filter(|m| m.is_expense() && m.date <= cutoff_date)
        .map(|m| m.amount.abs())
        .sum();

    let statement_balance = initial_balance + spent_to_cutoff - paid;
    if statement_balance <= Decimal::ZERO {
        return None;
    }
    let total_debt = (initial_balance + spent - paid).max(Decimal::ZERO);

    let estimated_interest = account
        .interest_rate
        .filter(|rate| *rate > Decimal::ZERO)
        .map(|rate| statement_balance * rate / Decimal::from(100) / Decimal::from(12) * config.tax_multiplier);

    Some(PaymentAlert {
        account: account.clone(),
        due_date,
        cutoff_date,
        days_until_due,
        statement_balance,
        total_debt,
        estimated_interest,
        status: AlertStatus::from_days(days_until_due),
        urgent: days_until_due <= URGENT_DAYS,
    })
}

/// Alerts for every account, soonest due first
pub fn payment_alerts(
    accounts: &BTreeMap<String, Card>,
    initial_balances: &BTreeMap<String, Decimal>,
    movements: &[Movement],
    today: NaiveDate,
    config: &AlertsConfig,
) -> Vec<PaymentAlert> {
    let mut alerts: Vec<PaymentAlert> = accounts
        .values()
        .filter_map(|account| {
            let initial = initial_balances.get(&account.id).copied().unwrap_or_default();
            payment_alert(account, initial, movements, today, config)
        })
        .collect();
    alerts.sort_by_key(|a| a.days_until_due);
    log::debug!("Computed {} payment alerts for {}", alerts.len(), today);
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CardType, PaymentMethod};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn credit(cutoff: u32, grace: u32, rate: Option<&str>) -> Card {
        Card {
            id: "joy".to_string(),
            name: "Banamex Joy".to_string(),
            card_type: CardType::Credit,
            color: "bg-pink-500".to_string(),
            cutoff_day: Some(cutoff),
            grace_period: Some(grace),
            interest_rate: rate.map(dec),
        }
    }

    fn charge(id: i64, amount: &str, on: NaiveDate, method: PaymentMethod) -> Movement {
        Movement {
            id,
            description: "compra".to_string(),
            amount: dec(amount),
            currency: "MXN".to_string(),
            payment_method: method,
            card_id: Some("joy".to_string()),
            installments: None,
            date: on,
        }
    }

    #[test]
    fn test_calendar_date_overflow() {
        assert_eq!(calendar_date(2026, 1, 30), Some(date(2026, 3, 2)));
        assert_eq!(calendar_date(2026, -1, 15), Some(date(2025, 12, 15)));
        assert_eq!(calendar_date(2026, 12, 31), Some(date(2027, 1, 31)));
        assert_eq!(calendar_date(2026, 10, 31), Some(date(2026, 12, 1)));
    }

    #[test]
    fn test_project_cycle_picks_current() {
        // Cutoff 15, 20 days grace: September cycle due Oct 5 is 10 days past the window
        let (cutoff, due) = project_cycle(15, 20, date(2026, 10, 15), 5).unwrap();
        assert_eq!(cutoff, date(2026, 10, 15));
        assert_eq!(due, date(2026, 11, 4));
    }

    #[test]
    fn test_project_cycle_within_overdue_window() {
        let (cutoff, due) = project_cycle(15, 20, date(2026, 10, 8), 5).unwrap();
        assert_eq!(cutoff, date(2026, 9, 15));
        assert_eq!(due, date(2026, 10, 5));
    }

    #[test]
    fn test_project_cycle_overdue_window_edge() {
        let (cutoff, due) = project_cycle(15, 20, date(2026, 10, 10), 5).unwrap();
        assert_eq!(cutoff, date(2026, 9, 15));
        assert_eq!(due, date(2026, 10, 5));

        let (cutoff, due) = project_cycle(15, 20, date(2026, 10, 11), 5).unwrap();
        assert_eq!(cutoff, date(2026, 10, 15));
        assert_eq!(due, date(2026, 11, 4));
    }

    #[test]
    fn test_project_cycle_cutoff_on_31st() {
        // February 31 rolls to March 3; the January cycle due Feb 20 is past the window
        let (cutoff, due) = project_cycle(31, 20, date(2026, 3, 5), 5).unwrap();
        assert_eq!(cutoff, date(2026, 3, 3));
        assert_eq!(due, date(2026, 3, 23));

        // April 31 rolls to May 1
        let (cutoff, due) = project_cycle(31, 20, date(2026, 5, 10), 5).unwrap();
        assert_eq!(cutoff, date(2026, 5, 1));
        assert_eq!(due, date(2026, 5, 21));

        let (cutoff, due) = project_cycle(31, 20, date(2026, 1, 10), 5).unwrap();
        assert_eq!(cutoff, date(2025, 12, 31));
        assert_eq!(due, date(2026, 1, 20));
    }

    #[test]
    fn test_alert_statement_balance() {
        let config = AlertsConfig::default();
        let movements = vec![
            charge(1, "-1000", date(2026, 10, 10), PaymentMethod::Card),
            charge(2, "-500", date(2026, 10, 20), PaymentMethod::Card),
            charge(3, "200", date(2026, 10, 12), PaymentMethod::Card),
            // Card id matches even when the method is cash
            charge(4, "-100", date(2026, 10, 1), PaymentMethod::Cash),
        ];
        let alert = payment_alert(&credit(15, 20, Some("60")), dec("50"), &movements, date(2026, 10, 20), &config).unwrap();

        assert_eq!(alert.cutoff_date, date(2026, 10, 15));
        assert_eq!(alert.due_date, date(2026, 11, 4));
        assert_eq!(alert.days_until_due, 15);
        assert_eq!(alert.statement_balance, dec("950"));
        assert_eq!(alert.total_debt, dec("1450"));
        assert_eq!(alert.estimated_interest, Some(dec("55.1")));
        assert_eq!(alert.status, AlertStatus::Upcoming(15));
        assert!(!alert.urgent);
    }

    #[test]
    fn test_no_alert_beyond_horizon() {
        let movements = vec![charge(1, "-1000", date(2026, 10, 1), PaymentMethod::Card)];
        let alert = payment_alert(&credit(15, 20, None), Decimal::ZERO, &movements, date(2026, 10, 12), &AlertsConfig::default());
        // Due Nov 4 is 23 days away
        assert!(alert.is_none());
    }

    #[test]
    fn test_no_alert_when_statement_paid() {
        let movements = vec![
            charge(1, "-1000", date(2026, 10, 1), PaymentMethod::Card),
            charge(2, "1000", date(2026, 10, 16), PaymentMethod::Card),
        ];
        let alert = payment_alert(&credit(15, 20, None), Decimal::ZERO, &movements, date(2026, 10, 20), &AlertsConfig::default());
        assert!(alert.is_none());
    }

    #[test]
    fn test_overdue_and_urgent() {
        let movements = vec![charge(1, "-300", date(2026, 9, 1), PaymentMethod::Card)];
        let alert = payment_alert(&credit(15, 20, None), Decimal::ZERO, &movements, date(2026, 10, 7), &AlertsConfig::default()).unwrap();
        assert_eq!(alert.due_date, date(2026, 10, 5));
        assert_eq!(alert.status, AlertStatus::Overdue(2));
        assert!(alert.urgent);
        assert_eq!(alert.estimated_interest, None);
        assert_eq!(alert.status.label(), "Venció hace 2 días");
    }

    #[test]
    fn test_overdue_alert_on_last_day_of_window() {
        let movements = vec![charge(1, "-300", date(2026, 9, 1), PaymentMethod::Card)];
        let alert = payment_alert(&credit(15, 20, None), Decimal::ZERO, &movements, date(2026, 10, 10), &AlertsConfig::default()).unwrap();
        assert_eq!(alert.due_date, date(2026, 10, 5));
        assert_eq!(alert.status, AlertStatus::Overdue(5));
    }

    #[test]
    fn test_cards_without_cycle_are_skipped() {
        let mut accounts = BTreeMap::new();
        let mut legacy = credit(15, 20, None);
        legacy.grace_period = None;
        accounts.insert(legacy.id.clone(), legacy);
        let movements = vec![charge(1, "-300", date(2026, 10, 1), PaymentMethod::Card)];
        let alerts = payment_alerts(&accounts, &BTreeMap::new(), &movements, date(2026, 10, 20), &AlertsConfig::default());
        assert!(alerts.is_empty());
    }
}
