//! Per-account balances and dashboard totals

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{Card, Movement, PaymentMethod};

/// Balance figures for one account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Balance {
    Debit {
        /// Initial balance plus every signed movement
        available: Decimal,
    },
    Credit {
        /// Sum of card charges
        spent: Decimal,
        /// Sum of payments and refunds
        paid: Decimal,
        /// Initial debt plus spent minus paid
        debt: Decimal,
        /// Estimated monthly charge when installments are spread out
        monthly_installments: Decimal,
    },
}

/// An account together with its computed balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub account: Card,
    pub initial_balance: Decimal,
    pub movement_count: usize,
    pub balance: Balance,
}

impl AccountSummary {
    /// Available funds (debit) or outstanding debt (credit)
    pub fn headline(&self) -> Decimal {
        match self.balance {
            Balance::Debit { available } => available,
            Balance::Credit { debt, .. } => debt,
        }
    }
}

/// Movements paid by card with the given account
pub fn card_movements<'a>(movements: &'a [Movement], card_id: &str) -> Vec<&'a Movement> {
    movements.iter().filter(|m| m.charged_to(card_id)).collect()
}

/// Compute the balance of one account
pub fn summarize(account: &Card, initial_balance: Decimal, movements: &[Movement]) -> AccountSummary {
    let own = card_movements(movements, &account.id);

    let balance = if account.is_credit() {
        let mut spent = Decimal::ZERO;
        let mut paid = Decimal::ZERO;
        let mut monthly = Decimal::ZERO;
        for movement in &own {
            if movement.is_expense() {
                let charge = movement.amount.abs();
                spent += charge;
                monthly += match movement.installments() {
                    0 => charge,
                    n => charge / Decimal::from(n),
                };
            } else if movement.is_income() {
                paid += movement.amount;
            }
        }
        Balance::Credit {
            spent,
            paid,
            debt: initial_balance + spent - paid,
            monthly_installments: monthly,
        }
    } else {
        let net: Decimal = own.iter().map(|m| m.amount).sum();
        Balance::Debit {
            available: initial_balance + net,
        }
    };

    AccountSummary {
        account: account.clone(),
        initial_balance,
        movement_count: own.len(),
        balance,
    }
}

/// Summaries for every account, in account id order
pub fn summarize_all(
    accounts: &BTreeMap<String, Card>,
    initial_balances: &BTreeMap<String, Decimal>,
    movements: &[Movement],
) -> Vec<AccountSummary> {
    accounts
        .values()
        .map(|account| {
            let initial = initial_balances.get(&account.id).copied().unwrap_or_default();
            summarize(account, initial, movements)
        })
        .collect()
}

/// Cash movements totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashSummary {
    pub income: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
}

pub fn cash_summary(movements: &[Movement]) -> CashSummary {
    let mut summary = CashSummary::default();
    for movement in movements.iter().filter(|m| m.payment_method == PaymentMethod::Cash) {
        if movement.is_expense() {
            summary.expenses += movement.amount.abs();
        } else {
            summary.income += movement.amount;
        }
    }
    summary.net = summary.income - summary.expenses;
    summary
}

/// Headline figures for the dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    /// Sum of available funds over debit accounts
    pub available: Decimal,
    /// Sum of debt over credit accounts
    pub debt: Decimal,
    pub cash: CashSummary,
}

pub fn totals(summaries: &[AccountSummary], movements: &[Movement]) -> Totals {
    let mut totals = Totals {
        cash: cash_summary(movements),
        ..Totals::default()
    };
    for summary in summaries {
        match summary.balance {
            Balance::Debit { available } => totals.available += available,
            Balance::Credit { debt, .. } => totals.debt += debt,
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CardType;
    use chrono::NaiveDate;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn card(id: &str, card_type: CardType) -> Card {
        Card {
            id: id.to_string(),
            name: id.to_uppercase(),
            card_type,
            color: "bg-slate-800".to_string(),
            cutoff_day: None,
            grace_period: None,
            interest_rate: None,
        }
    }

    fn movement(id: i64, amount: &str, method: PaymentMethod, card_id: Option<&str>, msi: Option<u32>) -> Movement {
        Movement {
            id,
            description: format!("mov {}", id),
            amount: dec(amount),
            currency: "MXN".to_string(),
            payment_method: method,
            card_id: card_id.map(str::to_string),
            installments: msi,
            date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
        }
    }

    #[test]
    fn test_debit_available() {
        let account = card("nomina", CardType::Debit);
        let movements = vec![
            movement(1, "-200", PaymentMethod::Card, Some("nomina"), None),
            movement(2, "1500", PaymentMethod::Card, Some("nomina"), None),
            movement(3, "-999", PaymentMethod::Cash, Some("nomina"), None),
            movement(4, "-50", PaymentMethod::Card, Some("otra"), None),
        ];
        let summary = summarize(&account, dec("1000"), &movements);
        assert_eq!(summary.balance, Balance::Debit { available: dec("2300") });
        assert_eq!(summary.movement_count, 2);
        assert_eq!(summary.headline(), dec("2300"));
    }

    #[test]
    fn test_credit_debt_and_installments() {
        let account = card("joy", CardType::Credit);
        let movements = vec![
            movement(1, "-1200", PaymentMethod::Card, Some("joy"), Some(12)),
            movement(2, "-300", PaymentMethod::Card, Some("joy"), Some(0)),
            movement(3, "-200", PaymentMethod::Card, Some("joy"), None),
            movement(4, "500", PaymentMethod::Card, Some("joy"), None),
        ];
        let summary = summarize(&account, dec("100"), &movements);
        match summary.balance {
            Balance::Credit { spent, paid, debt, monthly_installments } => {
                assert_eq!(spent, dec("1700"));
                assert_eq!(paid, dec("500"));
                assert_eq!(debt, dec("1300"));
                assert_eq!(monthly_installments, dec("600"));
            }
            other => panic!("expected credit balance, got {:?}", other),
        }
    }

    #[test]
    fn test_account_without_movements() {
        let summary = summarize(&card("joy", CardType::Credit), Decimal::ZERO, &[]);
        assert_eq!(summary.headline(), Decimal::ZERO);
        assert_eq!(summary.movement_count, 0);
    }

    #[test]
    fn test_cash_and_totals() {
        let mut accounts = BTreeMap::new();
        accounts.insert("deb".to_string(), card("deb", CardType::Debit));
        accounts.insert("cred".to_string(), card("cred", CardType::Credit));
        let mut balances = BTreeMap::new();
        balances.insert("deb".to_string(), dec("500"));
        balances.insert("cred".to_string(), dec("250"));

        let movements = vec![
            movement(1, "-100", PaymentMethod::Cash, None, None),
            movement(2, "40", PaymentMethod::Cash, None, None),
            movement(3, "-50", PaymentMethod::Card, Some("cred"), None),
        ];
        let summaries = summarize_all(&accounts, &balances, &movements);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].account.id, "cred");

        let totals = totals(&summaries, &movements);
        assert_eq!(totals.available, dec("500"));
        assert_eq!(totals.debt, dec("300"));
        assert_eq!(totals.cash.income, dec("40"));
        assert_eq!(totals.cash.expenses, dec("100"));
        assert_eq!(totals.cash.net, dec("-60"));
    }
}
