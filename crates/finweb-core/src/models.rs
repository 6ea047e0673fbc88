//! Core data models for the tracker

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Display token used when an account has no color
pub const DEFAULT_COLOR: &str = "bg-slate-800";

/// Description stamped on card payments
pub const PAYMENT_DESCRIPTION: &str = "PAGO A TARJETA";

/// Largest absolute amount accepted for a movement, payment or balance
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Largest annual interest rate accepted, in percent
pub const MAX_INTEREST_RATE: i64 = 1_000;

/// True when `amount` is within `±MAX_AMOUNT`; sums of in-range amounts never overflow
pub fn amount_in_range(amount: Decimal) -> bool {
    amount.abs() <= Decimal::from(MAX_AMOUNT)
}

/// True when `rate` is between zero and `MAX_INTEREST_RATE`
pub fn rate_in_range(rate: Decimal) -> bool {
    !rate.is_sign_negative() && rate <= Decimal::from(MAX_INTEREST_RATE)
}

/// Account (card) type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    /// Debit card or bank account: tracks an available balance
    #[default]
    Debit,
    /// Credit card: tracks a debt
    Credit,
}

impl std::str::FromStr for CardType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debit" | "debito" | "débito" => Ok(CardType::Debit),
            "credit" | "credito" | "crédito" => Ok(CardType::Credit),
            _ => Err(format!("Invalid card type: {}", s)),
        }
    }
}

impl std::fmt::Display for CardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CardType::Debit => write!(f, "debit"),
            CardType::Credit => write!(f, "credit"),
        }
    }
}

/// An account movements can be charged to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub card_type: CardType,
    #[serde(default = "default_color")]
    pub color: String,
    /// Statement cutoff day of month (credit only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cutoff_day: Option<u32>,
    /// Days after the cutoff until payment is due (credit only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grace_period: Option<u32>,
    /// Annual interest rate in percent, e.g. 50 for 50%
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<Decimal>,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

impl Card {
    pub fn is_credit(&self) -> bool {
        self.card_type == CardType::Credit
    }

    /// Cutoff day and grace period, present only for credit cards with both set
    pub fn billing_cycle(&self) -> Option<(u32, u32)> {
        if !self.is_credit() {
            return None;
        }
        match (self.cutoff_day, self.grace_period) {
            (Some(cutoff), Some(grace)) if cutoff > 0 && grace > 0 => Some((cutoff, grace)),
            _ => None,
        }
    }
}

/// How a movement was paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "Efectivo", alias = "cash")]
    Cash,
    #[serde(rename = "Tarjeta", alias = "card")]
    Card,
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "efectivo" | "cash" => Ok(PaymentMethod::Cash),
            "tarjeta" | "card" => Ok(PaymentMethod::Card),
            _ => Err(format!("Invalid payment method: {}", s)),
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "Efectivo"),
            PaymentMethod::Card => write!(f, "Tarjeta"),
        }
    }
}

/// Whether a movement takes money out or brings it in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    #[default]
    Expense,
    Income,
}

impl MovementKind {
    /// Kind implied by the sign of an amount
    pub fn of(amount: Decimal) -> Self {
        if amount.is_sign_negative() && !amount.is_zero() {
            MovementKind::Expense
        } else {
            MovementKind::Income
        }
    }

    /// Apply this kind's sign to an amount
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            MovementKind::Expense => -amount.abs(),
            MovementKind::Income => amount.abs(),
        }
    }
}

impl std::str::FromStr for MovementKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "expense" | "gasto" | "cargo" => Ok(MovementKind::Expense),
            "income" | "ingreso" | "abono" => Ok(MovementKind::Income),
            _ => Err(format!("Invalid movement kind: {}", s)),
        }
    }
}

/// A logged expense (negative amount) or income (positive amount)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    pub id: i64,
    pub description: String,
    pub amount: Decimal,
    pub currency: String,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_id: Option<String>,
    /// Months without interest; 0 or absent means a single charge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installments: Option<u32>,
    pub date: NaiveDate,
}

impl Movement {
    pub fn kind(&self) -> MovementKind {
        MovementKind::of(self.amount)
    }

    pub fn is_expense(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    pub fn is_income(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    /// True when the movement was charged to the given account
    pub fn charged_to(&self, card_id: &str) -> bool {
        self.payment_method == PaymentMethod::Card && self.card_id.as_deref() == Some(card_id)
    }

    pub fn installments(&self) -> u32 {
        self.installments.unwrap_or(0)
    }

    /// `YYYY-MM` of the movement date
    pub fn month_key(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }
}

/// UI theme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_matches('"').to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(format!("Invalid theme: {}", s)),
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

/// Input for creating or editing an account
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDraft {
    pub name: String,
    #[serde(rename = "type", default)]
    pub card_type: CardType,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub cutoff_day: Option<u32>,
    #[serde(default)]
    pub grace_period: Option<u32>,
    #[serde(default)]
    pub interest_rate: Option<Decimal>,
    /// Initial balance (debit) or initial debt (credit); stored as absolute value
    #[serde(default)]
    pub initial_balance: Option<Decimal>,
}

/// Input for creating or editing a movement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementDraft {
    pub description: String,
    /// Entered amount; its sign is ignored in favour of `kind`
    pub amount: Decimal,
    #[serde(default)]
    pub kind: MovementKind,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub card_id: Option<String>,
    #[serde(default)]
    pub installments: u32,
    pub date: NaiveDate,
}

/// Billing cycle derived from a sample cutoff date and payment date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingCycle {
    pub cutoff_day: u32,
    pub grace_period: Option<u32>,
}
