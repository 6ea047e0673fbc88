//! Tracker state and operations
//!
//! The tracker owns four pieces of state (movements, initial balances,
//! accounts and theme) and writes all of them back to the key-value store
//! after every change.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::sync::Arc;

use finweb_config::Config;
use finweb_utils::{now_millis, slugify, MoneyFormat};

use crate::alerts::{payment_alerts, PaymentAlert};
use crate::backup::Backup;
use crate::balances::{summarize_all, totals, AccountSummary, Totals};
use crate::cloud::CloudSnapshot;
use crate::error::{CoreError, CoreResult};
use crate::filter::MovementFilter;
use crate::import::ImportPreview;
use crate::models::{
    amount_in_range, rate_in_range, AccountDraft, BillingCycle, Card, CardType, Movement, MovementDraft, PaymentMethod,
    Theme, MAX_AMOUNT, MAX_INTEREST_RATE, PAYMENT_DESCRIPTION,
};
use crate::report::movements_csv;
use crate::store::{KeyValueStore, ACCOUNTS_KEY, BALANCES_KEY, MOVEMENTS_KEY, THEME_KEY};

/// Store reference type
pub type StoreRef = Arc<dyn KeyValueStore>;

fn preset(id: &str, name: &str, card_type: CardType, color: &str, cutoff_day: Option<u32>) -> Card {
    Card {
        id: id.to_string(),
        name: name.to_string(),
        card_type,
        color: color.to_string(),
        cutoff_day,
        grace_period: None,
        interest_rate: None,
    }
}

/// Accounts a fresh tracker starts with
pub fn default_accounts() -> BTreeMap<String, Card> {
    [
        preset("banamex_debito", "Banamex Débito", CardType::Debit, "bg-blue-600", None),
        preset("banamex_joy", "Banamex Joy", CardType::Credit, "bg-pink-500", Some(15)),
        preset("banorte_debito", "Banorte Débito", CardType::Debit, "bg-red-600", None),
        preset("banorte_credito", "Banorte Crédito", CardType::Credit, "bg-red-700", Some(10)),
        preset("bienestar", "Bienestar", CardType::Debit, "bg-emerald-500", None),
        preset("invex_aeropuerto", "Invex Aeropuerto", CardType::Credit, "bg-slate-800", Some(20)),
    ]
    .into_iter()
    .map(|card| (card.id.clone(), card))
    .collect()
}

fn zero_balances(accounts: &BTreeMap<String, Card>) -> BTreeMap<String, Decimal> {
    accounts.keys().map(|id| (id.clone(), Decimal::ZERO)).collect()
}

fn check_amount(amount: Decimal, what: &str) -> CoreResult<()> {
    if amount_in_range(amount) {
        Ok(())
    } else {
        Err(CoreError::validation(format!(
            "{} must be at most {} in absolute value",
            what, MAX_AMOUNT
        )))
    }
}

/// Reject backups and snapshots carrying amounts or rates the views cannot add up
fn check_values(
    movements: &[Movement],
    balances: &BTreeMap<String, Decimal>,
    accounts: Option<&BTreeMap<String, Card>>,
) -> CoreResult<()> {
    if let Some(movement) = movements.iter().find(|m| !amount_in_range(m.amount)) {
        return Err(CoreError::validation(format!("movement {} has an out-of-range amount", movement.id)));
    }
    if let Some((id, _)) = balances.iter().find(|(_, value)| !amount_in_range(**value)) {
        return Err(CoreError::validation(format!("initial balance of {} is out of range", id)));
    }
    let bad_rate = accounts
        .into_iter()
        .flat_map(|map| map.values())
        .find(|card| card.interest_rate.map_or(false, |rate| !rate_in_range(rate)));
    if let Some(card) = bad_rate {
        return Err(CoreError::validation(format!("interest rate of {} is out of range", card.id)));
    }
    Ok(())
}

/// Money format derived from the currency settings
pub fn money_format(config: &Config) -> MoneyFormat {
    MoneyFormat {
        symbol: config.currency.symbol.clone(),
        symbol_after: config.currency.symbol_position == finweb_config::SymbolPosition::After,
        thousands_separator: config.currency.thousands_separator.clone(),
        decimal_separator: config.currency.decimal_separator.clone(),
        decimal_places: config.currency.decimal_places,
    }
}

/// Single-user finance tracker
pub struct Tracker {
    config: Config,
    store: StoreRef,
    movements: Vec<Movement>,
    initial_balances: BTreeMap<String, Decimal>,
    accounts: BTreeMap<String, Card>,
    theme: Theme,
    last_id: i64,
}

impl Tracker {
    /// Create a tracker holding the default state; nothing is read yet
    pub fn new(config: Config, store: StoreRef) -> Self {
        let accounts = default_accounts();
        Self {
            config,
            store,
            movements: Vec::new(),
            initial_balances: zero_balances(&accounts),
            accounts,
            theme: Theme::Light,
            last_id: 0,
        }
    }

    /// Create a tracker and load whatever the store holds
    pub fn open(config: Config, store: StoreRef) -> Self {
        let mut tracker = Self::new(config, store);
        tracker.load();
        tracker
    }

    // ==================== Loading & Persistence ====================

    fn read_slot<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::error!("Failed to read slot {}: {}", key, e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                log::error!("Slot {} is not valid JSON, using defaults: {}", key, e);
                None
            }
        }
    }

    /// Read all slots; unreadable slots fall back to defaults
    pub fn load(&mut self) {
        if let Some(serde_json::Value::Array(items)) = self.read_slot::<serde_json::Value>(MOVEMENTS_KEY) {
            let total = items.len();
            self.movements = items
                .into_iter()
                .filter_map(|item| serde_json::from_value::<Movement>(item).ok())
                .filter(|m| m.id != 0 && amount_in_range(m.amount))
                .collect();
            if self.movements.len() != total {
                log::warn!("Dropped {} malformed stored movements", total - self.movements.len());
            }
        }

        match self.read_slot::<serde_json::Map<String, serde_json::Value>>(BALANCES_KEY) {
            Some(map) => {
                self.initial_balances = map
                    .into_iter()
                    .filter_map(|(id, value)| serde_json::from_value::<Decimal>(value).ok().map(|v| (id, v)))
                    .filter(|(_, value)| amount_in_range(*value))
                    .collect();
            }
            None => self.initial_balances = zero_balances(&default_accounts()),
        }

        match self.read_slot::<serde_json::Map<String, serde_json::Value>>(ACCOUNTS_KEY) {
            Some(map) => {
                self.accounts = map
                    .into_iter()
                    .filter_map(|(key, mut value)| {
                        let named = value
                            .get("name")
                            .and_then(|n| n.as_str())
                            .map_or(false, |n| !n.is_empty());
                        if !named {
                            return None;
                        }
                        if value.get("id").is_none() {
                            value["id"] = serde_json::Value::String(key.clone());
                        }
                        let mut card = serde_json::from_value::<Card>(value).ok()?;
                        card.interest_rate = card.interest_rate.filter(|rate| rate_in_range(*rate));
                        Some((key, card))
                    })
                    .collect();
            }
            None => self.accounts = default_accounts(),
        }

        self.theme = match self.store.get(THEME_KEY) {
            Ok(Some(raw)) => raw.parse().unwrap_or_default(),
            _ => Theme::Light,
        };

        self.last_id = self.movements.iter().map(|m| m.id).max().unwrap_or(0);
        log::info!(
            "Loaded {} movements across {} accounts",
            self.movements.len(),
            self.accounts.len()
        );
    }

    fn write_slot<T: serde::Serialize>(&self, key: &str, value: &T) -> CoreResult<()> {
        let json = serde_json::to_string(value).map_err(|e| CoreError::StorageError {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.store.set(key, &json)
    }

    /// Write all four slots
    pub fn persist(&self) -> CoreResult<()> {
        self.write_slot(MOVEMENTS_KEY, &self.movements)?;
        self.write_slot(BALANCES_KEY, &self.initial_balances)?;
        self.write_slot(ACCOUNTS_KEY, &self.accounts)?;
        self.store.set(THEME_KEY, &self.theme.to_string())?;
        log::debug!("Persisted tracker state ({} movements)", self.movements.len());
        Ok(())
    }

    /// Apply `change` and persist; when either fails the in-memory state is put back
    fn commit<T>(&mut self, change: impl FnOnce(&mut Self) -> CoreResult<T>) -> CoreResult<T> {
        let saved = (
            self.movements.clone(),
            self.initial_balances.clone(),
            self.accounts.clone(),
            self.theme,
        );
        let result = change(self).and_then(|value| self.persist().map(|()| value));
        if let Err(e) = &result {
            log::warn!("Rolling back tracker change: {}", e);
            (self.movements, self.initial_balances, self.accounts, self.theme) = saved;
        }
        result
    }

    /// Next movement id: the millisecond clock, bumped past the last id handed out
    fn next_id(&mut self) -> i64 {
        let id = now_millis().max(self.last_id + 1);
        self.last_id = id;
        id
    }

    // ==================== Accessors ====================

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn money_format(&self) -> MoneyFormat {
        money_format(&self.config)
    }

    pub fn movements(&self) -> &[Movement] {
        &self.movements
    }

    pub fn movement(&self, id: i64) -> Option<&Movement> {
        self.movements.iter().find(|m| m.id == id)
    }

    pub fn accounts(&self) -> &BTreeMap<String, Card> {
        &self.accounts
    }

    pub fn account(&self, id: &str) -> Option<&Card> {
        self.accounts.get(id)
    }

    pub fn initial_balances(&self) -> &BTreeMap<String, Decimal> {
        &self.initial_balances
    }

    pub fn initial_balance(&self, id: &str) -> Decimal {
        self.initial_balances.get(id).copied().unwrap_or_default()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    // ==================== Accounts ====================

    fn validate_account(draft: &AccountDraft) -> CoreResult<()> {
        if draft.name.trim().is_empty() {
            return Err(CoreError::validation("account name is required"));
        }
        if let Some(day) = draft.cutoff_day {
            if !(1..=31).contains(&day) {
                return Err(CoreError::validation("cutoff day must be between 1 and 31"));
            }
        }
        if let Some(rate) = draft.interest_rate {
            if !rate_in_range(rate) {
                return Err(CoreError::validation(format!(
                    "interest rate must be between 0 and {}",
                    MAX_INTEREST_RATE
                )));
            }
        }
        if let Some(balance) = draft.initial_balance {
            check_amount(balance, "initial balance")?;
        }
        Ok(())
    }

    fn card_from_draft(id: String, draft: &AccountDraft, previous_color: Option<&str>) -> Card {
        let credit = draft.card_type == CardType::Credit;
        let color = draft
            .color
            .clone()
            .filter(|c| !c.trim().is_empty())
            .or_else(|| previous_color.map(str::to_string))
            .unwrap_or_else(|| crate::models::DEFAULT_COLOR.to_string());
        Card {
            id,
            name: draft.name.trim().to_string(),
            card_type: draft.card_type,
            color,
            cutoff_day: draft.cutoff_day.filter(|_| credit),
            grace_period: draft.grace_period.filter(|g| credit && *g > 0),
            interest_rate: draft.interest_rate.filter(|_| credit),
        }
    }

    fn new_account_id(&self, name: &str) -> String {
        let slug = slugify(name);
        let mut stamp = now_millis();
        loop {
            let id = format!("{}_{:04}", slug, stamp.rem_euclid(10_000));
            if !self.accounts.contains_key(&id) {
                return id;
            }
            stamp += 1;
        }
    }

    pub fn add_account(&mut self, draft: AccountDraft) -> CoreResult<Card> {
        Self::validate_account(&draft)?;
        let id = self.new_account_id(&draft.name);
        let card = Self::card_from_draft(id.clone(), &draft, None);
        let initial = draft.initial_balance.map(|b| b.abs()).unwrap_or_default();

        self.commit(|tracker| {
            tracker.initial_balances.insert(id.clone(), initial);
            tracker.accounts.insert(id.clone(), card.clone());
            Ok(())
        })?;
        log::info!("Added account {} ({})", card.name, id);
        Ok(card)
    }

    pub fn edit_account(&mut self, id: &str, draft: AccountDraft) -> CoreResult<Card> {
        Self::validate_account(&draft)?;
        let previous = self
            .accounts
            .get(id)
            .ok_or_else(|| CoreError::AccountNotFound { id: id.to_string() })?;
        let card = Self::card_from_draft(id.to_string(), &draft, Some(&previous.color));

        self.commit(|tracker| {
            tracker.accounts.insert(id.to_string(), card.clone());
            if let Some(balance) = draft.initial_balance {
                tracker.initial_balances.insert(id.to_string(), balance.abs());
            }
            Ok(())
        })?;
        log::info!("Edited account {}", id);
        Ok(card)
    }

    /// Remove an account; its movements and initial balance stay behind
    pub fn delete_account(&mut self, id: &str) -> CoreResult<Card> {
        let card = self.commit(|tracker| {
            tracker
                .accounts
                .remove(id)
                .ok_or_else(|| CoreError::AccountNotFound { id: id.to_string() })
        })?;
        log::info!("Deleted account {}", id);
        Ok(card)
    }

    /// Derive the cutoff day and grace period from one real statement
    pub fn grace_from_dates(cutoff_date: NaiveDate, payment_date: NaiveDate) -> BillingCycle {
        use chrono::Datelike;
        let days = (payment_date - cutoff_date).num_days();
        BillingCycle {
            cutoff_day: cutoff_date.day(),
            grace_period: u32::try_from(days).ok().filter(|d| *d > 0),
        }
    }

    /// Set the initial balance (or initial debt) of an account to `|value|`
    pub fn set_initial_balance(&mut self, id: &str, value: Decimal) -> CoreResult<Decimal> {
        if !self.accounts.contains_key(id) {
            return Err(CoreError::AccountNotFound { id: id.to_string() });
        }
        check_amount(value, "initial balance")?;
        let value = value.abs();
        self.commit(|tracker| {
            tracker.initial_balances.insert(id.to_string(), value);
            Ok(())
        })?;
        Ok(value)
    }

    // ==================== Movements ====================

    fn build_movement(&self, id: i64, draft: MovementDraft) -> CoreResult<Movement> {
        let description = draft.description.trim().to_string();
        if description.is_empty() {
            return Err(CoreError::validation("description is required"));
        }
        if draft.amount.is_zero() {
            return Err(CoreError::validation("amount must not be zero"));
        }
        check_amount(draft.amount, "amount")?;

        let card = match draft.payment_method {
            PaymentMethod::Card => {
                let card_id = draft
                    .card_id
                    .as_deref()
                    .filter(|c| !c.is_empty())
                    .ok_or_else(|| CoreError::validation("card payments need an account"))?;
                Some(
                    self.accounts
                        .get(card_id)
                        .ok_or_else(|| CoreError::AccountNotFound { id: card_id.to_string() })?,
                )
            }
            PaymentMethod::Cash => None,
        };

        let installments = match card {
            Some(card) if card.is_credit() => draft.installments,
            _ => 0,
        };

        Ok(Movement {
            id,
            description,
            amount: draft.kind.signed(draft.amount),
            currency: self.config.currency.default_currency.clone(),
            payment_method: draft.payment_method,
            card_id: card.map(|c| c.id.clone()),
            installments: Some(installments),
            date: draft.date,
        })
    }

    pub fn add_movement(&mut self, draft: MovementDraft) -> CoreResult<Movement> {
        let id = self.next_id();
        let movement = self.build_movement(id, draft)?;
        self.commit(|tracker| {
            tracker.movements.push(movement.clone());
            Ok(())
        })?;
        log::debug!("Added movement {} ({})", movement.id, movement.amount);
        Ok(movement)
    }

    pub fn update_movement(&mut self, id: i64, draft: MovementDraft) -> CoreResult<Movement> {
        let index = self
            .movements
            .iter()
            .position(|m| m.id == id)
            .ok_or(CoreError::MovementNotFound { id })?;
        let mut movement = self.build_movement(id, draft)?;
        movement.currency = self.movements[index].currency.clone();
        self.commit(|tracker| {
            tracker.movements[index] = movement.clone();
            Ok(())
        })?;
        Ok(movement)
    }

    pub fn delete_movement(&mut self, id: i64) -> CoreResult<Movement> {
        let index = self
            .movements
            .iter()
            .position(|m| m.id == id)
            .ok_or(CoreError::MovementNotFound { id })?;
        self.commit(|tracker| Ok(tracker.movements.remove(index)))
    }

    /// Delete several movements; unknown ids are ignored. Returns how many went.
    pub fn delete_movements(&mut self, ids: &[i64]) -> CoreResult<usize> {
        if !self.movements.iter().any(|m| ids.contains(&m.id)) {
            return Ok(0);
        }
        let removed = self.commit(|tracker| {
            let before = tracker.movements.len();
            tracker.movements.retain(|m| !ids.contains(&m.id));
            Ok(before - tracker.movements.len())
        })?;
        log::info!("Deleted {} movements", removed);
        Ok(removed)
    }

    /// Log a payment toward an account as a positive card movement
    pub fn record_payment(&mut self, card_id: &str, amount: Decimal, date: NaiveDate) -> CoreResult<Movement> {
        if amount <= Decimal::ZERO {
            return Err(CoreError::validation("payment amount must be positive"));
        }
        check_amount(amount, "payment amount")?;
        if !self.accounts.contains_key(card_id) {
            return Err(CoreError::AccountNotFound { id: card_id.to_string() });
        }
        let movement = Movement {
            id: self.next_id(),
            description: PAYMENT_DESCRIPTION.to_string(),
            amount,
            currency: self.config.currency.default_currency.clone(),
            payment_method: PaymentMethod::Card,
            card_id: Some(card_id.to_string()),
            installments: Some(0),
            date,
        };
        self.commit(|tracker| {
            tracker.movements.push(movement.clone());
            Ok(())
        })?;
        log::info!("Recorded payment of {} to {}", amount, card_id);
        Ok(movement)
    }

    /// Append movements built from import drafts, each with a fresh id
    pub fn append_movements(&mut self, drafts: Vec<MovementDraft>) -> CoreResult<Vec<Movement>> {
        for (index, draft) in drafts.iter().enumerate() {
            check_amount(draft.amount, &format!("amount of row {}", index + 1))?;
        }

        let currency = self.config.currency.default_currency.clone();
        let mut added = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let card_id = match draft.payment_method {
                PaymentMethod::Card => draft.card_id.filter(|c| !c.is_empty()),
                PaymentMethod::Cash => None,
            };
            added.push(Movement {
                id: self.next_id(),
                description: draft.description,
                amount: draft.amount,
                currency: currency.clone(),
                payment_method: draft.payment_method,
                card_id,
                installments: Some(draft.installments),
                date: draft.date,
            });
        }
        self.commit(|tracker| {
            tracker.movements.extend(added.iter().cloned());
            Ok(())
        })?;
        log::info!("Appended {} imported movements", added.len());
        Ok(added)
    }

    pub fn confirm_import(&mut self, preview: &ImportPreview) -> CoreResult<Vec<Movement>> {
        if preview.is_empty() {
            return Err(CoreError::NothingToImport);
        }
        self.append_movements(preview.drafts())
    }

    /// Clear every movement and zero every account's initial balance
    pub fn reset(&mut self) -> CoreResult<()> {
        self.commit(|tracker| {
            tracker.movements.clear();
            tracker.initial_balances = zero_balances(&tracker.accounts);
            Ok(())
        })?;
        log::warn!("Tracker reset: all movements deleted");
        Ok(())
    }

    // ==================== Theme ====================

    pub fn set_theme(&mut self, theme: Theme) -> CoreResult<Theme> {
        self.commit(|tracker| {
            tracker.theme = theme;
            Ok(theme)
        })
    }

    pub fn toggle_theme(&mut self) -> CoreResult<Theme> {
        self.set_theme(self.theme.toggled())
    }

    // ==================== Backup & Sync ====================

    pub fn backup(&self) -> Backup {
        Backup {
            expenses: self.movements.clone(),
            initial_balances: self.initial_balances.clone(),
            cards: Some(self.accounts.clone()),
            timestamp: Some(Utc::now()),
        }
    }

    /// Replace movements and balances (and accounts when present) with a backup
    pub fn restore(&mut self, backup: Backup) -> CoreResult<()> {
        check_values(&backup.expenses, &backup.initial_balances, backup.cards.as_ref())?;
        self.commit(|tracker| {
            tracker.movements = backup.expenses;
            tracker.initial_balances = backup.initial_balances;
            if let Some(cards) = backup.cards {
                tracker.accounts = cards;
            }
            Ok(())
        })?;
        self.last_id = self.last_id.max(self.movements.iter().map(|m| m.id).max().unwrap_or(0));
        log::info!("Restored backup with {} movements", self.movements.len());
        Ok(())
    }

    pub fn snapshot(&self) -> CloudSnapshot {
        CloudSnapshot {
            expenses: Some(self.movements.clone()),
            balances: Some(self.initial_balances.clone()),
            cards: Some(self.accounts.clone()),
            theme: Some(self.theme),
            last_updated: None,
        }
    }

    /// Apply every part present in a pulled snapshot
    pub fn apply_snapshot(&mut self, snapshot: CloudSnapshot) -> CoreResult<()> {
        check_values(
            snapshot.expenses.as_deref().unwrap_or_default(),
            snapshot.balances.as_ref().unwrap_or(&BTreeMap::new()),
            snapshot.cards.as_ref(),
        )?;
        self.commit(|tracker| {
            if let Some(expenses) = snapshot.expenses {
                tracker.movements = expenses;
            }
            if let Some(balances) = snapshot.balances {
                tracker.initial_balances = balances;
            }
            if let Some(cards) = snapshot.cards {
                tracker.accounts = cards;
            }
            if let Some(theme) = snapshot.theme {
                tracker.theme = theme;
            }
            Ok(())
        })?;
        self.last_id = self.last_id.max(self.movements.iter().map(|m| m.id).max().unwrap_or(0));
        Ok(())
    }

    // ==================== Views ====================

    pub fn summaries(&self) -> Vec<AccountSummary> {
        summarize_all(&self.accounts, &self.initial_balances, &self.movements)
    }

    pub fn totals(&self) -> Totals {
        totals(&self.summaries(), &self.movements)
    }

    pub fn alerts(&self, today: NaiveDate) -> Vec<PaymentAlert> {
        payment_alerts(
            &self.accounts,
            &self.initial_balances,
            &self.movements,
            today,
            &self.config.alerts,
        )
    }

    pub fn filtered(&self, filter: &MovementFilter) -> Vec<Movement> {
        filter.apply(&self.movements).into_iter().cloned().collect()
    }

    pub fn report_csv(&self) -> CoreResult<String> {
        movements_csv(&self.movements, &self.accounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::{ImportPreview, RawMovementRow};
    use crate::models::MovementKind;
    use crate::store::{FileKeyValueStore, MemoryKeyValueStore};

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tracker() -> Tracker {
        Tracker::new(Config::default(), Arc::new(MemoryKeyValueStore::new()))
    }

    fn expense(description: &str, amount: &str, card: Option<&str>, installments: u32) -> MovementDraft {
        MovementDraft {
            description: description.to_string(),
            amount: dec(amount),
            kind: MovementKind::Expense,
            payment_method: if card.is_some() { PaymentMethod::Card } else { PaymentMethod::Cash },
            card_id: card.map(str::to_string),
            installments,
            date: date(2026, 10, 10),
        }
    }

    #[test]
    fn test_defaults() {
        let tracker = tracker();
        assert_eq!(tracker.accounts().len(), 6);
        assert_eq!(tracker.initial_balance("banamex_joy"), Decimal::ZERO);
        assert_eq!(tracker.account("banorte_credito").and_then(|c| c.cutoff_day), Some(10));
        assert_eq!(tracker.theme(), Theme::Light);
    }

    #[test]
    fn test_add_movement_normalizes() {
        let mut tracker = tracker();
        let movement = tracker.add_movement(expense(" Súper ", "250.50", Some("banamex_joy"), 3)).unwrap();
        assert_eq!(movement.description, "Súper");
        assert_eq!(movement.amount, dec("-250.50"));
        assert_eq!(movement.currency, "MXN");
        assert_eq!(movement.installments, Some(3));

        // Debit cards never carry installments
        let debit = tracker.add_movement(expense("Gas", "100", Some("bienestar"), 6)).unwrap();
        assert_eq!(debit.installments, Some(0));

        let cash = tracker
            .add_movement(MovementDraft {
                kind: MovementKind::Income,
                card_id: Some("bienestar".to_string()),
                ..expense("Venta", "-80", None, 0)
            })
            .unwrap();
        assert_eq!(cash.amount, dec("80"));
        assert_eq!(cash.card_id, None);
        assert!(debit.id > movement.id && cash.id > debit.id);
    }

    #[test]
    fn test_add_movement_validation() {
        let mut tracker = tracker();
        assert!(matches!(tracker.add_movement(expense("", "10", None, 0)), Err(CoreError::ValidationError { .. })));
        assert!(matches!(tracker.add_movement(expense("x", "0", None, 0)), Err(CoreError::ValidationError { .. })));
        assert!(matches!(
            tracker.add_movement(expense("x", "10", Some("nope"), 0)),
            Err(CoreError::AccountNotFound { .. })
        ));
        assert!(tracker.movements().is_empty());
    }

    #[test]
    fn test_update_and_delete_movements() {
        let mut tracker = tracker();
        let first = tracker.add_movement(expense("Café", "45", None, 0)).unwrap();
        let second = tracker.add_movement(expense("Pan", "20", None, 0)).unwrap();
        let third = tracker.add_movement(expense("Leche", "30", None, 0)).unwrap();

        let updated = tracker.update_movement(first.id, expense("Café doble", "60", None, 0)).unwrap();
        assert_eq!(updated.id, first.id);
        assert_eq!(tracker.movement(first.id).unwrap().amount, dec("-60"));

        tracker.delete_movement(second.id).unwrap();
        assert!(matches!(tracker.delete_movement(second.id), Err(CoreError::MovementNotFound { .. })));

        assert_eq!(tracker.delete_movements(&[first.id, third.id, 42]).unwrap(), 2);
        assert!(tracker.movements().is_empty());
    }

    #[test]
    fn test_accounts_lifecycle() {
        let mut tracker = tracker();
        let card = tracker
            .add_account(AccountDraft {
                name: "Nu Crédito".to_string(),
                card_type: CardType::Credit,
                cutoff_day: Some(5),
                grace_period: Some(20),
                interest_rate: Some(dec("55")),
                initial_balance: Some(dec("-1200")),
                ..AccountDraft::default()
            })
            .unwrap();
        assert!(card.id.starts_with("nu_crédito_"));
        assert_eq!(card.id.len(), "nu_crédito_".len() + 4);
        assert_eq!(card.color, crate::models::DEFAULT_COLOR);
        assert_eq!(tracker.initial_balance(&card.id), dec("1200"));

        let edited = tracker
            .edit_account(
                &card.id,
                AccountDraft {
                    name: "Nu".to_string(),
                    card_type: CardType::Debit,
                    cutoff_day: Some(5),
                    ..AccountDraft::default()
                },
            )
            .unwrap();
        assert_eq!(edited.cutoff_day, None);
        assert_eq!(tracker.initial_balance(&card.id), dec("1200"));

        tracker.add_movement(expense("Cine", "150", Some(&card.id), 0)).unwrap();
        tracker.delete_account(&card.id).unwrap();
        assert!(tracker.account(&card.id).is_none());
        assert_eq!(tracker.movements().len(), 1);
        assert!(matches!(tracker.delete_account(&card.id), Err(CoreError::AccountNotFound { .. })));

        assert!(tracker.add_account(AccountDraft::default()).is_err());
    }

    #[test]
    fn test_grace_from_dates() {
        let cycle = Tracker::grace_from_dates(date(2026, 9, 15), date(2026, 10, 5));
        assert_eq!(cycle.cutoff_day, 15);
        assert_eq!(cycle.grace_period, Some(20));

        let cycle = Tracker::grace_from_dates(date(2026, 9, 15), date(2026, 9, 1));
        assert_eq!(cycle.grace_period, None);
    }

    #[test]
    fn test_payment_reduces_debt() {
        let mut tracker = tracker();
        tracker.set_initial_balance("banamex_joy", dec("-500")).unwrap();
        tracker.add_movement(expense("TV", "1200", Some("banamex_joy"), 12)).unwrap();
        let payment = tracker.record_payment("banamex_joy", dec("300"), date(2026, 10, 14)).unwrap();
        assert_eq!(payment.description, PAYMENT_DESCRIPTION);
        assert_eq!(payment.amount, dec("300"));

        let joy = tracker
            .summaries()
            .into_iter()
            .find(|s| s.account.id == "banamex_joy")
            .unwrap();
        assert_eq!(joy.headline(), dec("1400"));
        assert!(tracker.record_payment("banamex_joy", dec("-5"), date(2026, 10, 14)).is_err());
    }

    #[test]
    fn test_reset_and_theme() {
        let mut tracker = tracker();
        tracker.set_initial_balance("bienestar", dec("900")).unwrap();
        tracker.add_movement(expense("Taxi", "90", None, 0)).unwrap();
        tracker.reset().unwrap();
        assert!(tracker.movements().is_empty());
        assert!(tracker.initial_balances().values().all(|v| v.is_zero()));

        assert_eq!(tracker.toggle_theme().unwrap(), Theme::Dark);
        assert_eq!(tracker.toggle_theme().unwrap(), Theme::Light);
    }

    #[test]
    fn test_persist_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let store: StoreRef = Arc::new(FileKeyValueStore::open(dir.path()).unwrap());

        let mut tracker = Tracker::open(Config::default(), store.clone());
        tracker.add_movement(expense("Renta", "8000", Some("banorte_debito"), 0)).unwrap();
        tracker.set_theme(Theme::Dark).unwrap();
        tracker.delete_account("bienestar").unwrap();

        let reloaded = Tracker::open(Config::default(), store.clone());
        assert_eq!(reloaded.movements().len(), 1);
        assert_eq!(reloaded.theme(), Theme::Dark);
        assert_eq!(reloaded.accounts().len(), 5);
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_load_sanitizes_slots() {
        let store = Arc::new(MemoryKeyValueStore::new());
        store
            .set(
                MOVEMENTS_KEY,
                r#"[{"id":1,"description":"ok","amount":-5,"currency":"MXN","paymentMethod":"Efectivo","date":"2026-10-01"},
                    {"id":2,"description":"no amount","currency":"MXN","date":"2026-10-01"},
                    {"description":"no id","amount":1,"currency":"MXN","date":"2026-10-01"},
                    null]"#,
            )
            .unwrap();
        store.set(BALANCES_KEY, "not json").unwrap();
        store
            .set(ACCOUNTS_KEY, r#"{"a":{"id":"a","name":"A","type":"debit"},"b":{"name":""},"c":5,"d":{"name":"D","type":"credit"}}"#)
            .unwrap();
        store.set(THEME_KEY, "dark").unwrap();

        let tracker = Tracker::open(Config::default(), store);
        assert_eq!(tracker.movements().len(), 1);
        assert_eq!(tracker.initial_balances().len(), 6);
        assert_eq!(tracker.accounts().keys().cloned().collect::<Vec<_>>(), vec!["a", "d"]);
        assert_eq!(tracker.account("d").unwrap().id, "d");
        assert_eq!(tracker.theme(), Theme::Dark);
    }

    #[test]
    fn test_restore_backup() {
        let mut tracker = tracker();
        tracker.add_movement(expense("Viejo", "10", None, 0)).unwrap();
        let backup = Backup::from_json(
            r#"{"expenses":[{"id":5,"description":"Nuevo","amount":20,"currency":"MXN","date":"2026-09-01"}],
                "initialBalances":{"bienestar":300}}"#,
        )
        .unwrap();
        tracker.restore(backup).unwrap();
        assert_eq!(tracker.movements().len(), 1);
        assert_eq!(tracker.movements()[0].description, "Nuevo");
        assert_eq!(tracker.initial_balance("bienestar"), dec("300"));
        assert_eq!(tracker.accounts().len(), 6);

        let exported = tracker.backup();
        assert_eq!(exported.expenses.len(), 1);
        assert!(exported.timestamp.is_some());
    }

    #[test]
    fn test_confirm_import() {
        let mut tracker = tracker();
        let preview = ImportPreview::from_rows(vec![
            RawMovementRow {
                date: date(2026, 10, 1),
                description: "Súper".to_string(),
                amount: Some(dec("-250")),
                kind: None,
                payment_method: PaymentMethod::Card,
                card_id: Some("banamex_joy".to_string()),
                installments: 3,
            },
            RawMovementRow {
                date: date(2026, 10, 2),
                description: "Nómina".to_string(),
                amount: Some(dec("15000")),
                kind: None,
                payment_method: PaymentMethod::Cash,
                card_id: None,
                installments: 0,
            },
        ])
        .unwrap();

        let added = tracker.confirm_import(&preview).unwrap();
        assert_eq!(added.len(), 2);
        assert_eq!(added[0].amount, dec("-250"));
        assert_eq!(added[0].card_id.as_deref(), Some("banamex_joy"));
        assert_eq!(added[1].amount, dec("15000"));
        assert!(added[1].id > added[0].id);
        assert!(matches!(tracker.confirm_import(&ImportPreview::default()), Err(CoreError::NothingToImport)));
    }

    #[test]
    fn test_snapshot_roundtrip_between_trackers() {
        let mut source = tracker();
        source.add_movement(expense("Libro", "300", None, 0)).unwrap();
        source.set_theme(Theme::Dark).unwrap();

        let mut target = tracker();
        target.apply_snapshot(source.snapshot()).unwrap();
        assert_eq!(target.movements(), source.movements());
        assert_eq!(target.theme(), Theme::Dark);

        let partial = CloudSnapshot {
            expenses: None,
            balances: None,
            cards: None,
            theme: Some(Theme::Light),
            last_updated: None,
        };
        target.apply_snapshot(partial).unwrap();
        assert_eq!(target.movements().len(), 1);
        assert_eq!(target.theme(), Theme::Light);
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> CoreResult<Option<String>> {
            Ok(None)
        }

        fn set(&self, key: &str, _value: &str) -> CoreResult<()> {
            Err(CoreError::StorageError {
                key: key.to_string(),
                message: "disk full".to_string(),
            })
        }

        fn remove(&self, _key: &str) -> CoreResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_persist_rolls_back() {
        let mut tracker = Tracker::new(Config::default(), Arc::new(FailingStore));

        let err = tracker.add_movement(expense("Café", "45", None, 0)).unwrap_err();
        assert!(matches!(err, CoreError::StorageError { .. }));
        assert!(tracker.movements().is_empty());

        assert!(tracker
            .add_account(AccountDraft {
                name: "Nu".to_string(),
                ..AccountDraft::default()
            })
            .is_err());
        assert_eq!(tracker.accounts().len(), 6);

        assert!(tracker.set_initial_balance("bienestar", dec("500")).is_err());
        assert_eq!(tracker.initial_balance("bienestar"), Decimal::ZERO);

        assert!(tracker.delete_account("bienestar").is_err());
        assert!(tracker.account("bienestar").is_some());

        assert!(tracker.set_theme(Theme::Dark).is_err());
        assert_eq!(tracker.theme(), Theme::Light);
    }

    #[test]
    fn test_failed_persist_keeps_existing_movements() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let mut seeded = Tracker::new(Config::default(), store.clone());
        seeded.add_movement(expense("Renta", "8000", None, 0)).unwrap();
        let movements = seeded.movements().to_vec();

        let mut tracker = Tracker::new(Config::default(), Arc::new(FailingStore));
        tracker.movements = movements.clone();
        assert!(tracker.reset().is_err());
        assert_eq!(tracker.movements(), movements.as_slice());
        assert!(tracker.delete_movement(movements[0].id).is_err());
        assert_eq!(tracker.movements().len(), 1);
    }

    #[test]
    fn test_out_of_range_amounts_rejected() {
        let mut tracker = tracker();
        let huge = "70000000000000000000000000000";

        let err = tracker.add_movement(expense("Enorme", huge, Some("bienestar"), 0)).unwrap_err();
        assert!(matches!(err, CoreError::ValidationError { .. }));
        assert!(tracker.add_movement(expense("Enorme", "1000000000001", None, 0)).is_err());
        tracker.add_movement(expense("Tope", "1000000000000", Some("bienestar"), 0)).unwrap();
        tracker.add_movement(expense("Tope", "1000000000000", Some("bienestar"), 0)).unwrap();
        assert!(tracker.set_initial_balance("bienestar", dec(huge)).is_err());
        assert!(tracker
            .add_account(AccountDraft {
                name: "Usura".to_string(),
                card_type: CardType::Credit,
                interest_rate: Some(dec("5000")),
                ..AccountDraft::default()
            })
            .is_err());

        let summary = tracker.summaries().into_iter().find(|s| s.account.id == "bienestar").unwrap();
        assert_eq!(summary.headline(), dec("-2000000000000"));
        assert_eq!(tracker.movements().len(), 2);
    }

    #[test]
    fn test_out_of_range_backup_and_stored_values() {
        let mut tracker = tracker();
        tracker.add_movement(expense("Viejo", "10", None, 0)).unwrap();
        let backup = Backup::from_json(
            r#"{"expenses":[{"id":5,"description":"Enorme","amount":5e20,"currency":"MXN","date":"2026-09-01"}],
                "initialBalances":{"bienestar":300}}"#,
        )
        .unwrap();
        assert!(tracker.restore(backup).is_err());
        assert_eq!(tracker.movements()[0].description, "Viejo");

        let snapshot = CloudSnapshot {
            expenses: None,
            balances: Some(BTreeMap::from([("bienestar".to_string(), dec("5000000000000"))])),
            cards: None,
            theme: Some(Theme::Dark),
            last_updated: None,
        };
        assert!(tracker.apply_snapshot(snapshot).is_err());
        assert_eq!(tracker.theme(), Theme::Light);

        let store = Arc::new(MemoryKeyValueStore::new());
        store
            .set(
                MOVEMENTS_KEY,
                r#"[{"id":1,"description":"Ok","amount":-20,"currency":"MXN","date":"2026-09-01"},
                    {"id":2,"description":"Enorme","amount":5e20,"currency":"MXN","date":"2026-09-01"}]"#,
            )
            .unwrap();
        store.set(BALANCES_KEY, r#"{"bienestar":5e20,"banamex_joy":100}"#).unwrap();
        let loaded = Tracker::open(Config::default(), store);
        assert_eq!(loaded.movements().len(), 1);
        assert_eq!(loaded.movements()[0].id, 1);
        assert_eq!(loaded.initial_balance("bienestar"), Decimal::ZERO);
        assert_eq!(loaded.initial_balance("banamex_joy"), dec("100"));
    }
}
