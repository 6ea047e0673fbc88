//! Movement list filtering by month and account

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use finweb_utils::month_label_es;

use crate::alerts::calendar_date;
use crate::models::Movement;

/// Value meaning "no restriction" for either selector
pub const ALL: &str = "all";

/// Number of months offered in the month selector
pub const MONTH_OPTIONS: i32 = 12;

/// Month and account selection for the movement list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementFilter {
    /// `YYYY-MM` or `all`
    #[serde(default = "all")]
    pub month: String,
    /// Account id or `all`
    #[serde(default = "all")]
    pub card: String,
}

fn all() -> String {
    ALL.to_string()
}

impl Default for MovementFilter {
    fn default() -> Self {
        Self { month: all(), card: all() }
    }
}

impl MovementFilter {
    /// Filter for the month containing `today`, every account
    pub fn current_month(today: NaiveDate) -> Self {
        Self {
            month: today.format("%Y-%m").to_string(),
            card: all(),
        }
    }

    pub fn matches(&self, movement: &Movement) -> bool {
        let month_ok = self.month == ALL || movement.month_key() == self.month;
        let card_ok = self.card == ALL || movement.card_id.as_deref() == Some(self.card.as_str());
        month_ok && card_ok
    }

    /// Matching movements, newest first; equal dates keep stored order
    pub fn apply<'a>(&self, movements: &'a [Movement]) -> Vec<&'a Movement> {
        let mut selected: Vec<&Movement> = movements.iter().filter(|m| self.matches(m)).collect();
        selected.sort_by(|a, b| b.date.cmp(&a.date));
        selected
    }

    pub fn description(&self) -> String {
        if self.month == ALL {
            return "Todos los meses".to_string();
        }
        NaiveDate::parse_from_str(&format!("{}-01", self.month), "%Y-%m-%d")
            .map(month_label_es)
            .unwrap_or_else(|_| self.month.clone())
    }
}

/// Entry of the month selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthOption {
    pub value: String,
    pub label: String,
}

/// The last twelve months, current month first
pub fn month_options(today: NaiveDate) -> Vec<MonthOption> {
    (0..MONTH_OPTIONS)
        .filter_map(|back| calendar_date(today.year(), today.month0() as i32 - back, 1))
        .map(|first| MonthOption {
            value: first.format("%Y-%m").to_string(),
            label: month_label_es(first),
        })
        .collect()
}
