//! JSON backup documents

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{CoreError, CoreResult};
use crate::models::{Card, Movement};

/// Full export of the tracker state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub expenses: Vec<Movement>,
    pub initial_balances: BTreeMap<String, Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cards: Option<BTreeMap<String, Card>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Backup {
    pub fn to_json(&self) -> CoreResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| CoreError::InternalError {
            message: format!("backup serialization: {}", e),
        })
    }

    /// Parse a backup; both `expenses` and `initialBalances` must be present
    pub fn from_json(content: &str) -> CoreResult<Self> {
        let value: serde_json::Value = serde_json::from_str(content).map_err(|e| CoreError::InvalidFormat {
            message: format!("backup is not valid JSON: {}", e),
        })?;

        let missing: Vec<&str> = ["expenses", "initialBalances"]
            .into_iter()
            .filter(|key| value.get(key).map_or(true, serde_json::Value::is_null))
            .collect();
        if !missing.is_empty() {
            return Err(CoreError::InvalidFormat {
                message: format!("backup is missing {}", missing.join(" and ")),
            });
        }

        serde_json::from_value(value).map_err(|e| CoreError::InvalidFormat {
            message: format!("backup has unexpected content: {}", e),
        })
    }
}

/// Download name for a backup taken on `date`
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("finanzas_backup_{}.json", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_original_export() {
        let content = r#"{
            "expenses": [
                {"id": 1, "description": "Súper", "amount": -250.5, "currency": "MXN",
                 "paymentMethod": "Tarjeta", "cardId": "banamex_joy", "installments": 0, "date": "2026-10-01"}
            ],
            "initialBalances": {"banamex_joy": 1200, "bienestar": 0},
            "cards": {"bienestar": {"id": "bienestar", "name": "Bienestar", "type": "debit", "color": "bg-green-700"}},
            "timestamp": "2026-10-15T18:30:00.000Z"
        }"#;
        let backup = Backup::from_json(content).unwrap();
        assert_eq!(backup.expenses.len(), 1);
        assert_eq!(backup.initial_balances["banamex_joy"], Decimal::from(1200));
        assert_eq!(backup.cards.as_ref().map(|c| c.len()), Some(1));
        assert!(backup.timestamp.is_some());
    }

    #[test]
    fn test_missing_sections_rejected() {
        let err = Backup::from_json(r#"{"expenses": []}"#).unwrap_err();
        assert!(matches!(err, CoreError::InvalidFormat { .. }));
        assert!(err.to_string().contains("initialBalances"));

        let err = Backup::from_json(r#"{"cards": {}}"#).unwrap_err();
        assert!(err.to_string().contains("expenses and initialBalances"));

        assert!(Backup::from_json("not json").is_err());
    }

    #[test]
    fn test_serialized_shape() {
        let backup = Backup {
            expenses: vec![],
            initial_balances: BTreeMap::new(),
            cards: Some(BTreeMap::new()),
            timestamp: None,
        };
        let value: serde_json::Value = serde_json::from_str(&backup.to_json().unwrap()).unwrap();
        assert!(value.get("expenses").is_some());
        assert!(value.get("initialBalances").is_some());
        assert!(value.get("cards").is_some());
        assert!(value.get("timestamp").is_none());
    }

    #[test]
    fn test_file_name() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        assert_eq!(backup_file_name(date), "finanzas_backup_2026-10-15.json");
    }
}
