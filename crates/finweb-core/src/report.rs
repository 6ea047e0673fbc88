//! CSV report and report structures for API responses

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::balances::{AccountSummary, Totals};
use crate::error::CoreResult;
use crate::filter::MovementFilter;
use crate::models::{Card, Movement, Theme};

/// Header row of the CSV report
pub const REPORT_HEADERS: [&str; 6] = ["Fecha", "Descripción", "Monto", "Método", "Tarjeta", "MSI"];

/// Render every movement, in stored order, as a fully quoted CSV document
pub fn movements_csv(movements: &[Movement], accounts: &BTreeMap<String, Card>) -> CoreResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());

    writer.write_record(REPORT_HEADERS)?;
    for movement in movements {
        let card_name = movement
            .card_id
            .as_ref()
            .and_then(|id| accounts.get(id))
            .map(|card| card.name.as_str())
            .unwrap_or("");
        writer.write_record([
            movement.date.format("%Y-%m-%d").to_string(),
            movement.description.clone(),
            movement.amount.normalize().to_string(),
            movement.payment_method.to_string(),
            card_name.to_string(),
            movement.installments().to_string(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Download name for a report generated on `date`
pub fn report_file_name(date: NaiveDate) -> String {
    format!("reporte_finanzas_{}.csv", date.format("%Y-%m-%d"))
}

/// Movement list response for API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementsResponse {
    pub filter: MovementFilter,
    pub movements: Vec<Movement>,
    pub total_count: usize,
}

/// Account balances response for API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalancesResponse {
    pub accounts: Vec<AccountSummary>,
    pub totals: Totals,
}

/// Whole state response for API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateResponse {
    pub expenses: Vec<Movement>,
    pub initial_balances: BTreeMap<String, rust_decimal::Decimal>,
    pub cards: BTreeMap<String, Card>,
    pub theme: Theme,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CardType, PaymentMethod};
    use rust_decimal::Decimal;

    #[test]
    fn test_movements_csv() {
        let mut accounts = BTreeMap::new();
        accounts.insert(
            "banamex_joy".to_string(),
            Card {
                id: "banamex_joy".to_string(),
                name: "Banamex Joy".to_string(),
                card_type: CardType::Credit,
                color: "bg-pink-500".to_string(),
                cutoff_day: Some(15),
                grace_period: None,
                interest_rate: None,
            },
        );
        let movements = vec![
            Movement {
                id: 1,
                description: "Súper \"grande\"".to_string(),
                amount: "-250.50".parse().unwrap(),
                currency: "MXN".to_string(),
                payment_method: PaymentMethod::Card,
                card_id: Some("banamex_joy".to_string()),
                installments: Some(3),
                date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            },
            Movement {
                id: 2,
                description: "Nómina".to_string(),
                amount: Decimal::from(15000),
                currency: "MXN".to_string(),
                payment_method: PaymentMethod::Cash,
                card_id: Some("borrada".to_string()),
                installments: None,
                date: NaiveDate::from_ymd_opt(2026, 10, 2).unwrap(),
            },
        ];

        let csv = movements_csv(&movements, &accounts).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "\"Fecha\",\"Descripción\",\"Monto\",\"Método\",\"Tarjeta\",\"MSI\"");
        assert_eq!(
            lines[1],
            "\"2026-10-01\",\"Súper \"\"grande\"\"\",\"-250.5\",\"Tarjeta\",\"Banamex Joy\",\"3\""
        );
        assert_eq!(lines[2], "\"2026-10-02\",\"Nómina\",\"15000\",\"Efectivo\",\"\",\"0\"");
    }

    #[test]
    fn test_empty_report_has_header() {
        let csv = movements_csv(&[], &BTreeMap::new()).unwrap();
        assert_eq!(csv.lines().count(), 1);
        assert_eq!(
            report_file_name(NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()),
            "reporte_finanzas_2026-10-15.csv"
        );
    }
}
