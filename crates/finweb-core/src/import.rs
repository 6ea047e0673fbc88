//! Spreadsheet row normalization and the import preview
//!
//! Expected columns, after a header row:
//! `Fecha | Descripción | Monto | Tipo | Tarjeta | MSI`.

use chrono::{Duration, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use finweb_import::{Cell, Sheet};

use crate::error::{CoreError, CoreResult};
use crate::models::{Card, MovementDraft, MovementKind, PaymentMethod};

const COL_DATE: usize = 0;
const COL_DESCRIPTION: usize = 1;
const COL_AMOUNT: usize = 2;
const COL_TYPE: usize = 3;
const COL_CARD: usize = 4;
const COL_INSTALLMENTS: usize = 5;

/// A sheet row after normalization, before the user reviews it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMovementRow {
    pub date: NaiveDate,
    pub description: String,
    /// Signed as written in the sheet; `None` when not numeric
    pub amount: Option<Decimal>,
    /// Kind given by the type column, if recognised
    pub kind: Option<MovementKind>,
    pub payment_method: PaymentMethod,
    pub card_id: Option<String>,
    pub installments: u32,
}

/// Spreadsheet serial day 0
fn sheet_epoch() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1899, 12, 30)
}

/// Date for a spreadsheet serial; `None` when it falls outside the calendar
fn serial_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let days = Duration::try_days(serial.floor() as i64)?;
    sheet_epoch()?.checked_add_signed(days)
}

fn cell(row: &[Cell], index: usize) -> &Cell {
    row.get(index).unwrap_or(&Cell::Empty)
}

/// Resolve a date cell: spreadsheet serial, `d/m/y` text or ISO text
pub fn parse_date_cell(value: &Cell, today: NaiveDate) -> NaiveDate {
    match value {
        Cell::Number(serial) => serial_date(*serial).unwrap_or_else(|| {
            log::warn!("Unreadable import date serial {}, using {}", serial, today);
            today
        }),
        Cell::Text(text) if text.contains('/') => {
            let parts: Vec<&str> = text.split('/').map(str::trim).collect();
            let parsed = match parts.as_slice() {
                [day, month, year] => {
                    format!("{}-{:0>2}-{:0>2}", year, month, day).parse::<NaiveDate>().ok()
                }
                _ => None,
            };
            parsed.unwrap_or_else(|| {
                log::warn!("Unreadable import date '{}', using {}", text, today);
                today
            })
        }
        Cell::Text(text) => text
            .get(..10)
            .unwrap_or(text)
            .parse::<NaiveDate>()
            .unwrap_or_else(|_| {
                log::warn!("Unreadable import date '{}', using {}", text, today);
                today
            }),
        Cell::Empty => today,
    }
}

/// Leading decimal number of a text, the way a lenient float parse reads it
fn leading_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (i, c) in text.char_indices() {
        match c {
            '+' | '-' if i == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }
    if !seen_digit {
        return None;
    }
    text[..end].trim_end_matches('.').parse().ok()
}

/// Resolve an amount cell
pub fn parse_amount_cell(value: &Cell) -> Option<Decimal> {
    match value {
        Cell::Number(n) => Decimal::try_from(*n).ok(),
        Cell::Text(text) => leading_decimal(text),
        Cell::Empty => None,
    }
}

/// Resolve the type column: `abono`/`ingreso` or `cargo`/`gasto`
pub fn parse_kind_cell(value: &Cell) -> Option<MovementKind> {
    let text = value.as_text()?.to_lowercase();
    if text.contains("abono") || text.contains("ingreso") {
        Some(MovementKind::Income)
    } else if text.contains("cargo") || text.contains("gasto") {
        Some(MovementKind::Expense)
    } else {
        None
    }
}

fn parse_installments_cell(value: &Cell) -> u32 {
    match value {
        Cell::Number(n) if *n > 0.0 => n.trunc() as u32,
        Cell::Text(text) => leading_decimal(text)
            .and_then(|d| d.trunc().to_u32())
            .unwrap_or(0),
        _ => 0,
    }
}

/// Turn the data rows of a sheet into movement rows
pub fn normalize_rows(sheet: &Sheet, accounts: &BTreeMap<String, Card>, today: NaiveDate) -> Vec<RawMovementRow> {
    let mut rows = Vec::new();

    for (index, row) in sheet.data_rows().enumerate() {
        if row.iter().all(Cell::is_empty) {
            continue;
        }

        let description = cell(row, COL_DESCRIPTION).to_string();
        let amount = parse_amount_cell(cell(row, COL_AMOUNT));
        if description.is_empty() && amount.is_none() {
            log::debug!("Skipping import row {}: no description or amount", index + 2);
            continue;
        }

        let card_id = cell(row, COL_CARD).as_text().and_then(|name| {
            let name = name.trim().to_lowercase();
            accounts
                .values()
                .find(|account| account.name.to_lowercase() == name)
                .map(|account| account.id.clone())
        });

        rows.push(RawMovementRow {
            date: parse_date_cell(cell(row, COL_DATE), today),
            description,
            amount,
            kind: parse_kind_cell(cell(row, COL_TYPE)),
            payment_method: if card_id.is_some() { PaymentMethod::Card } else { PaymentMethod::Cash },
            card_id,
            installments: parse_installments_cell(cell(row, COL_INSTALLMENTS)),
        });
    }

    rows
}

/// A row as shown for review: amount without sign, kind resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRow {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub kind: MovementKind,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub card_id: Option<String>,
    #[serde(default)]
    pub installments: u32,
}

impl From<RawMovementRow> for PreviewRow {
    fn from(raw: RawMovementRow) -> Self {
        let amount = raw.amount.unwrap_or_default();
        Self {
            date: raw.date,
            description: raw.description,
            amount: amount.abs(),
            kind: raw.kind.unwrap_or_else(|| MovementKind::of(amount)),
            payment_method: raw.payment_method,
            card_id: raw.card_id,
            installments: raw.installments,
        }
    }
}

impl PreviewRow {
    /// Draft with the amount signed by kind; card id kept for card rows only
    pub fn to_draft(&self) -> MovementDraft {
        let card_id = match self.payment_method {
            PaymentMethod::Card => self.card_id.clone().filter(|id| !id.is_empty()),
            PaymentMethod::Cash => None,
        };
        MovementDraft {
            description: self.description.clone(),
            amount: self.kind.signed(self.amount),
            kind: self.kind,
            payment_method: self.payment_method,
            card_id,
            installments: self.installments,
            date: self.date,
        }
    }
}

/// Rows waiting for the user to confirm an import
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportPreview {
    pub rows: Vec<PreviewRow>,
}

impl ImportPreview {
    /// Build a preview; fails when no row survived normalization
    pub fn from_rows(rows: Vec<RawMovementRow>) -> CoreResult<Self> {
        if rows.is_empty() {
            return Err(CoreError::ImportError {
                message: "no valid movements found".to_string(),
            });
        }
        Ok(Self {
            rows: rows.into_iter().map(PreviewRow::from).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Charge every row to one account, or back to cash with `None`
    pub fn apply_account(&mut self, card_id: Option<&str>) {
        for row in &mut self.rows {
            match card_id {
                Some(id) => {
                    row.payment_method = PaymentMethod::Card;
                    row.card_id = Some(id.to_string());
                }
                None => {
                    row.payment_method = PaymentMethod::Cash;
                    row.card_id = None;
                }
            }
        }
    }

    pub fn update_row(&mut self, index: usize, row: PreviewRow) -> CoreResult<()> {
        let slot = self.rows.get_mut(index).ok_or_else(|| row_out_of_range(index))?;
        *slot = PreviewRow {
            amount: row.amount.abs(),
            ..row
        };
        Ok(())
    }

    pub fn remove_row(&mut self, index: usize) -> CoreResult<PreviewRow> {
        if index >= self.rows.len() {
            return Err(row_out_of_range(index));
        }
        Ok(self.rows.remove(index))
    }

    pub fn drafts(&self) -> Vec<MovementDraft> {
        self.rows.iter().map(PreviewRow::to_draft).collect()
    }
}

fn row_out_of_range(index: usize) -> CoreError {
    CoreError::validation(format!("import row {} does not exist", index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CardType;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn accounts() -> BTreeMap<String, Card> {
        let mut map = BTreeMap::new();
        map.insert(
            "banamex_joy".to_string(),
            Card {
                id: "banamex_joy".to_string(),
                name: "Banamex Joy".to_string(),
                card_type: CardType::Credit,
                color: "bg-pink-500".to_string(),
                cutoff_day: Some(15),
                grace_period: Some(20),
                interest_rate: None,
            },
        );
        map
    }

    #[test]
    fn test_parse_date_cell() {
        let today = date(2026, 10, 15);
        assert_eq!(parse_date_cell(&Cell::Number(46309.0), today), date(2026, 10, 14));
        assert_eq!(parse_date_cell(&Cell::Number(46309.75), today), date(2026, 10, 14));
        assert_eq!(parse_date_cell(&Cell::Number(25569.0), today), date(1970, 1, 1));
        assert_eq!(parse_date_cell(&text("5/3/2026"), today), date(2026, 3, 5));
        assert_eq!(parse_date_cell(&text("2026-09-01"), today), date(2026, 9, 1));
        assert_eq!(parse_date_cell(&text("2026-09-01T12:00:00"), today), date(2026, 9, 1));
        assert_eq!(parse_date_cell(&text("ayer"), today), today);
        assert_eq!(parse_date_cell(&Cell::Empty, today), today);
    }

    #[test]
    fn test_out_of_range_serial_falls_back_to_today() {
        let today = date(2026, 10, 15);
        for serial in [1e300, -1e300, 1e15, f64::INFINITY, f64::NAN] {
            assert_eq!(parse_date_cell(&Cell::Number(serial), today), today, "serial {}", serial);
        }

        let sheet = finweb_import::csv_sheet::read_csv(b"Fecha,Desc,Monto\n1e300,Cafe,-45\n").unwrap();
        let rows = normalize_rows(&sheet, &accounts(), today);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, today);
        assert_eq!(rows[0].amount, Some(dec("-45")));
    }

    #[test]
    fn test_parse_amount_cell() {
        assert_eq!(parse_amount_cell(&Cell::Number(-250.5)), Some(dec("-250.5")));
        assert_eq!(parse_amount_cell(&text("120.75 MXN")), Some(dec("120.75")));
        assert_eq!(parse_amount_cell(&text("1,234")), Some(dec("1")));
        assert_eq!(parse_amount_cell(&text("$100")), None);
        assert_eq!(parse_amount_cell(&Cell::Empty), None);
    }

    #[test]
    fn test_parse_kind_cell() {
        assert_eq!(parse_kind_cell(&text("ABONO")), Some(MovementKind::Income));
        assert_eq!(parse_kind_cell(&text("Ingreso extra")), Some(MovementKind::Income));
        assert_eq!(parse_kind_cell(&text("Cargo")), Some(MovementKind::Expense));
        assert_eq!(parse_kind_cell(&text("otro")), None);
        assert_eq!(parse_kind_cell(&Cell::Number(1.0)), None);
    }

    #[test]
    fn test_normalize_rows() {
        let sheet = Sheet {
            name: "Hoja1".to_string(),
            rows: vec![
                vec![text("Fecha"), text("Descripción"), text("Monto"), text("Tipo"), text("Tarjeta"), text("MSI")],
                vec![text("01/10/2026"), text("Súper"), Cell::Number(-250.5), text("Cargo"), text("banamex joy"), Cell::Number(3.0)],
                vec![Cell::Empty, Cell::Empty, Cell::Empty],
                vec![text("2026-10-02"), Cell::Empty, text("n/a")],
                vec![text("2026-10-03"), text("Nómina"), Cell::Number(15000.0)],
                vec![text("2026-10-04"), text("Otra tarjeta"), Cell::Number(-10.0), Cell::Empty, text("Amex")],
            ],
        };

        let rows = normalize_rows(&sheet, &accounts(), date(2026, 10, 15));
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].date, date(2026, 10, 1));
        assert_eq!(rows[0].amount, Some(dec("-250.5")));
        assert_eq!(rows[0].kind, Some(MovementKind::Expense));
        assert_eq!(rows[0].payment_method, PaymentMethod::Card);
        assert_eq!(rows[0].card_id.as_deref(), Some("banamex_joy"));
        assert_eq!(rows[0].installments, 3);

        assert_eq!(rows[1].description, "Nómina");
        assert_eq!(rows[1].kind, None);
        assert_eq!(rows[1].payment_method, PaymentMethod::Cash);
        assert_eq!(rows[1].installments, 0);

        assert_eq!(rows[2].payment_method, PaymentMethod::Cash);
        assert_eq!(rows[2].card_id, None);
    }

    #[test]
    fn test_preview_resolves_kind_and_signs_drafts() {
        let rows = vec![
            RawMovementRow {
                date: date(2026, 10, 1),
                description: "Reembolso".to_string(),
                amount: Some(dec("-80")),
                kind: Some(MovementKind::Income),
                payment_method: PaymentMethod::Cash,
                card_id: None,
                installments: 0,
            },
            RawMovementRow {
                date: date(2026, 10, 2),
                description: "Café".to_string(),
                amount: Some(dec("-45")),
                kind: None,
                payment_method: PaymentMethod::Cash,
                card_id: None,
                installments: 0,
            },
            RawMovementRow {
                date: date(2026, 10, 3),
                description: "Sin monto".to_string(),
                amount: None,
                kind: None,
                payment_method: PaymentMethod::Cash,
                card_id: None,
                installments: 0,
            },
        ];
        let mut preview = ImportPreview::from_rows(rows).unwrap();
        assert_eq!(preview.rows[0].amount, dec("80"));
        assert_eq!(preview.rows[0].kind, MovementKind::Income);
        assert_eq!(preview.rows[1].kind, MovementKind::Expense);
        assert_eq!(preview.rows[2].amount, Decimal::ZERO);
        assert_eq!(preview.rows[2].kind, MovementKind::Income);

        preview.apply_account(Some("banamex_joy"));
        let drafts = preview.drafts();
        assert_eq!(drafts[0].amount, dec("80"));
        assert_eq!(drafts[1].amount, dec("-45"));
        assert_eq!(drafts[1].card_id.as_deref(), Some("banamex_joy"));

        preview.apply_account(None);
        assert!(preview.drafts().iter().all(|d| d.card_id.is_none()));
    }

    #[test]
    fn test_preview_edit_and_remove() {
        let raw = RawMovementRow {
            date: date(2026, 10, 1),
            description: "Luz".to_string(),
            amount: Some(dec("-300")),
            kind: None,
            payment_method: PaymentMethod::Cash,
            card_id: None,
            installments: 0,
        };
        let mut preview = ImportPreview::from_rows(vec![raw.clone(), raw]).unwrap();

        let mut edited = preview.rows[0].clone();
        edited.amount = dec("-320");
        edited.description = "Luz CFE".to_string();
        preview.update_row(0, edited).unwrap();
        assert_eq!(preview.rows[0].amount, dec("320"));

        let copy = preview.rows[0].clone();
        assert!(preview.update_row(5, copy).is_err());
        preview.remove_row(1).unwrap();
        assert_eq!(preview.len(), 1);
        assert!(preview.remove_row(1).is_err());
    }

    #[test]
    fn test_empty_preview_rejected() {
        let err = ImportPreview::from_rows(vec![]).unwrap_err();
        assert!(err.to_string().contains("no valid movements found"));
    }
}
