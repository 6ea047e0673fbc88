//! Utility functions and helpers

use chrono::{Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

const MONTHS_ES: [&str; 12] = [
    "enero", "febrero", "marzo", "abril", "mayo", "junio", "julio", "agosto", "septiembre", "octubre",
    "noviembre", "diciembre",
];

/// How money amounts are rendered
#[derive(Debug, Clone, PartialEq)]
pub struct MoneyFormat {
    pub symbol: String,
    pub symbol_after: bool,
    pub thousands_separator: String,
    pub decimal_separator: String,
    pub decimal_places: u32,
}

impl Default for MoneyFormat {
    fn default() -> Self {
        Self {
            symbol: "$".to_string(),
            symbol_after: false,
            thousands_separator: ",".to_string(),
            decimal_separator: ".".to_string(),
            decimal_places: 2,
        }
    }
}

/// Format a number with thousands separators
pub fn format_number<T: ToString>(n: T) -> String {
    group_thousands(&n.to_string(), ",")
}

fn group_thousands(digits: &str, separator: &str) -> String {
    let mut result = String::new();
    let mut count = 0;
    for c in digits.chars().rev() {
        if count == 3 {
            result.push_str(&separator.chars().rev().collect::<String>());
            count = 0;
        }
        result.push(c);
        count += 1;
    }
    result.chars().rev().collect()
}

/// Render an amount as money, e.g. `$1,234.50` or `$-80.00`
pub fn format_money(amount: Decimal, format: &MoneyFormat) -> String {
    let rounded = amount
        .round_dp_with_strategy(format.decimal_places, RoundingStrategy::MidpointAwayFromZero)
        .abs();
    let text = format!("{:.*}", format.decimal_places as usize, rounded);
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (text.clone(), None),
    };

    let mut number = group_thousands(&int_part, &format.thousands_separator);
    if let Some(frac) = frac_part {
        number.push_str(&format.decimal_separator);
        number.push_str(&frac);
    }
    let is_zero = rounded.is_zero();
    if amount.is_sign_negative() && !is_zero {
        number.insert(0, '-');
    }

    if format.symbol_after {
        format!("{} {}", number, format.symbol)
    } else {
        format!("{}{}", format.symbol, number)
    }
}

/// Current time in milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Generate a unique ID
pub fn generate_id() -> String {
    now_millis().to_string()
}

/// Lowercase a name and collapse whitespace runs into `_`
pub fn slugify(name: &str) -> String {
    WHITESPACE_RUN
        .replace_all(name.trim(), "_")
        .to_lowercase()
}

/// Escape text for inclusion in HTML
pub fn escape_html(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for c in content.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Spanish month label, e.g. `octubre 2026`
pub fn month_label_es(date: NaiveDate) -> String {
    format!("{} {}", MONTHS_ES[date.month0() as usize], date.year())
}

/// Spanish long date, e.g. `5 de noviembre de 2026`
pub fn long_date_es(date: NaiveDate) -> String {
    format!("{} de {} de {}", date.day(), MONTHS_ES[date.month0() as usize], date.year())
}

/// Spanish short date, e.g. `15 oct`
pub fn short_date_es(date: NaiveDate) -> String {
    let month: String = MONTHS_ES[date.month0() as usize].chars().take(3).collect();
    format!("{} {}", date.day(), month)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(12), "12");
    }

    #[test]
    fn test_format_money_default() {
        let fmt = MoneyFormat::default();
        assert_eq!(format_money("1234.5".parse().unwrap(), &fmt), "$1,234.50");
        assert_eq!(format_money("-80".parse().unwrap(), &fmt), "$-80.00");
        assert_eq!(format_money(Decimal::ZERO, &fmt), "$0.00");
        assert_eq!(format_money("999999.999".parse().unwrap(), &fmt), "$1,000,000.00");
    }

    #[test]
    fn test_format_money_custom() {
        let fmt = MoneyFormat {
            symbol: "€".to_string(),
            symbol_after: true,
            thousands_separator: ".".to_string(),
            decimal_separator: ",".to_string(),
            decimal_places: 2,
        };
        assert_eq!(format_money("1234.5".parse().unwrap(), &fmt), "1.234,50 €");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Banamex  Joy Oro"), "banamex_joy_oro");
        assert_eq!(slugify(" Nu "), "nu");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>\"A&B\"</b>"), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
    }

    #[test]
    fn test_spanish_dates() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        assert_eq!(month_label_es(date), "octubre 2026");
        assert_eq!(long_date_es(date), "15 de octubre de 2026");
        assert_eq!(short_date_es(date), "15 oct");
    }
}
