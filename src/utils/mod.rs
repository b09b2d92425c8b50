use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%d.%m.%Y", "%d/%m/%Y", "%Y/%m/%d", "%Y.%m.%d"];

pub fn format_decimal(value: Decimal) -> String {
    format!("{:.2}", round_money(value))
}

pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Accepts both `12.5` and `12,5`.
pub fn parse_decimal(value: &str) -> Result<Decimal> {
    let raw = value.trim().replace(',', ".");
    if raw.is_empty() {
        return Err(anyhow!("Parse decimal: empty input"));
    }
    Decimal::from_str(&raw).map_err(|e| anyhow!("Parse decimal: {}", e))
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let raw = value.trim();
    if raw.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Rewrites any accepted date spelling as `YYYY-MM-DD`; unknown spellings pass through.
pub fn normalize_date(value: Option<String>) -> Option<String> {
    let raw = value?.trim().to_string();
    if raw.is_empty() {
        return None;
    }
    match parse_date(&raw) {
        Some(date) => Some(date.format("%Y-%m-%d").to_string()),
        None => Some(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimals_parse_with_comma_and_format_with_two_places() {
        assert_eq!(parse_decimal("12,5").unwrap(), Decimal::new(125, 1));
        assert!(parse_decimal("abc").is_err());
        assert!(parse_decimal("  ").is_err());
        assert_eq!(format_decimal(Decimal::new(21, 0)), "21.00");
        assert_eq!(format_decimal(Decimal::new(10005, 3)), "10.01");
    }

    #[test]
    fn dates_are_normalized() {
        assert_eq!(normalize_date(Some("01.02.2024".to_string())), Some("2024-02-01".to_string()));
        assert_eq!(normalize_date(Some("   ".to_string())), None);
        assert_eq!(normalize_date(Some("next week".to_string())), Some("next week".to_string()));
        assert_eq!(parse_date("2024-13-01"), None);
    }
}
