//! Numeric and identifier coercion applied while validating chain rows.

use common::coerce::value_as_string;
use rust_decimal::Decimal;
use serde::de::{self, Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

/// Parse a price/quantity as published by the chains.
///
/// Accepts plain decimals, surrounding whitespace, currency symbols
/// (`₪`, `$`), thousands separators (`1,234.50`) and a comma decimal
/// separator when no dot is present (`5,90`).
pub fn parse_decimal(raw: &str) -> Result<Decimal, String> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '₪' | '$' | ' ' | '\u{a0}'))
        .collect();

    if cleaned.is_empty() {
        return Err(format!("empty numeric value {:?}", raw));
    }

    let normalized = if cleaned.contains('.') {
        cleaned.replace(',', "")
    } else if cleaned.matches(',').count() == 1 && !is_thousands_grouping(&cleaned) {
        cleaned.replace(',', ".")
    } else {
        cleaned.replace(',', "")
    };

    Decimal::from_str(&normalized)
        .or_else(|_| Decimal::from_scientific(&normalized))
        .map_err(|_| format!("invalid numeric value {:?}", raw))
}

/// `1,234` style: a single comma followed by exactly three digits.
///
/// Prices in the feeds carry two decimals, so `5,90` is a decimal comma while
/// `1,234` is a grouped integer.
fn is_thousands_grouping(s: &str) -> bool {
    match s.split_once(',') {
        Some((head, tail)) => {
            !head.is_empty()
                && head.trim_start_matches('-').chars().all(|c| c.is_ascii_digit())
                && tail.len() == 3
                && tail.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

/// Deserialize a string-or-number into a [`Decimal`] via [`parse_decimal`].
pub fn decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let raw = value_as_string(&value)
        .ok_or_else(|| de::Error::custom(format!("expected a number, found {}", value)))?;
    parse_decimal(&raw).map_err(de::Error::custom)
}

/// Deserialize a mandatory identity field (item code, store id, chain id).
///
/// Same coercion as `string_or_number`, but an empty value is rejected.
pub fn identifier<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = common::coerce::string_or_number(deserializer)?;
    if value.is_empty() {
        return Err(de::Error::custom("identifier must not be empty"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde::Deserialize;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_plain_values() {
        assert_eq!(parse_decimal("5.90").unwrap(), dec("5.90"));
        assert_eq!(parse_decimal(" 12 ").unwrap(), dec("12"));
        assert_eq!(parse_decimal("0").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_currency_and_separators() {
        assert_eq!(parse_decimal("₪5.90").unwrap(), dec("5.90"));
        assert_eq!(parse_decimal("$ 3.5").unwrap(), dec("3.5"));
        assert_eq!(parse_decimal("1,234.50").unwrap(), dec("1234.50"));
        assert_eq!(parse_decimal("1,234").unwrap(), dec("1234"));
        assert_eq!(parse_decimal("5,90").unwrap(), dec("5.90"));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_decimal("").is_err());
        assert!(parse_decimal("  ").is_err());
        assert!(parse_decimal("abc").is_err());
        assert!(parse_decimal("5.90.1").is_err());
    }

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "identifier")]
        code: String,
        #[serde(deserialize_with = "decimal")]
        price: Decimal,
    }

    #[test]
    fn test_decimal_from_number_and_string() {
        let a: Sample = serde_json::from_str(r#"{"code": 1, "price": 5.9}"#).unwrap();
        let b: Sample = serde_json::from_str(r#"{"code": "1", "price": "5.9"}"#).unwrap();
        assert_eq!(a.price, b.price);
    }

    #[test]
    fn test_empty_identifier_rejected() {
        let err = serde_json::from_str::<Sample>(r#"{"code": "  ", "price": "1"}"#).unwrap_err();
        assert!(err.to_string().contains("identifier must not be empty"));
    }

    #[test]
    fn test_unparseable_price_rejected() {
        assert!(serde_json::from_str::<Sample>(r#"{"code": "1", "price": "N/A"}"#).is_err());
        assert!(serde_json::from_str::<Sample>(r#"{"code": "1", "price": null}"#).is_err());
    }
}
