//! Serde helpers for fields the upstream delivers as either a string or a number.
//!
//! The same logical field (store id, item code, price) shows up as a JSON
//! string in one file type and as a JSON number in another, sometimes for the
//! same chain. These helpers canonicalize both into a trimmed `String` at the
//! deserialization boundary so nothing downstream sees the union.

use serde::de::{self, Deserialize, Deserializer};
use serde_json::Value;

/// Canonical string form of a string-or-number JSON value.
///
/// Returns `None` for null, booleans, arrays and objects.
pub fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Deserialize a required value that could be either a string or a number into a String.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_as_string(&value).ok_or_else(|| {
        de::Error::invalid_type(unexpected(&value), &"a string or a number")
    })
}

/// Deserialize an optional string or number. Missing and null both map to `None`.
///
/// Use together with `#[serde(default)]`.
pub fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => value_as_string(&v)
            .map(Some)
            .ok_or_else(|| de::Error::invalid_type(unexpected(&v), &"a string or a number")),
    }
}

fn unexpected(value: &Value) -> de::Unexpected<'_> {
    match value {
        Value::Null => de::Unexpected::Unit,
        Value::Bool(b) => de::Unexpected::Bool(*b),
        Value::Array(_) => de::Unexpected::Seq,
        Value::Object(_) => de::Unexpected::Map,
        Value::String(s) => de::Unexpected::Str(s),
        Value::Number(_) => de::Unexpected::Other("number"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "string_or_number")]
        code: String,
        #[serde(default, deserialize_with = "optional_string_or_number")]
        zip: Option<String>,
    }

    #[test]
    fn test_string_and_number_are_equivalent() {
        let a: Sample = serde_json::from_str(r#"{"code": "7290000000001"}"#).unwrap();
        let b: Sample = serde_json::from_str(r#"{"code": 7290000000001}"#).unwrap();
        assert_eq!(a.code, b.code);
    }

    #[test]
    fn test_strings_are_trimmed() {
        let p: Sample = serde_json::from_str(r#"{"code": "  001 "}"#).unwrap();
        assert_eq!(p.code, "001");
    }

    #[test]
    fn test_optional_missing_or_null() {
        let missing: Sample = serde_json::from_str(r#"{"code": "1"}"#).unwrap();
        let null: Sample = serde_json::from_str(r#"{"code": "1", "zip": null}"#).unwrap();
        assert!(missing.zip.is_none());
        assert!(null.zip.is_none());
    }

    #[test]
    fn test_rejects_non_scalar() {
        assert!(serde_json::from_str::<Sample>(r#"{"code": true}"#).is_err());
        assert!(serde_json::from_str::<Sample>(r#"{"code": null}"#).is_err());
        assert!(serde_json::from_str::<Sample>(r#"{"code": "1", "zip": [1]}"#).is_err());
    }
}
