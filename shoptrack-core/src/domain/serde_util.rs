//! Lenient serde helpers for backend payloads
//!
//! The backend is loose about number/string typing, so ids, prices and
//! timestamps accept more than one JSON shape.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value as JsonValue;

/// Parse a decimal from its JSON text, accepting exponent notation
fn parse_decimal(text: &str) -> Option<Decimal> {
    text.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(text).ok())
}

/// Deserialize a decimal that can be a number or a string
pub fn deserialize_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value: JsonValue = Deserialize::deserialize(deserializer)?;
    let text = match value {
        JsonValue::Number(n) => n.to_string(),
        JsonValue::String(s) => s.trim().to_string(),
        _ => return Err(D::Error::custom("expected number or string for decimal")),
    };
    parse_decimal(&text).ok_or_else(|| D::Error::custom(format!("invalid decimal: {}", text)))
}

/// Serialize a decimal as a JSON number.
///
/// Goes through `f64`, so digits past about 15 significant places are lost.
/// Cent-precision prices come out exact.
pub fn serialize_decimal<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    use serde::ser::Error;
    let number = value
        .to_f64()
        .ok_or_else(|| S::Error::custom(format!("decimal out of range: {}", value)))?;
    serializer.serialize_f64(number)
}

/// Deserialize an id that can be number or string
pub fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value: JsonValue = Deserialize::deserialize(deserializer)?;
    match value {
        JsonValue::Number(n) => Ok(n.to_string()),
        JsonValue::String(s) => Ok(s),
        _ => Err(D::Error::custom("expected number or string for id")),
    }
}

/// Deserialize a timestamp with or without a UTC offset.
///
/// Naive timestamps (`2025-01-05T14:30:00`) are taken as UTC.
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let text = String::deserialize(deserializer)?;
    parse_timestamp(&text).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {}", text)))
}

pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_timestamp_variants() {
        let with_offset = parse_timestamp("2025-01-05T14:30:00+02:00").unwrap();
        assert_eq!(with_offset.hour(), 12);

        let naive = parse_timestamp("2025-01-05T14:30:00.123456").unwrap();
        assert_eq!(naive.hour(), 14);
        assert_eq!(naive.day(), 5);

        let spaced = parse_timestamp("2025-01-05 09:00:00").unwrap();
        assert_eq!(spaced.hour(), 9);

        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_parse_decimal_exponent() {
        assert_eq!(parse_decimal("12.50"), Some(Decimal::new(1250, 2)));
        assert_eq!(parse_decimal("1e2"), Some(Decimal::new(100, 0)));
        assert!(parse_decimal("abc").is_none());
    }

    #[derive(serde::Serialize)]
    struct Priced {
        #[serde(serialize_with = "serialize_decimal")]
        price: Decimal,
    }

    #[test]
    fn test_serialize_cent_prices_exactly() {
        let body = serde_json::to_string(&Priced { price: Decimal::new(1999, 2) }).unwrap();
        assert_eq!(body, r#"{"price":19.99}"#);

        let body = serde_json::to_string(&Priced { price: Decimal::new(123456789, 2) }).unwrap();
        assert_eq!(body, r#"{"price":1234567.89}"#);
    }
}
