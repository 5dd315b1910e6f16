//! Small serde adapters for loosely typed server payloads

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize a JSON string or number into a `String`
///
/// Identifiers such as account indexes and product family codes come back as
/// numbers from some endpoints and as strings from others.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or a number, got {}",
            other
        ))),
    }
}

/// Deserialize a sequence of digits given as numbers or numeric strings
pub fn digits<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<Value>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|value| {
            let digit = match &value {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => s.trim().parse::<u64>().ok(),
                _ => None,
            };
            digit
                .and_then(|d| u8::try_from(d).ok())
                .ok_or_else(|| serde::de::Error::custom(format!("invalid digit {}", value)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Holder {
        #[serde(deserialize_with = "string_or_number")]
        id: String,
    }

    #[rstest]
    #[case::string(json!({"id": "07"}), "07")]
    #[case::integer(json!({"id": 7}), "7")]
    #[case::large(json!({"id": 1683669600000u64}), "1683669600000")]
    fn test_string_or_number(#[case] value: Value, #[case] expected: &str) {
        let holder: Holder = serde_json::from_value(value).unwrap();
        assert_eq!(holder.id, expected);
    }

    #[derive(Debug, Deserialize)]
    struct Digits {
        #[serde(deserialize_with = "digits")]
        values: Vec<u8>,
    }

    #[rstest]
    #[case::numbers(json!({"values": [3, 1, 4]}), vec![3, 1, 4])]
    #[case::strings(json!({"values": ["3", " 1", "4"]}), vec![3, 1, 4])]
    #[case::empty(json!({"values": []}), vec![])]
    fn test_digits(#[case] value: Value, #[case] expected: Vec<u8>) {
        let parsed: Digits = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.values, expected);
    }

    #[rstest]
    #[case::negative(json!({"values": [-1]}))]
    #[case::too_large(json!({"values": [300]}))]
    #[case::word(json!({"values": ["one"]}))]
    fn test_digits_rejects_invalid(#[case] value: Value) {
        assert!(serde_json::from_value::<Digits>(value).is_err());
    }

    #[test]
    fn test_string_or_number_rejects_objects() {
        let result = serde_json::from_value::<Holder>(json!({"id": {"nested": 1}}));
        assert!(result.is_err());
    }
}
