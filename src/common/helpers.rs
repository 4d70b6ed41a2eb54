// Helper functions for safe logging and array-column serialization

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::warn;

static LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(-?\d+(?:\.\d+)?)").unwrap());

/// Masks email addresses for safe logging
///
/// # Example
/// ```
/// let masked = safe_email_log("user@example.com");
/// // Returns: "u***@example.com"
/// ```
pub fn safe_email_log(email: &str) -> String {
    if email.len() > 3 {
        let parts: Vec<&str> = email.split('@').collect();
        if parts.len() == 2 && !parts[0].is_empty() {
            let first = parts[0].chars().next().unwrap_or('*');
            format!("{}***@{}", first, parts[1])
        } else {
            "***@***.***".to_string()
        }
    } else {
        "***@***.***".to_string()
    }
}

/// Text arrays live in SQLite as JSON text; NULL and garbage read as empty
pub fn parse_json_array(raw: Option<&str>) -> Vec<String> {
    raw.and_then(|r| serde_json::from_str::<Vec<String>>(r).ok())
        .unwrap_or_default()
}

/// Encodes a text array for storage; `None` stays NULL
pub fn to_json_array(values: Option<&[String]>) -> Option<String> {
    values.map(|v| serde_json::to_string(v).unwrap_or_else(|_| "[]".to_string()))
}

/// Serializes a JSON-text array column as a real array in API responses
pub fn serialize_json_array<S>(raw: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    parse_json_array(raw.as_deref()).serialize(serializer)
}

/// Serializes a JSON-text object column as a JSON value (or null)
pub fn serialize_json_value<S>(raw: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    raw.as_deref()
        .and_then(|r| serde_json::from_str::<serde_json::Value>(r).ok())
        .serialize(serializer)
}

/// SQLite stores booleans as 0/1 integers
pub fn serialize_int_bool<S>(value: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_bool(value.unwrap_or(0) != 0)
}

/// Accepts `["a", "b"]`, a single string, or null for a text-array field
pub fn deserialize_string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => None,
        Some(OneOrMany::One(s)) => Some(vec![s]),
        Some(OneOrMany::Many(v)) => Some(v),
    })
}

/// A JSON number, or the leading number of a string such as `"10+"`
pub fn number_from_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => LEADING_NUMBER
            .captures(s)
            .and_then(|c| c[1].parse::<f64>().ok()),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

/// Model-supplied decimal; unreadable values become `None`
pub fn deserialize_lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

/// Model-supplied whole number; fractions are truncated, unreadable values become `None`
pub fn deserialize_lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(number_from_value)
        .map(|n| n.trunc() as i64))
}

/// Confidence score; null or unreadable reads as 0 so a default applies later
pub fn deserialize_confidence<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_lenient_f64(deserializer)?.unwrap_or(0.0))
}

/// Required text that the model may send as a number or boolean
pub fn deserialize_scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(D::Error::custom(format!("expected text, found {}", other))),
    }
}

/// Decodes a list item by item, dropping (and logging) the items that do not fit `T`
pub fn deserialize_lenient_items<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items,
        Some(other) => {
            warn!(found = %other, "Expected a list of extracted items");
            Vec::new()
        }
        None => Vec::new(),
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<T>(item) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!(error = %e, "Skipping unreadable extracted item");
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        #[serde(serialize_with = "serialize_json_array")]
        skills: Option<String>,
        #[serde(serialize_with = "serialize_int_bool")]
        is_remote: Option<i64>,
    }

    #[derive(Deserialize)]
    struct Body {
        #[serde(default, deserialize_with = "deserialize_string_list")]
        achievements: Option<Vec<String>>,
    }

    #[test]
    fn test_safe_email_log() {
        assert_eq!(safe_email_log("user@example.com"), "u***@example.com");
        assert_eq!(safe_email_log("bad"), "***@***.***");
        assert_eq!(safe_email_log("no-at-sign"), "***@***.***");
    }

    #[test]
    fn test_array_column_round_trip() {
        let stored = to_json_array(Some(&["Finance".to_string(), "M&A".to_string()]));
        assert_eq!(
            parse_json_array(stored.as_deref()),
            vec!["Finance".to_string(), "M&A".to_string()]
        );
        assert!(parse_json_array(Some("not json")).is_empty());
        assert_eq!(to_json_array(None), None);
    }

    #[test]
    fn test_row_serialization() {
        let row = Row {
            skills: Some(r#"["IFRS"]"#.to_string()),
            is_remote: Some(1),
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["skills"][0], "IFRS");
        assert_eq!(json["is_remote"], true);
    }

    #[test]
    fn test_string_list_accepts_single_value() {
        let body: Body = serde_json::from_str(r#"{"achievements": "Cut costs 20%"}"#).unwrap();
        assert_eq!(body.achievements, Some(vec!["Cut costs 20%".to_string()]));

        let body: Body = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(body.achievements, None);
    }

    #[derive(Deserialize, Debug)]
    struct Scores {
        #[serde(default, deserialize_with = "deserialize_confidence")]
        confidence: f64,
        #[serde(default, deserialize_with = "deserialize_lenient_f64")]
        years: Option<f64>,
        #[serde(default, deserialize_with = "deserialize_lenient_i64")]
        team_size: Option<i64>,
    }

    #[test]
    fn test_lenient_numbers() {
        let scores: Scores =
            serde_json::from_str(r#"{"confidence": null, "years": "10+", "team_size": 12.5}"#)
                .unwrap();
        assert_eq!(scores.confidence, 0.0);
        assert_eq!(scores.years, Some(10.0));
        assert_eq!(scores.team_size, Some(12));

        let scores: Scores =
            serde_json::from_str(r#"{"confidence": "0.8", "years": "many", "team_size": [3]}"#)
                .unwrap();
        assert_eq!(scores.confidence, 0.8);
        assert_eq!(scores.years, None);
        assert_eq!(scores.team_size, None);

        let scores: Scores = serde_json::from_str("{}").unwrap();
        assert_eq!(scores.confidence, 0.0);
        assert_eq!(scores.years, None);
    }
}
