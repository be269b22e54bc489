//! Bound parameter values
//!
//! Literals and cast payloads are decoded into `SqlValue` and collected in
//! placeholder order next to the generated SQL text.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Native dynamic value bound to a positional placeholder
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Date(NaiveDate),
    Uuid(Uuid),
    Json(JsonValue),
    Array(Vec<SqlValue>),
}

impl SqlValue {
    /// Decode a scalar JSON literal (number, bool, null).
    ///
    /// Integers that fit `i64` stay integers; every other number is a float.
    /// Strings and containers are never literals in expression position and
    /// fall back to `Json`.
    pub fn from_json_literal(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(*b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            other => Self::Json(other.clone()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_literal_integers_stay_integers() {
        assert_eq!(SqlValue::from_json_literal(&json!(12345678)), SqlValue::Int(12345678));
        assert_eq!(SqlValue::from_json_literal(&json!(-3)), SqlValue::Int(-3));
    }

    #[test]
    fn test_literal_floats() {
        assert_eq!(SqlValue::from_json_literal(&json!(1.5)), SqlValue::Float(1.5));
        assert_eq!(
            SqlValue::from_json_literal(&json!(u64::MAX)),
            SqlValue::Float(u64::MAX as f64)
        );
    }

    #[test]
    fn test_literal_bool_and_null() {
        assert_eq!(SqlValue::from_json_literal(&json!(true)), SqlValue::Bool(true));
        assert!(SqlValue::from_json_literal(&json!(null)).is_null());
    }

    #[test]
    fn test_serialize_untagged() {
        let values = vec![
            SqlValue::Null,
            SqlValue::Bool(false),
            SqlValue::Int(7),
            SqlValue::Text("x".into()),
            SqlValue::Array(vec![SqlValue::Int(1), SqlValue::Int(2)]),
        ];
        let json = serde_json::to_value(&values).unwrap();
        assert_eq!(json, json!([null, false, 7, "x", [1, 2]]));
    }

    #[test]
    fn test_from_option() {
        assert_eq!(SqlValue::from(None::<i64>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some("a")), SqlValue::Text("a".into()));
    }
}
