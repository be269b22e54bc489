//! Typed decoding of cast literals
//!
//! A cast such as `["createdAt", "2024-01-01T00:00:00Z"]` decodes its
//! literal with the `FieldValue` impl of the target field's Rust type, so
//! the bound parameter is a timestamp rather than a string.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde::de::Error as _;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::sql::SqlValue;

/// Field types that accept cast literals
pub trait FieldValue {
    fn decode_json(value: &JsonValue) -> Result<SqlValue, serde_json::Error>;
}

impl FieldValue for String {
    fn decode_json(value: &JsonValue) -> Result<SqlValue, serde_json::Error> {
        String::deserialize(value).map(SqlValue::Text)
    }
}

impl FieldValue for bool {
    fn decode_json(value: &JsonValue) -> Result<SqlValue, serde_json::Error> {
        bool::deserialize(value).map(SqlValue::Bool)
    }
}

macro_rules! impl_field_value_int {
    ($($ty:ty),*) => {
        $(
            impl FieldValue for $ty {
                fn decode_json(value: &JsonValue) -> Result<SqlValue, serde_json::Error> {
                    let v = <$ty>::deserialize(value)?;
                    i64::try_from(v)
                        .map(SqlValue::Int)
                        .map_err(|_| serde_json::Error::custom(format!("integer {} out of range for i64", v)))
                }
            }
        )*
    };
}

impl_field_value_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FieldValue for f32 {
    fn decode_json(value: &JsonValue) -> Result<SqlValue, serde_json::Error> {
        f32::deserialize(value).map(|v| SqlValue::Float(f64::from(v)))
    }
}

impl FieldValue for f64 {
    fn decode_json(value: &JsonValue) -> Result<SqlValue, serde_json::Error> {
        f64::deserialize(value).map(SqlValue::Float)
    }
}

impl FieldValue for DateTime<Utc> {
    fn decode_json(value: &JsonValue) -> Result<SqlValue, serde_json::Error> {
        DateTime::<Utc>::deserialize(value).map(SqlValue::Timestamp)
    }
}

impl FieldValue for NaiveDateTime {
    fn decode_json(value: &JsonValue) -> Result<SqlValue, serde_json::Error> {
        NaiveDateTime::deserialize(value).map(|v| SqlValue::Timestamp(v.and_utc()))
    }
}

impl FieldValue for NaiveDate {
    fn decode_json(value: &JsonValue) -> Result<SqlValue, serde_json::Error> {
        NaiveDate::deserialize(value).map(SqlValue::Date)
    }
}

impl FieldValue for Uuid {
    fn decode_json(value: &JsonValue) -> Result<SqlValue, serde_json::Error> {
        Uuid::deserialize(value).map(SqlValue::Uuid)
    }
}

impl FieldValue for JsonValue {
    fn decode_json(value: &JsonValue) -> Result<SqlValue, serde_json::Error> {
        Ok(SqlValue::Json(value.clone()))
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn decode_json(value: &JsonValue) -> Result<SqlValue, serde_json::Error> {
        if value.is_null() {
            Ok(SqlValue::Null)
        } else {
            T::decode_json(value)
        }
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    fn decode_json(value: &JsonValue) -> Result<SqlValue, serde_json::Error> {
        let items = Vec::<JsonValue>::deserialize(value)?;
        items
            .iter()
            .map(T::decode_json)
            .collect::<Result<Vec<_>, _>>()
            .map(SqlValue::Array)
    }
}

impl<T: FieldValue> FieldValue for Box<T> {
    fn decode_json(value: &JsonValue) -> Result<SqlValue, serde_json::Error> {
        T::decode_json(value)
    }
}
