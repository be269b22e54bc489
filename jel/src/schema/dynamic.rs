//! Runtime record descriptors loaded from JSON
//!
//! Lets a host describe its records without Rust types, e.g. for the `jel`
//! binary or for schemas managed outside the application:
//!
//! ```json
//! {
//!   "name": "External",
//!   "fields": [
//!     { "name": "externalName", "column": "external_name", "type": "text" },
//!     { "name": "internal", "column": "internal", "record": {
//!         "name": "Internal",
//!         "fields": [
//!           { "name": "internalTime", "column": "internal_time",
//!             "type": "timestamp", "nullable": true }
//!         ]
//!     } }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use thiserror::Error;
use uuid::Uuid;

use super::{DecodeFn, FieldInfo, FieldValue, RecordDescriptor};

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Schema parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid field {field:?} in {record}: {reason}")]
    Invalid {
        record: String,
        field: String,
        reason: &'static str,
    },
}

/// Scalar column type of a dynamic field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    Text,
    Integer,
    Float,
    Boolean,
    Timestamp,
    Date,
    Uuid,
    Json,
}

macro_rules! decoder {
    ($ty:ty, $nullable:expr, $array:expr) => {
        match ($nullable, $array) {
            (false, false) => <$ty as FieldValue>::decode_json as DecodeFn,
            (true, false) => <Option<$ty> as FieldValue>::decode_json as DecodeFn,
            (false, true) => <Vec<$ty> as FieldValue>::decode_json as DecodeFn,
            (true, true) => <Option<Vec<$ty>> as FieldValue>::decode_json as DecodeFn,
        }
    };
}

impl ScalarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Timestamp => "timestamp",
            Self::Date => "date",
            Self::Uuid => "uuid",
            Self::Json => "json",
        }
    }

    /// Cast decoder for a field of this kind
    pub fn decoder(&self, nullable: bool, array: bool) -> DecodeFn {
        match self {
            Self::Text => decoder!(String, nullable, array),
            Self::Integer => decoder!(i64, nullable, array),
            Self::Float => decoder!(f64, nullable, array),
            Self::Boolean => decoder!(bool, nullable, array),
            Self::Timestamp => decoder!(DateTime<Utc>, nullable, array),
            Self::Date => decoder!(NaiveDate, nullable, array),
            Self::Uuid => decoder!(Uuid, nullable, array),
            Self::Json => decoder!(JsonValue, nullable, array),
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record described at runtime
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DynamicSchema {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<DynamicField>,
}

/// Field of a [`DynamicSchema`]. Exactly one of `type` and `record` is set.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DynamicField {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub column: String,
    #[serde(rename = "type")]
    pub kind: Option<ScalarKind>,
    pub record: Option<DynamicSchema>,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub array: bool,
    #[serde(default)]
    pub embed: bool,
    /// Computed on validation, e.g. `timestamp[]?`
    #[serde(skip)]
    type_label: String,
}

impl DynamicSchema {
    /// Parse and validate a schema document
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let mut schema: Self = serde_json::from_str(json)?;
        schema.validate()?;
        tracing::debug!(record = %schema.name, fields = schema.fields.len(), "Loaded schema");
        Ok(schema)
    }

    /// Read, parse and validate a schema file
    pub fn from_file(path: &Path) -> Result<Self, SchemaError> {
        tracing::debug!(path = %path.display(), "Loading schema file");
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    fn validate(&mut self) -> Result<(), SchemaError> {
        let mut seen = HashSet::new();
        for field in &mut self.fields {
            let reason = match (field.kind, &mut field.record) {
                (Some(_), Some(_)) => Some("\"type\" and \"record\" are exclusive"),
                (None, None) => Some("one of \"type\" or \"record\" is required"),
                (Some(_), None) if field.embed => Some("only record fields can be embedded"),
                (Some(kind), None) => {
                    field.type_label = format!(
                        "{}{}{}",
                        kind,
                        if field.array { "[]" } else { "" },
                        if field.nullable { "?" } else { "" }
                    );
                    None
                }
                (None, Some(record)) => {
                    record.validate()?;
                    field.type_label = record.name.clone();
                    None
                }
            };

            let reason = reason.or(if field.embed {
                None
            } else if field.name.is_empty() {
                Some("name is required")
            } else if !seen.insert(field.name.clone()) {
                Some("duplicate field name")
            } else {
                None
            });

            if let Some(reason) = reason {
                return Err(SchemaError::Invalid {
                    record: self.name.clone(),
                    field: field.name.clone(),
                    reason,
                });
            }
        }
        Ok(())
    }
}

impl RecordDescriptor for DynamicSchema {
    fn type_name(&self) -> &str {
        &self.name
    }

    fn fields(&self) -> Vec<FieldInfo<'_>> {
        self.fields
            .iter()
            .map(|field| FieldInfo {
                name: &field.name,
                column: &field.column,
                type_name: &field.type_label,
                embedded: field.embed,
                decode: field.kind.map(|kind| kind.decoder(field.nullable, field.array)),
                nested: field
                    .record
                    .as_ref()
                    .map(|record| record as &dyn RecordDescriptor),
            })
            .collect()
    }
}
