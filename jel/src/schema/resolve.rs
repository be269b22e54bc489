//! Dotted path resolution against a record descriptor

use std::sync::OnceLock;

use regex::Regex;
use serde::de::Error as _;
use serde_json::Value as JsonValue;

use super::{FieldInfo, RecordDescriptor};
use crate::error::{JelError, Result};
use crate::sql::{FieldPath, SqlValue};

/// ASCII word segments joined by dots, unanchored
pub(crate) const DOTTED_PATH: &str = r"(?:[0-9A-Za-z_]+\.)*[0-9A-Za-z_]+";

/// Embedded records are flattened at most this deep
const MAX_EMBED_DEPTH: usize = 32;

/// Record literals nest at most this deep
const MAX_RECORD_LITERAL_DEPTH: usize = 32;

/// Field located by a dotted public path
#[derive(Debug, Clone)]
pub struct ResolvedField<'a> {
    /// Storage path, one segment per public segment
    pub path: FieldPath,
    /// The last field on the path
    pub field: FieldInfo<'a>,
}

/// Check that `path` is a dot-separated sequence of word identifiers
pub fn is_dotted_path(path: &str) -> bool {
    static RE_DOTTED: OnceLock<Regex> = OnceLock::new();
    let re = RE_DOTTED
        .get_or_init(|| Regex::new(&format!("^{}$", DOTTED_PATH)).expect("Invalid regex"));
    re.is_match(path)
}

/// Resolves a dotted public path (e.g. `internal.internalTime`) into its
/// storage path (`("internal")."internal_time"`) and leaf field.
pub fn resolve<'a>(
    schema: Option<&'a dyn RecordDescriptor>,
    dotted: &str,
) -> Result<ResolvedField<'a>> {
    if !is_dotted_path(dotted) {
        return Err(JelError::invalid_path(dotted));
    }
    let Some(mut record) = schema else {
        return Err(JelError::NoSchemaProvided {
            path: dotted.to_string(),
        });
    };

    let mut columns: Vec<&'a str> = Vec::new();
    let mut leaf: Option<FieldInfo<'a>> = None;

    for segment in dotted.split('.') {
        if let Some(parent) = leaf {
            record = parent
                .nested
                .ok_or_else(|| JelError::unknown_field(segment, parent.type_name))?;
        }

        let field = find_field(record, segment, 0)
            .ok_or_else(|| JelError::unknown_field(segment, record.type_name()))?;
        if field.column.is_empty() {
            return Err(JelError::NoStorageMapping {
                field: segment.to_string(),
                record: record.type_name().to_string(),
                path: dotted.to_string(),
            });
        }

        columns.push(field.column);
        leaf = Some(field);
    }

    let field = leaf.ok_or_else(|| JelError::invalid_path(dotted))?;
    let path = FieldPath::new(columns)?;
    tracing::trace!(path = dotted, column = %path, "Resolved field");

    Ok(ResolvedField { path, field })
}

/// Finds a field by public name among direct fields, then inside embedded
/// records in declaration order.
fn find_field<'a>(
    record: &'a dyn RecordDescriptor,
    name: &str,
    depth: usize,
) -> Option<FieldInfo<'a>> {
    let fields = record.fields();
    if let Some(field) = fields.iter().find(|f| !f.embedded && f.name == name) {
        return Some(*field);
    }
    if depth >= MAX_EMBED_DEPTH {
        return None;
    }
    fields
        .iter()
        .filter(|f| f.embedded)
        .filter_map(|f| f.nested)
        .find_map(|embedded| find_field(embedded, name, depth + 1))
}

/// Decodes a literal cast to a record-typed field.
///
/// Accepts `null`, an object keyed by public field names, or an array of
/// such objects for list fields. Every member must name an exposed field and
/// decode as that field's type; the literal is bound as JSON.
pub fn decode_record(
    record: &dyn RecordDescriptor,
    literal: &JsonValue,
) -> std::result::Result<SqlValue, serde_json::Error> {
    if literal.is_null() {
        return Ok(SqlValue::Null);
    }
    check_record_literal(record, literal, 0)?;
    Ok(SqlValue::Json(literal.clone()))
}

fn check_record_literal(
    record: &dyn RecordDescriptor,
    literal: &JsonValue,
    depth: usize,
) -> std::result::Result<(), serde_json::Error> {
    if depth >= MAX_RECORD_LITERAL_DEPTH {
        return Err(serde_json::Error::custom("record literal nested too deeply"));
    }

    let members = match literal {
        JsonValue::Null => return Ok(()),
        JsonValue::Array(items) => {
            return items
                .iter()
                .try_for_each(|item| check_record_literal(record, item, depth + 1));
        }
        JsonValue::Object(members) => members,
        other => {
            return Err(serde_json::Error::custom(format!(
                "expected object for {}, found {}",
                record.type_name(),
                other
            )));
        }
    };

    for (name, value) in members {
        let field = find_field(record, name, 0).ok_or_else(|| {
            serde_json::Error::custom(format!(
                "unknown field {:?} in {}",
                name,
                record.type_name()
            ))
        })?;
        match (field.decode, field.nested) {
            (Some(decode), _) => {
                decode(value)?;
            }
            (None, Some(nested)) => check_record_literal(nested, value, depth + 1)?,
            (None, None) => {
                return Err(serde_json::Error::custom(format!(
                    "field {:?} does not accept literals",
                    name
                )));
            }
        }
    }
    Ok(())
}
