//! Record descriptors
//!
//! A record descriptor is the whitelist of identifiers a client may
//! reference. It maps public (client-facing) field names to storage column
//! names, exposes nested records for dotted paths, and supplies the decoder
//! used when a literal is cast to a field's type.
//!
//! Descriptors come from two places:
//!
//! - `#[derive(Record)]` on a Rust struct, producing a static descriptor
//! - [`DynamicSchema`], loaded from JSON at runtime

mod dynamic;
mod resolve;
mod value;

use std::fmt;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::sql::SqlValue;

pub use dynamic::{DynamicField, DynamicSchema, ScalarKind, SchemaError};
pub(crate) use resolve::DOTTED_PATH;
pub use resolve::{ResolvedField, decode_record, is_dotted_path, resolve};
pub use value::FieldValue;

/// Decodes a cast literal into a bound value of the field's type
pub type DecodeFn = fn(&JsonValue) -> Result<SqlValue, serde_json::Error>;

/// Returns the descriptor of a nested record type
pub type DescriptorFn = fn() -> &'static dyn RecordDescriptor;

/// Schema capability: enumerates the fields of one record type
pub trait RecordDescriptor: Send + Sync {
    /// Name used in diagnostics
    fn type_name(&self) -> &str;

    /// Direct fields, in declaration order. Embedded fields are reported
    /// with `embedded = true` and flattened by the resolver.
    fn fields(&self) -> Vec<FieldInfo<'_>>;
}

/// One field of a record descriptor
#[derive(Clone, Copy)]
pub struct FieldInfo<'a> {
    /// Public name used by clients
    pub name: &'a str,
    /// Storage column name; empty when the field has no column
    pub column: &'a str,
    /// Field type name, used in diagnostics
    pub type_name: &'a str,
    /// Whether this field's record is flattened into the parent
    pub embedded: bool,
    /// Cast decoder; `None` for record fields, whose literals go through
    /// [`decode_record`]
    pub decode: Option<DecodeFn>,
    /// Record type behind the field, unwrapped from `Option`/`Vec`/`Box`
    pub nested: Option<&'a dyn RecordDescriptor>,
}

impl fmt::Debug for FieldInfo<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldInfo")
            .field("name", &self.name)
            .field("column", &self.column)
            .field("type_name", &self.type_name)
            .field("embedded", &self.embedded)
            .field("decodable", &self.decode.is_some())
            .field("nested", &self.nested.map(|r| r.type_name()))
            .finish()
    }
}

/// Rust types that describe themselves as records.
///
/// Usually derived with `#[derive(jel::Record)]`. Wrappers delegate to their
/// element type, so `Option<T>`, `Vec<T>` and `Box<T>` fields can be
/// traversed like `T`.
pub trait Record {
    fn descriptor() -> &'static dyn RecordDescriptor;
}

impl<T: Record> Record for Option<T> {
    fn descriptor() -> &'static dyn RecordDescriptor {
        T::descriptor()
    }
}

impl<T: Record> Record for Vec<T> {
    fn descriptor() -> &'static dyn RecordDescriptor {
        T::descriptor()
    }
}

impl<T: Record> Record for Box<T> {
    fn descriptor() -> &'static dyn RecordDescriptor {
        T::descriptor()
    }
}

impl<T: Record> Record for Arc<T> {
    fn descriptor() -> &'static dyn RecordDescriptor {
        T::descriptor()
    }
}

/// Field of a compile-time descriptor (generated by the derive macro)
#[derive(Clone, Copy)]
pub struct StaticField {
    pub name: &'static str,
    pub column: &'static str,
    pub type_name: &'static str,
    pub embedded: bool,
    pub decode: Option<DecodeFn>,
    pub nested: Option<DescriptorFn>,
}

/// Compile-time record descriptor (generated by the derive macro)
pub struct StaticRecord {
    pub name: &'static str,
    pub fields: &'static [StaticField],
}

impl RecordDescriptor for StaticRecord {
    fn type_name(&self) -> &str {
        self.name
    }

    fn fields(&self) -> Vec<FieldInfo<'_>> {
        self.fields
            .iter()
            .map(|field| FieldInfo {
                name: field.name,
                column: field.column,
                type_name: field.type_name,
                embedded: field.embedded,
                decode: field.decode,
                nested: field.nested.map(|descriptor| descriptor()),
            })
            .collect()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{External, Internal};
    use super::*;

    #[test]
    fn test_derived_descriptor_fields() {
        let descriptor = External::descriptor();
        assert_eq!(descriptor.type_name(), "External");

        let fields = descriptor.fields();
        let names: Vec<&str> = fields.iter().map(|f| f.name).collect();
        assert_eq!(
            names,
            ["externalName", "internal", "id", "score", "tags", "history", "unmapped", "audit"]
        );
    }

    #[test]
    fn test_derived_descriptor_columns_and_nesting() {
        let fields = External::descriptor().fields();

        let internal = fields.iter().find(|f| f.name == "internal").unwrap();
        assert_eq!(internal.column, "internal");
        assert!(internal.decode.is_none());
        assert_eq!(internal.nested.map(|r| r.type_name()), Some("Internal"));

        let unmapped = fields.iter().find(|f| f.name == "unmapped").unwrap();
        assert_eq!(unmapped.column, "");

        let audit = fields.iter().find(|f| f.name == "audit").unwrap();
        assert!(audit.embedded);
    }

    #[test]
    fn test_wrappers_delegate_descriptor() {
        assert_eq!(
            <Vec<Internal> as Record>::descriptor().type_name(),
            "Internal"
        );
        assert_eq!(
            <Option<Box<Internal>> as Record>::descriptor().type_name(),
            "Internal"
        );
    }

    #[test]
    fn test_field_info_debug() {
        let fields = Internal::descriptor().fields();
        let debug = format!("{:?}", fields[0]);
        assert!(debug.contains("internalTime"));
        assert!(debug.contains("decodable: true"));
    }
}
