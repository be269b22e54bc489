//! JSON Expression Language
//!
//! Compiles filter and ordering expressions supplied by untrusted clients as
//! JSON into parameterized SQL. Every operator is checked against a fixed
//! whitelist ([`SqlOp`]) and every identifier is resolved through a record
//! schema that maps public field names to storage columns, so clients can
//! reference only what the application exposes and literals always travel as
//! bound parameters.
//!
//! ```ignore
//! use jel::{Expr, Orders, Record};
//!
//! #[derive(Record)]
//! struct Person {
//!     #[jel(name = "fullName", column = "full_name")]
//!     full_name: String,
//! }
//!
//! let filter = Expr::bool_for::<Person>()
//!     .with_text(r#"["=", "fullName", ["fullName", "Ada"]]"#)
//!     .compile()?;
//! assert_eq!(filter.text, r#"("full_name" = $1)"#);
//!
//! let mut orders = Orders::for_record::<Person>();
//! orders.parse_slice(&["fullName desc"])?;
//! assert_eq!(orders.to_string(), r#"order by "full_name" desc"#);
//! ```

extern crate self as jel;

pub mod app;
pub mod core;
pub mod error;
pub mod expr;
pub mod ops;
pub mod order;
pub mod schema;
pub mod sql;

pub use error::{JelError, Result};
pub use expr::{Compiled, Expr};
pub use ops::{SqlOp, SqlOpSyntax};
pub use order::{Order, Orders};
pub use schema::{
    DynamicSchema, FieldInfo, FieldValue, Record, RecordDescriptor, ResolvedField, resolve,
};
pub use sql::{Backend, FieldPath, SqlBuilder, SqlExpr, SqlValue};

pub use crate::core::config::CompileLimits;

/// `#[derive(Record)]`, see [`schema::Record`]
pub use jel_derive::Record;
