//! Error type for expression and ordering compilation
//!
//! Compilation is all-or-nothing: the first failure aborts the whole
//! operation and is returned as a `JelError`. Every variant carries enough
//! context (operator, field, expected vs. found argument count) to build a
//! client-facing diagnostic, and exposes a stable machine code via
//! [`JelError::code`].

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T, E = JelError> = std::result::Result<T, E>;

/// Errors produced while compiling JEL expressions or orderings
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JelError {
    /// Input is not valid JSON, or a list head is not a string
    #[error("Invalid input: {message}")]
    InvalidInputShape { message: String },

    /// JSON objects are only valid as the payload of a cast
    #[error("Unexpected object in input: {input}")]
    UnexpectedObject { input: String },

    /// Lists must have at least one element (the head)
    #[error("Lists must have at least one element, found empty list")]
    EmptyList,

    /// Wrong number of arguments for a whitelisted operator
    #[error("Operation {operator:?} must have {expected} argument(s), found {found}")]
    ArityMismatch {
        operator: String,
        expected: &'static str,
        found: usize,
    },

    /// No field with the given public name in the record
    #[error("Unknown field {field:?} in {record}")]
    UnknownField { field: String, record: String },

    /// Not a valid dot-separated identifier
    #[error("Expected a valid dot-separated identifier, got {path:?}")]
    InvalidPath { path: String },

    /// Field lookup was attempted without a reference schema
    #[error("Can't find field by path {path:?}: no schema provided")]
    NoSchemaProvided { path: String },

    /// Field is known but has no storage column
    #[error("No column name corresponding to {field:?} in {record} for path {path:?}")]
    NoStorageMapping {
        field: String,
        record: String,
        path: String,
    },

    /// Storage identifier that can't be safely quoted
    #[error("Unexpected '\"' in SQL identifier {ident:?}")]
    InvalidIdentifier { ident: String },

    /// Casts take exactly one literal argument
    #[error("Cast into {field:?} must have exactly 1 argument, found {found}")]
    CastArityMismatch { field: String, found: usize },

    /// Cast literal doesn't decode into the field's type
    #[error("Failed to decode cast into {field:?} as {type_name}: {reason}")]
    CastDecodeFailure {
        field: String,
        type_name: String,
        reason: String,
    },

    /// Ordering directive doesn't match `<ident> asc|desc`
    #[error("{input:?} is not a valid ordering string; expected format: \"<ident> asc|desc\"")]
    InvalidOrderingSyntax { input: String },

    /// Nesting exceeds the configured maximum depth
    #[error("Expression nesting exceeds maximum depth of {max_depth}")]
    TooDeep { max_depth: usize },

    /// Raw input exceeds the configured size limit
    #[error("Expression input of {size} bytes exceeds maximum size of {max} bytes")]
    InputTooLarge { size: usize, max: usize },

    /// Too many ordering directives
    #[error("Maximum {max} orderings allowed, found {count}")]
    TooManyOrderings { count: usize, max: usize },
}

impl JelError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInputShape {
            message: message.into(),
        }
    }

    pub fn arity(operator: &str, expected: &'static str, found: usize) -> Self {
        Self::ArityMismatch {
            operator: operator.to_string(),
            expected,
            found,
        }
    }

    pub fn unknown_field(field: &str, record: &str) -> Self {
        Self::UnknownField {
            field: field.to_string(),
            record: record.to_string(),
        }
    }

    pub fn invalid_path(path: &str) -> Self {
        Self::InvalidPath {
            path: path.to_string(),
        }
    }

    pub fn cast_decode(field: &str, type_name: &str, reason: impl ToString) -> Self {
        Self::CastDecodeFailure {
            field: field.to_string(),
            type_name: type_name.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Stable machine-readable code for client-facing diagnostics
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInputShape { .. } => "INVALID_INPUT",
            Self::UnexpectedObject { .. } => "UNEXPECTED_OBJECT",
            Self::EmptyList => "EMPTY_LIST",
            Self::ArityMismatch { .. } => "ARITY_MISMATCH",
            Self::UnknownField { .. } => "UNKNOWN_FIELD",
            Self::InvalidPath { .. } => "INVALID_PATH",
            Self::NoSchemaProvided { .. } => "NO_SCHEMA_PROVIDED",
            Self::NoStorageMapping { .. } => "NO_STORAGE_MAPPING",
            Self::InvalidIdentifier { .. } => "INVALID_IDENTIFIER",
            Self::CastArityMismatch { .. } => "CAST_ARITY_MISMATCH",
            Self::CastDecodeFailure { .. } => "CAST_DECODE_FAILURE",
            Self::InvalidOrderingSyntax { .. } => "INVALID_ORDERING",
            Self::TooDeep { .. } => "TOO_DEEP",
            Self::InputTooLarge { .. } => "INPUT_TOO_LARGE",
            Self::TooManyOrderings { .. } => "TOO_MANY_ORDERINGS",
        }
    }
}
