//! JSON expression compiler
//!
//! Expressions are Lisp-style JSON lists whose head names a whitelisted SQL
//! operator:
//!
//! ```json
//! ["and",
//!   ["or", false, ["=", "externalName", ["externalName", "literal string"]]],
//!   ["<", "internal.internalTime", ["internal.internalTime", "9999-01-01T00:00:00Z"]]]
//! ```
//!
//! Strings are field references resolved against the record schema, other
//! scalars become bound parameters, and a list whose head is not an operator
//! is a cast: `["internal.internalTime", "9999-01-01T00:00:00Z"]` decodes the
//! literal as the field's type. The output is SQL text with positional
//! placeholders and the ordered argument list.

mod decode;

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

use crate::core::CompileLimits;
use crate::error::{JelError, Result};
use crate::schema::{Record, RecordDescriptor};
use crate::sql::{Backend, SqlBuilder, SqlExpr, SqlValue};

use decode::Decoder;

/// Compiled SQL text and the arguments referenced by its placeholders
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Compiled {
    pub text: String,
    pub args: Vec<SqlValue>,
}

#[derive(Debug, Clone)]
enum Source {
    Text(String),
    Value(JsonValue),
}

/// An expression awaiting compilation.
///
/// Building an `Expr` does no work; the input is validated and decoded on
/// every [`compile`](Expr::compile). Compiling never mutates the expression,
/// so one `Expr` may be compiled many times and from several threads.
#[derive(Clone)]
pub struct Expr<'s> {
    source: Option<Source>,
    schema: Option<&'s dyn RecordDescriptor>,
    is_bool: bool,
    limits: CompileLimits,
}

impl<'s> Expr<'s> {
    pub fn new(schema: Option<&'s dyn RecordDescriptor>) -> Self {
        Self {
            source: None,
            schema,
            is_bool: false,
            limits: CompileLimits::default(),
        }
    }

    /// Expression whose identifiers are resolved against `R`
    pub fn for_record<R: Record>() -> Expr<'static> {
        Expr::new(Some(R::descriptor()))
    }

    /// Boolean expression for `R`; empty input compiles to `true`
    pub fn bool_for<R: Record>() -> Expr<'static> {
        Self::for_record::<R>().boolean(true)
    }

    /// Expression without a schema: any field reference fails
    pub fn untyped() -> Expr<'static> {
        Expr::new(None)
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.source = Some(Source::Text(text.into()));
        self
    }

    pub fn with_value(mut self, value: JsonValue) -> Self {
        self.source = Some(Source::Value(value));
        self
    }

    pub fn boolean(mut self, is_bool: bool) -> Self {
        self.is_bool = is_bool;
        self
    }

    pub fn with_limits(mut self, limits: CompileLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Attaches a schema, e.g. to an expression deserialized from a request
    pub fn with_schema<'t>(self, schema: Option<&'t dyn RecordDescriptor>) -> Expr<'t> {
        Expr {
            source: self.source,
            schema,
            is_bool: self.is_bool,
            limits: self.limits,
        }
    }

    pub fn schema(&self) -> Option<&'s dyn RecordDescriptor> {
        self.schema
    }

    pub fn is_bool(&self) -> bool {
        self.is_bool
    }

    pub fn limits(&self) -> &CompileLimits {
        &self.limits
    }

    /// Compile with Postgres-style placeholders (`$1`, `$2`, ...)
    pub fn compile(&self) -> Result<Compiled> {
        self.compile_with(Backend::default())
    }

    pub fn compile_with(&self, backend: Backend) -> Result<Compiled> {
        let mut bui = SqlBuilder::with_backend(backend);
        match self.append_to(&mut bui) {
            Ok(()) => {
                let (text, args) = bui.finish();
                tracing::debug!(backend = %backend, args = args.len(), "Compiled expression");
                Ok(Compiled { text, args })
            }
            Err(e) => {
                tracing::debug!(error = %e, code = e.code(), "Expression rejected");
                Err(e)
            }
        }
    }

    /// Validates limits and parses the input. `None` means "empty boolean".
    fn parse(&self) -> Result<Option<Cow<'_, JsonValue>>> {
        let text = match &self.source {
            Some(Source::Value(value)) => return Ok(Some(Cow::Borrowed(value))),
            Some(Source::Text(text)) => text.as_str(),
            None => "",
        };

        if text.len() > self.limits.max_input_bytes {
            return Err(JelError::InputTooLarge {
                size: text.len(),
                max: self.limits.max_input_bytes,
            });
        }
        if text.trim().is_empty() {
            if self.is_bool {
                return Ok(None);
            }
            return Err(JelError::invalid_input("expression is empty"));
        }

        check_depth(text, self.limits.depth_limit())?;
        let value = serde_json::from_str(text).map_err(|e| JelError::invalid_input(e.to_string()))?;
        Ok(Some(Cow::Owned(value)))
    }
}

impl Default for Expr<'_> {
    fn default() -> Self {
        Self::new(None)
    }
}

impl fmt::Debug for Expr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expr")
            .field("source", &self.source)
            .field("schema", &self.schema.map(|s| s.type_name()))
            .field("is_bool", &self.is_bool)
            .field("limits", &self.limits)
            .finish()
    }
}

/// Renders the compiled SQL text, or the rejection
impl fmt::Display for Expr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.compile() {
            Ok(compiled) => f.write_str(&compiled.text),
            Err(e) => write!(f, "invalid expression: {}", e),
        }
    }
}

/// Stores the raw JSON without a schema; attach one with
/// [`with_schema`](Expr::with_schema) before compiling field references.
impl<'de> Deserialize<'de> for Expr<'static> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = JsonValue::deserialize(deserializer)?;
        Ok(Expr {
            source: Some(Source::Value(value)),
            ..Expr::untyped()
        })
    }
}

impl SqlExpr for Expr<'_> {
    /// Appends the compiled expression. Placeholders continue from the
    /// builder's current argument count; on error nothing is appended.
    fn append_to(&self, bui: &mut SqlBuilder) -> Result<()> {
        let Some(node) = self.parse()? else {
            bui.append_literal("true");
            return Ok(());
        };
        bui.append_subexpression(&Decoder {
            schema: self.schema,
            node: &node,
            max_depth: self.limits.depth_limit(),
        })
    }
}

/// Rejects input nested deeper than `max_depth` before it is parsed
fn check_depth(text: &str, max_depth: usize) -> Result<()> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for byte in text.bytes() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'[' | b'{' => {
                depth += 1;
                if depth > max_depth {
                    return Err(JelError::TooDeep { max_depth });
                }
            }
            b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}
