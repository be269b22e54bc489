//! SQL text and argument accumulation
//!
//! Collects SQL fragments and bound parameters during compilation
//! (maintains insertion order). Placeholders are rendered through the
//! backend dialect and numbered from 1 in argument order.

use crate::error::Result;

use super::{Backend, SqlValue};

/// Anything that can write itself into a `SqlBuilder`
pub trait SqlExpr {
    fn append_to(&self, bui: &mut SqlBuilder) -> Result<()>;
}

/// Accumulates SQL text and the arguments referenced by its placeholders
#[derive(Debug, Clone, Default)]
pub struct SqlBuilder {
    text: String,
    args: Vec<SqlValue>,
    backend: Backend,
    /// Number of arguments bound before this buffer's first one
    base: usize,
}

impl SqlBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend(backend: Backend) -> Self {
        Self {
            backend,
            ..Self::default()
        }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Appends a raw SQL fragment, separated by a space when needed.
    ///
    /// No space is added at the start of the buffer, after whitespace or
    /// `(`, or before a fragment starting with whitespace, `)` or `,`.
    pub fn append_literal(&mut self, fragment: &str) {
        if fragment.is_empty() {
            return;
        }
        if self.needs_space(fragment) {
            self.text.push(' ');
        }
        self.text.push_str(fragment);
    }

    /// Binds `value` and appends its placeholder. Returns the 1-based ordinal.
    pub fn append_param(&mut self, value: SqlValue) -> usize {
        self.args.push(value);
        let ordinal = self.base + self.args.len();
        let placeholder = self.backend.dialect().placeholder(ordinal);
        self.append_literal(&placeholder);
        ordinal
    }

    /// Appends a sub-expression. On error the builder is left unchanged.
    pub fn append_subexpression(&mut self, expr: &dyn SqlExpr) -> Result<()> {
        let mut scratch = Self {
            text: String::new(),
            args: Vec::new(),
            backend: self.backend,
            base: self.base + self.args.len(),
        };
        expr.append_to(&mut scratch)?;

        self.append_literal(&scratch.text);
        self.args.extend(scratch.args);
        Ok(())
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn args(&self) -> &[SqlValue] {
        &self.args
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Consumes the builder, returning SQL text and arguments
    pub fn finish(self) -> (String, Vec<SqlValue>) {
        (self.text, self.args)
    }

    fn needs_space(&self, fragment: &str) -> bool {
        let (Some(last), Some(first)) = (self.text.chars().last(), fragment.chars().next()) else {
            return false;
        };
        !(last.is_whitespace()
            || last == '('
            || first.is_whitespace()
            || first == ')'
            || first == ',')
    }
}
