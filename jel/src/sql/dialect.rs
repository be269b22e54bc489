//! SQL dialect trait for placeholder rendering
//!
//! Compiled expressions bind every literal as a positional parameter. The
//! placeholder syntax differs per database; identifier quoting does not
//! (all supported backends accept standard double-quoted identifiers).

/// SQL dialect trait for generating database-specific placeholders
pub trait SqlDialect: Send + Sync {
    /// Get the dialect name
    fn name(&self) -> &'static str;

    /// Generate a parameter placeholder for the given index (1-based)
    ///
    /// - PostgreSQL: `$1`, `$2`, etc.
    /// - SQLite: `?1`, `?2`, etc.
    /// - DuckDB: always `?`
    fn placeholder(&self, index: usize) -> String;
}
