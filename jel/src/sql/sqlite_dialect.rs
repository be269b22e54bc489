//! SQLite SQL dialect implementation

use super::SqlDialect;

/// SQLite SQL dialect
///
/// Uses numbered `?NNN` placeholders so parameters stay aligned when a
/// compiled fragment is spliced after other bound values.
pub struct SqliteDialect;

impl SqlDialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn placeholder(&self, index: usize) -> String {
        format!("?{}", index)
    }
}
