//! SQL output layer
//!
//! This module provides the pieces the compilers write into: an argument
//! buffer (`SqlBuilder`), quoted identifier paths (`FieldPath`), bound
//! values (`SqlValue`) and per-backend placeholder syntax (`SqlDialect`).

mod builder;
mod dialect;
mod duckdb_dialect;
mod ident;
mod postgres_dialect;
mod sqlite_dialect;
mod value;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use builder::{SqlBuilder, SqlExpr};
pub use dialect::SqlDialect;
pub use duckdb_dialect::DuckdbDialect;
pub use ident::FieldPath;
pub use postgres_dialect::PostgresDialect;
pub use sqlite_dialect::SqliteDialect;
pub use value::SqlValue;

/// Database backend identifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Postgres,
    Sqlite,
    Duckdb,
}

impl Backend {
    /// Get the SQL dialect for this backend
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Backend::Postgres => &PostgresDialect,
            Backend::Sqlite => &SqliteDialect,
            Backend::Duckdb => &DuckdbDialect,
        }
    }

    /// Get the backend name
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Postgres => "postgres",
            Backend::Sqlite => "sqlite",
            Backend::Duckdb => "duckdb",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Backend::Postgres),
            "sqlite" => Ok(Backend::Sqlite),
            "duckdb" => Ok(Backend::Duckdb),
            _ => Err(format!(
                "Invalid backend '{}'. Valid options: postgres, sqlite, duckdb",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_dialect_names_match() {
        for backend in [Backend::Postgres, Backend::Sqlite, Backend::Duckdb] {
            assert_eq!(backend.dialect().name(), backend.name());
        }
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("Postgres".parse::<Backend>(), Ok(Backend::Postgres));
        assert_eq!("postgresql".parse::<Backend>(), Ok(Backend::Postgres));
        assert_eq!("sqlite".parse::<Backend>(), Ok(Backend::Sqlite));
        assert!("mysql".parse::<Backend>().is_err());
    }

    #[test]
    fn test_backend_serde() {
        let backend: Backend = serde_json::from_str(r#""duckdb""#).unwrap();
        assert_eq!(backend, Backend::Duckdb);
        assert_eq!(Backend::default(), Backend::Postgres);
    }
}
