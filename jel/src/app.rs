//! Core application

use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;

use crate::core::cli::{self, Commands, OutputFormat};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::error::JelError;
use crate::expr::{Compiled, Expr};
use crate::ops::SqlOp;
use crate::order::Orders;
use crate::schema::DynamicSchema;

pub struct CoreApp {
    pub config: AppConfig,
    pub format: OutputFormat,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub fn run() -> Result<()> {
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        let app = Self {
            config: AppConfig::load(&cli_config)?,
            format: cli_config.format,
        };

        let output = match command {
            Commands::Expr {
                schema,
                boolean,
                input,
            } => {
                let input = match input {
                    Some(input) => input,
                    None => io::read_to_string(io::stdin())
                        .context("Failed to read expression from stdin")?,
                };
                app.compile_expr(&schema, boolean, input)?
            }
            Commands::Order { schema, directives } => app.compile_order(&schema, &directives)?,
            Commands::Ops => app.list_ops()?,
        };

        println!("{}", output);
        Ok(())
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    fn load_schema(path: &Path) -> Result<DynamicSchema> {
        DynamicSchema::from_file(path)
            .with_context(|| format!("Failed to load schema: {}", path.display()))
    }

    /// Compile an expression and render it in the configured format
    pub fn compile_expr(&self, schema: &Path, boolean: bool, input: String) -> Result<String> {
        let schema = Self::load_schema(schema)?;
        let compiled = Expr::new(Some(&schema))
            .boolean(boolean)
            .with_limits(self.config.limits)
            .with_text(input)
            .compile_with(self.config.backend)
            .map_err(rejected)?;
        self.render_compiled(&compiled)
    }

    /// Compile ordering directives and render them in the configured format
    pub fn compile_order(&self, schema: &Path, directives: &[String]) -> Result<String> {
        let schema = Self::load_schema(schema)?;
        let mut orders = Orders::new(Some(&schema)).with_limits(self.config.limits);
        orders.parse_slice(directives).map_err(rejected)?;

        match self.format {
            OutputFormat::Text => Ok(orders.to_string()),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "sql": orders.to_string(),
            }))?),
        }
    }

    /// Render the operator whitelist
    pub fn list_ops(&self) -> Result<String> {
        match self.format {
            OutputFormat::Text => Ok(SqlOp::ALL
                .iter()
                .map(|op| format!("{:<22}{}", op.as_str(), op.syntax()))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Json => {
                let ops: Vec<_> = SqlOp::ALL
                    .iter()
                    .map(|op| json!({ "name": op, "syntax": op.syntax() }))
                    .collect();
                Ok(serde_json::to_string_pretty(&ops)?)
            }
        }
    }

    fn render_compiled(&self, compiled: &Compiled) -> Result<String> {
        match self.format {
            OutputFormat::Text => {
                let mut lines = vec![compiled.text.clone()];
                for (i, arg) in compiled.args.iter().enumerate() {
                    lines.push(format!(
                        "{}: {}",
                        self.config.backend.dialect().placeholder(i + 1),
                        serde_json::to_string(arg)?
                    ));
                }
                Ok(lines.join("\n"))
            }
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "sql": compiled.text,
                "args": compiled.args,
            }))?),
        }
    }
}

/// Attaches the machine code to a compile error
fn rejected(err: JelError) -> anyhow::Error {
    anyhow::anyhow!("{} [{}]", err, err.code())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::sql::Backend;

    const SCHEMA: &str = r#"{
        "name": "External",
        "fields": [
            { "name": "externalName", "column": "external_name", "type": "text" },
            { "name": "internal", "column": "internal", "record": {
                "name": "Internal",
                "fields": [
                    { "name": "internalTime", "column": "internal_time", "type": "timestamp", "nullable": true }
                ]
            } }
        ]
    }"#;

    fn schema_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SCHEMA.as_bytes()).unwrap();
        file
    }

    fn app(format: OutputFormat) -> CoreApp {
        CoreApp {
            config: AppConfig::default(),
            format,
        }
    }

    #[test]
    fn test_compile_expr_text() {
        let schema = schema_file();
        let output = app(OutputFormat::Text)
            .compile_expr(
                schema.path(),
                false,
                r#"["=", "externalName", ["externalName", "x"]]"#.into(),
            )
            .unwrap();
        assert_eq!(output, "(\"external_name\" = $1)\n$1: \"x\"");
    }

    #[test]
    fn test_compile_expr_json() {
        let schema = schema_file();
        let output = app(OutputFormat::Json)
            .compile_expr(
                schema.path(),
                false,
                r#"["<", "internal.internalTime", ["internal.internalTime", "2024-01-01T00:00:00Z"]]"#
                    .into(),
            )
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["sql"], r#"(("internal")."internal_time" < $1)"#);
        assert_eq!(value["args"][0], "2024-01-01T00:00:00Z");
    }

    #[test]
    fn test_compile_expr_bool_and_backend() {
        let schema = schema_file();
        let mut sqlite = app(OutputFormat::Text);
        sqlite.config.backend = Backend::Sqlite;

        assert_eq!(
            sqlite.compile_expr(schema.path(), true, String::new()).unwrap(),
            "true"
        );
        assert_eq!(
            sqlite
                .compile_expr(schema.path(), false, "[\"and\", true, false]".into())
                .unwrap(),
            "(?1 and ?2)\n?1: true\n?2: false"
        );
    }

    #[test]
    fn test_compile_expr_error_has_code() {
        let schema = schema_file();
        let err = app(OutputFormat::Text)
            .compile_expr(schema.path(), false, "\"nope\"".into())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown field \"nope\" in External [UNKNOWN_FIELD]"
        );
    }

    #[test]
    fn test_compile_order() {
        let schema = schema_file();
        let directives = vec![
            "externalName asc".to_string(),
            "internal.internalTime desc".to_string(),
        ];
        let output = app(OutputFormat::Text)
            .compile_order(schema.path(), &directives)
            .unwrap();
        assert_eq!(
            output,
            r#"order by "external_name" asc, ("internal")."internal_time" desc"#
        );

        let err = app(OutputFormat::Text)
            .compile_order(schema.path(), &["externalName up".to_string()])
            .unwrap_err();
        assert!(err.to_string().ends_with("[INVALID_ORDERING]"));
    }

    #[test]
    fn test_missing_schema_file() {
        let err = app(OutputFormat::Text)
            .compile_order(Path::new("/nonexistent/schema.json"), &[])
            .unwrap_err();
        assert!(err.to_string().contains("Failed to load schema"));
    }

    #[test]
    fn test_list_ops() {
        let text = app(OutputFormat::Text).list_ops().unwrap();
        assert_eq!(text.lines().count(), SqlOp::ALL.len());
        assert!(text.lines().any(|l| l.starts_with("between") && l.ends_with("between")));

        let json = app(OutputFormat::Json).list_ops().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[2]["name"], "not");
        assert_eq!(value[2]["syntax"], "prefix");
    }
}
