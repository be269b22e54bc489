use clap::{Parser, Subcommand};

use std::path::PathBuf;

use crate::sql::Backend;

use super::constants::{
    ENV_BACKEND, ENV_CONFIG, ENV_MAX_DEPTH, ENV_MAX_INPUT_BYTES, ENV_MAX_ORDERINGS,
};

#[derive(Parser)]
#[command(name = "jel")]
#[command(
    version,
    about = "Compile JSON filter and ordering expressions into parameterized SQL",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Maximum nesting depth of expression lists
    #[arg(long, global = true, env = ENV_MAX_DEPTH)]
    pub max_depth: Option<usize>,

    /// Maximum expression input size in bytes
    #[arg(long, global = true, env = ENV_MAX_INPUT_BYTES)]
    pub max_input_bytes: Option<usize>,

    /// Maximum number of ordering directives
    #[arg(long, global = true, env = ENV_MAX_ORDERINGS)]
    pub max_orderings: Option<usize>,

    /// Placeholder style (postgres, sqlite or duckdb)
    #[arg(long, short = 'b', global = true, env = ENV_BACKEND, value_parser = parse_backend)]
    pub backend: Option<Backend>,

    /// Output format (text or json)
    #[arg(long, short = 'f', global = true, default_value = "text", value_parser = parse_output_format)]
    pub format: OutputFormat,
}

/// Output format of compile results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Parse backend from CLI/env string
fn parse_backend(s: &str) -> Result<Backend, String> {
    s.parse()
}

/// Parse output format from CLI string
fn parse_output_format(s: &str) -> Result<OutputFormat, String> {
    match s.to_lowercase().as_str() {
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        _ => Err(format!(
            "Invalid output format '{}'. Valid options: text, json",
            s
        )),
    }
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Compile a JSON expression into a SQL condition with arguments
    Expr {
        /// Record schema (JSON) that whitelists referenced fields
        #[arg(long, short = 's')]
        schema: PathBuf,

        /// Boolean context: empty input compiles to `true`
        #[arg(long = "bool")]
        boolean: bool,

        /// Expression text; read from stdin when omitted
        input: Option<String>,
    },
    /// Compile "<field> asc|desc" directives into an ORDER BY clause
    Order {
        /// Record schema (JSON) that whitelists referenced fields
        #[arg(long, short = 's')]
        schema: PathBuf,

        /// Ordering directives, e.g. "internal.internalTime desc"
        #[arg(required = true)]
        directives: Vec<String>,
    },
    /// List whitelisted operators and their syntax forms
    Ops,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub config: Option<PathBuf>,
    pub max_depth: Option<usize>,
    pub max_input_bytes: Option<usize>,
    pub max_orderings: Option<usize>,
    pub backend: Option<Backend>,
    pub format: OutputFormat,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Commands) {
    split(Cli::parse())
}

fn split(cli: Cli) -> (CliConfig, Commands) {
    let config = CliConfig {
        config: cli.config,
        max_depth: cli.max_depth,
        max_input_bytes: cli.max_input_bytes,
        max_orderings: cli.max_orderings,
        backend: cli.backend,
        format: cli.format,
    };
    (config, cli.command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_expr_command() {
        let cli = Cli::try_parse_from([
            "jel", "expr", "--schema", "schema.json", "--bool", r#"["=", "a", 1]"#,
        ])
        .unwrap();
        let (config, command) = split(cli);

        assert_eq!(config.format, OutputFormat::Text);
        match command {
            Commands::Expr {
                schema,
                boolean,
                input,
            } => {
                assert_eq!(schema, PathBuf::from("schema.json"));
                assert!(boolean);
                assert_eq!(input.as_deref(), Some(r#"["=", "a", 1]"#));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "jel",
            "order",
            "-s",
            "schema.json",
            "a asc",
            "b desc",
            "--backend",
            "SQLite",
            "--format",
            "json",
            "--max-orderings",
            "2",
        ])
        .unwrap();
        let (config, command) = split(cli);

        assert_eq!(config.backend, Some(Backend::Sqlite));
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.max_orderings, Some(2));
        assert!(matches!(
            command,
            Commands::Order { directives, .. } if directives == ["a asc", "b desc"]
        ));
    }

    #[test]
    fn test_parse_rejects_invalid_values() {
        assert!(Cli::try_parse_from(["jel", "ops", "--backend", "mysql"]).is_err());
        assert!(Cli::try_parse_from(["jel", "ops", "--format", "yaml"]).is_err());
        assert!(Cli::try_parse_from(["jel", "order", "-s", "schema.json"]).is_err());
    }

    #[test]
    fn test_parse_output_format() {
        assert_eq!(parse_output_format("JSON"), Ok(OutputFormat::Json));
        assert!(parse_output_format("xml").is_err());
    }
}
