use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::sql::Backend;

use super::cli::CliConfig;
use super::constants::{
    CONFIG_FILE_NAME, DEFAULT_MAX_DEPTH, DEFAULT_MAX_INPUT_BYTES, DEFAULT_MAX_ORDERINGS,
    MAX_DEPTH_LIMIT,
};

// =============================================================================
// Compile Limits
// =============================================================================

/// Resource limits applied while compiling untrusted input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompileLimits {
    /// Maximum nesting of JSON lists/objects in an expression
    pub max_depth: usize,
    /// Maximum size of expression text in bytes
    pub max_input_bytes: usize,
    /// Maximum number of ordering directives
    pub max_orderings: usize,
}

impl Default for CompileLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            max_orderings: DEFAULT_MAX_ORDERINGS,
        }
    }
}

impl CompileLimits {
    /// Nesting limit actually enforced; capped below the JSON parser's own
    /// recursion limit
    pub fn depth_limit(&self) -> usize {
        self.max_depth.min(MAX_DEPTH_LIMIT)
    }
}

// =============================================================================
// File Configuration
// =============================================================================

/// Limits section (from JSON config file)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct LimitsFileConfig {
    pub max_depth: Option<usize>,
    pub max_input_bytes: Option<usize>,
    pub max_orderings: Option<usize>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub limits: Option<LimitsFileConfig>,
    pub backend: Option<Backend>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(limits) = other.limits {
            let current = self.limits.get_or_insert_with(LimitsFileConfig::default);
            if limits.max_depth.is_some() {
                tracing::trace!(max_depth = ?limits.max_depth, "Merging limits.max_depth");
                current.max_depth = limits.max_depth;
            }
            if limits.max_input_bytes.is_some() {
                tracing::trace!(max_input_bytes = ?limits.max_input_bytes, "Merging limits.max_input_bytes");
                current.max_input_bytes = limits.max_input_bytes;
            }
            if limits.max_orderings.is_some() {
                tracing::trace!(max_orderings = ?limits.max_orderings, "Merging limits.max_orderings");
                current.max_orderings = limits.max_orderings;
            }
        }

        if other.backend.is_some() {
            tracing::trace!(backend = ?other.backend, "Merging backend");
            self.backend = other.backend;
        }
    }
}

// =============================================================================
// Application Configuration
// =============================================================================

/// Resolved configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AppConfig {
    pub limits: CompileLimits,
    pub backend: Backend,
}

impl AppConfig {
    /// Load configuration with priority (lowest to highest):
    /// 1. Defaults
    /// 2. Local directory config OR CLI-specified config path
    /// 3. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();

        let overlay_path = if let Some(ref path) = cli.config {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Some(path.clone())
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            tracing::debug!(config = %path.display(), "Config file loaded");
        }

        let file_limits = file_config.limits.unwrap_or_default();
        let defaults = CompileLimits::default();

        let limits = CompileLimits {
            max_depth: cli
                .max_depth
                .or(file_limits.max_depth)
                .unwrap_or(defaults.max_depth),
            max_input_bytes: cli
                .max_input_bytes
                .or(file_limits.max_input_bytes)
                .unwrap_or(defaults.max_input_bytes),
            max_orderings: cli
                .max_orderings
                .or(file_limits.max_orderings)
                .unwrap_or(defaults.max_orderings),
        };
        let backend = cli.backend.or(file_config.backend).unwrap_or_default();

        let config = Self { limits, backend };
        config.validate()?;

        tracing::debug!(
            max_depth = config.limits.max_depth,
            max_input_bytes = config.limits.max_input_bytes,
            max_orderings = config.limits.max_orderings,
            backend = %config.backend,
            "Configuration loaded"
        );
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.limits.max_depth == 0 || self.limits.max_depth > MAX_DEPTH_LIMIT {
            anyhow::bail!(
                "Configuration error: limits.max_depth must be between 1 and {} (got {})",
                MAX_DEPTH_LIMIT,
                self.limits.max_depth
            );
        }
        if self.limits.max_input_bytes == 0 {
            anyhow::bail!("Configuration error: limits.max_input_bytes must be greater than 0");
        }
        if self.limits.max_orderings == 0 {
            anyhow::bail!("Configuration error: limits.max_orderings must be greater than 0");
        }
        Ok(())
    }
}
