// =============================================================================
// Application Identity
// =============================================================================

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "jel";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name, looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "jel.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "JEL_CONFIG";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "JEL_LOG";

// =============================================================================
// Environment Variables - Compile Limits
// =============================================================================

/// Environment variable for maximum expression nesting depth
pub const ENV_MAX_DEPTH: &str = "JEL_MAX_DEPTH";

/// Environment variable for maximum expression input size in bytes
pub const ENV_MAX_INPUT_BYTES: &str = "JEL_MAX_INPUT_BYTES";

/// Environment variable for maximum number of ordering directives
pub const ENV_MAX_ORDERINGS: &str = "JEL_MAX_ORDERINGS";

/// Environment variable for the placeholder backend
pub const ENV_BACKEND: &str = "JEL_BACKEND";

// =============================================================================
// Compile Limit Defaults
// =============================================================================

/// Default maximum nesting depth of expression lists
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Upper bound for `max_depth` (stays below serde_json's recursion limit)
pub const MAX_DEPTH_LIMIT: usize = 127;

/// Default maximum expression input size (64 KiB)
pub const DEFAULT_MAX_INPUT_BYTES: usize = 64 * 1024;

/// Default maximum number of ordering directives
pub const DEFAULT_MAX_ORDERINGS: usize = 50;
