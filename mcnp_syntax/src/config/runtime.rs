// RUNTIME PREFERENCES (User Experience)

use super::constants::format::{ABS_TOL, REL_TOL};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatPreferences {
    /// Relative tolerance for deciding a number is unchanged
    pub rel_tol: f64,

    /// Absolute tolerance for deciding a number is unchanged
    pub abs_tol: f64,

    /// Target format version, e.g. "6.3.0"
    pub version: String,

    /// Replace non-ASCII characters with spaces while reading
    pub replace_non_ascii: bool,
}

impl Default for FormatPreferences {
    fn default() -> Self {
        Self {
            rel_tol: env::var(env_vars::REL_TOL)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(REL_TOL),
            abs_tol: env::var(env_vars::ABS_TOL)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(ABS_TOL),
            version: env::var(env_vars::FORMAT_VERSION).unwrap_or_else(|_| "6.3.0".to_string()),
            replace_non_ascii: env::var(env_vars::REPLACE_NON_ASCII)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsePreferences {
    /// Downgrade recoverable record errors to warnings
    pub check_mode: bool,

    /// Stop at the first record that fails to parse
    pub fail_fast: bool,
}

impl Default for ParsePreferences {
    fn default() -> Self {
        Self {
            check_mode: env::var(env_vars::CHECK_MODE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            fail_fast: env::var(env_vars::FAIL_FAST)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Whether to enable console output
    pub enable_console_logging: bool,

    /// Minimum level that reaches the logger
    pub min_log_level: LogLevel,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var(env_vars::LOGGING_USE_STRUCTURED)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var(env_vars::LOGGING_ENABLE_CONSOLE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Warning),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Convert to events::LogLevel
    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables)
fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub format: FormatPreferences,
    pub parse: ParsePreferences,
    pub logging: LoggingPreferences,
}

/// Environment variable names for configuration
pub mod env_vars {
    // Formatting
    pub const REL_TOL: &str = "MCNP_REL_TOL";
    pub const ABS_TOL: &str = "MCNP_ABS_TOL";
    pub const FORMAT_VERSION: &str = "MCNP_FORMAT_VERSION";
    pub const REPLACE_NON_ASCII: &str = "MCNP_REPLACE_NON_ASCII";

    // Parsing
    pub const CHECK_MODE: &str = "MCNP_CHECK_MODE";
    pub const FAIL_FAST: &str = "MCNP_FAIL_FAST";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "MCNP_STRUCTURED_LOGGING";
    pub const LOGGING_ENABLE_CONSOLE: &str = "MCNP_CONSOLE_LOGGING";
    pub const LOGGING_MIN_LEVEL: &str = "MCNP_LOG_LEVEL";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("ERROR"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("2"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("debug"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("verbose"), None);
    }

    #[test]
    fn test_format_defaults_are_positive() {
        let prefs = FormatPreferences::default();
        assert!(prefs.rel_tol >= 0.0);
        assert!(prefs.abs_tol >= 0.0);
        assert!(!prefs.version.is_empty());
    }
}
