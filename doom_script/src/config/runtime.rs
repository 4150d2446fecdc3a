// RUNTIME PREFERENCES (user-adjustable behavior within compile-time limits)

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Read and parse an environment variable, falling back when unset or malformed
fn env_or<T: std::str::FromStr>(name: &str, fallback: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(fallback)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessorPreferences {
    /// Pass newline tokens through to the parser instead of dropping them
    pub emit_newlines: bool,

    /// Match macro names without regard to case
    pub case_insensitive_macros: bool,

    /// Log every directive at debug level
    pub trace_directives: bool,

    /// Tokens macro expansion may deliver per session (capped by MAX_TOKEN_COUNT)
    pub max_expanded_tokens: usize,
}

impl Default for PreprocessorPreferences {
    fn default() -> Self {
        Self {
            emit_newlines: env_or(env_vars::PREPROCESSOR_EMIT_NEWLINES, false),
            case_insensitive_macros: env_or(env_vars::PREPROCESSOR_CASE_INSENSITIVE_MACROS, true),
            trace_directives: env_or(env_vars::PREPROCESSOR_TRACE_DIRECTIVES, false),
            max_expanded_tokens: env_or(
                env_vars::PREPROCESSOR_MAX_EXPANDED_TOKENS,
                crate::config::compile_time::lexical::MAX_TOKEN_COUNT,
            ),
        }
    }
}

impl PreprocessorPreferences {
    /// Effective expansion budget, never above the compile-time token ceiling
    pub fn expansion_limit(&self) -> usize {
        self.max_expanded_tokens
            .min(crate::config::compile_time::lexical::MAX_TOKEN_COUNT)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserPreferences {
    /// Stop collecting diagnostics after this many (capped by MAX_ERROR_COUNT)
    pub max_reported_errors: usize,

    /// Log each resynchronization at debug level
    pub trace_recovery: bool,
}

impl Default for ParserPreferences {
    fn default() -> Self {
        Self {
            max_reported_errors: env_or(
                env_vars::PARSER_MAX_REPORTED_ERRORS,
                crate::config::compile_time::syntax::MAX_ERROR_COUNT,
            ),
            trace_recovery: env_or(env_vars::PARSER_TRACE_RECOVERY, false),
        }
    }
}

impl ParserPreferences {
    /// Effective error cap, never above the compile-time ceiling
    pub fn error_limit(&self) -> usize {
        self.max_reported_errors
            .clamp(1, crate::config::compile_time::syntax::MAX_ERROR_COUNT)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Whether to enable console output
    pub enable_console_logging: bool,

    /// Minimum log level
    pub min_log_level: LogLevel,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_or(env_vars::LOGGING_USE_STRUCTURED, false),
            enable_console_logging: env_or(env_vars::LOGGING_ENABLE_CONSOLE, false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Warning),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
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

    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (environment variables and CLI flags)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

/// Errors loading a preferences file
#[derive(Debug, Clone, thiserror::Error)]
pub enum RuntimeConfigError {
    #[error("Failed to read preferences file {path}: {message}")]
    Read { path: String, message: String },

    #[error("Invalid preferences TOML: {message}")]
    Parse { message: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub preprocessor: PreprocessorPreferences,
    pub parser: ParserPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Parse preferences from TOML; missing sections keep their defaults
    pub fn from_toml_str(text: &str) -> Result<Self, RuntimeConfigError> {
        toml::from_str(text).map_err(|e| RuntimeConfigError::Parse {
            message: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, RuntimeConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| RuntimeConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    pub const PREPROCESSOR_EMIT_NEWLINES: &str = "DOOM_SCRIPT_EMIT_NEWLINES";
    pub const PREPROCESSOR_CASE_INSENSITIVE_MACROS: &str = "DOOM_SCRIPT_CASE_INSENSITIVE_MACROS";
    pub const PREPROCESSOR_TRACE_DIRECTIVES: &str = "DOOM_SCRIPT_TRACE_DIRECTIVES";
    pub const PREPROCESSOR_MAX_EXPANDED_TOKENS: &str = "DOOM_SCRIPT_MAX_EXPANDED_TOKENS";

    pub const PARSER_MAX_REPORTED_ERRORS: &str = "DOOM_SCRIPT_MAX_REPORTED_ERRORS";
    pub const PARSER_TRACE_RECOVERY: &str = "DOOM_SCRIPT_TRACE_RECOVERY";

    pub const LOGGING_USE_STRUCTURED: &str = "DOOM_SCRIPT_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "DOOM_SCRIPT_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "DOOM_SCRIPT_LOGGING_MIN_LEVEL";
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
    fn test_toml_overrides_sections() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            [preprocessor]
            emit_newlines = true
            case_insensitive_macros = false

            [logging]
            min_log_level = "debug"
            "#,
        )
        .unwrap();

        assert!(config.preprocessor.emit_newlines);
        assert!(!config.preprocessor.case_insensitive_macros);
        assert_eq!(config.logging.min_log_level, LogLevel::Debug);
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let result = RuntimeConfig::from_toml_str("[parser\nmax_reported_errors = ");
        assert!(matches!(result, Err(RuntimeConfigError::Parse { .. })));
    }

    #[test]
    fn test_error_limit_is_clamped() {
        let prefs = ParserPreferences {
            max_reported_errors: usize::MAX,
            trace_recovery: false,
        };
        assert_eq!(
            prefs.error_limit(),
            crate::config::compile_time::syntax::MAX_ERROR_COUNT
        );

        let prefs = ParserPreferences {
            max_reported_errors: 0,
            trace_recovery: false,
        };
        assert_eq!(prefs.error_limit(), 1);
    }

    #[test]
    fn test_expansion_limit_is_clamped() {
        let prefs = RuntimeConfig::from_toml_str(
            "[preprocessor]\nmax_expanded_tokens = 9000000000000000",
        )
        .unwrap()
        .preprocessor;
        assert_eq!(
            prefs.expansion_limit(),
            crate::config::compile_time::lexical::MAX_TOKEN_COUNT
        );
    }
}
