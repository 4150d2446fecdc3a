//! Global logging for the script toolchain
//!
//! A write-once global [`LoggingService`] plus the helper functions the
//! logging macros expand to. Logging before initialization is a no-op.

pub mod codes;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use crate::utils::SourceLocation;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

/// Initialize global logging from runtime preferences
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    let service = Arc::new(service::create_configured_service());
    GLOBAL_LOGGER
        .set(service.clone())
        .map_err(|_| "Global logger already initialized".to_string())?;

    service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));
    Ok(())
}

/// Initialize with a caller-provided service
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

/// Whether an event at `level` would reach the global logger
pub fn is_enabled(level: LogLevel) -> bool {
    try_get_global_logger()
        .map(|logger| logger.should_log(level))
        .unwrap_or(false)
}

fn attach_context(mut event: LogEvent, context: Vec<(&str, &str)>) -> LogEvent {
    for (key, value) in context {
        event = event.with_context(key, value);
    }
    event
}

/// Used by `log_error!`
pub fn log_error_with_context(
    code: Code,
    message: &str,
    location: Option<SourceLocation>,
    context: Vec<(&str, &str)>,
) {
    let Some(logger) = try_get_global_logger() else {
        return;
    };
    let mut event = attach_context(LogEvent::error(code, message), context);
    if let Some(loc) = location {
        event = event.with_location(loc);
    }
    logger.log_event(event);
}

/// Used by `log_success!`
pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(attach_context(LogEvent::success(code, message), context));
    }
}

/// Used by `log_info!`, `log_warning!` and `log_debug!`
pub fn log_with_level(level: LogLevel, message: &str, context: Vec<(&str, &str)>) {
    let Some(logger) = try_get_global_logger() else {
        return;
    };
    let event = match level {
        LogLevel::Error => LogEvent::error(codes::system::INTERNAL_ERROR, message),
        LogLevel::Warning => LogEvent::warning(message),
        LogLevel::Info => LogEvent::info(message),
        LogLevel::Debug => LogEvent::debug(message),
    };
    logger.log_event(attach_context(event, context));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpers_are_safe_without_initialization() {
        log_error_with_context(codes::system::INTERNAL_ERROR, "boom", None, vec![]);
        log_success_with_context(codes::success::PARSE_COMPLETE, "ok", vec![("k", "v")]);
        log_with_level(LogLevel::Debug, "trace", vec![]);
    }

    // The only test that installs the global service
    #[test]
    fn test_installed_service_receives_pipeline_events() {
        use crate::lexical::Tokenizer;
        use crate::patch::{parse_patch, patch_kernel};

        let memory = Arc::new(MemoryLogger::new());
        let service = Arc::new(LoggingService::new(memory.clone(), LogLevel::Info));
        init_global_logging_with_service(service).unwrap();
        assert!(is_initialized());
        assert!(init_global_logging_with_service(Arc::new(LoggingService::new(
            Arc::new(MemoryLogger::new()),
            LogLevel::Info,
        )))
        .is_err());

        let source = Tokenizer::new(patch_kernel(), "logged.dh", "thing 1 { health \"open");
        assert!(parse_patch(source, &Default::default()).is_err());
        let lexical = memory
            .get_errors()
            .into_iter()
            .find(|event| event.code == codes::lexical::UNTERMINATED_STRING)
            .unwrap();
        assert_eq!(lexical.location.unwrap().stream_name(), "logged.dh");

        let source = Tokenizer::new(patch_kernel(), "logged.dh", "ammo 1 { max 2 }");
        assert!(parse_patch(source, &Default::default()).is_ok());
        assert!(memory.has_success_with_code(codes::success::PARSE_COMPLETE));
    }

    #[test]
    fn test_debug_disabled_without_logger() {
        if !is_initialized() {
            assert!(!is_enabled(LogLevel::Debug));
        }
    }
}
