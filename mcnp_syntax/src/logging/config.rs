//! Configuration access for logging
//!
//! Buffer limits come from the generated compile-time constants; verbosity
//! and output style are runtime preferences.

use crate::config::compile_time::logging::*;
use crate::config::runtime::LoggingPreferences;

type EventsLogLevel = crate::logging::events::LogLevel;

fn get_runtime_preferences() -> LoggingPreferences {
    LoggingPreferences::default()
}

/// Get minimum log level
pub fn get_min_log_level() -> EventsLogLevel {
    get_runtime_preferences().min_log_level.to_events_log_level()
}

/// Check if structured logging is enabled
pub fn use_structured_logging() -> bool {
    get_runtime_preferences().use_structured_logging
}

/// Check if console logging is enabled
pub fn use_console_logging() -> bool {
    get_runtime_preferences().enable_console_logging
}

/// Size of the in-memory event buffer
pub fn get_error_buffer_size() -> usize {
    LOG_BUFFER_SIZE
}

/// Maximum events kept for a single file
pub fn get_max_log_events_per_file() -> usize {
    MAX_LOG_EVENTS_PER_FILE
}

/// Maximum length of a logged context value
pub fn get_max_log_message_length() -> usize {
    MAX_LOG_MESSAGE_LENGTH
}

/// Maximum errors retained by the collector across all files
pub fn get_max_error_collection() -> usize {
    MAX_ERROR_COLLECTION
}

/// Validate current configuration settings
pub fn validate_config() -> Result<(), String> {
    if LOG_BUFFER_SIZE < 100 {
        return Err(format!("Log buffer size too small: {}", LOG_BUFFER_SIZE));
    }

    if MAX_LOG_EVENTS_PER_FILE > LOG_BUFFER_SIZE {
        return Err("Max log events per file exceeds total buffer size".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        assert!(validate_config().is_ok());
    }
}
