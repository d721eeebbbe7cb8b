//! Central filtering logic
//!
//! Filtering rules:
//! 1. Errors are always shown
//! 2. Everything else checks the minimum level threshold
//! 3. Debug level additionally requires `--debug` or `--debug-<tag>`

use super::config::{get_logger_config, is_debug_enabled_for_tag};
use super::levels::LogLevel;
use super::tags::LogTag;

/// Check if a log message should be emitted
pub fn should_log(tag: &LogTag, level: LogLevel) -> bool {
    if level == LogLevel::Error {
        return true;
    }

    let config = get_logger_config();

    if level == LogLevel::Debug {
        return is_debug_enabled_for_tag(tag);
    }

    level <= config.min_level
}

/// Filter then delegate to the format module
pub fn log_internal(tag: LogTag, level: LogLevel, message: &str) {
    if !should_log(&tag, level) {
        return;
    }

    super::format::format_and_log(tag, level.as_str(), message);
}
