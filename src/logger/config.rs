//! Logger configuration derived from command-line arguments

use super::levels::LogLevel;
use super::tags::LogTag;
use crate::arguments;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashSet;

/// Runtime logger configuration
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Minimum level shown on console (Error always passes)
    pub min_level: LogLevel,
    /// Tags with debug logging enabled via `--debug-<tag>`
    pub debug_tags: HashSet<String>,
    /// `--debug` without a tag enables debug everywhere
    pub debug_all: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_tags: HashSet::new(),
            debug_all: false,
        }
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> = Lazy::new(|| RwLock::new(LoggerConfig::default()));

/// Build the logger configuration from CMD_ARGS
pub fn init_from_args() {
    let mut config = LoggerConfig::default();

    if arguments::is_verbose_enabled() {
        config.min_level = LogLevel::Verbose;
    } else if arguments::is_quiet_enabled() {
        config.min_level = LogLevel::Error;
    }

    config.debug_all = arguments::has_arg("--debug");
    for arg in arguments::get_cmd_args() {
        if let Some(tag) = arg.strip_prefix("--debug-") {
            config.debug_tags.insert(tag.to_string());
        }
    }

    *LOGGER_CONFIG.write() = config;
}

/// Get a snapshot of the current logger configuration
pub fn get_logger_config() -> LoggerConfig {
    LOGGER_CONFIG.read().clone()
}

/// Check whether debug output is enabled for a tag
pub fn is_debug_enabled_for_tag(tag: &LogTag) -> bool {
    let config = LOGGER_CONFIG.read();
    config.debug_all || config.debug_tags.contains(tag.to_debug_key())
}
