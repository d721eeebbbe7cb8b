//! Configuration loading and access helpers
//!
//! - Loading configuration from disk (TOML)
//! - Hot-reloading at runtime
//! - Thread-safe access through `with_config`

use super::schemas::Config;
use crate::arguments;
use once_cell::sync::OnceCell;
use std::sync::RwLock;

/// Global configuration instance, the single source of truth
pub static CONFIG: OnceCell<RwLock<Config>> = OnceCell::new();

/// Default configuration file path
pub const CONFIG_FILE_PATH: &str = "data/config.toml";

/// Load configuration from disk and initialize the global CONFIG
///
/// Honors `--config <path>`. If the file does not exist, defaults are used
/// (the bot starts with the transport disabled until a token is configured).
pub fn load_config() -> Result<(), String> {
    let path = arguments::get_arg_value("--config").unwrap_or_else(|| CONFIG_FILE_PATH.to_string());
    load_config_from_path(&path)
}

/// Load configuration from a specific file path
pub fn load_config_from_path(path: &str) -> Result<(), String> {
    let config = if std::path::Path::new(path).exists() {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path, e))?;

        toml::from_str::<Config>(&contents)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path, e))?
    } else {
        eprintln!("⚠️  Config file '{}' not found, using default values", path);
        Config::default()
    };

    CONFIG
        .set(RwLock::new(config))
        .map_err(|_| "Config already initialized".to_string())?;

    Ok(())
}

/// Reload configuration from disk, atomically replacing the current values
pub fn reload_config() -> Result<(), String> {
    let path = arguments::get_arg_value("--config").unwrap_or_else(|| CONFIG_FILE_PATH.to_string());

    let contents = std::fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read config file '{}': {}", path, e))?;
    let new_config = toml::from_str::<Config>(&contents)
        .map_err(|e| format!("Failed to parse config file '{}': {}", path, e))?;

    let lock = CONFIG.get().ok_or("Config not initialized")?;
    let mut guard = lock
        .write()
        .map_err(|_| "Config lock poisoned".to_string())?;
    *guard = new_config;

    Ok(())
}

/// Run a closure against the current configuration
///
/// Initializes defaults if `load_config` was never called (tests, tools).
pub fn with_config<F, R>(f: F) -> R
where
    F: FnOnce(&Config) -> R,
{
    let lock = CONFIG.get_or_init(|| RwLock::new(Config::default()));
    let guard = lock.read().unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&guard)
}
