//! Filesystem layout for SignalBot
//!
//! All runtime data lives under `data/`:
//! - `data/config.toml`        runtime configuration
//! - `data/logs/`              daily log files
//! - `data/snapshots/`         per-run filtered signal snapshots (audit trail)
//! - `data/full_channel_dump.txt`  flat append-only chat history store

use std::path::PathBuf;

/// Root directory for all runtime data
pub fn get_data_dir() -> PathBuf {
    PathBuf::from("data")
}

/// Directory for log files
pub fn get_logs_dir() -> PathBuf {
    get_data_dir().join("logs")
}

/// Directory for per-run signal snapshots
pub fn get_snapshots_dir() -> PathBuf {
    get_data_dir().join("snapshots")
}

/// Path to the runtime configuration file
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

/// Default path to the flat channel history dump
pub fn get_history_dump_path() -> PathBuf {
    get_data_dir().join("full_channel_dump.txt")
}

/// Create all required directories if they do not exist
///
/// Must run before logger initialization (the logger needs the logs
/// directory to create its files).
pub fn ensure_all_directories() -> std::io::Result<()> {
    std::fs::create_dir_all(get_data_dir())?;
    std::fs::create_dir_all(get_logs_dir())?;
    std::fs::create_dir_all(get_snapshots_dir())?;
    Ok(())
}
