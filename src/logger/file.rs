//! File persistence for log output
//!
//! One plain-text log file per day under `data/logs/`, append-only.

use crate::paths;
use chrono::Local;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;

static LOG_FILE: Lazy<Mutex<Option<File>>> = Lazy::new(|| Mutex::new(None));

/// Open today's log file for appending
pub fn init_file_logging() {
    let path = paths::get_logs_dir().join(format!("signalbot_{}.log", Local::now().format("%Y%m%d")));

    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => {
            *LOG_FILE.lock() = Some(file);
        }
        Err(e) => {
            eprintln!("Failed to open log file {}: {}", path.display(), e);
        }
    }
}

/// Append a line to the log file; console output is unaffected on failure
pub fn write_to_file(line: &str) {
    let mut guard = LOG_FILE.lock();
    if let Some(file) = guard.as_mut() {
        let _ = writeln!(file, "{}", line);
    }
}

/// Flush pending writes to disk
pub fn flush_file_logging() {
    let mut guard = LOG_FILE.lock();
    if let Some(file) = guard.as_mut() {
        let _ = file.flush();
    }
}
