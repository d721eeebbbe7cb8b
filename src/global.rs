//! Process-wide shared state
//!
//! The only mutable state shared between the summary pipeline and the
//! delivery/scheduler paths is the last rendered report. It is replaced
//! atomically on each successful run; readers always observe a complete
//! string or nothing.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use std::sync::RwLock;

/// Last successfully produced summary report, rendered text only.
///
/// Initialized empty at process start, written by the pipeline, read by
/// `!push` and scheduled deliveries.
static LAST_REPORT: Lazy<RwLock<Option<String>>> = Lazy::new(|| RwLock::new(None));

/// Startup timestamp, used for uptime reporting
pub static STARTUP_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Replace the cached report with a freshly rendered one
pub fn set_last_report(report: String) {
    if let Ok(mut guard) = LAST_REPORT.write() {
        *guard = Some(report);
    }
}

/// Get a copy of the cached report, if any run has completed yet
pub fn get_last_report() -> Option<String> {
    match LAST_REPORT.read() {
        Ok(guard) => guard.clone(),
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_cache_round_trip() {
        assert_eq!(get_last_report(), None);
        set_last_report("summary text".to_string());
        assert_eq!(get_last_report().as_deref(), Some("summary text"));
        set_last_report("newer".to_string());
        assert_eq!(get_last_report().as_deref(), Some("newer"));
    }
}
