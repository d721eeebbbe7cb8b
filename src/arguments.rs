//! Centralized command-line argument handling
//!
//! Consolidates argument storage and debug-flag checking so modules never
//! touch `env::args()` directly.
//!
//! Features:
//! - Thread-safe CMD_ARGS storage, overridable from tests
//! - `--debug-<tag>` / `--verbose` / `--quiet` flag helpers

use once_cell::sync::Lazy;
use std::env;
use std::sync::Mutex;

/// Global command-line arguments storage
pub static CMD_ARGS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(env::args().collect()));

/// Override the stored arguments (used by tests)
pub fn set_cmd_args(args: Vec<String>) {
    if let Ok(mut cmd_args) = CMD_ARGS.lock() {
        *cmd_args = args;
    }
}

/// Get a copy of the current command-line arguments
pub fn get_cmd_args() -> Vec<String> {
    match CMD_ARGS.lock() {
        Ok(args) => args.clone(),
        Err(_) => env::args().collect(),
    }
}

/// Check if a specific argument is present
pub fn has_arg(arg: &str) -> bool {
    get_cmd_args().iter().any(|a| a == arg)
}

/// Get the value following a flag, e.g. `--config path.toml`
pub fn get_arg_value(flag: &str) -> Option<String> {
    let args = get_cmd_args();
    for (i, arg) in args.iter().enumerate() {
        if arg == flag && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }
    None
}

/// Check if debug logging is requested for a module tag
///
/// `--debug` enables every tag; `--debug-llm`, `--debug-history` etc.
/// enable a single one.
pub fn is_debug_enabled_for(tag_key: &str) -> bool {
    has_arg("--debug") || has_arg(&format!("--debug-{}", tag_key))
}

/// Check if verbose output is requested
pub fn is_verbose_enabled() -> bool {
    has_arg("--verbose")
}

/// Check if warnings should be suppressed
pub fn is_quiet_enabled() -> bool {
    has_arg("--quiet")
}

/// Check if a help printout was requested
pub fn is_help_requested() -> bool {
    has_arg("--help") || has_arg("-h")
}

/// Print usage information for the binary
pub fn print_help() {
    println!("SignalBot - trade signal summary bot");
    println!();
    println!("USAGE:");
    println!("    signalbot [FLAGS]");
    println!();
    println!("FLAGS:");
    println!("    --config <path>     Use an alternative config file");
    println!("    --debug             Enable debug logging for all modules");
    println!("    --debug-<module>    Enable debug logging for one module");
    println!("                        (system, telegram, llm, history, extract,");
    println!("                         reconcile, summary)");
    println!("    --verbose           Enable verbose trace logging");
    println!("    --quiet             Suppress warnings");
    println!("    --help, -h          Show this help");
}
