//! Log formatting and output with ANSI colors
//!
//! Handles:
//! - Colorized console output with aligned tag and level columns
//! - Dual output (console + file)
//! - Broken pipe handling for piped invocations

use super::file::write_to_file;
use super::tags::LogTag;
use chrono::Local;
use colored::*;
use std::io::{stdout, ErrorKind, Write};

/// Column width for the tag field
const TAG_WIDTH: usize = 10;
/// Column width for the level field
const LEVEL_WIDTH: usize = 8;

/// Format and output a log message to console and file
pub fn format_and_log(tag: LogTag, level: &str, message: &str) {
    let now = Local::now();
    let time = now.format("%H:%M:%S").to_string();

    let console_line = format!(
        "{} [{}] [{}] {}",
        time.dimmed(),
        format_tag(&tag),
        format_level(level),
        message
    );
    print_stdout_safe(&console_line);

    let file_line = format!(
        "{} [{}] [{}] {}",
        now.format("%Y-%m-%d %H:%M:%S"),
        tag.to_plain_string(),
        level,
        message
    );
    write_to_file(&file_line);
}

/// Format a tag with its subsystem color, padded for alignment
fn format_tag(tag: &LogTag) -> ColoredString {
    let padded = format!("{:<width$}", tag.to_plain_string(), width = TAG_WIDTH);
    match tag {
        LogTag::System => padded.bright_yellow().bold(),
        LogTag::Telegram => padded.bright_cyan().bold(),
        LogTag::Llm => padded.bright_magenta().bold(),
        LogTag::History => padded.bright_blue().bold(),
        LogTag::Extract => padded.bright_green().bold(),
        LogTag::Reconcile => padded.bright_white().bold(),
        LogTag::Summary => padded.bright_red().bold(),
    }
}

/// Format a level with its severity color, padded for alignment
fn format_level(level: &str) -> ColoredString {
    let padded = format!("{:<width$}", level, width = LEVEL_WIDTH);
    match level {
        "ERROR" => padded.red().bold(),
        "WARNING" => padded.yellow(),
        "INFO" => padded.green(),
        "DEBUG" => padded.cyan(),
        _ => padded.dimmed(),
    }
}

/// Write a line to stdout, tolerating a closed pipe
fn print_stdout_safe(line: &str) {
    let mut out = stdout();
    if let Err(e) = writeln!(out, "{}", line) {
        if e.kind() == ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
    }
}
