//! Plain-text command parsing
//!
//! Commands arrive as ordinary chat messages in the command chat:
//!
//! ```text
//! !data <today|week|month>        run a summary and cache the report
//! !push [test|live] [time]        deliver the cached report; time is
//!                                 HH:MM, "open" (09:30) or "close" (16:00)
//! !parse                          resync the history dump
//! !kill                           graceful shutdown
//! ```
//!
//! Parsing is pure; execution lives in the service module.

use crate::summary::SummaryMode;
use chrono::NaiveTime;
use once_cell::sync::Lazy;
use regex::Regex;

static CLOCK_TIME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}:\d{2}$").expect("Invalid clock time regex"));

/// Where a pushed report goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushDest {
    Test,
    Live,
}

impl PushDest {
    pub fn label(&self) -> &'static str {
        match self {
            PushDest::Test => "test",
            PushDest::Live => "live",
        }
    }
}

/// When a pushed report goes out
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PushWhen {
    Immediate,
    At(NaiveTime),
}

/// One parsed command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Data(SummaryMode),
    Push { dest: PushDest, when: PushWhen },
    Parse,
    Kill,
}

const PUSH_USAGE: &str = "❌ Invalid usage. Examples:\n\
    `!push test`\n\
    `!push live close`\n\
    `!push test 14:30`";

/// Parse a chat message into a command
///
/// Returns `None` for anything that is not a known command; `Some(Err)`
/// carries a user-facing usage message for malformed invocations.
pub fn parse_command(text: &str) -> Option<Result<Command, String>> {
    let tokens: Vec<String> = text
        .trim()
        .split_whitespace()
        .map(|t| t.to_lowercase())
        .collect();
    let first = tokens.first()?.as_str();

    match first {
        "!data" => {
            if tokens.len() != 2 {
                return Some(Err(
                    "❌ Invalid usage. Use `!data today`, `!data week`, or `!data month`."
                        .to_string(),
                ));
            }
            Some(tokens[1].parse::<SummaryMode>().map(Command::Data).map_err(|e| format!("❌ {}", e)))
        }
        "!push" => Some(parse_push(&tokens)),
        "!parse" => Some(Ok(Command::Parse)),
        "!kill" => Some(Ok(Command::Kill)),
        _ => None,
    }
}

fn parse_push(tokens: &[String]) -> Result<Command, String> {
    let dest = match tokens.get(1).map(String::as_str) {
        None | Some("test") => PushDest::Test,
        Some("live") => PushDest::Live,
        Some(_) => return Err(PUSH_USAGE.to_string()),
    };

    match tokens.len() {
        1 | 2 => Ok(Command::Push {
            dest,
            when: PushWhen::Immediate,
        }),
        3 => {
            let time = parse_push_time(&tokens[2])?;
            Ok(Command::Push {
                dest,
                when: PushWhen::At(time),
            })
        }
        _ => Err(PUSH_USAGE.to_string()),
    }
}

/// Parse a push time argument: market aliases or 24-hour clock
pub fn parse_push_time(arg: &str) -> Result<NaiveTime, String> {
    match arg {
        "open" => Ok(NaiveTime::from_hms_opt(9, 30, 0).expect("static time")),
        "close" => Ok(NaiveTime::from_hms_opt(16, 0, 0).expect("static time")),
        other => {
            if !CLOCK_TIME_PATTERN.is_match(other) {
                return Err(
                    "❌ Invalid time format. Use `!push <test|live> HH:MM`, \
                     `!push <test|live> open`, or `!push <test|live> close`."
                        .to_string(),
                );
            }
            NaiveTime::parse_from_str(other, "%H:%M").map_err(|_| {
                "❌ Invalid time. Please use a valid 24-hour format (e.g., `16:00`).".to_string()
            })
        }
    }
}
