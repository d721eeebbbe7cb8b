//! Signal extraction via the completion service
//!
//! Builds the extraction prompt (the prompt text is the service contract:
//! it fixes the JSON schema the response must follow), parses the response
//! into typed candidates, and recomputes the relevance flag
//! deterministically so accounting never depends on the model's own
//! date arithmetic.

use crate::apis::llm::{complete_with, LlmClient};
use crate::logger::{self, LogTag};
use crate::signals::types::{Relevance, TradeCandidate, TradeStatus};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// System instructions for every extraction call
pub const SYSTEM_PROMPT: &str =
    "You are a trading assistant that processes signals from chat logs.";

/// Responses may arrive wrapped in markdown code fences
static FENCE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^```(?:json)?|```$").expect("Invalid fence pattern regex"));

/// Build the extraction prompt for a batch of chat lines
///
/// `relevant_dates` seeds the model's own relevance guess; the definitive
/// flag is recomputed in `recompute_relevance` after parsing.
pub fn build_extraction_prompt(lines: &[String], relevant_dates: &[NaiveDate]) -> String {
    let date_list: Vec<String> = relevant_dates
        .iter()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect();

    format!(
        r#"You are a trading assistant. Extract and match real trade signals from chat logs.
Each trade may span multiple days. An entry could happen on one day and the exit on the next.

Return a valid JSON array. Each object must include:
- channel (e.g., "live-signals-tier-3")
- ticker (e.g., "NCIS")
- type (call or put, or null if not specified)
- expiry (or null if not specified)
- entry (e.g., "$1.17" or null if not found)
- exit (e.g., "$2.10" or null if not found)
- status ("open" or "closed")
- summary ("yes" if the trade belongs to {date_list:?}, "no" otherwise)
- entry_time (e.g., "2025-06-02 14:38" or null if not found)
- exit_time (e.g., "2025-06-03 11:04" or null if not found)

Rules:
- Only explicit "Entry TICKER @PRICE" / "Exit TICKER @PRICE" patterns (and close variants) are signals.
- Exclude commentary and guidance lines (e.g. reminders about prior exits) even if they mention a ticker and a price-like token.
- Match "Exit TICKER @PRICE" or "Exit TICKER" with the most recent unmatched entry of the same ticker in the same channel *only if* the exit time is **after** the entry time.
- If an exit is found without a matching entry in the provided logs, include the trade with status="closed", entry=null, entry_time=null, and summary="no".
- Status is "closed" if an exit is found, "open" if only an entry.
- Use date format YYYY-MM-DD HH:MM for entry_time and exit_time.

Chat Messages:
{chat}"#,
        date_list = date_list,
        chat = lines.join("\n"),
    )
}

/// Strip leading/trailing markdown fence markers from a response
pub fn strip_code_fences(raw: &str) -> String {
    FENCE_PATTERN.replace_all(raw.trim(), "").trim().to_string()
}

/// Parse a response body into validated candidates
///
/// Non-JSON input fails the whole batch. Individual candidates violating
/// the schema invariants are dropped with a warning; the rest survive.
pub fn parse_candidates(raw: &str) -> Result<Vec<TradeCandidate>, String> {
    let cleaned = strip_code_fences(raw);

    let candidates: Vec<TradeCandidate> = serde_json::from_str(&cleaned)
        .map_err(|e| format!("Response is not a valid candidate array: {}", e))?;

    let mut valid = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        match candidate.validate() {
            Ok(()) => valid.push(candidate),
            Err(reason) => {
                logger::warning(LogTag::Extract, &format!("Rejected candidate: {}", reason));
            }
        }
    }

    Ok(valid)
}

/// Recompute the relevance flag deterministically
///
/// - Closed trade with an exit time: `yes` iff the exit date is in the
///   requested window.
/// - Open trade: always `yes` (open positions are always reportable).
/// - Anything else: fall back to entry-date membership.
pub fn recompute_relevance(candidates: &mut [TradeCandidate], relevant_dates: &[NaiveDate]) {
    for candidate in candidates.iter_mut() {
        candidate.relevance = match (candidate.status, candidate.exit_date()) {
            (TradeStatus::Open, _) => Relevance::Yes,
            (TradeStatus::Closed, Some(exit_date)) => {
                if relevant_dates.contains(&exit_date) {
                    Relevance::Yes
                } else {
                    Relevance::No
                }
            }
            _ => match candidate.entry_date() {
                Some(entry_date) if relevant_dates.contains(&entry_date) => Relevance::Yes,
                _ => Relevance::No,
            },
        };
    }
}

/// Extract trade candidates from a batch of chat lines
///
/// Any failure (request or parse) is logged and yields an empty batch so
/// one tier's failure never aborts the whole run.
pub async fn extract(
    client: &dyn LlmClient,
    lines: &[String],
    relevant_dates: &[NaiveDate],
) -> Vec<TradeCandidate> {
    if lines.is_empty() {
        return Vec::new();
    }

    let prompt = build_extraction_prompt(lines, relevant_dates);

    let response = match complete_with(client, SYSTEM_PROMPT, &prompt).await {
        Ok(text) => text,
        Err(e) => {
            logger::error(LogTag::Extract, &format!("Extraction request failed: {}", e));
            return Vec::new();
        }
    };

    let mut candidates = match parse_candidates(&response) {
        Ok(candidates) => candidates,
        Err(e) => {
            logger::error(LogTag::Extract, &format!("Extraction parse failed: {}", e));
            return Vec::new();
        }
    };

    recompute_relevance(&mut candidates, relevant_dates);

    logger::debug(
        LogTag::Extract,
        &format!("Extracted {} candidates from {} lines", candidates.len(), lines.len()),
    );

    candidates
}
