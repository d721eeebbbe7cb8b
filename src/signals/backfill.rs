//! Entry backfill search
//!
//! A closed trade whose entry never appeared in the filtered window is
//! repaired by re-running the extractor over the full per-channel history
//! and picking the most recent entry preceding the exit. "Most recent
//! unmatched" is approximated by the maximum entry time; usage tracking
//! across calls is not maintained.

use crate::apis::llm::LlmClient;
use crate::logger::{self, LogTag};
use crate::signals::extractor;
use crate::signals::types::TradeCandidate;
use chrono::NaiveDateTime;

/// Pick the best entry candidate for an exit from a pre-extracted set
///
/// Predicates: ticker matches case-insensitively, channel matches exactly,
/// entry time present and strictly before the exit time. Among matches the
/// latest entry time wins.
pub fn select_entry(
    candidates: &[TradeCandidate],
    ticker: &str,
    exit_time: NaiveDateTime,
    channel: &str,
) -> Option<TradeCandidate> {
    candidates
        .iter()
        .filter(|c| c.ticker.eq_ignore_ascii_case(ticker))
        .filter(|c| c.channel == channel)
        .filter(|c| matches!(c.entry_time, Some(t) if t < exit_time))
        .max_by_key(|c| c.entry_time)
        .cloned()
}

/// Search a channel's full history for the entry matching an exit
///
/// Runs the extractor with an empty relevant-date set (this is a lookup,
/// not a relevance-filtered pass). Returns `None` when nothing qualifies.
pub async fn find_entry(
    client: &dyn LlmClient,
    historical_lines: &[String],
    ticker: &str,
    exit_time: NaiveDateTime,
    channel: &str,
) -> Option<TradeCandidate> {
    logger::info(
        LogTag::Extract,
        &format!("Searching for entry: {} in {} before {}", ticker, channel, exit_time),
    );

    let candidates = extractor::extract(client, historical_lines, &[]).await;
    let found = select_entry(&candidates, ticker, exit_time, channel);

    if found.is_none() {
        logger::warning(
            LogTag::Extract,
            &format!("No entry found for {} in {} before {}", ticker, channel, exit_time),
        );
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::types::{Relevance, TradeStatus};

    fn entry_candidate(ticker: &str, channel: &str, entry_time: &str) -> TradeCandidate {
        TradeCandidate {
            channel: channel.to_string(),
            ticker: ticker.to_string(),
            instrument_type: None,
            expiry: None,
            entry_price: Some("$1.00".to_string()),
            exit_price: None,
            status: TradeStatus::Open,
            relevance: Relevance::Yes,
            entry_time: Some(
                chrono::NaiveDateTime::parse_from_str(entry_time, "%Y-%m-%d %H:%M").unwrap(),
            ),
            exit_time: None,
        }
    }

    fn exit_at(date: &str) -> NaiveDateTime {
        chrono::NaiveDateTime::parse_from_str(date, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn finds_single_preceding_entry() {
        let candidates = vec![entry_candidate("XYZ", "live-signals-free", "2025-06-02 14:00")];
        let found = select_entry(&candidates, "XYZ", exit_at("2025-06-03 11:00"), "live-signals-free");
        assert!(found.is_some());
    }

    #[test]
    fn latest_of_two_entries_wins() {
        let candidates = vec![
            entry_candidate("XYZ", "live-signals-free", "2025-06-01 10:00"),
            entry_candidate("XYZ", "live-signals-free", "2025-06-02 14:00"),
        ];
        let found = select_entry(&candidates, "XYZ", exit_at("2025-06-03 11:00"), "live-signals-free")
            .unwrap();
        assert_eq!(
            found.entry_time.unwrap(),
            exit_at("2025-06-02 14:00")
        );
    }

    #[test]
    fn entry_after_exit_is_excluded() {
        let candidates = vec![entry_candidate("XYZ", "live-signals-free", "2025-06-03 12:00")];
        assert!(
            select_entry(&candidates, "XYZ", exit_at("2025-06-03 11:00"), "live-signals-free")
                .is_none()
        );
    }

    #[test]
    fn channel_must_match_exactly_ticker_case_insensitively() {
        let candidates = vec![entry_candidate("xyz", "live-signals-tier-1", "2025-06-02 14:00")];
        assert!(
            select_entry(&candidates, "XYZ", exit_at("2025-06-03 11:00"), "live-signals-free")
                .is_none()
        );
        assert!(
            select_entry(&candidates, "XYZ", exit_at("2025-06-03 11:00"), "live-signals-tier-1")
                .is_some()
        );
    }

    #[test]
    fn ignores_dateless_candidates() {
        let mut candidate = entry_candidate("XYZ", "live-signals-free", "2025-06-02 14:00");
        candidate.entry_time = None;
        assert!(
            select_entry(&[candidate], "XYZ", exit_at("2025-06-03 11:00"), "live-signals-free")
                .is_none()
        );
    }
}
