//! The summary pipeline
//!
//! One run, strictly sequential: load history, snapshot the filtered
//! window, extract per tier, repair missing entries, reconcile, aggregate,
//! validate, cache. No sub-step failure escapes the run; it either
//! completes with best-effort data or returns one user-facing error.

use crate::apis::llm::get_llm_client;
use crate::config::{with_config, SignalsConfig};
use crate::global;
use crate::history::{filter_by_dates, HistoryStore};
use crate::logger::{self, LogTag};
use crate::reconcile::{group_candidates, merge_backfilled, needs_backfill};
use crate::signals::backfill;
use crate::signals::extractor;
use crate::signals::types::TradeCandidate;
use crate::summary::validator;
use crate::summary::{aggregate, trading_days, SummaryMode};
use async_trait::async_trait;
use chrono::{Local, NaiveDate};

/// Destination for user-visible progress messages during a run
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn say(&self, message: &str);
}

/// Sink that swallows progress (tests, headless runs)
pub struct NullProgress;

#[async_trait]
impl ProgressSink for NullProgress {
    async fn say(&self, _message: &str) {}
}

/// Run a trade summary for the current date
pub async fn run_trade_summary(
    mode: SummaryMode,
    progress: &dyn ProgressSink,
) -> Result<String, String> {
    run_trade_summary_at(mode, Local::now().date_naive(), progress).await
}

/// Run a trade summary against an explicit reference date
pub async fn run_trade_summary_at(
    mode: SummaryMode,
    today: NaiveDate,
    progress: &dyn ProgressSink,
) -> Result<String, String> {
    logger::info(
        LogTag::Summary,
        &format!("Starting trade summary for: {}", mode),
    );

    let dates = trading_days(mode, today);
    if dates.is_empty() && mode != SummaryMode::Today {
        return Err(format!("No trading days in the requested `{}` window.", mode));
    }

    progress
        .say(&format!("📥 Collecting messages for `{}`...", mode))
        .await;

    let signals: SignalsConfig = with_config(|c| c.signals.clone());
    let store = HistoryStore::from_config();

    let buckets = store
        .load_tier_lines(&signals.tiers)
        .map_err(|e| format!("Error reading channel dump: {}", e))?;

    // Audit snapshot of everything in the window, across all tiers
    let window_lines: Vec<String> = buckets
        .iter()
        .flat_map(|b| filter_by_dates(&b.lines, &dates))
        .collect();
    if let Err(e) = store.write_snapshot(&window_lines, mode.as_str(), today) {
        logger::warning(LogTag::Summary, &format!("Snapshot write failed: {}", e));
    }

    progress.say("📊 Parsing signals by tier...").await;

    let client = get_llm_client();
    let mut candidates: Vec<TradeCandidate> = Vec::new();
    for bucket in &buckets {
        let tier_window = filter_by_dates(&bucket.lines, &dates);
        if tier_window.is_empty() {
            continue;
        }
        progress
            .say(&format!("🤖 Prompting {}...", bucket.tier.display_name))
            .await;
        candidates.extend(extractor::extract(&*client, &tier_window, &dates).await);
    }

    // Repair pass: closed trades whose entry never resolved get one search
    // over the full per-channel history
    for candidate in candidates.iter_mut() {
        if !needs_backfill(candidate) {
            continue;
        }
        let exit_time = match candidate.exit_time {
            Some(t) => t,
            None => continue,
        };
        progress
            .say(&format!(
                "🔍 Looking for entry for {} in {} before {}",
                candidate.ticker, candidate.channel, exit_time
            ))
            .await;

        let channel_history = buckets
            .iter()
            .find(|b| b.tier.channel == candidate.channel)
            .map(|b| b.lines.as_slice());
        let Some(channel_history) = channel_history else {
            logger::warning(
                LogTag::Reconcile,
                &format!("No history bucket for channel {}", candidate.channel),
            );
            continue;
        };

        if let Some(found) = backfill::find_entry(
            &*client,
            channel_history,
            &candidate.ticker,
            exit_time,
            &candidate.channel,
        )
        .await
        {
            merge_backfilled(candidate, &found);
        }
    }

    let trades = group_candidates(candidates);
    let report = aggregate(&trades, mode, today, &signals);

    let validated = validator::validate(&*client, &report.body, report.open_count, &trades).await;

    global::set_last_report(validated.clone());
    logger::info(
        LogTag::Summary,
        &format!(
            "Trade summary complete: {} wins, {} losses, {} open",
            report.win_count, report.loss_count, report.open_count
        ),
    );

    Ok(validated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apis::llm::{ChatRequest, ChatResponse, LlmClient, LlmError, Usage};
    use crate::reconcile::group_candidates;
    use crate::signals::extractor::parse_candidates;

    /// Completion stub that always returns the same canned text
    struct CannedClient {
        response: String,
    }

    #[async_trait]
    impl LlmClient for CannedClient {
        fn provider(&self) -> &'static str {
            "canned"
        }

        fn is_enabled(&self) -> bool {
            true
        }

        async fn call(&self, _request: ChatRequest) -> Result<ChatResponse, LlmError> {
            Ok(ChatResponse {
                content: self.response.clone(),
                usage: Usage::new(0, 0),
                finish_reason: "stop".to_string(),
                model: "canned".to_string(),
                latency_ms: 0.0,
            })
        }
    }

    /// Completion stub that always fails
    struct FailingClient;

    #[async_trait]
    impl LlmClient for FailingClient {
        fn provider(&self) -> &'static str {
            "failing"
        }

        fn is_enabled(&self) -> bool {
            true
        }

        async fn call(&self, _request: ChatRequest) -> Result<ChatResponse, LlmError> {
            Err(LlmError::NetworkError {
                provider: "failing".to_string(),
                message: "connection refused".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn validator_failure_keeps_original_report() {
        let report = "Total Trades: 1 (1 Win, 0 Losses, 0 Open Positions)";
        let validated = validator::validate(&FailingClient, report, 0, &[]).await;
        assert_eq!(validated, report);
    }

    #[tokio::test]
    async fn validator_echo_returns_identical_text() {
        let report = "Total Trades: 1 (1 Win, 0 Losses, 0 Open Positions)";
        let echo = CannedClient {
            response: report.to_string(),
        };
        let validated = validator::validate(&echo, report, 0, &[]).await;
        assert_eq!(validated, report);
    }

    #[tokio::test]
    async fn extraction_failure_yields_empty_batch() {
        let lines = vec!["live-signals-free [2025-06-02 14:38] alice: Entry NCIS @ $1.17".to_string()];
        let candidates = extractor::extract(&FailingClient, &lines, &[]).await;
        assert!(candidates.is_empty());

        let garbage = CannedClient {
            response: "no trades found, sorry!".to_string(),
        };
        let candidates = extractor::extract(&garbage, &lines, &[]).await;
        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn extracted_batch_flows_into_reconciliation() {
        let response = r#"```json
        [{
            "channel": "live-signals-free",
            "ticker": "NCIS",
            "type": "call",
            "expiry": null,
            "entry": "$1.00",
            "exit": "$1.50",
            "status": "closed",
            "summary": "yes",
            "entry_time": "2025-06-03 10:00",
            "exit_time": "2025-06-03 10:10"
        }]
        ```"#;
        let client = CannedClient {
            response: response.to_string(),
        };
        let lines = vec!["live-signals-free [2025-06-03 10:00] alice: Entry NCIS @ $1.00".to_string()];
        let dates = vec![chrono::NaiveDate::from_ymd_opt(2025, 6, 3).unwrap()];

        let candidates = extractor::extract(&client, &lines, &dates).await;
        assert_eq!(candidates.len(), 1);

        let trades = group_candidates(candidates);
        assert_eq!(trades.len(), 1);
        assert!(trades[0].is_win());
    }

    #[test]
    fn canned_fixture_parses_without_fences() {
        // guard against the fixture drifting out of schema
        let json = r#"[{
            "channel": "live-signals-free", "ticker": "NCIS", "type": "call",
            "entry": "$1.00", "exit": "$1.50", "status": "closed", "summary": "yes",
            "entry_time": "2025-06-03 10:00", "exit_time": "2025-06-03 10:10"
        }]"#;
        assert_eq!(parse_candidates(json).unwrap().len(), 1);
    }
}
