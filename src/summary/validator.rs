//! Consistency validation of the rendered report
//!
//! A second completion pass cross-checks the rendered text against the
//! structured trade list (count mismatches, open positions leaking into
//! the itemized list) and returns a corrected report. Strictly
//! best-effort: any failure falls back to the uncorrected text so
//! delivery is never blocked.

use crate::apis::llm::{complete_with, LlmClient};
use crate::logger::{self, LogTag};
use crate::reconcile::ReconciledTrade;
use crate::signals::extractor::strip_code_fences;

/// System instructions for the validation call
const SYSTEM_PROMPT: &str =
    "You are a trading assistant that validates trade summaries for accuracy.";

/// Build the validation prompt from the report and structured details
pub fn build_validation_prompt(
    full_message: &str,
    open_count: usize,
    trade_details: &str,
) -> String {
    format!(
        r#"You are a trading assistant tasked with validating a trade summary message for inconsistencies.
The message contains a summary of trading activity, including total trades, wins, losses, and open positions.
It also lists specific trades grouped by channel or date.

Rules:
- Open positions should **only** be counted in the open-position count and should **not** appear in the detailed trade list.
- If an open position is incorrectly listed in the trade details, remove it from the trade list and ensure the open-position count matches the number of open positions.
- Ensure the total trades count equals the sum of wins, losses, and open positions.
- Preserve the original formatting, including emojis, links, and structure, unless corrections are needed.
- If no inconsistencies are found, return the original message unchanged.
- DO NOT add any note of changes made. Just return the corrected message.

Input:
- Total open positions reported: {open_count}
- Trade details: {trade_details}
- Full message:
{full_message}

Output:
- Return the validated or corrected message as a string."#,
    )
}

/// Validate the rendered report, falling back to the original on failure
pub async fn validate(
    client: &dyn LlmClient,
    report: &str,
    open_count: usize,
    trades: &[ReconciledTrade],
) -> String {
    let trade_details = match serde_json::to_string_pretty(trades) {
        Ok(json) => json,
        Err(e) => {
            logger::warning(
                LogTag::Summary,
                &format!("Could not serialize trade details for validation: {}", e),
            );
            return report.to_string();
        }
    };

    let prompt = build_validation_prompt(report, open_count, &trade_details);

    match complete_with(client, SYSTEM_PROMPT, &prompt).await {
        Ok(response) => {
            let corrected = strip_code_fences(&response);
            if corrected.is_empty() {
                logger::warning(LogTag::Summary, "Validation returned empty text, keeping original");
                report.to_string()
            } else {
                corrected
            }
        }
        Err(e) => {
            logger::warning(
                LogTag::Summary,
                &format!("Validation pass failed, keeping original report: {}", e),
            );
            report.to_string()
        }
    }
}
