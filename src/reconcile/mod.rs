//! Trade reconciliation
//!
//! Takes the extractor's candidates and produces the deduplicated set of
//! open/closed positions the aggregator works from. Candidate lifecycle:
//!
//! ```text
//! DETECTED ──(closed, entry missing or out-of-window)──> BACKFILLED
//!          ──(entry price still unresolvable)──────────> DROPPED
//!          ──(otherwise)────────────────────────────────> RESOLVED
//! ```
//!
//! Surviving candidates are grouped by `(channel, ticker, entry_time)` in
//! first-seen order; each closed member contributes one exit leg (partial
//! exits collapse into a single trade). A group whose entry price cannot
//! be parsed is dropped with a warning, never a fault.

use crate::logger::{self, LogTag};
use crate::signals::types::{
    parse_price, InstrumentType, Relevance, TradeCandidate, TradeStatus,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// One exit increment of a position
#[derive(Debug, Clone, Serialize)]
pub struct ExitLeg {
    pub exit_price: f64,
    pub percent_change: f64,
    pub duration_minutes: i64,
}

/// One reconciled position, open or closed
#[derive(Debug, Clone, Serialize)]
pub struct ReconciledTrade {
    pub channel: String,
    pub ticker: String,
    pub instrument_type: Option<InstrumentType>,
    pub entry_price: f64,
    pub entry_time: NaiveDateTime,
    pub status: TradeStatus,
    /// Exit legs in extraction order
    pub exits: Vec<ExitLeg>,
    /// More than one exit leg means a partial-exit trade
    pub is_partial: bool,
    /// Last exit's date when closed, entry date when open
    pub trade_date: NaiveDate,
}

impl ReconciledTrade {
    /// Mean percent change across exit legs; 0 for open trades
    pub fn avg_percent_change(&self) -> f64 {
        if self.exits.is_empty() {
            return 0.0;
        }
        self.exits.iter().map(|e| e.percent_change).sum::<f64>() / self.exits.len() as f64
    }

    /// Mean holding duration across exit legs in whole minutes; 0 for open
    pub fn avg_duration_minutes(&self) -> i64 {
        if self.exits.is_empty() {
            return 0;
        }
        self.exits.iter().map(|e| e.duration_minutes).sum::<i64>() / self.exits.len() as i64
    }

    /// Mean exit price across legs, the basis for profit estimation
    pub fn avg_exit_price(&self) -> f64 {
        if self.exits.is_empty() {
            return 0.0;
        }
        self.exits.iter().map(|e| e.exit_price).sum::<f64>() / self.exits.len() as f64
    }

    pub fn is_closed(&self) -> bool {
        self.status == TradeStatus::Closed
    }

    /// A closed trade is a win iff its mean percent change is strictly
    /// positive; zero or negative is a loss. Open trades are neither.
    pub fn is_win(&self) -> bool {
        self.is_closed() && self.avg_percent_change() > 0.0
    }
}

/// Should this candidate trigger the entry backfill search?
///
/// Closed trades whose entry never resolved, or whose relevance came back
/// negative for lack of entry context, get one repair attempt.
pub fn needs_backfill(candidate: &TradeCandidate) -> bool {
    candidate.status == TradeStatus::Closed
        && candidate.exit_time.is_some()
        && (candidate.entry_time.is_none() || candidate.relevance == Relevance::No)
}

/// Merge a backfilled entry into the original exit candidate
///
/// Overwrites entry price/time, prefers the backfilled instrument type and
/// expiry when present, and forces the trade into the reporting window.
pub fn merge_backfilled(candidate: &mut TradeCandidate, found: &TradeCandidate) {
    if found.entry_price.is_none() || found.entry_time.is_none() {
        return;
    }

    candidate.entry_price = found.entry_price.clone();
    candidate.entry_time = found.entry_time;
    candidate.instrument_type = found.instrument_type.or(candidate.instrument_type);
    candidate.expiry = found.expiry.clone().or_else(|| candidate.expiry.clone());
    candidate.relevance = Relevance::Yes;
}

/// Group surviving candidates into reconciled trades
///
/// Only `relevance=yes` candidates participate. Grouping preserves
/// first-seen order so repeated runs over the same candidate list yield
/// identical output.
pub fn group_candidates(candidates: Vec<TradeCandidate>) -> Vec<ReconciledTrade> {
    type GroupKey = (String, String, Option<NaiveDateTime>);
    let mut groups: Vec<(GroupKey, Vec<TradeCandidate>)> = Vec::new();

    for candidate in candidates {
        if candidate.relevance != Relevance::Yes {
            continue;
        }
        let key: GroupKey = (
            candidate.channel.clone(),
            candidate.ticker.clone(),
            candidate.entry_time,
        );
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, members)) => members.push(candidate),
            None => groups.push((key, vec![candidate])),
        }
    }

    let mut trades = Vec::with_capacity(groups.len());
    for ((channel, ticker, entry_time), members) in groups {
        let entry_time = match entry_time {
            Some(t) => t,
            None => {
                logger::warning(
                    LogTag::Reconcile,
                    &format!("Skipping group {} in {}: no entry time", ticker, channel),
                );
                continue;
            }
        };

        let entry_price = match members[0].entry_price.as_deref().and_then(parse_price) {
            Some(price) => price,
            None => {
                logger::warning(
                    LogTag::Reconcile,
                    &format!(
                        "Skipping group {} in {} at {}: entry price {:?} is not a number",
                        ticker, channel, entry_time, members[0].entry_price
                    ),
                );
                continue;
            }
        };

        let mut exits = Vec::new();
        let mut last_exit_time: Option<NaiveDateTime> = None;
        for member in &members {
            if member.status != TradeStatus::Closed {
                continue;
            }
            let (exit_price, exit_time) = match (member.exit_price_value(), member.exit_time) {
                (Some(price), Some(time)) => (price, time),
                _ => {
                    logger::warning(
                        LogTag::Reconcile,
                        &format!(
                            "Ignoring exit leg for {} in {}: unparseable exit {:?}",
                            ticker, channel, member.exit_price
                        ),
                    );
                    continue;
                }
            };

            exits.push(ExitLeg {
                exit_price,
                percent_change: (exit_price - entry_price) / entry_price * 100.0,
                duration_minutes: (exit_time - entry_time).num_minutes(),
            });
            last_exit_time = Some(exit_time);
        }

        let status = if exits.is_empty() {
            TradeStatus::Open
        } else {
            TradeStatus::Closed
        };
        let trade_date = match last_exit_time {
            Some(t) => t.date(),
            None => entry_time.date(),
        };

        trades.push(ReconciledTrade {
            channel,
            ticker,
            instrument_type: members[0].instrument_type,
            entry_price,
            entry_time,
            status,
            is_partial: exits.len() > 1,
            exits,
            trade_date,
        });
    }

    trades
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn candidate(
        ticker: &str,
        entry: Option<&str>,
        exit: Option<&str>,
        status: TradeStatus,
        entry_time: Option<&str>,
        exit_time: Option<&str>,
    ) -> TradeCandidate {
        TradeCandidate {
            channel: "live-signals-tier-1".to_string(),
            ticker: ticker.to_string(),
            instrument_type: Some(InstrumentType::Call),
            expiry: None,
            entry_price: entry.map(String::from),
            exit_price: exit.map(String::from),
            status,
            relevance: Relevance::Yes,
            entry_time: entry_time.map(dt),
            exit_time: exit_time.map(dt),
        }
    }

    #[test]
    fn single_leg_percent_change_round_trip() {
        let trades = group_candidates(vec![candidate(
            "TSLA",
            Some("$2.50"),
            Some("$3.00"),
            TradeStatus::Closed,
            Some("2025-06-02 15:00"),
            Some("2025-06-03 11:04"),
        )]);

        assert_eq!(trades.len(), 1);
        let trade = &trades[0];
        assert!(trade.is_closed());
        assert!((trade.avg_percent_change() - 20.0).abs() < 1e-9);
        assert_eq!(trade.exits[0].duration_minutes, 20 * 60 + 4);
        assert_eq!(trade.trade_date, dt("2025-06-03 11:04").date());
    }

    #[test]
    fn partial_exits_collapse_into_one_trade() {
        let first = candidate(
            "XYZ",
            Some("$1.00"),
            Some("$1.50"),
            TradeStatus::Closed,
            Some("2025-06-02 10:00"),
            Some("2025-06-02 10:30"),
        );
        let second = candidate(
            "XYZ",
            Some("$1.00"),
            Some("$2.00"),
            TradeStatus::Closed,
            Some("2025-06-02 10:00"),
            Some("2025-06-02 11:00"),
        );
        let trades = group_candidates(vec![first, second]);

        assert_eq!(trades.len(), 1);
        let trade = &trades[0];
        assert!(trade.is_partial);
        assert_eq!(trade.exits.len(), 2);
        assert!((trade.avg_percent_change() - 75.0).abs() < 1e-9);
        assert_eq!(trade.avg_duration_minutes(), 45);
        assert_eq!(trade.trade_date, dt("2025-06-02 11:00").date());
    }

    #[test]
    fn unparseable_entry_drops_whole_group() {
        let trades = group_candidates(vec![candidate(
            "BAD",
            Some("market"),
            Some("$2.00"),
            TradeStatus::Closed,
            Some("2025-06-02 10:00"),
            Some("2025-06-02 11:00"),
        )]);
        assert!(trades.is_empty());
    }

    #[test]
    fn open_group_has_zero_metrics() {
        let trades = group_candidates(vec![candidate(
            "ABC",
            Some("$1.00"),
            None,
            TradeStatus::Open,
            Some("2025-06-02 10:00"),
            None,
        )]);

        let trade = &trades[0];
        assert!(!trade.is_closed());
        assert!(!trade.is_win());
        assert_eq!(trade.avg_percent_change(), 0.0);
        assert_eq!(trade.avg_duration_minutes(), 0);
        assert_eq!(trade.trade_date, dt("2025-06-02 10:00").date());
    }

    #[test]
    fn zero_change_is_a_loss() {
        let trades = group_candidates(vec![candidate(
            "FLAT",
            Some("$1.00"),
            Some("$1.00"),
            TradeStatus::Closed,
            Some("2025-06-02 10:00"),
            Some("2025-06-02 10:10"),
        )]);
        assert!(!trades[0].is_win());
    }

    #[test]
    fn irrelevant_candidates_are_excluded() {
        let mut out_of_window = candidate(
            "OLD",
            Some("$1.00"),
            Some("$1.20"),
            TradeStatus::Closed,
            Some("2025-05-01 10:00"),
            Some("2025-05-01 11:00"),
        );
        out_of_window.relevance = Relevance::No;
        assert!(group_candidates(vec![out_of_window]).is_empty());
    }

    #[test]
    fn classification_is_exhaustive_and_exclusive() {
        let trades = group_candidates(vec![
            candidate(
                "WIN",
                Some("$1.00"),
                Some("$1.50"),
                TradeStatus::Closed,
                Some("2025-06-02 10:00"),
                Some("2025-06-02 10:10"),
            ),
            candidate(
                "LOSS",
                Some("$2.00"),
                Some("$1.00"),
                TradeStatus::Closed,
                Some("2025-06-02 10:00"),
                Some("2025-06-02 10:20"),
            ),
            candidate(
                "OPEN",
                Some("$1.00"),
                None,
                TradeStatus::Open,
                Some("2025-06-02 12:00"),
                None,
            ),
        ]);

        let wins = trades.iter().filter(|t| t.is_win()).count();
        let losses = trades.iter().filter(|t| t.is_closed() && !t.is_win()).count();
        let opens = trades.iter().filter(|t| !t.is_closed()).count();
        assert_eq!(wins + losses + opens, trades.len());
        assert_eq!((wins, losses, opens), (1, 1, 1));
    }

    #[test]
    fn backfill_trigger_predicate() {
        // Closed without entry time: needs repair
        let no_entry = candidate(
            "XYZ",
            None,
            Some("$2.00"),
            TradeStatus::Closed,
            None,
            Some("2025-06-03 11:00"),
        );
        assert!(needs_backfill(&no_entry));

        // Closed but flagged out-of-window: needs repair
        let mut stale = candidate(
            "XYZ",
            Some("$1.00"),
            Some("$2.00"),
            TradeStatus::Closed,
            Some("2025-06-02 14:00"),
            Some("2025-06-03 11:00"),
        );
        stale.relevance = Relevance::No;
        assert!(needs_backfill(&stale));

        // Well-formed in-window closed trade: leave alone
        let ok = candidate(
            "XYZ",
            Some("$1.00"),
            Some("$2.00"),
            TradeStatus::Closed,
            Some("2025-06-02 14:00"),
            Some("2025-06-03 11:00"),
        );
        assert!(!needs_backfill(&ok));

        // Open trades never trigger backfill
        let open = candidate(
            "XYZ",
            Some("$1.00"),
            None,
            TradeStatus::Open,
            Some("2025-06-02 14:00"),
            None,
        );
        assert!(!needs_backfill(&open));
    }

    #[test]
    fn merge_prefers_backfilled_values() {
        let mut target = candidate(
            "XYZ",
            None,
            Some("$2.00"),
            TradeStatus::Closed,
            None,
            Some("2025-06-03 11:00"),
        );
        target.instrument_type = None;
        target.relevance = Relevance::No;

        let mut found = candidate(
            "XYZ",
            Some("$1.00"),
            None,
            TradeStatus::Open,
            Some("2025-06-02 14:00"),
            None,
        );
        found.instrument_type = Some(InstrumentType::Put);
        found.expiry = Some("06/20".to_string());

        merge_backfilled(&mut target, &found);
        assert_eq!(target.entry_price.as_deref(), Some("$1.00"));
        assert_eq!(target.entry_time, Some(dt("2025-06-02 14:00")));
        assert_eq!(target.instrument_type, Some(InstrumentType::Put));
        assert_eq!(target.expiry.as_deref(), Some("06/20"));
        assert_eq!(target.relevance, Relevance::Yes);
    }

    #[test]
    fn merge_without_entry_data_is_a_no_op() {
        let mut target = candidate(
            "XYZ",
            None,
            Some("$2.00"),
            TradeStatus::Closed,
            None,
            Some("2025-06-03 11:00"),
        );
        target.relevance = Relevance::No;

        let found = candidate("XYZ", None, None, TradeStatus::Open, None, None);
        merge_backfilled(&mut target, &found);
        assert!(target.entry_price.is_none());
        assert_eq!(target.relevance, Relevance::No);
    }
}
