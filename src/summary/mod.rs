//! Summary aggregation and rendering
//!
//! Turns reconciled trades into the published report: win/loss/open counts,
//! price-weighted average percent change, estimated aggregate profit, and
//! a body grouped by tier (today/month) or by calendar day (week).
//!
//! Aggregation is a pure function of its inputs so re-running it over the
//! same trade set yields byte-identical text.

pub mod calendar;
pub mod pipeline;
pub mod validator;

pub use calendar::{trading_days, SummaryMode};

use crate::config::SignalsConfig;
use crate::reconcile::ReconciledTrade;
use chrono::{Datelike, NaiveDate, Weekday};

/// Aggregated summary for one reporting window
#[derive(Debug, Clone)]
pub struct SummaryReport {
    pub mode: SummaryMode,
    pub win_count: usize,
    pub loss_count: usize,
    pub open_count: usize,
    /// Price-weighted average percent change across closed trades
    pub average_percent_change: f64,
    /// Sum over closed trades of (mean exit price - entry price)
    pub estimated_profit: f64,
    /// Rendered report text
    pub body: String,
}

/// Build the summary report for a trade set
pub fn aggregate(
    trades: &[ReconciledTrade],
    mode: SummaryMode,
    today: NaiveDate,
    signals: &SignalsConfig,
) -> SummaryReport {
    let win_count = trades.iter().filter(|t| t.is_win()).count();
    let loss_count = trades.iter().filter(|t| t.is_closed() && !t.is_win()).count();
    let open_count = trades.iter().filter(|t| !t.is_closed()).count();

    let closed: Vec<&ReconciledTrade> = trades.iter().filter(|t| t.is_closed()).collect();
    let average_percent_change = round2(weighted_average(&closed));
    let estimated_profit = round2(
        closed
            .iter()
            .map(|t| t.avg_exit_price() - t.entry_price)
            .sum::<f64>(),
    );

    let mut report = SummaryReport {
        mode,
        win_count,
        loss_count,
        open_count,
        average_percent_change,
        estimated_profit,
        body: String::new(),
    };

    report.body = match mode {
        SummaryMode::Week => render_week(&report, trades, today, signals),
        _ => render_tiered(&report, trades, today, signals),
    };

    report
}

/// Price-weighted mean percent change: Σ(pct·entry) / Σ(entry)
///
/// Returns 0 when there are no closed trades or the weight sum is zero.
fn weighted_average(closed: &[&ReconciledTrade]) -> f64 {
    let weight_sum: f64 = closed.iter().map(|t| t.entry_price).sum();
    if closed.is_empty() || weight_sum == 0.0 {
        return 0.0;
    }
    let weighted: f64 = closed
        .iter()
        .map(|t| t.avg_percent_change() * t.entry_price)
        .sum();
    weighted / weight_sum
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 {
        one
    } else {
        many
    }
}

/// Totals line shared by every mode
///
/// The monthly figure counts only closed trades; daily and weekly include
/// open positions in the total.
fn totals_line(report: &SummaryReport) -> String {
    let total = match report.mode {
        SummaryMode::Month => report.win_count + report.loss_count,
        _ => report.win_count + report.loss_count + report.open_count,
    };
    format!(
        "Total Trades: {} ({} {}, {} {}, {} {})\n",
        total,
        report.win_count,
        plural(report.win_count, "Win", "Wins"),
        report.loss_count,
        plural(report.loss_count, "Loss", "Losses"),
        report.open_count,
        plural(report.open_count, "Open Position", "Open Positions"),
    )
}

/// Fire-tier marker for a closed trade's percent change
fn fire_tier(percent_change: f64) -> &'static str {
    if percent_change >= 50.0 {
        "🔥🔥🔥"
    } else if percent_change >= 0.0 {
        "🔥📈"
    } else {
        ""
    }
}

/// One itemized trade line
///
/// `"{ticker} {type} @ ${entry}"`, then the exit clause for closed trades:
/// single exits carry the holding duration, partial exits list every leg.
fn format_trade_line(trade: &ReconciledTrade) -> String {
    let mut line = match trade.instrument_type {
        Some(instrument) => format!(
            "- {} {} @ ${:.2}",
            trade.ticker, instrument, trade.entry_price
        ),
        None => format!("- {} @ ${:.2}", trade.ticker, trade.entry_price),
    };

    if !trade.is_closed() {
        return line;
    }

    let pct = round2(trade.avg_percent_change());
    let pct_str = if pct >= 0.0 {
        format!("{:.2}% gain", pct)
    } else {
        format!("{:.2}% loss", pct.abs())
    };

    if trade.is_partial {
        let exits: Vec<String> = trade
            .exits
            .iter()
            .map(|e| format!("${:.2}", e.exit_price))
            .collect();
        line.push_str(&format!(
            ". Sold some at {} for a {}",
            exits.join(", "),
            pct_str
        ));
    } else {
        line.push_str(&format!(
            ". Sold at ${:.2} {}m later for a {}",
            trade.exits[0].exit_price,
            trade.avg_duration_minutes(),
            pct_str
        ));
    }

    let emoji = fire_tier(pct);
    if !emoji.is_empty() {
        line.push(' ');
        line.push_str(emoji);
    }

    line
}

/// Daily and monthly bodies: grouped by tier in configured order
fn render_tiered(
    report: &SummaryReport,
    trades: &[ReconciledTrade],
    today: NaiveDate,
    signals: &SignalsConfig,
) -> String {
    let title = match report.mode {
        SummaryMode::Month => format!("Monthly Trade Summary for {}", today.format("%B")),
        _ => format!("Daily Trade Summary for {}", today.format("%m/%d/%Y")),
    };

    let mut body = format!("<b>{}</b>\n\n", title);
    body.push_str(&totals_line(report));
    body.push_str(&format!(
        "Average Percent Increase: {:.2}%\n\n",
        report.average_percent_change
    ));

    // Configured tiers first, then any channel the config does not know,
    // in first-seen order
    let mut channels: Vec<&str> = signals.tiers.iter().map(|t| t.channel.as_str()).collect();
    for trade in trades {
        if !channels.contains(&trade.channel.as_str()) {
            channels.push(trade.channel.as_str());
        }
    }

    for channel in channels {
        let channel_trades: Vec<&ReconciledTrade> =
            trades.iter().filter(|t| t.channel == channel).collect();
        if channel_trades.is_empty() {
            continue;
        }

        let heading = signals
            .tier_for_channel(channel)
            .map(|t| t.display_name.clone())
            .unwrap_or_else(|| channel.to_string());
        body.push_str(&format!("{}:\n", heading));
        for trade in channel_trades {
            body.push_str(&format_trade_line(trade));
            body.push('\n');
        }
        body.push('\n');
    }

    if report.mode == SummaryMode::Month {
        body.push_str(&format!(
            "If you bought one contract for each trade this month, you would've made ${:.2}\n\n",
            report.estimated_profit
        ));
    }

    body.push_str(&signals.footer);
    body.push('\n');
    body
}

/// Weekly body: per-day sub-totals keyed on each trade's defining date
fn render_week(
    report: &SummaryReport,
    trades: &[ReconciledTrade],
    today: NaiveDate,
    signals: &SignalsConfig,
) -> String {
    let mut body = format!(
        "<b>Weekly Trade Summary for {}</b>\n\n",
        today.format("%m/%d/%Y")
    );
    body.push_str(&totals_line(report));
    body.push_str(&format!(
        "Average Percent Increase: {:.2}%\n\n",
        report.average_percent_change
    ));

    let mut days: Vec<NaiveDate> = trades.iter().map(|t| t.trade_date).collect();
    days.sort();
    days.dedup();

    for day in days {
        let day_trades: Vec<&ReconciledTrade> =
            trades.iter().filter(|t| t.trade_date == day).collect();
        let day_closed: Vec<&ReconciledTrade> =
            day_trades.iter().filter(|t| t.is_closed()).copied().collect();
        let day_wins = day_closed.iter().filter(|t| t.is_win()).count();
        let day_losses = day_closed.len() - day_wins;
        let day_avg = round2(weighted_average(&day_closed));

        body.push_str(&format!(
            "{} ({}):\n",
            day_name(day.weekday()),
            day.format("%m/%d/%Y")
        ));
        body.push_str(&format!(
            "- Total Trades: {} ({} {}, {} {})\n",
            day_trades.len(),
            day_wins,
            plural(day_wins, "Win", "Wins"),
            day_losses,
            plural(day_losses, "Loss", "Losses"),
        ));
        body.push_str(&format!("- Average Percent Increase: {:.2}%\n\n", day_avg));
    }

    body.push_str(&format!(
        "If you bought one contract for each trade this week, you would've made ${:.2}\n\n",
        report.estimated_profit
    ));

    body.push_str(&signals.footer);
    body.push('\n');
    body
}

fn day_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::ExitLeg;
    use crate::signals::types::TradeStatus;
    use chrono::NaiveDateTime;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn closed_trade(
        ticker: &str,
        entry_price: f64,
        exits: Vec<(f64, i64)>,
        entry_time: &str,
        trade_date: (i32, u32, u32),
    ) -> ReconciledTrade {
        let legs: Vec<ExitLeg> = exits
            .iter()
            .map(|(price, minutes)| ExitLeg {
                exit_price: *price,
                percent_change: (price - entry_price) / entry_price * 100.0,
                duration_minutes: *minutes,
            })
            .collect();
        ReconciledTrade {
            channel: "live-signals-free".to_string(),
            ticker: ticker.to_string(),
            instrument_type: None,
            entry_price,
            entry_time: dt(entry_time),
            status: TradeStatus::Closed,
            is_partial: legs.len() > 1,
            exits: legs,
            trade_date: NaiveDate::from_ymd_opt(trade_date.0, trade_date.1, trade_date.2).unwrap(),
        }
    }

    fn open_trade(ticker: &str, entry_price: f64, entry_time: &str) -> ReconciledTrade {
        ReconciledTrade {
            channel: "live-signals-free".to_string(),
            ticker: ticker.to_string(),
            instrument_type: None,
            entry_price,
            entry_time: dt(entry_time),
            status: TradeStatus::Open,
            exits: Vec::new(),
            is_partial: false,
            trade_date: dt(entry_time).date(),
        }
    }

    fn reference_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 3).unwrap()
    }

    #[test]
    fn weighted_average_balances_by_entry_price() {
        // entries [10, 20], changes [+10%, -5%]:
        // (10*10 + 20*-5) / 30 = 0.00
        let trades = vec![
            closed_trade("AAA", 10.0, vec![(11.0, 30)], "2025-06-03 10:00", (2025, 6, 3)),
            closed_trade("BBB", 20.0, vec![(19.0, 30)], "2025-06-03 10:00", (2025, 6, 3)),
        ];
        let report = aggregate(&trades, SummaryMode::Today, reference_date(), &SignalsConfig::default());
        assert_eq!(report.average_percent_change, 0.0);
        assert!(report.body.contains("Average Percent Increase: 0.00%"));
    }

    #[test]
    fn today_scenario_one_win_one_open() {
        let trades = vec![
            closed_trade("NCIS", 1.0, vec![(1.5, 10)], "2025-06-03 10:00", (2025, 6, 3)),
            open_trade("ABC", 1.0, "2025-06-03 12:00"),
        ];
        let report = aggregate(&trades, SummaryMode::Today, reference_date(), &SignalsConfig::default());

        assert_eq!((report.win_count, report.loss_count, report.open_count), (1, 0, 1));
        assert!(report
            .body
            .contains("Total Trades: 2 (1 Win, 0 Losses, 1 Open Position)"));
        assert!(report.body.contains("Average Percent Increase: 50.00%"));
        assert!(report
            .body
            .contains("- NCIS @ $1.00. Sold at $1.50 10m later for a 50.00% gain 🔥🔥🔥"));
        // Open position renders with no exit clause
        assert!(report.body.contains("- ABC @ $1.00\n"));
    }

    #[test]
    fn aggregation_is_idempotent() {
        let trades = vec![
            closed_trade("NCIS", 1.0, vec![(1.5, 10)], "2025-06-03 10:00", (2025, 6, 3)),
            open_trade("ABC", 1.0, "2025-06-03 12:00"),
        ];
        let config = SignalsConfig::default();
        let first = aggregate(&trades, SummaryMode::Week, reference_date(), &config);
        let second = aggregate(&trades, SummaryMode::Week, reference_date(), &config);
        assert_eq!(first.body, second.body);
    }

    #[test]
    fn partial_exit_line_lists_every_leg() {
        let trades = vec![closed_trade(
            "XYZ",
            1.0,
            vec![(1.5, 30), (2.0, 60)],
            "2025-06-03 10:00",
            (2025, 6, 3),
        )];
        let report = aggregate(&trades, SummaryMode::Today, reference_date(), &SignalsConfig::default());
        assert!(report
            .body
            .contains("- XYZ @ $1.00. Sold some at $1.50, $2.00 for a 75.00% gain 🔥🔥🔥"));
    }

    #[test]
    fn losses_render_without_fire_tier() {
        let trades = vec![closed_trade(
            "DOWN",
            2.0,
            vec![(1.0, 15)],
            "2025-06-03 10:00",
            (2025, 6, 3),
        )];
        let report = aggregate(&trades, SummaryMode::Today, reference_date(), &SignalsConfig::default());
        assert!(report
            .body
            .contains("- DOWN @ $2.00. Sold at $1.00 15m later for a 50.00% loss\n"));
        assert!(!report.body.contains("loss 🔥"));
    }

    #[test]
    fn monthly_total_counts_only_closed_trades() {
        let trades = vec![
            closed_trade("WIN", 1.0, vec![(1.5, 10)], "2025-06-02 10:00", (2025, 6, 2)),
            open_trade("ABC", 1.0, "2025-06-03 12:00"),
        ];
        let report = aggregate(&trades, SummaryMode::Month, reference_date(), &SignalsConfig::default());
        assert!(report
            .body
            .contains("Total Trades: 1 (1 Win, 0 Losses, 1 Open Position)"));
        assert!(report.body.contains("Monthly Trade Summary for June"));
        // Profit line: mean exit 1.50 - entry 1.00
        assert!(report
            .body
            .contains("each trade this month, you would've made $0.50"));
    }

    #[test]
    fn weekly_buckets_follow_trade_date() {
        let trades = vec![
            // Entered Monday, exited Tuesday: belongs to Tuesday's bucket
            closed_trade("SPAN", 1.0, vec![(1.2, 1200)], "2025-06-02 10:00", (2025, 6, 3)),
            closed_trade("MON", 2.0, vec![(1.0, 30)], "2025-06-02 09:00", (2025, 6, 2)),
            open_trade("ABC", 1.0, "2025-06-02 12:00"),
        ];
        let report = aggregate(&trades, SummaryMode::Week, reference_date(), &SignalsConfig::default());

        // Monday holds the loss and the open position; opens stay out of
        // the win/loss tally but count toward the day's trade total
        assert!(report.body.contains("Monday (06/02/2025):\n- Total Trades: 2 (0 Wins, 1 Loss)"));
        assert!(report.body.contains("Tuesday (06/03/2025):\n- Total Trades: 1 (1 Win, 0 Losses)"));
        assert!(report.body.contains("each trade this week"));
    }

    #[test]
    fn estimated_profit_uses_mean_exit_price() {
        let trades = vec![
            closed_trade("A", 1.0, vec![(1.5, 10), (2.0, 20)], "2025-06-03 10:00", (2025, 6, 3)),
            closed_trade("B", 3.0, vec![(2.0, 10)], "2025-06-03 11:00", (2025, 6, 3)),
        ];
        let report = aggregate(&trades, SummaryMode::Today, reference_date(), &SignalsConfig::default());
        // (1.75 - 1.00) + (2.00 - 3.00) = -0.25
        assert_eq!(report.estimated_profit, -0.25);
    }

    #[test]
    fn zero_weight_sum_yields_zero_average() {
        let trade = ReconciledTrade {
            channel: "live-signals-free".to_string(),
            ticker: "ZERO".to_string(),
            instrument_type: None,
            entry_price: 0.0,
            entry_time: dt("2025-06-03 10:00"),
            status: TradeStatus::Closed,
            exits: vec![ExitLeg {
                exit_price: 0.0,
                percent_change: 0.0,
                duration_minutes: 10,
            }],
            is_partial: false,
            trade_date: reference_date(),
        };
        let report = aggregate(&[trade], SummaryMode::Today, reference_date(), &SignalsConfig::default());
        assert_eq!(report.average_percent_change, 0.0);
    }

    #[test]
    fn footer_is_always_appended() {
        let report = aggregate(&[], SummaryMode::Today, reference_date(), &SignalsConfig::default());
        assert!(report.body.ends_with(&format!("{}\n", SignalsConfig::default().footer)));
    }
}
