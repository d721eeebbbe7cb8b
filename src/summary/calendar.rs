//! Reporting modes and trading-day windows

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::str::FromStr;

/// Requested reporting window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryMode {
    Today,
    Week,
    Month,
}

impl SummaryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryMode::Today => "today",
            SummaryMode::Week => "week",
            SummaryMode::Month => "month",
        }
    }
}

impl std::fmt::Display for SummaryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SummaryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "today" => Ok(SummaryMode::Today),
            "week" => Ok(SummaryMode::Week),
            "month" => Ok(SummaryMode::Month),
            other => Err(format!(
                "Invalid mode '{}'. Use `!data today`, `!data week`, or `!data month`.",
                other
            )),
        }
    }
}

/// Weekday trading days covered by a mode, relative to a reference date
///
/// - `today`: the reference date when it is a weekday, empty on weekends
/// - `week`: Monday through the reference date; on weekends, the previous
///   full Monday-Friday week
/// - `month`: every weekday from the 1st through the reference date
pub fn trading_days(mode: SummaryMode, reference: NaiveDate) -> Vec<NaiveDate> {
    match mode {
        SummaryMode::Today => {
            if is_weekday(reference) {
                vec![reference]
            } else {
                Vec::new()
            }
        }
        SummaryMode::Week => {
            let offset = reference.weekday().num_days_from_monday() as i64;
            let (start, span) = if offset >= 5 {
                // Weekend: report on the week that just ended
                (reference - Duration::days(offset + 7), 5)
            } else {
                (reference - Duration::days(offset), offset + 1)
            };
            (0..span)
                .map(|i| start + Duration::days(i))
                .filter(|d| is_weekday(*d))
                .collect()
        }
        SummaryMode::Month => {
            let start = reference.with_day(1).expect("day 1 always valid");
            let span = (reference - start).num_days() + 1;
            (0..span)
                .map(|i| start + Duration::days(i))
                .filter(|d| is_weekday(*d))
                .collect()
        }
    }
}

fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn mode_parsing() {
        assert_eq!("today".parse::<SummaryMode>().unwrap(), SummaryMode::Today);
        assert_eq!("WEEK".parse::<SummaryMode>().unwrap(), SummaryMode::Week);
        assert!("yesterday".parse::<SummaryMode>().is_err());
    }

    #[test]
    fn today_is_empty_on_weekends() {
        // 2025-06-03 is a Tuesday, 2025-06-07 a Saturday
        assert_eq!(
            trading_days(SummaryMode::Today, date(2025, 6, 3)),
            vec![date(2025, 6, 3)]
        );
        assert!(trading_days(SummaryMode::Today, date(2025, 6, 7)).is_empty());
    }

    #[test]
    fn week_runs_monday_through_reference() {
        let days = trading_days(SummaryMode::Week, date(2025, 6, 4)); // Wednesday
        assert_eq!(
            days,
            vec![date(2025, 6, 2), date(2025, 6, 3), date(2025, 6, 4)]
        );
    }

    #[test]
    fn weekend_reports_previous_full_week() {
        let days = trading_days(SummaryMode::Week, date(2025, 6, 7)); // Saturday
        assert_eq!(days.len(), 5);
        assert_eq!(days[0], date(2025, 5, 26));
        assert_eq!(days[4], date(2025, 5, 30));
    }

    #[test]
    fn month_covers_weekdays_since_the_first() {
        let days = trading_days(SummaryMode::Month, date(2025, 6, 6)); // first Friday
        // June 2025 starts on a Sunday, so 5 weekdays through the 6th
        assert_eq!(days.len(), 5);
        assert_eq!(days[0], date(2025, 6, 2));
        assert_eq!(days[4], date(2025, 6, 6));
    }
}
