//! Trade candidate types
//!
//! `TradeCandidate` mirrors the JSON contract of the extraction prompt
//! (keys `channel`, `ticker`, `type`, `expiry`, `entry`, `exit`, `status`,
//! `summary`, `entry_time`, `exit_time`). Responses are deserialized into
//! these types at the boundary; anything violating the schema is rejected
//! there and never reaches the reconciler as an untyped map.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Option contract direction, when the signal names one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentType {
    #[serde(alias = "CALL", alias = "Call")]
    Call,
    #[serde(alias = "PUT", alias = "Put")]
    Put,
}

impl std::fmt::Display for InstrumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstrumentType::Call => write!(f, "call"),
            InstrumentType::Put => write!(f, "put"),
        }
    }
}

/// Whether an exit has been observed for the trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Open,
    Closed,
}

/// Whether the trade belongs in the currently requested reporting window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Relevance {
    Yes,
    #[default]
    No,
}

/// One extracted trade signal, entry and/or exit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeCandidate {
    pub channel: String,
    pub ticker: String,
    #[serde(rename = "type", default)]
    pub instrument_type: Option<InstrumentType>,
    #[serde(default)]
    pub expiry: Option<String>,
    /// Entry price as quoted, e.g. "$1.17"
    #[serde(rename = "entry", default)]
    pub entry_price: Option<String>,
    /// Exit price as quoted, e.g. "$2.10"
    #[serde(rename = "exit", default)]
    pub exit_price: Option<String>,
    pub status: TradeStatus,
    #[serde(rename = "summary", default)]
    pub relevance: Relevance,
    #[serde(default, with = "minute_format")]
    pub entry_time: Option<NaiveDateTime>,
    #[serde(default, with = "minute_format")]
    pub exit_time: Option<NaiveDateTime>,
}

impl TradeCandidate {
    /// Boundary validation of the schema invariants
    ///
    /// - `status=closed` implies `exit` and `exit_time` are present
    /// - `entry_time`, if present, is strictly before `exit_time`
    pub fn validate(&self) -> Result<(), String> {
        if self.status == TradeStatus::Closed
            && (self.exit_price.is_none() || self.exit_time.is_none())
        {
            return Err(format!(
                "closed trade {} in {} lacks exit price/time",
                self.ticker, self.channel
            ));
        }

        if let (Some(entry), Some(exit)) = (self.entry_time, self.exit_time) {
            if entry >= exit {
                return Err(format!(
                    "trade {} in {} has entry_time {} not before exit_time {}",
                    self.ticker, self.channel, entry, exit
                ));
            }
        }

        Ok(())
    }

    /// Entry price parsed as a number, if present and parseable
    pub fn entry_price_value(&self) -> Option<f64> {
        self.entry_price.as_deref().and_then(parse_price)
    }

    /// Exit price parsed as a number, if present and parseable
    pub fn exit_price_value(&self) -> Option<f64> {
        self.exit_price.as_deref().and_then(parse_price)
    }

    /// Calendar date of the entry signal
    pub fn entry_date(&self) -> Option<NaiveDate> {
        self.entry_time.map(|t| t.date())
    }

    /// Calendar date of the exit signal
    pub fn exit_date(&self) -> Option<NaiveDate> {
        self.exit_time.map(|t| t.date())
    }
}

/// Parse a quoted price like "$1.17" or "2,100.50" into a number
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().trim_start_matches('$').replace(',', "");
    cleaned.parse::<f64>().ok()
}

/// Serde adapter for the `YYYY-MM-DD HH:MM` wire format
pub mod minute_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M";

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt = Option::<String>::deserialize(deserializer)?;
        match opt {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => NaiveDateTime::parse_from_str(s.trim(), FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate_json() -> &'static str {
        r#"{
            "channel": "live-signals-tier-1",
            "ticker": "TSLA",
            "type": "call",
            "expiry": null,
            "entry": "$2.50",
            "exit": "$3.00",
            "status": "closed",
            "summary": "yes",
            "entry_time": "2025-06-02 15:00",
            "exit_time": "2025-06-03 11:04"
        }"#
    }

    #[test]
    fn deserializes_wire_format() {
        let candidate: TradeCandidate = serde_json::from_str(candidate_json()).unwrap();
        assert_eq!(candidate.ticker, "TSLA");
        assert_eq!(candidate.instrument_type, Some(InstrumentType::Call));
        assert_eq!(candidate.status, TradeStatus::Closed);
        assert_eq!(candidate.relevance, Relevance::Yes);
        assert_eq!(candidate.entry_price_value(), Some(2.50));
        assert_eq!(
            candidate.entry_time.unwrap().format("%Y-%m-%d %H:%M").to_string(),
            "2025-06-02 15:00"
        );
        assert!(candidate.validate().is_ok());
    }

    #[test]
    fn closed_without_exit_fields_is_invalid() {
        let mut candidate: TradeCandidate = serde_json::from_str(candidate_json()).unwrap();
        candidate.exit_price = None;
        assert!(candidate.validate().is_err());
    }

    #[test]
    fn entry_after_exit_is_invalid() {
        let mut candidate: TradeCandidate = serde_json::from_str(candidate_json()).unwrap();
        candidate.entry_time = candidate.exit_time;
        assert!(candidate.validate().is_err());
    }

    #[test]
    fn null_times_deserialize_to_none() {
        let json = r#"{
            "channel": "live-signals-free",
            "ticker": "XYZ",
            "type": null,
            "entry": null,
            "exit": "$2.00",
            "status": "closed",
            "summary": "no",
            "entry_time": null,
            "exit_time": "2025-06-03 11:00"
        }"#;
        let candidate: TradeCandidate = serde_json::from_str(json).unwrap();
        assert!(candidate.entry_time.is_none());
        assert!(candidate.validate().is_ok());
    }

    #[test]
    fn price_parsing() {
        assert_eq!(parse_price("$1.17"), Some(1.17));
        assert_eq!(parse_price(" $2,100.50 "), Some(2100.50));
        assert_eq!(parse_price("2.10"), Some(2.10));
        assert_eq!(parse_price("n/a"), None);
    }
}
