//! Log tags identifying the subsystem a message originates from

/// Subsystem tag attached to every log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogTag {
    /// Startup, shutdown, configuration
    System,
    /// Telegram transport: commands, delivery, scheduling
    Telegram,
    /// Completion-service client
    Llm,
    /// Flat history store
    History,
    /// Signal extraction and backfill
    Extract,
    /// Trade reconciliation
    Reconcile,
    /// Aggregation, rendering, validation
    Summary,
}

impl LogTag {
    /// Key used in `--debug-<key>` flags
    pub fn to_debug_key(self) -> &'static str {
        match self {
            LogTag::System => "system",
            LogTag::Telegram => "telegram",
            LogTag::Llm => "llm",
            LogTag::History => "history",
            LogTag::Extract => "extract",
            LogTag::Reconcile => "reconcile",
            LogTag::Summary => "summary",
        }
    }

    /// Uppercase column label for console and file output
    pub fn to_plain_string(self) -> &'static str {
        match self {
            LogTag::System => "SYSTEM",
            LogTag::Telegram => "TELEGRAM",
            LogTag::Llm => "LLM",
            LogTag::History => "HISTORY",
            LogTag::Extract => "EXTRACT",
            LogTag::Reconcile => "RECONCILE",
            LogTag::Summary => "SUMMARY",
        }
    }
}
