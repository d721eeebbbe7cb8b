//! Configuration schema definitions
//!
//! Every field has a serde default so partial config files load cleanly.

use serde::{Deserialize, Serialize};

/// Top-level runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub signals: SignalsConfig,
}

/// Telegram transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token from @BotFather; empty disables the transport
    #[serde(default)]
    pub bot_token: String,
    /// Chat where commands are accepted and progress is reported
    #[serde(default)]
    pub command_chat_id: String,
    /// Destination for `!push test`
    #[serde(default)]
    pub test_channel_id: String,
    /// Destination for `!push live`
    #[serde(default)]
    pub live_channel_id: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            command_chat_id: String::new(),
            test_channel_id: String::new(),
            live_channel_id: String::new(),
            enabled: true,
        }
    }
}

/// Completion-service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Kept at 0.0: extraction output feeds accounting logic
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// One signal-distribution tier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TierConfig {
    /// Short key used in flags and progress messages ("free", "1", ...)
    pub key: String,
    /// Channel name as it appears in the history dump
    pub channel: String,
    /// Human-readable name used in report headings
    pub display_name: String,
}

/// Signal ingestion and reporting settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalsConfig {
    /// Tier list; iteration order here is the merge order for reports
    #[serde(default = "default_tiers")]
    pub tiers: Vec<TierConfig>,
    /// Flat append-only chat history dump
    #[serde(default = "default_history_file")]
    pub history_file: String,
    /// Directory for per-run filtered snapshots
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: String,
    /// IANA timezone for market-time scheduling
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Promotional footer appended to every report
    #[serde(default = "default_footer")]
    pub footer: String,
}

impl Default for SignalsConfig {
    fn default() -> Self {
        Self {
            tiers: default_tiers(),
            history_file: default_history_file(),
            snapshot_dir: default_snapshot_dir(),
            timezone: default_timezone(),
            footer: default_footer(),
        }
    }
}

impl SignalsConfig {
    /// Find the tier owning a channel name, if any
    pub fn tier_for_channel(&self, channel: &str) -> Option<&TierConfig> {
        self.tiers.iter().find(|t| t.channel == channel)
    }
}

fn default_true() -> bool {
    true
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_tiers() -> Vec<TierConfig> {
    vec![
        TierConfig {
            key: "free".to_string(),
            channel: "live-signals-free".to_string(),
            display_name: "Free Tier".to_string(),
        },
        TierConfig {
            key: "1".to_string(),
            channel: "live-signals-tier-1".to_string(),
            display_name: "Tier 1".to_string(),
        },
        TierConfig {
            key: "2".to_string(),
            channel: "live-signals-tier-2".to_string(),
            display_name: "Tier 2".to_string(),
        },
        TierConfig {
            key: "3".to_string(),
            channel: "live-signals-tier-3".to_string(),
            display_name: "Tier 3".to_string(),
        },
    ]
}

fn default_history_file() -> String {
    "data/full_channel_dump.txt".to_string()
}

fn default_snapshot_dir() -> String {
    "data/snapshots".to_string()
}

fn default_timezone() -> String {
    "America/New_York".to_string()
}

fn default_footer() -> String {
    "🔐 Want to see our open trades? Get a premium membership!".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_all_tiers() {
        let config = Config::default();
        assert_eq!(config.signals.tiers.len(), 4);
        assert_eq!(config.signals.tiers[0].key, "free");
        assert_eq!(
            config
                .signals
                .tier_for_channel("live-signals-tier-2")
                .map(|t| t.display_name.as_str()),
            Some("Tier 2")
        );
        assert!(config.signals.tier_for_channel("general-chat").is_none());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r#"
            [llm]
            api_key = "sk-test"
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.llm.api_key, "sk-test");
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.temperature, 0.0);
        assert_eq!(config.signals.timezone, "America/New_York");
    }
}
