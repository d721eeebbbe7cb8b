//! Configuration system
//!
//! TOML configuration loaded once at startup into a global `OnceCell`,
//! accessed through `with_config`. Defaults cover every field so a missing
//! file still yields a runnable (if disabled) bot.

mod schemas;
mod utils;

pub use schemas::{Config, LlmConfig, SignalsConfig, TelegramConfig, TierConfig};
pub use utils::{load_config, load_config_from_path, reload_config, with_config, CONFIG_FILE_PATH};
