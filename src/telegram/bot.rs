//! Telegram bot instance management

use crate::config::with_config;
use crate::logger::{self, LogTag};
use teloxide::prelude::*;

/// Create a bot from the configured token and validate it with getMe
pub async fn create_bot() -> Result<Bot, String> {
    let token = with_config(|c| c.telegram.bot_token.clone());

    if token.is_empty() {
        return Err("No bot token configured".to_string());
    }

    let bot = Bot::new(&token);
    match bot.get_me().send().await {
        Ok(me) => {
            logger::info(
                LogTag::Telegram,
                &format!(
                    "Bot initialized: @{} (ID: {})",
                    me.username.as_deref().unwrap_or("unknown"),
                    me.id
                ),
            );
            Ok(bot)
        }
        Err(e) => {
            logger::error(
                LogTag::Telegram,
                &format!("Failed to validate bot token: {}", e),
            );
            Err(format!("Invalid bot token: {}", e))
        }
    }
}
