//! Message sending
//!
//! `Notifier` wraps one destination chat; `TelegramProgress` adapts it to
//! the pipeline's progress sink so a running summary narrates its steps
//! into the command chat.

use crate::logger::{self, LogTag};
use crate::summary::pipeline::ProgressSink;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatId, ParseMode};

/// Parse a configured chat id string
pub fn resolve_chat_id(raw: &str) -> Result<ChatId, String> {
    if raw.is_empty() {
        return Err("Chat ID is empty".to_string());
    }
    raw.parse::<i64>()
        .map(ChatId)
        .map_err(|e| format!("Invalid chat ID '{}': {}", raw, e))
}

/// Sender bound to one destination chat
pub struct Notifier {
    bot: Bot,
    chat_id: ChatId,
}

impl Notifier {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }

    /// Send an HTML-formatted message to the destination
    pub async fn send_message(&self, message: &str) -> Result<(), String> {
        self.bot
            .send_message(self.chat_id, message)
            .parse_mode(ParseMode::Html)
            .send()
            .await
            .map_err(|e| format!("Failed to send Telegram message: {}", e))?;

        logger::debug(
            LogTag::Telegram,
            &format!("Sent message to {} (length={})", self.chat_id, message.len()),
        );

        Ok(())
    }
}

/// Progress sink that narrates pipeline steps into the command chat
///
/// Delivery is best-effort: a dropped progress message must not affect
/// the run itself.
pub struct TelegramProgress {
    notifier: Notifier,
}

impl TelegramProgress {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self {
            notifier: Notifier::new(bot, chat_id),
        }
    }
}

#[async_trait]
impl ProgressSink for TelegramProgress {
    async fn say(&self, message: &str) {
        if let Err(e) = self.notifier.send_message(message).await {
            logger::debug(
                LogTag::Telegram,
                &format!("Progress message dropped: {}", e),
            );
        }
    }
}
