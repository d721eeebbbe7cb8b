//! Update polling and command execution
//!
//! One long-polling loop drives everything: messages in the command chat
//! are parsed as commands and executed inline (one summary run at a time),
//! messages observed in configured signal channels are appended to the
//! flat history dump as they arrive.

use crate::config::with_config;
use crate::global;
use crate::history::HistoryStore;
use crate::logger::{self, LogTag};
use crate::shutdown::{get_shutdown_notify, is_shutdown_requested, request_shutdown};
use crate::summary::pipeline;
use crate::telegram::bot::create_bot;
use crate::telegram::commands::{parse_command, Command, PushDest, PushWhen};
use crate::telegram::notifier::{resolve_chat_id, Notifier, TelegramProgress};
use crate::telegram::scheduler;
use std::time::Duration;
use teloxide::prelude::*;
use teloxide::types::{ChatId, ParseMode, UpdateKind};

/// Run the Telegram service until shutdown
///
/// Returns immediately when the transport is disabled or unconfigured.
pub async fn run() -> Result<(), String> {
    let telegram = with_config(|c| c.telegram.clone());

    if !telegram.enabled {
        logger::info(LogTag::Telegram, "Telegram service disabled in config");
        return Ok(());
    }
    if telegram.bot_token.is_empty() {
        logger::info(LogTag::Telegram, "No bot token configured, nothing to serve");
        return Ok(());
    }

    let bot = create_bot().await?;
    let command_chat = resolve_chat_id(&telegram.command_chat_id)
        .map_err(|e| format!("Command chat misconfigured: {}", e))?;

    let notifier = Notifier::new(bot.clone(), command_chat);
    if let Err(e) = notifier
        .send_message("✅ SignalBot online and listening for commands.")
        .await
    {
        logger::warning(LogTag::Telegram, &format!("Startup notification failed: {}", e));
    }

    let shutdown = get_shutdown_notify();
    let mut offset: i32 = 0;
    logger::info(LogTag::Telegram, "Command loop started");

    loop {
        if is_shutdown_requested() {
            break;
        }

        let current_offset = offset;
        tokio::select! {
            _ = shutdown.notified() => break,
            result = async { bot.get_updates().offset(current_offset).timeout(25).send().await } => {
                match result {
                    Ok(updates) => {
                        for update in updates {
                            offset = update.id + 1;
                            if let UpdateKind::Message(message) = update.kind {
                                handle_message(&bot, command_chat, &message).await;
                            }
                        }
                    }
                    Err(e) => {
                        logger::error(LogTag::Telegram, &format!("Update polling failed: {}", e));
                        tokio::time::sleep(Duration::from_secs(5)).await;
                    }
                }
            }
        }
    }

    logger::info(LogTag::Telegram, "Command loop stopped");
    Ok(())
}

async fn handle_message(bot: &Bot, command_chat: ChatId, message: &Message) {
    record_signal_message(message);

    if message.chat.id != command_chat {
        return;
    }
    let Some(text) = message.text() else {
        return;
    };

    match parse_command(text) {
        None => {}
        Some(Err(usage)) => reply(bot, command_chat, &usage).await,
        Some(Ok(command)) => execute_command(bot, command_chat, command).await,
    }
}

/// Append messages seen in configured signal channels to the history dump
fn record_signal_message(message: &Message) {
    let Some(title) = message.chat.title() else {
        return;
    };
    let Some(tier) = with_config(|c| c.signals.tier_for_channel(title).cloned()) else {
        return;
    };
    let Some(text) = message.text() else {
        return;
    };

    let author = message
        .from()
        .map(|u| u.full_name())
        .unwrap_or_else(|| "unknown".to_string());
    let local_time = message
        .date
        .with_timezone(&scheduler::load_timezone())
        .naive_local();

    let store = HistoryStore::from_config();
    if let Err(e) = store.append_line(&tier.channel, local_time, &author, text) {
        logger::warning(
            LogTag::History,
            &format!("Could not record message from {}: {}", tier.channel, e),
        );
    }
}

async fn execute_command(bot: &Bot, command_chat: ChatId, command: Command) {
    match command {
        Command::Data(mode) => {
            let progress = TelegramProgress::new(bot.clone(), command_chat);
            match pipeline::run_trade_summary(mode, &progress).await {
                Ok(report) => {
                    if let Err(e) = bot
                        .send_message(command_chat, report)
                        .parse_mode(ParseMode::Html)
                        .send()
                        .await
                    {
                        logger::error(LogTag::Telegram, &format!("Report delivery failed: {}", e));
                    }
                }
                Err(e) => reply(bot, command_chat, &format!("❌ {}", e)).await,
            }
        }

        Command::Push { dest, when } => execute_push(bot, command_chat, dest, when).await,

        Command::Parse => {
            let tiers = with_config(|c| c.signals.tiers.clone());
            let store = HistoryStore::from_config();
            match store.resync(&tiers) {
                Ok(counts) => {
                    let summary = counts
                        .iter()
                        .map(|(key, n)| format!("{}={}", key, n))
                        .collect::<Vec<_>>()
                        .join(", ");
                    reply(bot, command_chat, &format!("🔄 History resynced: {}", summary)).await;
                }
                Err(e) => reply(bot, command_chat, &format!("❌ Error resyncing history: {}", e)).await,
            }
        }

        Command::Kill => {
            reply(bot, command_chat, "🔌 Shutting down...").await;
            request_shutdown();
        }
    }
}

async fn execute_push(bot: &Bot, command_chat: ChatId, dest: PushDest, when: PushWhen) {
    let raw_dest = with_config(|c| match dest {
        PushDest::Test => c.telegram.test_channel_id.clone(),
        PushDest::Live => c.telegram.live_channel_id.clone(),
    });
    let dest_chat = match resolve_chat_id(&raw_dest) {
        Ok(chat) => chat,
        Err(e) => {
            logger::error(LogTag::Telegram, &format!("Push destination unavailable: {}", e));
            reply(bot, command_chat, "❌ Could not find the output channel.").await;
            return;
        }
    };

    match when {
        PushWhen::Immediate => {
            let Some(report) = global::get_last_report() else {
                reply(bot, command_chat, "⚠️ No report available to push.").await;
                return;
            };
            match bot
                .send_message(dest_chat, report)
                .parse_mode(ParseMode::Html)
                .send()
                .await
            {
                Ok(_) => {
                    reply(
                        bot,
                        command_chat,
                        &format!("✅ Report posted to <b>{}</b>.", dest.label()),
                    )
                    .await;
                }
                Err(e) => {
                    logger::error(LogTag::Telegram, &format!("Push delivery failed: {}", e));
                    reply(bot, command_chat, &format!("❌ Could not deliver the report: {}", e))
                        .await;
                }
            }
        }

        PushWhen::At(time) => {
            let target = match scheduler::next_occurrence(time) {
                Ok(target) => target,
                Err(e) => {
                    reply(bot, command_chat, &format!("❌ {}", e)).await;
                    return;
                }
            };
            scheduler::spawn_scheduled_push(
                bot.clone(),
                dest_chat,
                dest.label().to_string(),
                command_chat,
                target,
            );
            reply(
                bot,
                command_chat,
                &format!(
                    "✅ Push scheduled for {} on {}.",
                    target.format("%I:%M %p %Z"),
                    target.format("%m/%d/%Y")
                ),
            )
            .await;
        }
    }
}

async fn reply(bot: &Bot, chat: ChatId, message: &str) {
    if let Err(e) = bot
        .send_message(chat, message)
        .parse_mode(ParseMode::Html)
        .send()
        .await
    {
        logger::warning(LogTag::Telegram, &format!("Reply failed: {}", e));
    }
}
