//! Scheduled report delivery
//!
//! A scheduled push is an independent timer task that sleeps until the
//! target wall-clock time (configured timezone, next day if the time has
//! already passed) and then delivers the cached report. The task tolerates
//! an empty cache and delivery failures with user-visible warnings, and is
//! cancelled by the shutdown notifier.

use crate::config::with_config;
use crate::global;
use crate::logger::{self, LogTag};
use crate::shutdown::get_shutdown_notify;
use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use teloxide::prelude::*;
use teloxide::types::{ChatId, ParseMode};

/// Configured reporting timezone, Eastern when unset or invalid
pub fn load_timezone() -> Tz {
    let name = with_config(|c| c.signals.timezone.clone());
    name.parse().unwrap_or_else(|_| {
        logger::warning(
            LogTag::Telegram,
            &format!("Invalid timezone '{}', falling back to America/New_York", name),
        );
        chrono_tz::America::New_York
    })
}

/// Next wall-clock occurrence of a target time, strictly after `now`
pub fn next_occurrence_after(now: DateTime<Tz>, target_time: NaiveTime) -> Option<DateTime<Tz>> {
    let tz = now.timezone();
    let mut date = now.date_naive();

    // Check today and tomorrow; skips a non-existent local time (DST gap)
    for _ in 0..2 {
        if let Some(candidate) = tz.from_local_datetime(&date.and_time(target_time)).earliest() {
            if candidate > now {
                return Some(candidate);
            }
        }
        date = date.succ_opt()?;
    }
    None
}

/// Next occurrence of a target time from the current instant
pub fn next_occurrence(target_time: NaiveTime) -> Result<DateTime<Tz>, String> {
    let tz = load_timezone();
    let now = Utc::now().with_timezone(&tz);
    next_occurrence_after(now, target_time)
        .ok_or_else(|| format!("Could not resolve target time {}", target_time))
}

/// Spawn the delivery timer
///
/// Outcome messages (delivered, empty cache, delivery failure) go to the
/// command chat; none of them can take the task down.
pub fn spawn_scheduled_push(
    bot: Bot,
    dest_chat: ChatId,
    dest_label: String,
    command_chat: ChatId,
    target: DateTime<Tz>,
) {
    tokio::spawn(async move {
        let now = Utc::now().with_timezone(&target.timezone());
        let delay = (target - now).max(Duration::zero()).to_std().unwrap_or_default();

        logger::info(
            LogTag::Telegram,
            &format!(
                "Push to {} scheduled for {}",
                dest_label,
                target.format("%Y-%m-%d %H:%M %Z")
            ),
        );

        let shutdown = get_shutdown_notify();
        tokio::select! {
            _ = tokio::time::sleep(delay) => {
                deliver(&bot, dest_chat, &dest_label, command_chat).await;
            }
            _ = shutdown.notified() => {
                logger::info(
                    LogTag::Telegram,
                    &format!("Scheduled push to {} cancelled by shutdown", dest_label),
                );
            }
        }
    });
}

async fn deliver(bot: &Bot, dest_chat: ChatId, dest_label: &str, command_chat: ChatId) {
    let Some(report) = global::get_last_report() else {
        logger::warning(LogTag::Telegram, "Scheduled push fired with empty report cache");
        notify_best_effort(
            bot,
            command_chat,
            "⚠️ No report available to push at scheduled time.",
        )
        .await;
        return;
    };

    match bot
        .send_message(dest_chat, report)
        .parse_mode(ParseMode::Html)
        .send()
        .await
    {
        Ok(_) => {
            notify_best_effort(
                bot,
                command_chat,
                &format!("✅ Scheduled report posted to <b>{}</b>.", dest_label),
            )
            .await;
        }
        Err(e) => {
            logger::error(
                LogTag::Telegram,
                &format!("Scheduled delivery to {} failed: {}", dest_label, e),
            );
            notify_best_effort(
                bot,
                command_chat,
                &format!("❌ Could not deliver the scheduled report: {}", e),
            )
            .await;
        }
    }
}

async fn notify_best_effort(bot: &Bot, chat: ChatId, message: &str) {
    if let Err(e) = bot
        .send_message(chat, message)
        .parse_mode(ParseMode::Html)
        .send()
        .await
    {
        logger::warning(
            LogTag::Telegram,
            &format!("Could not notify command chat: {}", e),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eastern_now(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Tz> {
        chrono_tz::America::New_York
            .with_ymd_and_hms(y, mo, d, h, mi, 0)
            .unwrap()
    }

    #[test]
    fn target_later_today_stays_today() {
        let now = eastern_now(2025, 6, 3, 10, 0);
        let target = next_occurrence_after(now, NaiveTime::from_hms_opt(16, 0, 0).unwrap()).unwrap();
        assert_eq!(target, eastern_now(2025, 6, 3, 16, 0));
    }

    #[test]
    fn past_target_rolls_to_tomorrow() {
        let now = eastern_now(2025, 6, 3, 17, 0);
        let target = next_occurrence_after(now, NaiveTime::from_hms_opt(16, 0, 0).unwrap()).unwrap();
        assert_eq!(target, eastern_now(2025, 6, 4, 16, 0));
    }

    #[test]
    fn exact_now_counts_as_past() {
        let now = eastern_now(2025, 6, 3, 16, 0);
        let target = next_occurrence_after(now, NaiveTime::from_hms_opt(16, 0, 0).unwrap()).unwrap();
        assert_eq!(target, eastern_now(2025, 6, 4, 16, 0));
    }
}
