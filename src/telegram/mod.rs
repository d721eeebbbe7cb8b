//! Telegram transport for SignalBot
//!
//! Thin dispatch layer over the summary engine:
//! - `bot`: bot instance creation and token validation
//! - `notifier`: message sending + progress-sink adapter
//! - `commands`: plain-text command parsing (`!data`, `!push`, `!parse`, `!kill`)
//! - `scheduler`: market-time push scheduling with shutdown cancellation
//! - `service`: update polling loop, command execution, live signal recording

pub mod bot;
pub mod commands;
pub mod notifier;
pub mod scheduler;
pub mod service;
