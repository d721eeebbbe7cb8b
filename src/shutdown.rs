//! Graceful shutdown coordination
//!
//! A single `Notify` fans out to every background task (command polling,
//! scheduled pushes). Tasks `select!` on it and exit cleanly; scheduled
//! deliveries are cancelled rather than left to fire into a dead process.

use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Shutdown broadcast handle
static SHUTDOWN: Lazy<Arc<Notify>> = Lazy::new(|| Arc::new(Notify::new()));

/// Latched flag so late subscribers do not miss the signal
static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Get the shared shutdown notifier
pub fn get_shutdown_notify() -> Arc<Notify> {
    SHUTDOWN.clone()
}

/// Request process shutdown; wakes all waiting tasks
pub fn request_shutdown() {
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
    SHUTDOWN.notify_waiters();
}

/// Check whether shutdown has been requested
pub fn is_shutdown_requested() -> bool {
    SHUTDOWN_REQUESTED.load(Ordering::SeqCst)
}
