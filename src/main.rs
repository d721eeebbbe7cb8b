use signalbot::{
    arguments, config,
    logger::{self, LogTag},
    shutdown, telegram,
};

/// Main entry point for SignalBot
///
/// Startup order matters: directories exist before the logger opens its
/// file, the logger exists before config loading can complain, and the
/// Ctrl-C hook is installed before the service loop starts.
#[tokio::main]
async fn main() {
    // Ensure all directories exist BEFORE logger initialization
    if let Err(e) = signalbot::paths::ensure_all_directories() {
        eprintln!("❌ Failed to create required directories: {}", e);
        std::process::exit(1);
    }

    logger::init();

    if arguments::is_help_requested() {
        arguments::print_help();
        return;
    }

    logger::info(LogTag::System, "🚀 SignalBot starting up...");

    if let Err(e) = config::load_config() {
        logger::error(LogTag::System, &format!("Configuration error: {}", e));
        logger::flush();
        std::process::exit(1);
    }

    // Ctrl-C triggers the same graceful path as the !kill command
    if let Err(e) = ctrlc::set_handler(|| {
        shutdown::request_shutdown();
    }) {
        logger::warning(LogTag::System, &format!("Could not install Ctrl-C handler: {}", e));
    }

    match telegram::service::run().await {
        Ok(()) => logger::info(LogTag::System, "Service loop finished"),
        Err(e) => logger::error(LogTag::System, &format!("Service failed: {}", e)),
    }

    logger::info(LogTag::System, "Shutdown complete");
    logger::flush();
}
