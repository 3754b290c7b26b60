//! OS signal handling.
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Config reload is driven by the file watcher, not SIGHUP

use crate::lifecycle::Shutdown;

/// Wait for Ctrl+C, then trigger `shutdown`.
///
/// Never returns if the handler cannot be installed.
pub async fn wait_for_ctrl_c(shutdown: Shutdown) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        return std::future::pending().await;
    }
    tracing::info!("Shutdown signal received");
    shutdown.trigger();
}
