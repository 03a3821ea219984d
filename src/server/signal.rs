// Signal handling module
//
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)

use std::sync::Arc;
use tokio::sync::Notify;

use crate::logger;

/// Register shutdown signal handlers and notify `shutdown` on the first one.
///
/// Registration happens before this returns so a failure surfaces at startup.
#[cfg(unix)]
pub fn start_signal_handler(shutdown: Arc<Notify>) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::spawn(async move {
        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        logger::log_shutdown_requested(name);
        // notify_one stores a permit if the loop is not waiting yet
        shutdown.notify_one();
    });
    Ok(())
}

/// Fallback for non-Unix targets: Ctrl+C only
#[cfg(not(unix))]
pub fn start_signal_handler(shutdown: Arc<Notify>) -> std::io::Result<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            logger::log_shutdown_requested("Ctrl+C");
            shutdown.notify_one();
        }
    });
    Ok(())
}
