//! Process-wide shutdown state.
//!
//! - `SHUTDOWN`: Ctrl+C has been received
//! - `SESSION`: a watch session is running and wants a graceful stop

use std::sync::LazyLock;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// A watch session is registered for graceful shutdown
static SESSION: AtomicBool = AtomicBool::new(false);

/// Wakes the watch session. `notify_one` keeps a permit if nobody waits yet.
static SHUTDOWN_NOTIFY: LazyLock<Notify> = LazyLock::new(Notify::new);

/// Setup the global Ctrl+C handler. Call once at program start.
///
/// - Before `register_session()`: exit right away (nothing to tear down)
/// - After `register_session()`: wake `shutdown_signal()` waiters
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);

        if SESSION.load(Ordering::SeqCst) {
            crate::log!("watch"; "shutting down...");
            SHUTDOWN_NOTIFY.notify_one();
        } else {
            std::process::exit(130);
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Mark a watch session as running.
pub fn register_session() {
    SESSION.store(true, Ordering::SeqCst);
}

/// Check if shutdown has been requested
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::SeqCst)
}

/// Resolves once Ctrl+C has been received.
pub async fn shutdown_signal() {
    if is_shutdown() {
        return;
    }
    SHUTDOWN_NOTIFY.notified().await;
}
