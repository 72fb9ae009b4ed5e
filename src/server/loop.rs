// Server loop module
// Accepts connections until shutdown, then drains them and releases the file cache

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config;
use crate::logger;

/// How often the drain phase re-checks the active connection count
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Run the accept loop until `shutdown` is notified.
///
/// Must be polled inside a `tokio::task::LocalSet`, connections are served
/// with `spawn_local`. On shutdown the listener is dropped first, in-flight
/// connections get up to `performance.shutdown_timeout` seconds to finish,
/// and only then are the cached file handles closed.
#[allow(clippy::ignored_unit_patterns)]
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<config::AppState>,
    shutdown: Arc<Notify>,
) -> Result<(), Box<dyn std::error::Error>> {
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            _ = shutdown.notified() => break,
        }
    }

    drop(listener);
    logger::log_shutdown_started(active_connections.load(Ordering::SeqCst));

    let drain_timeout = Duration::from_secs(state.config.performance.shutdown_timeout);
    if !wait_for_drain(&active_connections, drain_timeout).await {
        logger::log_shutdown_timeout(active_connections.load(Ordering::SeqCst));
    }

    state.close_file_cache();
    logger::log_shutdown_complete();
    Ok(())
}

/// Wait until no connection is active, false if `timeout` elapsed first
async fn wait_for_drain(active: &AtomicUsize, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while active.load(Ordering::SeqCst) > 0 {
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
    true
}
