// Server loop module
// Accepts connections until shutdown, then waits for in-flight requests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// How long open connections may keep running after shutdown is requested
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);
const DRAIN_POLL: Duration = Duration::from_millis(50);

/// Run the accept loop until `shutdown` is notified.
///
/// The listener is closed as soon as shutdown begins; the function returns
/// once every connection has finished or the grace period has passed.
#[allow(clippy::ignored_unit_patterns)]
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
    shutdown: Arc<Notify>,
) {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            _ = shutdown.notified() => break,
        }
    }

    drop(listener);
    let remaining = drain_connections(&active_connections, SHUTDOWN_GRACE).await;
    logger::log_shutdown_complete(remaining);
}

/// Wait for the connection counter to reach zero, at most `grace`.
/// Returns the number of connections still open.
async fn drain_connections(active_connections: &AtomicUsize, grace: Duration) -> usize {
    let deadline = tokio::time::Instant::now() + grace;
    loop {
        let remaining = active_connections.load(Ordering::SeqCst);
        if remaining == 0 || tokio::time::Instant::now() >= deadline {
            return remaining;
        }
        tokio::time::sleep(DRAIN_POLL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::ledger::testing::RecordingConnector;
    use crate::server::create_reusable_listener;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_drain_returns_when_idle() {
        let counter = AtomicUsize::new(0);
        assert_eq!(drain_connections(&counter, Duration::from_secs(5)).await, 0);
    }

    #[tokio::test]
    async fn test_drain_gives_up_after_grace() {
        let counter = AtomicUsize::new(2);
        let remaining = drain_connections(&counter, Duration::from_millis(120)).await;
        assert_eq!(remaining, 2);
    }

    #[tokio::test]
    async fn test_serves_health_and_shuts_down() {
        let mut config = Config::load_from("does-not-exist/config").unwrap();
        config.logging.access_log = false;
        let state = Arc::new(AppState::with_connector(
            config,
            Arc::new(RecordingConnector::new()),
        ));

        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let connections = Arc::new(AtomicUsize::new(0));
        let shutdown = Arc::new(Notify::new());

        let server = tokio::spawn(start_server_loop(
            listener,
            state,
            Arc::clone(&connections),
            Arc::clone(&shutdown),
        ));

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.contains("\"status\":\"healthy\""));

        shutdown.notify_one();
        server.await.unwrap();
        assert_eq!(connections.load(Ordering::SeqCst), 0);
    }
}
