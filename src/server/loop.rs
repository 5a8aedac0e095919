// Server loop module
// Accepts connections until shutdown, then drains in-flight requests

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// How long in-flight connections get to finish after shutdown is requested
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Accept connections until `shutdown` resolves.
///
/// Accept errors are logged and the loop carries on; nothing a single
/// connection does can stop the server.
pub async fn run_server(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()>,
) {
    let graceful = GracefulShutdown::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &graceful);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = &mut shutdown => {
                logger::log_info("Stopped accepting connections, draining in-flight requests");
                break;
            }
        }
    }

    drop(listener);

    tokio::select! {
        () = graceful.shutdown() => {
            logger::log_info("All connections closed");
        }
        () = tokio::time::sleep(DRAIN_TIMEOUT) => {
            logger::log_warning(&format!(
                "Connections still open after {}s, exiting anyway",
                DRAIN_TIMEOUT.as_secs()
            ));
        }
    }
}
