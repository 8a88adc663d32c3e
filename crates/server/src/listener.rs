use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use database::EmployeeStore;
use protocol::Response;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tracing::Instrument;

use crate::connection::Connection;
use crate::{ServerError, dispatcher};

/// First pause after an accept failure that is not a per-connection hiccup.
/// Doubles on every consecutive failure.
const INITIAL_ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// After this many consecutive failures the listener is considered dead.
const MAX_ACCEPT_FAILURES: u32 = 8;

const BACKLOG: u32 = 1024;

/// Binds the listening socket with `SO_REUSEADDR`, so a restarted server can
/// reclaim its port while old connections are still in `TIME_WAIT`.
///
/// When the host resolves to several addresses (`localhost` usually gives
/// both `127.0.0.1` and `::1`), IPv4 ones are tried first.
pub async fn bind(addr: &str) -> Result<TcpListener, ServerError> {
    let listener_fault = |source: io::Error| ServerError::Listener {
        addr: addr.to_string(),
        source,
    };

    let resolved: Vec<SocketAddr> = tokio::net::lookup_host(addr)
        .await
        .map_err(listener_fault)?
        .collect();

    let mut last_err = None;
    for socket_addr in ipv4_first(resolved) {
        match bind_one(socket_addr) {
            Ok(listener) => return Ok(listener),
            Err(e) => last_err = Some(e),
        }
    }

    Err(listener_fault(last_err.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::AddrNotAvailable, "address resolved to nothing")
    })))
}

fn ipv4_first(mut addrs: Vec<SocketAddr>) -> Vec<SocketAddr> {
    // Stable, so the resolver's order is kept within each family.
    addrs.sort_by_key(|addr| !addr.is_ipv4());
    addrs
}

fn bind_one(addr: SocketAddr) -> io::Result<TcpListener> {
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    socket.listen(BACKLOG)
}

/// Serves connections from `listener` until `shutdown` completes.
///
/// Every accepted connection runs in its own task and owns its socket; a
/// failing connection never affects the others or the accept loop. Returns
/// `ServerError::Listener` when the listening socket itself stops working.
pub async fn run(
    listener: TcpListener,
    store: Arc<dyn EmployeeStore>,
    shutdown: impl Future,
) -> Result<(), ServerError> {
    let local_addr = match listener.local_addr() {
        Ok(addr) => {
            tracing::info!(%addr, "Records server listening.");
            addr.to_string()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Records server listening on an unknown address.");
            "unknown address".to_string()
        }
    };

    tokio::select! {
        res = accept_loop(&listener, store) => {
            res.map_err(|source| ServerError::Listener { addr: local_addr, source })
        }
        _ = shutdown => {
            tracing::info!("Shutdown signal received, no longer accepting connections.");
            Ok(())
        }
    }
}

/// Accepts until the listening socket fails for good.
///
/// Errors that concern only the connection being accepted are skipped at
/// once. Anything else is retried with a doubling back-off, and returned
/// after `MAX_ACCEPT_FAILURES` failures in a row.
async fn accept_loop(listener: &TcpListener, store: Arc<dyn EmployeeStore>) -> io::Result<()> {
    let mut failures = 0;
    let mut backoff = INITIAL_ACCEPT_BACKOFF;

    loop {
        match listener.accept().await {
            Ok((socket, peer)) => {
                failures = 0;
                backoff = INITIAL_ACCEPT_BACKOFF;

                let span = tracing::info_span!("connection", %peer);
                let store = Arc::clone(&store);

                tokio::spawn(
                    async move {
                        tracing::debug!("Client connected.");
                        match handle_connection(socket, store).await {
                            Ok(()) => tracing::debug!("Client disconnected."),
                            Err(e) => tracing::warn!(error = %e, "Connection closed on error."),
                        }
                    }
                    .instrument(span),
                );
            }
            Err(e) if is_connection_error(&e) => {
                tracing::debug!(error = %e, "Skipped a connection that failed during accept.");
            }
            Err(e) => {
                failures += 1;
                if failures >= MAX_ACCEPT_FAILURES {
                    tracing::error!(error = %e, failures, "Listener failed, giving up.");
                    return Err(e);
                }

                tracing::error!(error = %e, failures, retry_in = ?backoff, "Failed to accept connection.");
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }
        }
    }
}

/// Failures that belong to the single incoming connection, not the listener.
fn is_connection_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
    )
}

/// Serves one client: read a frame, answer it, repeat until the peer leaves.
///
/// A body that is not valid JSON is answered with an error response and the
/// connection stays open. Transport failures end the connection.
async fn handle_connection(
    socket: TcpStream,
    store: Arc<dyn EmployeeStore>,
) -> Result<(), ServerError> {
    let mut connection = Connection::new(socket);

    while let Some(body) = connection.read_frame().await? {
        let response = match protocol::decode_request(&body) {
            Ok(request) => {
                tracing::info!(operation = %request.operation, "Request received.");
                dispatcher::dispatch(store.as_ref(), request).await
            }
            Err(e) => {
                let err = ServerError::from(e);
                tracing::warn!(error = %err, bytes = body.len(), "Rejected undecodable request.");
                Response::from(&err)
            }
        };

        connection.write_response(&response).await?;
        tracing::info!(status = ?response.status, "Response sent.");
    }

    Ok(())
}
