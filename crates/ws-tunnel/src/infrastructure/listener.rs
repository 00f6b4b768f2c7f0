//! Shared accept loop for both modes.
//!
//! Binds the listening socket, then accepts connections until the `running`
//! flag is cleared.  Every accepted connection is handed to a per-session
//! Tokio task running inside its own `session` tracing span, so one slow or
//! failing session never blocks the loop or any other session.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

/// How often the accept loop wakes up to check the shutdown flag.
pub const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Binds a TCP listener on `addr` (`host:port`).
///
/// # Errors
///
/// Returns an error if the address cannot be resolved or bound (e.g., the port
/// is already in use or the process lacks permission to bind).
pub async fn bind(addr: &str) -> anyhow::Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind listener on {addr}"))
}

/// Accepts connections until `running` becomes `false`.
///
/// `on_accept` builds the session future for each connection; it is spawned
/// inside a span carrying a fresh session id and the peer address.
pub async fn accept_loop<F, Fut>(listener: TcpListener, running: Arc<AtomicBool>, mut on_accept: F)
where
    F: FnMut(TcpStream, SocketAddr) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    loop {
        if !running.load(Ordering::Relaxed) {
            info!("shutdown flag set; stopping accept loop");
            break;
        }

        // Short timeout so the flag is rechecked even when nobody connects.
        match timeout(ACCEPT_POLL_INTERVAL, listener.accept()).await {
            Ok(Ok((stream, peer))) => {
                let span = info_span!("session", id = %Uuid::new_v4(), %peer);
                span.in_scope(|| info!("accepted connection"));
                tokio::spawn(on_accept(stream, peer).instrument(span));
            }
            Ok(Err(e)) => {
                // Transient (e.g. out of file descriptors); keep accepting.
                error!("accept error: {e}");
            }
            Err(_) => {}
        }
    }
}
