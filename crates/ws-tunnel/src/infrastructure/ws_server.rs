//! Server mode: accept WebSocket clients, dial the TCP service.
//!
//! For every accepted TCP connection the session task:
//!
//! 1. Completes the WebSocket upgrade handshake.
//! 2. Dials the configured TCP service.
//! 3. Hands both connections to the relay and logs the outcome.
//!
//! A failed upgrade or dial ends only that session.  The accept loop keeps
//! running until the shutdown flag is cleared.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::accept_async_with_config;
use tracing::{debug, info, warn};

use crate::application::run_session;
use crate::infrastructure::context::SessionContext;
use crate::infrastructure::dial::{dial_tcp, set_nodelay};
use crate::infrastructure::listener::accept_loop;
use crate::infrastructure::ws_conduit::WsConduit;

/// Runs the server-mode accept loop on `listener` until `running` is cleared.
pub async fn serve(listener: TcpListener, ctx: Arc<SessionContext>, running: Arc<AtomicBool>) {
    match listener.local_addr() {
        Ok(addr) => info!("server mode listening on {addr}, forwarding to {}", ctx.remote),
        Err(e) => debug!("could not read listener address: {e}"),
    }

    accept_loop(listener, running, move |stream, _peer| {
        let ctx = Arc::clone(&ctx);
        async move {
            if let Err(e) = handle_connection(stream, ctx).await {
                warn!("session aborted: {e:#}");
            }
        }
    })
    .await;
}

/// One server-mode session, from upgrade to teardown.
async fn handle_connection(stream: TcpStream, ctx: Arc<SessionContext>) -> anyhow::Result<()> {
    set_nodelay(&stream);

    let mut ws = timeout(ctx.dial_timeout, accept_async_with_config(stream, Some(ctx.websocket)))
        .await
        .map_err(|_| anyhow!("WebSocket upgrade timed out after {:?}", ctx.dial_timeout))?
        .context("WebSocket upgrade failed")?;
    debug!("WebSocket upgrade complete");

    let tcp = match dial_tcp(&ctx.remote, ctx.dial_timeout).await {
        Ok(tcp) => tcp,
        Err(e) => {
            // Tell the client why it is being dropped before giving up.
            if let Err(close_err) = ws.close(None).await {
                debug!("closing WebSocket after failed dial: {close_err}");
            }
            return Err(e);
        }
    };
    debug!("connected to {}", ctx.remote);

    run_session(&ctx.relay, tcp, WsConduit::new(ws)).await;
    Ok(())
}
