//! Proxy mode: accept TCP clients, dial the ws-tunnel server.
//!
//! Each accepted TCP connection gets its own WebSocket connection to the
//! configured URL.  If the dial fails the TCP client is disconnected and the
//! accept loop carries on.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::application::run_session;
use crate::infrastructure::context::SessionContext;
use crate::infrastructure::dial::{dial_websocket, set_nodelay};
use crate::infrastructure::listener::accept_loop;
use crate::infrastructure::ws_conduit::WsConduit;

/// Runs the proxy-mode accept loop on `listener` until `running` is cleared.
pub async fn serve(listener: TcpListener, ctx: Arc<SessionContext>, running: Arc<AtomicBool>) {
    match listener.local_addr() {
        Ok(addr) => info!("proxy mode listening on {addr}, forwarding to {}", ctx.remote),
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

/// One proxy-mode session, from dial to teardown.
async fn handle_connection(mut stream: TcpStream, ctx: Arc<SessionContext>) -> anyhow::Result<()> {
    set_nodelay(&stream);

    let ws = match dial_websocket(&ctx.remote, ctx.websocket, ctx.dial_timeout).await {
        Ok(ws) => ws,
        Err(e) => {
            if let Err(shutdown_err) = stream.shutdown().await {
                debug!("shutting down client after failed dial: {shutdown_err}");
            }
            return Err(e);
        }
    };
    debug!("connected to {}", ctx.remote);

    run_session(&ctx.relay, stream, WsConduit::new(ws)).await;
    Ok(())
}
