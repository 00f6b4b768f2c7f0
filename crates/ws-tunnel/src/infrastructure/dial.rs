//! Outbound connection establishment for both modes.
//!
//! Each session dials its remote side exactly once.  Failures are returned
//! with context so the session task can log them; nothing here retries.

use std::time::Duration;

use anyhow::{anyhow, Context};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::{connect_async_with_config, MaybeTlsStream, WebSocketStream};
use tracing::debug;

/// A dialed WebSocket connection.
pub type DialedWebSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens a TCP connection to `remote` (`host:port`) within `limit`.
///
/// # Errors
///
/// Returns an error if name resolution or the connection fails, or if it does
/// not complete within `limit`.
pub async fn dial_tcp(remote: &str, limit: Duration) -> anyhow::Result<TcpStream> {
    let stream = timeout(limit, TcpStream::connect(remote))
        .await
        .map_err(|_| anyhow!("timed out after {limit:?} connecting to {remote}"))?
        .with_context(|| format!("failed to connect to {remote}"))?;

    set_nodelay(&stream);
    Ok(stream)
}

/// Opens a WebSocket connection to `url` within `limit`, applying `config`.
///
/// # Errors
///
/// Returns an error if the TCP connection or the upgrade handshake fails, or
/// if both together do not complete within `limit`.
pub async fn dial_websocket(
    url: &str,
    config: WebSocketConfig,
    limit: Duration,
) -> anyhow::Result<DialedWebSocket> {
    let (stream, response) = timeout(limit, connect_async_with_config(url, Some(config), true))
        .await
        .map_err(|_| anyhow!("timed out after {limit:?} connecting to {url}"))?
        .with_context(|| format!("WebSocket handshake with {url} failed"))?;

    debug!("{url} accepted upgrade with status {}", response.status());
    Ok(stream)
}

/// Disables Nagle's algorithm so small relayed chunks go out immediately.
pub fn set_nodelay(stream: &TcpStream) {
    if let Err(e) = stream.set_nodelay(true) {
        debug!("could not set TCP_NODELAY: {e}");
    }
}
