//! Per-listener state shared by every session task.

use std::time::Duration;

use anyhow::Context;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tunnel_core::Relay;

use crate::domain::{SessionSettings, WebSocketSettings};
use crate::infrastructure::ws_conduit::websocket_config;

/// Everything a session needs once its connection has been accepted.
///
/// Built once per listener and shared behind an `Arc`.  `remote` is a
/// `host:port` in server mode and a `ws://` URL in proxy mode.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub(crate) relay: Relay,
    pub(crate) remote: String,
    pub(crate) websocket: WebSocketConfig,
    pub(crate) dial_timeout: Duration,
}

impl SessionContext {
    /// Builds the shared session context.
    ///
    /// # Errors
    ///
    /// Returns an error if the relay tuning in `session` is invalid.
    pub fn new(
        remote: &str,
        session: &SessionSettings,
        websocket: &WebSocketSettings,
    ) -> anyhow::Result<Self> {
        let relay = Relay::new(session.relay_config()).context("invalid relay configuration")?;
        Ok(Self {
            relay,
            remote: remote.to_string(),
            websocket: websocket_config(websocket),
            dial_timeout: session.dial_timeout,
        })
    }

    /// The address or URL each session dials.
    pub fn remote(&self) -> &str {
        &self.remote
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_carries_remote_and_tuning() {
        let session = SessionSettings {
            chunk_size: 4096,
            dial_timeout: Duration::from_secs(3),
            ..SessionSettings::default()
        };
        let websocket = WebSocketSettings::default();

        let ctx = SessionContext::new("127.0.0.1:9000", &session, &websocket).unwrap();

        assert_eq!(ctx.remote(), "127.0.0.1:9000");
        assert_eq!(ctx.dial_timeout, Duration::from_secs(3));
        assert_eq!(ctx.relay.config().chunk_size, 4096);
        assert_eq!(ctx.websocket.max_message_size, Some(websocket.max_message_size));
    }

    #[test]
    fn test_context_rejects_zero_chunk_size() {
        let session = SessionSettings {
            chunk_size: 0,
            ..SessionSettings::default()
        };

        let result = SessionContext::new(
            "ws://127.0.0.1:8000/",
            &session,
            &WebSocketSettings::default(),
        );

        assert!(result.is_err());
    }
}
