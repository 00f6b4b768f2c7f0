//! tokio-tungstenite adapters for the relay's frame traits.
//!
//! [`WsConduit`] wraps an established `WebSocketStream` (accepted or dialed)
//! and splits into a [`WsFrameSource`] and a [`WsFrameSink`], which implement
//! [`FrameSource`] and [`FrameSink`] from `tunnel-core`.
//!
//! # Message mapping
//!
//! | tungstenite `Message` | relay `Frame` |
//! |-----------------------|---------------|
//! | `Binary(bytes)`       | `Binary`      |
//! | `Text(string)`        | `Text` (UTF-8 bytes) |
//! | `Ping` / `Pong`       | `Ping` / `Pong` |
//! | `Close(_)`            | `Close`       |
//! | `Frame(_)`            | skipped (only produced when writing raw frames) |
//!
//! Protocol-level pings are answered by tungstenite itself; the relay just
//! skips them.

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};
use tokio_tungstenite::WebSocketStream;
use tracing::debug;

use tunnel_core::{Frame, FrameKind, FrameSink, FrameSource, MessageStream, TransportError};

use crate::domain::WebSocketSettings;

/// Builds the tungstenite configuration used for every upgrade and dial.
pub fn websocket_config(settings: &WebSocketSettings) -> WebSocketConfig {
    let mut config = WebSocketConfig::default();
    config.write_buffer_size = settings.write_buffer_size;
    config.max_message_size = Some(settings.max_message_size);
    config.max_frame_size = Some(settings.max_frame_size);
    config
}

/// Converts a tungstenite error into the relay's transport error.
pub fn transport_error(err: WsError) -> TransportError {
    match err {
        WsError::ConnectionClosed | WsError::AlreadyClosed => TransportError::Closed,
        WsError::Io(e) => TransportError::Io(e),
        WsError::Protocol(e) => TransportError::Protocol(e.to_string()),
        other => TransportError::Other(other.to_string()),
    }
}

/// An established WebSocket connection, ready to be relayed.
pub struct WsConduit<S> {
    stream: WebSocketStream<S>,
}

impl<S> WsConduit<S> {
    /// Wraps a stream whose handshake has already completed.
    pub fn new(stream: WebSocketStream<S>) -> Self {
        Self { stream }
    }
}

impl<S> MessageStream for WsConduit<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    type Source = WsFrameSource<S>;
    type Sink = WsFrameSink<S>;

    fn into_halves(self) -> (Self::Source, Self::Sink) {
        let (sink, stream) = self.stream.split();
        (
            WsFrameSource { inner: stream },
            WsFrameSink {
                inner: sink,
                closed: false,
            },
        )
    }
}

/// Receiving half of a [`WsConduit`].
pub struct WsFrameSource<S> {
    inner: SplitStream<WebSocketStream<S>>,
}

#[async_trait]
impl<S> FrameSource for WsFrameSource<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn read_frame(&mut self) -> Result<Option<Frame>, TransportError> {
        loop {
            let message = match self.inner.next().await {
                None => return Ok(None),
                Some(Ok(message)) => message,
                Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) => return Ok(None),
                Some(Err(e)) => return Err(transport_error(e)),
            };

            let frame = match message {
                WsMessage::Binary(payload) => Frame::binary(payload),
                WsMessage::Text(text) => Frame::text(text.into_bytes()),
                WsMessage::Ping(payload) => Frame::ping(payload),
                WsMessage::Pong(payload) => Frame::pong(payload),
                WsMessage::Close(reason) => {
                    if let Some(reason) = reason {
                        debug!("peer closed websocket: {} {}", reason.code, reason.reason);
                    }
                    Frame::close()
                }
                WsMessage::Frame(_) => continue,
            };
            return Ok(Some(frame));
        }
    }
}

/// Sending half of a [`WsConduit`].
pub struct WsFrameSink<S> {
    inner: SplitSink<WebSocketStream<S>, WsMessage>,
    closed: bool,
}

#[async_trait]
impl<S> FrameSink for WsFrameSink<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn write_frame(&mut self, frame: Frame) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }

        let message = match frame.kind {
            FrameKind::Binary => WsMessage::Binary(frame.payload),
            FrameKind::Text => match String::from_utf8(frame.payload) {
                Ok(text) => WsMessage::Text(text),
                Err(e) => WsMessage::Binary(e.into_bytes()),
            },
            FrameKind::Ping => WsMessage::Ping(frame.payload),
            FrameKind::Pong => WsMessage::Pong(frame.payload),
            FrameKind::Close => WsMessage::Close(None),
        };

        // `send` flushes, so every frame leaves as soon as it is written.
        self.inner.send(message).await.map_err(transport_error)
    }

    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        match self.inner.close().await {
            Ok(()) | Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => {}
            Err(e) => debug!("websocket close: {e}"),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
