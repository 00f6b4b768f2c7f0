//! Shared test fixtures: an in-memory message-stream conduit.
//!
//! The relay sees a `(ChannelSource, ChannelSink)` pair; the test drives the
//! other end through a [`MessagePeer`].  Closing the relay's sink drops its
//! channel sender, so the peer observes the close as `recv() == None`.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tunnel_core::{Frame, FrameSink, FrameSource, TransportError};

pub struct ChannelSource {
    rx: mpsc::UnboundedReceiver<Frame>,
}

#[async_trait]
impl FrameSource for ChannelSource {
    async fn read_frame(&mut self) -> Result<Option<Frame>, TransportError> {
        Ok(self.rx.recv().await)
    }
}

pub struct ChannelSink {
    tx: Option<mpsc::UnboundedSender<Frame>>,
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl FrameSink for ChannelSink {
    async fn write_frame(&mut self, frame: Frame) -> Result<(), TransportError> {
        let tx = self.tx.as_ref().ok_or(TransportError::Closed)?;
        tx.send(frame).map_err(|_| TransportError::Closed)
    }

    async fn close(&mut self) {
        if self.tx.take().is_some() {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// The test's end of an in-memory message stream.
pub struct MessagePeer {
    pub to_relay: mpsc::UnboundedSender<Frame>,
    pub from_relay: mpsc::UnboundedReceiver<Frame>,
    /// Number of times the relay's sink actually released its connection.
    pub closes: Arc<AtomicUsize>,
}

impl MessagePeer {
    /// Receives frames until the relay closes its sink, returning the
    /// concatenated payloads.
    pub async fn collect_payloads(&mut self) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(frame) = self.from_relay.recv().await {
            out.extend_from_slice(&frame.payload);
        }
        out
    }
}

pub fn message_pair() -> ((ChannelSource, ChannelSink), MessagePeer) {
    let (to_relay, rx) = mpsc::unbounded_channel();
    let (tx, from_relay) = mpsc::unbounded_channel();
    let closes = Arc::new(AtomicUsize::new(0));

    let conduit = (
        ChannelSource { rx },
        ChannelSink {
            tx: Some(tx),
            closes: Arc::clone(&closes),
        },
    );
    let peer = MessagePeer {
        to_relay,
        from_relay,
        closes,
    };
    (conduit, peer)
}
