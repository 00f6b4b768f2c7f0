//! The unit of the message-stream side: a [`Frame`].
//!
//! A frame carries an opaque payload and a [`FrameKind`] tag.  The relay only
//! uses the tag to tell payload frames (`Binary`, `Text`) apart from control
//! frames (`Ping`, `Pong`) and the explicit close indication (`Close`).
//! `Text` payloads are treated as opaque bytes exactly like `Binary` ones.

use std::fmt;

/// The kind tag of a [`Frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// Opaque binary payload.  Every frame the relay emits has this kind.
    Binary,
    /// Text payload; relayed as raw bytes.
    Text,
    /// Keepalive request.  Not part of the payload path.
    Ping,
    /// Keepalive reply.  Not part of the payload path.
    Pong,
    /// The peer is closing the connection.
    Close,
}

impl FrameKind {
    /// Returns `true` for kinds whose payload belongs to the relayed data.
    pub fn carries_payload(self) -> bool {
        matches!(self, FrameKind::Binary | FrameKind::Text)
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrameKind::Binary => "binary",
            FrameKind::Text => "text",
            FrameKind::Ping => "ping",
            FrameKind::Pong => "pong",
            FrameKind::Close => "close",
        };
        f.write_str(name)
    }
}

/// One discrete unit transmitted atomically over a message-stream connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// What the frame carries.
    pub kind: FrameKind,
    /// Raw payload bytes; empty for `Close`.
    pub payload: Vec<u8>,
}

impl Frame {
    /// Builds a frame of any kind.
    pub fn new(kind: FrameKind, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            kind,
            payload: payload.into(),
        }
    }

    /// A `Binary` frame holding `payload`.
    pub fn binary(payload: impl Into<Vec<u8>>) -> Self {
        Self::new(FrameKind::Binary, payload)
    }

    /// A `Text` frame; `payload` is expected to be UTF-8.
    pub fn text(payload: impl Into<Vec<u8>>) -> Self {
        Self::new(FrameKind::Text, payload)
    }

    /// A `Ping` control frame.
    pub fn ping(payload: impl Into<Vec<u8>>) -> Self {
        Self::new(FrameKind::Ping, payload)
    }

    /// A `Pong` control frame.
    pub fn pong(payload: impl Into<Vec<u8>>) -> Self {
        Self::new(FrameKind::Pong, payload)
    }

    /// A `Close` frame with no payload.
    pub fn close() -> Self {
        Self::new(FrameKind::Close, Vec::new())
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// True when the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}
