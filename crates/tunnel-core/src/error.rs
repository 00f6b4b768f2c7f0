//! Error types for the relay core.
//!
//! Two families exist:
//!
//! - [`TransportError`] is what a message-stream conduit reports when reading or
//!   writing a frame fails.  Byte-stream conduits report plain
//!   [`std::io::Error`]s.
//! - [`PumpError`] records *which* half of the session failed, wrapping the
//!   underlying transport error.  It is the payload of
//!   [`Termination::Failed`](crate::Termination::Failed).
//!
//! [`ConfigError`] covers invalid [`RelayConfig`](crate::RelayConfig) values.

use std::io;

use thiserror::Error;

/// A failure of a message-stream (framed) transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The connection was already closed when the operation was attempted.
    #[error("connection closed")]
    Closed,

    /// The peer violated the framing protocol (bad opcode, reset without a
    /// closing handshake, oversized frame, ...).
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// The underlying socket failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Any other transport-specific failure.
    #[error("{0}")]
    Other(String),
}

/// The condition that stopped a pump, tagged with the half that failed.
#[derive(Debug, Error)]
pub enum PumpError {
    /// Reading from the byte-stream connection failed.
    #[error("byte-stream read failed: {0}")]
    ByteRead(#[source] io::Error),

    /// Writing to the byte-stream connection failed.
    #[error("byte-stream write failed: {0}")]
    ByteWrite(#[source] io::Error),

    /// Reading a frame from the message-stream connection failed.
    #[error("message-stream read failed: {0}")]
    FrameRead(#[source] TransportError),

    /// Writing a frame to the message-stream connection failed.
    #[error("message-stream write failed: {0}")]
    FrameWrite(#[source] TransportError),
}

/// An invalid relay configuration value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The outbound chunk size must be at least one byte, otherwise every read
    /// would look like end-of-stream.
    #[error("chunk size must be at least 1 byte")]
    ZeroChunkSize,

    /// The close timeout must be non-zero.
    #[error("close timeout must be greater than zero")]
    ZeroCloseTimeout,
}
