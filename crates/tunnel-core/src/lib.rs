//! # tunnel-core
//!
//! The relay core of the TCP ⇄ WebSocket tunnel: it pairs one byte-stream
//! connection with one message-stream connection and copies data between them
//! until either side ends.
//!
//! This crate opens no sockets and knows nothing about WebSocket handshakes.
//! Callers establish both connections (accept, dial, upgrade) and hand them to
//! [`Relay::run`], which owns them for the lifetime of one session and closes
//! both before returning.
//!
//! # Architecture overview
//!
//! ```text
//!                 ┌──────────── Relay::run ────────────┐
//!  byte stream ──►│ outbound pump: read chunk → 1 frame │──► message stream
//!  (TcpStream)  ◄─│ inbound pump:  frame → write bytes  │◄── (WebSocket)
//!                 └─────────────────────────────────────┘
//! ```
//!
//! - **`frame`** – the message-stream unit: a [`Frame`] with a [`FrameKind`].
//! - **`conduit`** – the traits a connection must implement to be relayed:
//!   [`ByteStream`], [`MessageStream`], [`FrameSource`], [`FrameSink`].
//! - **`pump`** – the two directional copy loops.
//! - **`relay`** – the session driver: runs both pumps, stops at the first
//!   one to finish, closes everything and reports a [`SessionOutcome`].
//! - **`config`** / **`error`** – [`RelayConfig`] and the error types.

pub mod config;
pub mod conduit;
pub mod error;
pub mod frame;
pub mod pump;
pub mod relay;

pub use config::{RelayConfig, DEFAULT_CHUNK_SIZE, DEFAULT_CLOSE_TIMEOUT};
pub use conduit::{ByteStream, FrameSink, FrameSource, MessageStream};
pub use error::{ConfigError, PumpError, TransportError};
pub use frame::{Frame, FrameKind};
pub use pump::{pump_inbound, pump_outbound, DirectionStats, Termination};
pub use relay::{Direction, Relay, SessionOutcome, SessionStats};
