//! The session driver.
//!
//! [`Relay::run`] takes ownership of one byte stream and one message stream,
//! splits both, and drives the inbound and outbound pumps side by side inside
//! a single `tokio::select!`.  Whichever pump finishes first decides the
//! session outcome; the other pump is dropped where it was waiting, and both
//! connections are closed before `run` returns.
//!
//! # Shutdown
//!
//! Closing means shutting down the byte-stream write half and closing the
//! frame sink (which sends a WebSocket Close frame for a WebSocket conduit).
//! Each close is bounded by [`RelayConfig::close_timeout`], and the remaining
//! halves are dropped when `run` returns, which releases the sockets.

use std::fmt;
use std::time::{Duration, Instant};

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tracing::debug;

use crate::conduit::{ByteStream, FrameSink, MessageStream};
use crate::config::RelayConfig;
use crate::error::ConfigError;
use crate::pump::{pump_inbound, pump_outbound, DirectionStats, Termination};

/// Identifies one of the two pumps of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Message stream → byte stream.
    Inbound,
    /// Byte stream → message stream.
    Outbound,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Inbound => f.write_str("inbound (message → bytes)"),
            Direction::Outbound => f.write_str("outbound (bytes → message)"),
        }
    }
}

/// Traffic counters for both directions of a session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    /// Message stream → byte stream.
    pub inbound: DirectionStats,
    /// Byte stream → message stream.
    pub outbound: DirectionStats,
}

/// How a session ended, for the caller to log.
///
/// Any termination is a normal end of a proxy session; [`is_error`] only
/// separates clean endings from transport failures so they can be logged at
/// different levels.
///
/// [`is_error`]: SessionOutcome::is_error
#[derive(Debug)]
pub struct SessionOutcome {
    /// The pump that finished first.
    pub finished: Direction,
    /// Why it finished.
    pub termination: Termination,
    /// What both pumps moved before the session closed.
    pub stats: SessionStats,
    /// Wall-clock time from the start of `run` until both conduits were closed.
    pub elapsed: Duration,
}

impl SessionOutcome {
    /// True when the session ended on a transport failure rather than a clean EOF.
    pub fn is_error(&self) -> bool {
        self.termination.is_error()
    }
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} finished first: {}", self.finished, self.termination)
    }
}

/// Pairs a byte stream with a message stream for one session at a time.
///
/// A `Relay` holds only configuration, so one instance can drive any number of
/// concurrent sessions.
///
/// ```rust,no_run
/// use tunnel_core::{Relay, RelayConfig};
///
/// # async fn example<M: tunnel_core::MessageStream>(tcp: tokio::net::TcpStream, ws: M) {
/// let relay = Relay::new(RelayConfig::default()).unwrap();
/// let outcome = relay.run(tcp, ws).await;
/// println!("session over: {outcome}");
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Relay {
    config: RelayConfig,
}

impl Relay {
    /// Creates a relay after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid.
    pub fn new(config: RelayConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration this relay applies to every session.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Relays between `byte_stream` and `message_stream` until either
    /// direction ends, then closes both and reports the outcome.
    pub async fn run<B, M>(&self, byte_stream: B, message_stream: M) -> SessionOutcome
    where
        B: ByteStream,
        M: MessageStream,
    {
        let started = Instant::now();
        let (mut byte_reader, mut byte_writer) = byte_stream.into_halves();
        let (mut frame_source, mut frame_sink) = message_stream.into_halves();
        let mut stats = SessionStats::default();

        // The losing pump's future is dropped here, releasing its borrows.
        let (finished, termination) = tokio::select! {
            end = pump_inbound(&mut frame_source, &mut byte_writer, &mut stats.inbound) => {
                (Direction::Inbound, end)
            }
            end = pump_outbound(
                &mut byte_reader,
                &mut frame_sink,
                self.config.chunk_size,
                &mut stats.outbound,
            ) => {
                (Direction::Outbound, end)
            }
        };

        debug!("{finished} finished first ({termination}); closing both conduits");
        self.close_conduits(&mut byte_writer, &mut frame_sink).await;

        SessionOutcome {
            finished,
            termination,
            stats,
            elapsed: started.elapsed(),
        }
    }

    /// Closes both write-side halves concurrently, each within the close
    /// timeout.  Errors are expected here (the peer is often already gone) and
    /// are only logged.
    async fn close_conduits<W, K>(&self, byte_writer: &mut W, frame_sink: &mut K)
    where
        W: AsyncWrite + Unpin + ?Sized,
        K: FrameSink + ?Sized,
    {
        let limit = self.config.close_timeout;

        let close_bytes = async {
            match timeout(limit, byte_writer.shutdown()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => debug!("byte-stream shutdown: {e}"),
                Err(_) => debug!("byte-stream shutdown timed out after {limit:?}"),
            }
        };
        let close_frames = async {
            if timeout(limit, frame_sink.close()).await.is_err() {
                debug!("message-stream close timed out after {limit:?}");
            }
        };

        tokio::join!(close_bytes, close_frames);
    }
}
