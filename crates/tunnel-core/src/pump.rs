//! The two directional pumps of a session.
//!
//! Each pump is a plain loop over its source: read, convert, write.  A pump
//! owns no connection; it borrows exactly the two halves it needs, which lets
//! the [`Relay`](crate::Relay) run both pumps side by side and get the halves
//! back once either pump stops.
//!
//! ```text
//! inbound:  FrameSource ──read_frame──► payload ──write_all──► byte writer
//! outbound: byte reader ──read(chunk)──► 1 Binary frame ──write_frame──► FrameSink
//! ```
//!
//! Both loops run `Running → Terminated{reason}` with no retry state: the
//! first end-of-stream or error ends the pump.

use std::fmt;
use std::io::ErrorKind;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

use crate::conduit::{FrameSink, FrameSource};
use crate::error::PumpError;
use crate::frame::{Frame, FrameKind};

/// Why a pump stopped.
#[derive(Debug)]
pub enum Termination {
    /// The source ended cleanly: byte-stream EOF, end of the frame stream, or
    /// a `Close` frame from the peer.
    EndOfStream,
    /// A read or write failed.
    Failed(PumpError),
}

impl Termination {
    /// Returns `true` if the pump stopped because of an error.
    pub fn is_error(&self) -> bool {
        matches!(self, Termination::Failed(_))
    }

    /// Returns the error that stopped the pump, if any.
    pub fn error(&self) -> Option<&PumpError> {
        match self {
            Termination::EndOfStream => None,
            Termination::Failed(err) => Some(err),
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::EndOfStream => f.write_str("end of stream"),
            Termination::Failed(err) => write!(f, "{err}"),
        }
    }
}

/// Traffic counters for one direction of a session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DirectionStats {
    /// Payload-bearing frames moved in this direction.
    pub frames: u64,
    /// Payload bytes moved in this direction.
    pub bytes: u64,
    /// Control frames (ping/pong) read and dropped.  Always zero outbound.
    pub control_frames: u64,
}

impl DirectionStats {
    fn record(&mut self, len: usize) {
        self.frames += 1;
        self.bytes += len as u64;
    }
}

/// Copies frame payloads from `source` to `writer` until either side stops.
///
/// `Binary` and `Text` payloads are written in full (`write_all` + `flush`);
/// `Ping`/`Pong` frames are skipped; a `Close` frame or the end of the frame
/// stream ends the pump with [`Termination::EndOfStream`].
pub async fn pump_inbound<S, W>(
    source: &mut S,
    writer: &mut W,
    stats: &mut DirectionStats,
) -> Termination
where
    S: FrameSource + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    loop {
        let frame = match source.read_frame().await {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                debug!("message stream ended");
                return Termination::EndOfStream;
            }
            Err(e) => return Termination::Failed(PumpError::FrameRead(e)),
        };

        match frame.kind {
            FrameKind::Binary | FrameKind::Text => {
                trace!(kind = %frame.kind, len = frame.len(), "message → bytes");
                if let Err(e) = writer.write_all(&frame.payload).await {
                    return Termination::Failed(PumpError::ByteWrite(e));
                }
                if let Err(e) = writer.flush().await {
                    return Termination::Failed(PumpError::ByteWrite(e));
                }
                stats.record(frame.len());
            }
            FrameKind::Ping | FrameKind::Pong => {
                trace!(kind = %frame.kind, "skipping control frame");
                stats.control_frames += 1;
            }
            FrameKind::Close => {
                debug!("peer sent close frame");
                return Termination::EndOfStream;
            }
        }
    }
}

/// Copies byte chunks from `reader` to `sink`, one frame per successful read.
///
/// Reads at most `chunk_size` bytes at a time.  Every read of `n > 0` bytes
/// becomes exactly one `Binary` frame holding those `n` bytes.  A zero-length
/// read is EOF and ends the pump with [`Termination::EndOfStream`].
///
/// `chunk_size` must be at least 1; a zero value is treated as 1.
pub async fn pump_outbound<R, K>(
    reader: &mut R,
    sink: &mut K,
    chunk_size: usize,
    stats: &mut DirectionStats,
) -> Termination
where
    R: AsyncRead + Unpin + ?Sized,
    K: FrameSink + ?Sized,
{
    let mut chunk = vec![0u8; chunk_size.max(1)];

    loop {
        let n = match reader.read(&mut chunk).await {
            Ok(0) => {
                debug!("byte stream reached EOF");
                return Termination::EndOfStream;
            }
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Termination::Failed(PumpError::ByteRead(e)),
        };

        trace!(len = n, "bytes → message");
        if let Err(e) = sink.write_frame(Frame::binary(&chunk[..n])).await {
            return Termination::Failed(PumpError::FrameWrite(e));
        }
        stats.record(n);
    }
}
