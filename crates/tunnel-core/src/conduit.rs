//! The seams between the relay and the transports it bridges.
//!
//! A session is built from two connections:
//!
//! - a [`ByteStream`]: ordered bytes without boundaries (TCP), split into an
//!   owned [`AsyncRead`] half and an owned [`AsyncWrite`] half;
//! - a [`MessageStream`]: discrete frames (WebSocket), split into a
//!   [`FrameSource`] and a [`FrameSink`].
//!
//! Splitting up front gives each pump exclusive ownership of the halves it
//! touches, so nothing on the data path needs a lock.
//!
//! Closing a conduit must make any call blocked on it return promptly.  The
//! relay relies on this when it tears a session down.

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use crate::error::TransportError;
use crate::frame::Frame;

/// A duplex, boundary-less byte channel that can be split into halves.
pub trait ByteStream: Send {
    type Reader: AsyncRead + Unpin + Send;
    type Writer: AsyncWrite + Unpin + Send;

    /// Consumes the connection and returns its independently owned halves.
    fn into_halves(self) -> (Self::Reader, Self::Writer);
}

impl ByteStream for TcpStream {
    type Reader = OwnedReadHalf;
    type Writer = OwnedWriteHalf;

    fn into_halves(self) -> (Self::Reader, Self::Writer) {
        self.into_split()
    }
}

impl<R, W> ByteStream for (R, W)
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    type Reader = R;
    type Writer = W;

    fn into_halves(self) -> (R, W) {
        self
    }
}

/// The receiving half of a message-stream connection.
#[async_trait]
pub trait FrameSource: Send {
    /// Waits for the next frame.
    ///
    /// Returns `Ok(None)` once the stream has ended cleanly; an `Err` means the
    /// transport failed.  Either way the caller should not read again.
    async fn read_frame(&mut self) -> Result<Option<Frame>, TransportError>;
}

/// The sending half of a message-stream connection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FrameSink: Send {
    /// Sends one frame as a single discrete message.
    async fn write_frame(&mut self, frame: Frame) -> Result<(), TransportError>;

    /// Closes the connection.
    ///
    /// Must be idempotent: closing an already-closed sink, or a sink whose
    /// peer is gone, is a silent no-op.
    async fn close(&mut self);
}

/// A duplex frame channel that can be split into a source and a sink.
pub trait MessageStream: Send {
    type Source: FrameSource;
    type Sink: FrameSink;

    /// Consumes the connection and returns its independently owned halves.
    fn into_halves(self) -> (Self::Source, Self::Sink);
}

impl<S, K> MessageStream for (S, K)
where
    S: FrameSource,
    K: FrameSink,
{
    type Source = S;
    type Sink = K;

    fn into_halves(self) -> (S, K) {
        self
    }
}

#[async_trait]
impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    async fn read_frame(&mut self) -> Result<Option<Frame>, TransportError> {
        (**self).read_frame().await
    }
}

#[async_trait]
impl<K: FrameSink + ?Sized> FrameSink for Box<K> {
    async fn write_frame(&mut self, frame: Frame) -> Result<(), TransportError> {
        (**self).write_frame(frame).await
    }

    async fn close(&mut self) {
        (**self).close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_tuple_byte_stream_returns_halves_unchanged() {
        let (near, mut far) = tokio::io::duplex(64);
        let (_reader, mut writer) = tokio::io::split(near).into_halves();

        writer.write_all(b"hi").await.unwrap();

        let mut buf = [0u8; 2];
        far.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"hi");
    }

    #[tokio::test]
    async fn test_tcp_stream_splits_into_owned_halves() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).await.unwrap();
        let (mut server, _) = listener.accept().await.unwrap();

        let (_reader, mut writer) = client.into_halves();
        writer.write_all(b"ping").await.unwrap();

        let mut buf = [0u8; 4];
        server.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"ping");
    }

    #[tokio::test]
    async fn test_boxed_sink_forwards_to_inner() {
        let mut mock = MockFrameSink::new();
        mock.expect_write_frame()
            .withf(|frame| frame.payload == b"abc")
            .times(1)
            .returning(|_| Ok(()));
        mock.expect_close().times(1).returning(|| ());

        let mut boxed: Box<dyn FrameSink> = Box::new(mock);
        boxed.write_frame(Frame::binary(b"abc".to_vec())).await.unwrap();
        boxed.close().await;
    }
}
