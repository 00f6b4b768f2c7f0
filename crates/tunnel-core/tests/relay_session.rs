//! Session-level tests for `Relay::run`.
//!
//! Each test wires the relay between a `tokio::io::duplex` byte stream and an
//! in-memory message stream (see `common`), then drives both far ends the way
//! a TCP client and a WebSocket peer would.

mod common;

use std::sync::atomic::Ordering;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;
use tunnel_core::{Direction, Frame, FrameKind, Relay, RelayConfig, Termination};

use common::message_pair;

const BOUND: Duration = Duration::from_secs(5);

fn relay() -> Relay {
    Relay::new(RelayConfig::default()).expect("default config is valid")
}

/// Walks through one request/response exchange, then the TCP side hangs up.
#[tokio::test]
async fn test_request_response_then_byte_side_close() {
    // Arrange
    let (near, mut tcp_peer) = tokio::io::duplex(1024);
    let (conduit, mut ws_peer) = message_pair();
    let session = tokio::spawn(async move { relay().run(tokio::io::split(near), conduit).await });

    // Act 1: the TCP client sends a request.
    tcp_peer.write_all(b"GET /\r\n").await.unwrap();

    // Assert 1: exactly one binary frame with the request.
    let frame = timeout(BOUND, ws_peer.from_relay.recv())
        .await
        .expect("frame must arrive")
        .expect("sink must still be open");
    assert_eq!(frame, Frame::binary(b"GET /\r\n".to_vec()));

    // Act 2: the WebSocket peer answers.
    ws_peer
        .to_relay
        .send(Frame::binary(b"HTTP/1.1 200 OK\r\n".to_vec()))
        .unwrap();

    // Assert 2: the TCP client reads exactly the 17 payload bytes.
    let mut response = [0u8; 17];
    timeout(BOUND, tcp_peer.read_exact(&mut response))
        .await
        .expect("response must arrive")
        .unwrap();
    assert_eq!(&response, b"HTTP/1.1 200 OK\r\n");

    // Act 3: the TCP client closes.
    drop(tcp_peer);

    // Assert 3: the message side is closed and the outcome names byte-side EOF.
    let outcome = timeout(BOUND, session).await.expect("session must end").unwrap();
    assert_eq!(outcome.finished, Direction::Outbound);
    assert!(matches!(outcome.termination, Termination::EndOfStream));
    assert!(timeout(BOUND, ws_peer.from_relay.recv()).await.unwrap().is_none());
    assert_eq!(ws_peer.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_byte_stream_writes_arrive_as_frames_without_loss() {
    // Arrange
    let (near, mut tcp_peer) = tokio::io::duplex(256);
    let (conduit, mut ws_peer) = message_pair();
    let session = tokio::spawn(async move { relay().run(tokio::io::split(near), conduit).await });

    let writes: Vec<Vec<u8>> = (0u8..50).map(|i| vec![i; usize::from(i) * 37 + 1]).collect();
    let expected: Vec<u8> = writes.concat();

    // Act
    for w in &writes {
        tcp_peer.write_all(w).await.unwrap();
    }
    drop(tcp_peer);
    let received = timeout(BOUND, ws_peer.collect_payloads()).await.unwrap();

    // Assert
    assert_eq!(received, expected);
    let outcome = session.await.unwrap();
    assert_eq!(outcome.stats.outbound.bytes, expected.len() as u64);
}

#[tokio::test]
async fn test_outbound_frames_never_exceed_chunk_size() {
    let relay = Relay::new(RelayConfig {
        chunk_size: 100,
        ..RelayConfig::default()
    })
    .unwrap();
    let (near, mut tcp_peer) = tokio::io::duplex(4096);
    let (conduit, mut ws_peer) = message_pair();
    let session = tokio::spawn(async move { relay.run(tokio::io::split(near), conduit).await });

    tcp_peer.write_all(&[7u8; 1000]).await.unwrap();
    drop(tcp_peer);

    let mut total = 0;
    while let Some(frame) = timeout(BOUND, ws_peer.from_relay.recv()).await.unwrap() {
        assert_eq!(frame.kind, FrameKind::Binary);
        assert!(!frame.payload.is_empty() && frame.payload.len() <= 100);
        total += frame.payload.len();
    }
    assert_eq!(total, 1000);
    session.await.unwrap();
}

#[tokio::test]
async fn test_frames_arrive_on_byte_stream_without_loss() {
    // Arrange
    let (near, mut tcp_peer) = tokio::io::duplex(64);
    let (conduit, ws_peer) = message_pair();
    let session = tokio::spawn(async move { relay().run(tokio::io::split(near), conduit).await });

    let payloads: Vec<Vec<u8>> = (0u8..40).map(|i| vec![i; usize::from(i) * 11]).collect();
    let expected = payloads.concat();

    // Act: text and binary frames alike, plus interleaved keepalives.
    for (i, p) in payloads.iter().enumerate() {
        let frame = if i % 2 == 0 {
            Frame::binary(p.clone())
        } else {
            Frame::text(p.clone())
        };
        ws_peer.to_relay.send(frame).unwrap();
        ws_peer.to_relay.send(Frame::ping(b"hb".to_vec())).unwrap();
    }
    drop(ws_peer.to_relay);

    let mut received = Vec::new();
    timeout(BOUND, tcp_peer.read_to_end(&mut received))
        .await
        .unwrap()
        .unwrap();

    // Assert
    assert_eq!(received, expected);
    let outcome = session.await.unwrap();
    assert_eq!(outcome.finished, Direction::Inbound);
    assert_eq!(outcome.stats.inbound.control_frames, 40);
}

#[tokio::test]
async fn test_message_side_close_ends_idle_session() {
    // Arrange: nothing is ever written on the TCP side.
    let (near, mut tcp_peer) = tokio::io::duplex(64);
    let (conduit, mut ws_peer) = message_pair();
    let session = tokio::spawn(async move { relay().run(tokio::io::split(near), conduit).await });

    // Act: the WebSocket peer sends Close.
    ws_peer.to_relay.send(Frame::close()).unwrap();

    // Assert: the TCP client sees EOF without doing anything else.
    let mut buf = [0u8; 16];
    let n = timeout(BOUND, tcp_peer.read(&mut buf))
        .await
        .expect("byte side must be closed promptly")
        .unwrap();
    assert_eq!(n, 0);

    let outcome = timeout(BOUND, session).await.unwrap().unwrap();
    assert_eq!(outcome.finished, Direction::Inbound);
    assert!(!outcome.is_error());
    assert!(ws_peer.from_relay.recv().await.is_none());
}

#[tokio::test]
async fn test_stalled_inbound_write_does_not_block_outbound() {
    // Arrange: a tiny duplex buffer, and the TCP client never reads, so the
    // inbound pump blocks in write_all.
    let (near, mut tcp_peer) = tokio::io::duplex(8);
    let (conduit, mut ws_peer) = message_pair();
    let session = tokio::spawn(async move { relay().run(tokio::io::split(near), conduit).await });

    ws_peer.to_relay.send(Frame::binary(vec![0xAA; 4096])).unwrap();

    // Act: meanwhile the TCP client keeps talking.
    for i in 0u8..5 {
        tcp_peer.write_all(&[i; 3]).await.unwrap();

        // Assert: every chunk still comes out on the message side.
        let frame = timeout(BOUND, ws_peer.from_relay.recv())
            .await
            .expect("outbound must progress while inbound is stalled")
            .unwrap();
        assert_eq!(frame.payload, vec![i; 3]);
    }

    drop(tcp_peer);
    let outcome = timeout(BOUND, session).await.unwrap().unwrap();
    // The stalled write fails once the TCP client is gone, or the outbound
    // pump sees EOF first; either way the session ends.
    assert!(matches!(outcome.finished, Direction::Inbound | Direction::Outbound));
}

#[tokio::test]
async fn test_session_with_peers_already_gone_closes_quietly() {
    // Arrange: both far ends are gone before the session even starts.
    let (near, tcp_peer) = tokio::io::duplex(64);
    let (conduit, ws_peer) = message_pair();
    drop(tcp_peer);
    drop(ws_peer);

    // Act
    let outcome = timeout(BOUND, relay().run(tokio::io::split(near), conduit))
        .await
        .expect("session must end");

    // Assert: a clean end-of-stream, with no error surfaced by the close path.
    assert!(!outcome.is_error());
}

#[tokio::test]
async fn test_relay_can_drive_concurrent_sessions() {
    let relay = relay();
    let mut handles = Vec::new();

    for i in 0u8..8 {
        let relay = relay.clone();
        handles.push(tokio::spawn(async move {
            let (near, mut tcp_peer) = tokio::io::duplex(64);
            let (conduit, mut ws_peer) = message_pair();
            let session =
                tokio::spawn(async move { relay.run(tokio::io::split(near), conduit).await });

            tcp_peer.write_all(&[i; 10]).await.unwrap();
            drop(tcp_peer);
            let payload = ws_peer.collect_payloads().await;
            session.await.unwrap();
            payload
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let payload = timeout(BOUND, handle).await.unwrap().unwrap();
        assert_eq!(payload, vec![i as u8; 10]);
    }
}
