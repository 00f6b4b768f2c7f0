//! ws-tunnel library crate.
//!
//! Establishes the two connections of every tunnel session and hands them to
//! the [`tunnel_core::Relay`].
//!
//! # Architecture
//!
//! ```text
//! TCP client ──► [proxy mode] ══ WebSocket ══► [server mode] ──► TCP service
//!
//! [ws-tunnel]
//!   ├── domain/           Pure types: TunnelConfig, address validation
//!   ├── application/      Session orchestration: run the relay, log the outcome
//!   └── infrastructure/
//!         ├── listener/   Shared accept loop with a shutdown flag
//!         ├── ws_server/  Server mode: WebSocket accept → TCP dial
//!         ├── tcp_server/ Proxy mode: TCP accept → WebSocket dial
//!         ├── dial/       Outbound TCP and WebSocket connections
//!         ├── context/    Per-listener state shared by session tasks
//!         ├── ws_conduit/ tokio-tungstenite adapters for the relay's frame traits
//!         └── config_file/ Optional TOML tuning file
//! ```
//!
//! # Layer rules
//!
//! - `domain` does no I/O.
//! - `application` depends on `domain` and `tunnel-core` only.
//! - `infrastructure` depends on all other layers plus `tokio` and `tungstenite`.

/// Domain layer: configuration types and validation (no I/O).
pub mod domain;

/// Application layer: per-session orchestration.
pub mod application;

/// Infrastructure layer: listeners, dialers and WebSocket adapters.
pub mod infrastructure;
