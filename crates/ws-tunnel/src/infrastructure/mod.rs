//! Infrastructure layer for ws-tunnel.
//!
//! Handles all I/O: binding the listener, accepting connections, dialing the
//! remote side, and adapting tokio-tungstenite streams to the relay's frame
//! traits.
//!
//! # What does NOT belong here?
//!
//! - Relay semantics (that is `tunnel-core`)
//! - Configuration types and validation (that is the domain layer)
//! - CLI parsing (that is done in `main.rs`)

pub mod config_file;
pub mod context;
pub mod dial;
pub mod listener;
pub mod tcp_server;
pub mod ws_conduit;
pub mod ws_server;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Context;

use crate::domain::{ModeConfig, TunnelConfig};

pub use config_file::{ConfigFileError, FileConfig};
pub use context::SessionContext;

/// Validates `config`, binds the listener and serves until `running` is
/// cleared.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the listener cannot
/// be bound.  Session failures are logged, never returned.
pub async fn run_tunnel(config: TunnelConfig, running: Arc<AtomicBool>) -> anyhow::Result<()> {
    config.validate().context("invalid configuration")?;

    let listener = listener::bind(config.mode.bind()).await?;

    let ctx = SessionContext::new(config.mode.remote(), &config.session, &config.websocket)?;
    let ctx = Arc::new(ctx);

    match config.mode {
        ModeConfig::Server(_) => ws_server::serve(listener, ctx, running).await,
        ModeConfig::Proxy(_) => tcp_server::serve(listener, ctx, running).await,
    }

    Ok(())
}
