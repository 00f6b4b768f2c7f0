//! ws-tunnel entry point.
//!
//! Carries arbitrary TCP connections across a WebSocket hop.  The same binary
//! runs at both ends:
//!
//! ```text
//! TCP client ──► ws-tunnel proxy ══ WebSocket ══► ws-tunnel server ──► TCP service
//! ```
//!
//! # Usage
//!
//! ```text
//! ws-tunnel [--config <PATH>] [--chunk-size <N>] <COMMAND>
//!
//! Commands:
//!   server, s  Accept WebSocket connections and dial a TCP service
//!              --bind   <HOST:PORT>  [default: 0.0.0.0:8000]
//!              --remote <HOST:PORT>  (required)
//!   proxy, p   Accept TCP connections and dial a ws-tunnel server
//!              --bind   <HOST:PORT>  [default: 127.0.0.1:8001]
//!              --remote <WS_URL>     (required)
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable                | Flag            |
//! |-------------------------|-----------------|
//! | `WS_TUNNEL_CONFIG`      | `--config`      |
//! | `WS_TUNNEL_CHUNK_SIZE`  | `--chunk-size`  |
//! | `WS_TUNNEL_BIND`        | `--bind`        |
//! | `WS_TUNNEL_REMOTE`      | `--remote`      |
//!
//! Flags win over environment variables, which win over the TOML file given
//! by `--config`, which wins over the built-in defaults.

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ws_tunnel::domain::config::{DEFAULT_PROXY_BIND, DEFAULT_SERVER_BIND};
use ws_tunnel::domain::{ModeConfig, ProxyConfig, ServerConfig, TunnelConfig};
use ws_tunnel::infrastructure::{run_tunnel, FileConfig};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Tunnel TCP connections through a WebSocket hop.
#[derive(Debug, Parser)]
#[command(name = "ws-tunnel", version)]
struct Cli {
    /// TOML file with session and WebSocket tuning.
    #[arg(long, global = true, env = "WS_TUNNEL_CONFIG")]
    config: Option<PathBuf>,

    /// Maximum bytes read from the TCP side per outbound WebSocket frame.
    #[arg(long, global = true, env = "WS_TUNNEL_CHUNK_SIZE")]
    chunk_size: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Accept WebSocket connections and relay each to a TCP service.
    #[command(visible_alias = "s")]
    Server {
        /// Address the WebSocket listener binds to.
        #[arg(long, default_value = DEFAULT_SERVER_BIND, env = "WS_TUNNEL_BIND")]
        bind: String,

        /// `host:port` of the TCP service.
        #[arg(long, env = "WS_TUNNEL_REMOTE")]
        remote: String,
    },

    /// Accept TCP connections and relay each to a ws-tunnel server.
    #[command(visible_alias = "p")]
    Proxy {
        /// Address the TCP listener binds to.
        #[arg(long, default_value = DEFAULT_PROXY_BIND, env = "WS_TUNNEL_BIND")]
        bind: String,

        /// `ws://host:port/path` of the ws-tunnel server.
        #[arg(long, env = "WS_TUNNEL_REMOTE")]
        remote: String,
    },
}

impl Cli {
    /// Merges the parsed arguments with the optional config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded or the merged
    /// configuration fails validation.
    fn into_tunnel_config(self) -> anyhow::Result<TunnelConfig> {
        let mode = match self.command {
            Command::Server { bind, remote } => ModeConfig::Server(ServerConfig { bind, remote }),
            Command::Proxy { bind, remote } => ModeConfig::Proxy(ProxyConfig {
                bind,
                remote_url: remote,
            }),
        };
        let mut config = TunnelConfig::new(mode);

        if let Some(path) = &self.config {
            let file = FileConfig::load(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            file.apply(&mut config.session, &mut config.websocket);
        }
        if let Some(chunk_size) = self.chunk_size {
            config.session.chunk_size = chunk_size;
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `RUST_LOG` controls verbosity; `info` when unset or invalid.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_tunnel_config()?;

    info!(
        "ws-tunnel starting — bind={}, remote={}, chunk_size={}",
        config.mode.bind(),
        config.mode.remote(),
        config.session.chunk_size
    );

    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    // The accept loop polls this flag every 200 ms.  Sessions already in
    // flight are left to finish on their own.
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C — initiating graceful shutdown");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    run_tunnel(config, running).await?;

    info!("ws-tunnel stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
