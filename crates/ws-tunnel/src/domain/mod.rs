//! Domain layer for ws-tunnel.
//!
//! Pure configuration types.  Nothing here touches sockets, files or the
//! environment; the infrastructure layer and `main.rs` populate these values.

pub mod config;

pub use config::{
    ConfigError, ModeConfig, ProxyConfig, ServerConfig, SessionSettings, TunnelConfig,
    WebSocketSettings,
};
