//! Tunnel configuration types.
//!
//! [`TunnelConfig`] is the single source of truth for all runtime settings.
//! `main.rs` builds it from CLI arguments, environment variables and the
//! optional TOML file; tests build it directly.
//!
//! Keeping configuration as plain immutable values (no global state) means
//! each listener receives exactly the settings it needs, including the
//! WebSocket parameters used for every upgrade or dial it performs.

use std::time::Duration;

use thiserror::Error;
use tunnel_core::RelayConfig;

/// Default listen address in server mode (WebSocket side).
pub const DEFAULT_SERVER_BIND: &str = "0.0.0.0:8000";

/// Default listen address in proxy mode (TCP side).
pub const DEFAULT_PROXY_BIND: &str = "127.0.0.1:8001";

/// A configuration value that failed validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An address is not of the form `host:port`.
    #[error("invalid {field} address '{value}': {reason}")]
    InvalidAddress {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    /// The WebSocket URL is not usable.
    #[error("invalid WebSocket URL '{value}': {reason}")]
    InvalidUrl { value: String, reason: &'static str },

    /// The relay tuning is invalid.
    #[error(transparent)]
    Relay(#[from] tunnel_core::ConfigError),

    /// The dial timeout must be non-zero.
    #[error("dial timeout must be greater than zero")]
    ZeroDialTimeout,

    /// A WebSocket size limit is zero.
    #[error("websocket {0} must be greater than zero")]
    ZeroSize(&'static str),

    /// A single frame may not be larger than a whole message.
    #[error("websocket max_frame_size ({frame}) exceeds max_message_size ({message})")]
    FrameExceedsMessage { frame: usize, message: usize },
}

/// Server mode: accept WebSocket connections, dial a TCP service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// `host:port` the WebSocket listener binds to.
    pub bind: String,
    /// `host:port` of the TCP service each session dials.
    pub remote: String,
}

/// Proxy mode: accept TCP connections, dial a WebSocket server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// `host:port` the TCP listener binds to.
    pub bind: String,
    /// `ws://host:port/path` of the ws-tunnel server each session dials.
    pub remote_url: String,
}

/// Which acceptor/dialer pair this process runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeConfig {
    /// WebSocket in, TCP out.
    Server(ServerConfig),
    /// TCP in, WebSocket out.
    Proxy(ProxyConfig),
}

impl ModeConfig {
    /// The address this mode listens on.
    pub fn bind(&self) -> &str {
        match self {
            ModeConfig::Server(cfg) => &cfg.bind,
            ModeConfig::Proxy(cfg) => &cfg.bind,
        }
    }

    /// The address or URL each session dials.
    pub fn remote(&self) -> &str {
        match self {
            ModeConfig::Server(cfg) => &cfg.remote,
            ModeConfig::Proxy(cfg) => &cfg.remote_url,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        validate_host_port("bind", self.bind(), true)?;
        match self {
            ModeConfig::Server(cfg) => validate_host_port("remote", &cfg.remote, false),
            ModeConfig::Proxy(cfg) => validate_ws_url(&cfg.remote_url),
        }
    }
}

/// Per-session tuning shared by both modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// Maximum bytes per outbound read (and so per outbound frame).
    pub chunk_size: usize,
    /// Bound on closing both conduits at session end.
    pub close_timeout: Duration,
    /// Bound on dialing the remote side of a session.
    pub dial_timeout: Duration,
}

impl SessionSettings {
    /// The relay configuration these settings describe.
    pub fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            chunk_size: self.chunk_size,
            close_timeout: self.close_timeout,
        }
    }
}

impl Default for SessionSettings {
    /// | Field          | Default    |
    /// |----------------|------------|
    /// | chunk_size     | 1024 bytes |
    /// | close_timeout  | 5 seconds  |
    /// | dial_timeout   | 10 seconds |
    fn default() -> Self {
        let relay = RelayConfig::default();
        Self {
            chunk_size: relay.chunk_size,
            close_timeout: relay.close_timeout,
            dial_timeout: Duration::from_secs(10),
        }
    }
}

/// WebSocket protocol limits applied to every upgrade and every dial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebSocketSettings {
    /// Bytes buffered before the writer flushes to the socket.
    pub write_buffer_size: usize,
    /// Largest accepted message (after reassembly of fragments).
    pub max_message_size: usize,
    /// Largest accepted single frame.
    pub max_frame_size: usize,
}

impl Default for WebSocketSettings {
    /// Mirrors tungstenite's own defaults.
    fn default() -> Self {
        Self {
            write_buffer_size: 128 * 1024,
            max_message_size: 64 << 20,
            max_frame_size: 16 << 20,
        }
    }
}

impl WebSocketSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        let sizes = [
            ("write_buffer_size", self.write_buffer_size),
            ("max_message_size", self.max_message_size),
            ("max_frame_size", self.max_frame_size),
        ];
        if let Some((name, _)) = sizes.into_iter().find(|(_, v)| *v == 0) {
            return Err(ConfigError::ZeroSize(name));
        }
        if self.max_frame_size > self.max_message_size {
            return Err(ConfigError::FrameExceedsMessage {
                frame: self.max_frame_size,
                message: self.max_message_size,
            });
        }
        Ok(())
    }
}

/// Everything one ws-tunnel process needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelConfig {
    /// Listen address and remote side.
    pub mode: ModeConfig,
    /// Relay and dial tuning.
    pub session: SessionSettings,
    /// Limits for every WebSocket upgrade or dial.
    pub websocket: WebSocketSettings,
}

impl TunnelConfig {
    /// Builds a configuration with default tuning for `mode`.
    pub fn new(mode: ModeConfig) -> Self {
        Self {
            mode,
            session: SessionSettings::default(),
            websocket: WebSocketSettings::default(),
        }
    }

    /// Checks every field.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.mode.validate()?;
        self.session.relay_config().validate()?;
        if self.session.dial_timeout.is_zero() {
            return Err(ConfigError::ZeroDialTimeout);
        }
        self.websocket.validate()
    }
}

/// Checks that `value` looks like `host:port`.
///
/// The host is not resolved here; that happens when the address is bound or
/// dialed.  Port 0 is only accepted for listen addresses.
pub fn validate_host_port(
    field: &'static str,
    value: &str,
    allow_port_zero: bool,
) -> Result<(), ConfigError> {
    let invalid = |reason| ConfigError::InvalidAddress {
        field,
        value: value.to_string(),
        reason,
    };

    let (host, port) = value.rsplit_once(':').ok_or_else(|| invalid("missing ':port'"))?;
    if host.is_empty() || host == "[]" {
        return Err(invalid("empty host"));
    }
    let port: u16 = port
        .parse()
        .map_err(|_| invalid("port must be a number between 0 and 65535"))?;
    if port == 0 && !allow_port_zero {
        return Err(invalid("port 0 cannot be dialed"));
    }
    Ok(())
}

/// Checks that `value` is a plain `ws://` URL with a host.
pub fn validate_ws_url(value: &str) -> Result<(), ConfigError> {
    let invalid = |reason| ConfigError::InvalidUrl {
        value: value.to_string(),
        reason,
    };

    let rest = match value.strip_prefix("ws://") {
        Some(rest) => rest,
        None if value.starts_with("wss://") => {
            return Err(invalid("wss:// requires TLS, which is not supported"))
        }
        None => return Err(invalid("expected a ws:// URL")),
    };

    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if authority.is_empty() {
        return Err(invalid("missing host"));
    }
    if let Some((host, port)) = authority.rsplit_once(':') {
        // A bare IPv6 literal without a port ends in ']' after the last ':'.
        if !port.ends_with(']') {
            if host.is_empty() {
                return Err(invalid("missing host"));
            }
            if port.parse::<u16>().is_err() {
                return Err(invalid("port must be a number between 0 and 65535"));
            }
        }
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
