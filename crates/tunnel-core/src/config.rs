//! Relay configuration.

use std::time::Duration;

use crate::error::ConfigError;

/// Default size of one outbound read, and so the largest outbound frame.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Default bound on closing both conduits at the end of a session.
pub const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Tuning for one [`Relay`](crate::Relay).
///
/// Plain `Copy` data: build it once at startup and hand a copy to every
/// session.
///
/// ```rust
/// use tunnel_core::RelayConfig;
///
/// let cfg = RelayConfig::default();
/// assert_eq!(cfg.chunk_size, 1024);
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayConfig {
    /// Maximum number of bytes read from the byte stream per call.  Each
    /// successful read becomes exactly one frame, so this is also the upper
    /// bound on outbound frame size.
    pub chunk_size: usize,

    /// How long the driver waits for each conduit to finish closing before it
    /// drops the connection outright.
    pub close_timeout: Duration,
}

impl RelayConfig {
    /// Checks the invariants the pumps depend on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroChunkSize`] if `chunk_size` is zero and
    /// [`ConfigError::ZeroCloseTimeout`] if `close_timeout` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if self.close_timeout.is_zero() {
            return Err(ConfigError::ZeroCloseTimeout);
        }
        Ok(())
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            close_timeout: DEFAULT_CLOSE_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(RelayConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_default_close_timeout_is_5s() {
        assert_eq!(RelayConfig::default().close_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_zero_chunk_size_is_rejected() {
        let cfg = RelayConfig {
            chunk_size: 0,
            ..RelayConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroChunkSize));
    }

    #[test]
    fn test_one_byte_chunk_is_accepted() {
        let cfg = RelayConfig {
            chunk_size: 1,
            ..RelayConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_zero_close_timeout_is_rejected() {
        let cfg = RelayConfig {
            close_timeout: Duration::ZERO,
            ..RelayConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroCloseTimeout));
    }
}
