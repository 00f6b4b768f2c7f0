//! Optional TOML tuning file.
//!
//! Every key is optional; anything left out keeps its built-in default.
//! Unknown keys are rejected so that typos do not silently fall back to a
//! default.
//!
//! ```toml
//! [session]
//! chunk_size = 1024
//! close_timeout_ms = 5000
//! dial_timeout_ms = 10000
//!
//! [websocket]
//! write_buffer_size = 131072
//! max_message_size = 67108864
//! max_frame_size = 16777216
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::domain::{SessionSettings, WebSocketSettings};

/// Errors from reading or parsing the tuning file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// `[session]` table.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionSection {
    pub chunk_size: Option<usize>,
    pub close_timeout_ms: Option<u64>,
    pub dial_timeout_ms: Option<u64>,
}

/// `[websocket]` table.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebSocketSection {
    pub write_buffer_size: Option<usize>,
    pub max_message_size: Option<usize>,
    pub max_frame_size: Option<usize>,
}

/// The whole file.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub session: SessionSection,
    pub websocket: WebSocketSection,
}

impl FileConfig {
    /// Parses TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigFileError::Parse`] on malformed TOML, wrong value types
    /// or unknown keys.
    pub fn parse(text: &str) -> Result<Self, ConfigFileError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigFileError::Io`] if the file cannot be read, otherwise
    /// the same errors as [`FileConfig::parse`].
    pub fn load(path: &Path) -> Result<Self, ConfigFileError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Overwrites every setting this file specifies.
    pub fn apply(&self, session: &mut SessionSettings, websocket: &mut WebSocketSettings) {
        let s = &self.session;
        if let Some(v) = s.chunk_size {
            session.chunk_size = v;
        }
        if let Some(ms) = s.close_timeout_ms {
            session.close_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = s.dial_timeout_ms {
            session.dial_timeout = Duration::from_millis(ms);
        }

        let w = &self.websocket;
        if let Some(v) = w.write_buffer_size {
            websocket.write_buffer_size = v;
        }
        if let Some(v) = w.max_message_size {
            websocket.max_message_size = v;
        }
        if let Some(v) = w.max_frame_size {
            websocket.max_frame_size = v;
        }
    }
}
