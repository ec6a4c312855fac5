//! Error type shared by the composer core and its C ABI.
//!
//! The text functions (tokenize, suggest, insert) never fail; only message
//! preparation, config loading and the FFI request decoding do.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error("message content is empty")]
    EmptyMessage,

    #[error("invalid request: {0}")]
    InvalidRequest(#[source] serde_json::Error),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("null pointer passed across the FFI boundary")]
    NullPointer,

    #[error("request is not valid UTF-8")]
    InvalidUtf8,
}

impl ComposeError {
    /// Stable machine-readable tag used in FFI error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            ComposeError::EmptyMessage => "empty_message",
            ComposeError::InvalidRequest(_) => "invalid_request",
            ComposeError::ConfigRead { .. } => "config_read",
            ComposeError::ConfigParse { .. } => "config_parse",
            ComposeError::NullPointer => "null_pointer",
            ComposeError::InvalidUtf8 => "invalid_utf8",
        }
    }
}

pub type Result<T> = std::result::Result<T, ComposeError>;
