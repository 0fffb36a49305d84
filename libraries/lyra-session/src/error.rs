//! Error types for the playback session

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category of an engine-reported playback failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackErrorKind {
    /// The media source could not be opened or read
    Source,

    /// Network failure while fetching remote media
    Network,

    /// The media could not be decoded
    Decoder,

    /// Anything the engine did not classify
    Unspecified,
}

impl std::fmt::Display for PlaybackErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Source => "source error",
            Self::Network => "network error",
            Self::Decoder => "decoder error",
            Self::Unspecified => "playback error",
        };
        f.write_str(name)
    }
}

/// Playback error reported by the engine
///
/// Stored in state snapshots, so it is a plain cloneable value rather than a
/// boxed error chain.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct PlaybackError {
    /// Failure category
    pub kind: PlaybackErrorKind,

    /// Human-readable description, suitable for display
    pub message: String,
}

impl PlaybackError {
    /// Create a playback error
    pub fn new(kind: PlaybackErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Create a source error
    pub fn source_unavailable(message: impl Into<String>) -> Self {
        Self::new(PlaybackErrorKind::Source, message)
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PlaybackErrorKind::Network, message)
    }

    /// Create a decoder error
    pub fn decoder(message: impl Into<String>) -> Self {
        Self::new(PlaybackErrorKind::Decoder, message)
    }
}

/// Session errors
#[derive(Debug, Error)]
pub enum SessionError {
    /// The engine connection could not be established
    #[error("Engine connection failed: {0}")]
    Connection(String),

    /// Invalid session configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Errors from the core crate
    #[error(transparent)]
    Core(#[from] lyra_core::CoreError),
}

impl SessionError {
    /// Create a connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playback_error_display_includes_kind() {
        let err = PlaybackError::network("connection reset");
        assert_eq!(err.to_string(), "network error: connection reset");
    }

    #[test]
    fn playback_errors_compare_by_value() {
        assert_eq!(PlaybackError::decoder("bad frame"), PlaybackError::decoder("bad frame"));
        assert_ne!(PlaybackError::decoder("bad frame"), PlaybackError::source_unavailable("bad frame"));
    }
}
