use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by presentation surfaces
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// Artwork could not be resolved
    #[error("Artwork unavailable for {locator}: {reason}")]
    Artwork { locator: String, reason: String },

    /// Preference file not found
    #[error("Preference file not found: {0}")]
    PreferencesNotFound(PathBuf),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Preference file could not be encoded or decoded
    #[error("Preference encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl SurfaceError {
    /// Create an artwork error
    pub fn artwork(locator: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Artwork {
            locator: locator.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for surface operations
pub type Result<T> = std::result::Result<T, SurfaceError>;
