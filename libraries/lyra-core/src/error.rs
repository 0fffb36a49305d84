/// Core error types for Lyra
use thiserror::Error;

use crate::types::SongId;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for Lyra
#[derive(Error, Debug)]
pub enum CoreError {
    /// Two catalog entries share an id
    #[error("Duplicate song id in catalog: {0}")]
    DuplicateSongId(SongId),

    /// A song's source could not be turned into a media locator
    #[error("Invalid source locator for song {id}: {reason}")]
    InvalidLocator { id: SongId, reason: String },

    /// Catalog file could not be parsed
    #[error("Catalog parse error: {0}")]
    CatalogParse(#[from] toml::de::Error),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Create an invalid locator error
    pub fn invalid_locator(id: SongId, reason: impl Into<String>) -> Self {
        Self::InvalidLocator {
            id,
            reason: reason.into(),
        }
    }
}
