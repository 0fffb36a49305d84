/// Song domain type
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;

use crate::error::{CoreError, Result};

/// Song identifier
///
/// Caller-assigned and unique within a catalog. Engines tag their media
/// items with it so callbacks can be mapped back to catalog entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SongId(i32);

impl SongId {
    /// Create a new song ID
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Get the raw integer value
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl From<i32> for SongId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Playable catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Song {
    /// Unique song identifier
    pub id: SongId,

    /// Song title
    pub title: String,

    /// Artist name
    pub artist: String,

    /// Remote `http(s)` URI or bundled resource name
    pub source: String,

    /// Artwork locator
    pub artwork: String,

    /// Duration in seconds
    pub duration_secs: u32,
}

impl Song {
    /// Create a new song
    pub fn new(
        id: impl Into<SongId>,
        title: impl Into<String>,
        artist: impl Into<String>,
        source: impl Into<String>,
        artwork: impl Into<String>,
        duration_secs: u32,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            source: source.into(),
            artwork: artwork.into(),
            duration_secs,
        }
    }

    /// Get the song duration as a Duration
    pub fn duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.duration_secs))
    }

    /// Resolve the source into a media locator
    pub fn locator(&self) -> Result<MediaLocator> {
        MediaLocator::parse(self.id, &self.source)
    }
}

/// Where an engine should load a song from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MediaLocator {
    /// Remote HTTP(S) resource
    Remote(Url),

    /// Resource bundled with the application, by name
    Bundled(String),
}

impl MediaLocator {
    /// Parse a song source
    ///
    /// Sources starting with `http` are remote URLs; anything else names a
    /// bundled resource.
    pub fn parse(id: SongId, source: &str) -> Result<Self> {
        if source.starts_with("http") {
            let url = Url::parse(source).map_err(|e| CoreError::invalid_locator(id, e.to_string()))?;
            return Ok(Self::Remote(url));
        }

        if source.trim().is_empty() {
            return Err(CoreError::invalid_locator(id, "empty source"));
        }

        Ok(Self::Bundled(source.to_string()))
    }

    /// Whether the media has to be fetched over the network
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

impl fmt::Display for MediaLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(url) => write!(f, "{url}"),
            Self::Bundled(name) => write!(f, "bundled:{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(source: &str) -> Song {
        Song::new(7, "Title", "Artist", source, "https://img.example.com/7.jpg", 200)
    }

    #[test]
    fn http_sources_are_remote() {
        let locator = song("https://media.example.com/a.mp3").locator().unwrap();
        assert!(locator.is_remote());
        assert_eq!(locator.to_string(), "https://media.example.com/a.mp3");
    }

    #[test]
    fn other_sources_are_bundled() {
        let locator = song("night_drive").locator().unwrap();
        assert_eq!(locator, MediaLocator::Bundled("night_drive".to_string()));
        assert_eq!(locator.to_string(), "bundled:night_drive");
    }

    #[test]
    fn malformed_http_source_is_rejected() {
        let err = song("http://").locator().unwrap_err();
        assert!(matches!(err, CoreError::InvalidLocator { id, .. } if id == SongId::new(7)));
    }

    #[test]
    fn empty_source_is_rejected() {
        assert!(song("  ").locator().is_err());
    }

    #[test]
    fn duration_conversion() {
        assert_eq!(song("a").duration(), Duration::from_secs(200));
    }
}
