//! Song catalog
//!
//! The catalog is the fixed, ordered list of playable songs. It is loaded once
//! (usually from a TOML file) and never mutated afterwards; the playlist handed
//! to the engine is the catalog in file order.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use crate::error::{CoreError, Result};
use crate::types::{Song, SongId};

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    songs: Vec<Song>,
}

/// Immutable list of playable songs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    songs: Arc<[Song]>,
}

impl Catalog {
    /// Build a catalog, validating ids and source locators
    pub fn new(songs: Vec<Song>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(songs.len());
        for song in &songs {
            if !seen.insert(song.id) {
                return Err(CoreError::DuplicateSongId(song.id));
            }
            song.locator()?;
        }

        Ok(Self {
            songs: songs.into(),
        })
    }

    /// Parse a catalog from TOML text
    ///
    /// ```toml
    /// [[songs]]
    /// id = 1
    /// title = "Opening"
    /// artist = "Lyra Ensemble"
    /// source = "opening"
    /// artwork = "https://media.example.com/opening.jpg"
    /// duration_secs = 180
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(text)?;
        Self::new(file.songs)
    }

    /// Load a catalog from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// All songs in catalog order
    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    /// Shared handle to the song list, cheap to clone into snapshots
    pub fn shared(&self) -> Arc<[Song]> {
        Arc::clone(&self.songs)
    }

    /// Find a song by id
    pub fn find(&self, id: SongId) -> Option<&Song> {
        self.songs.iter().find(|song| song.id == id)
    }

    /// Number of songs
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    /// Whether the catalog has no songs
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}
