//! Media engine abstraction
//!
//! The engine is an external collaborator: it opens and decodes media, tracks
//! position and exposes transport controls. Lyra only talks to it through the
//! [`MediaEngine`] trait, obtained asynchronously from an [`EngineConnector`].
//!
//! Commands are fire-and-forget. The engine reports what actually happened by
//! pushing [`EngineEvent`]s into every registered [`EventSink`].

use async_trait::async_trait;
use lyra_core::{MediaLocator, Song, SongId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

use crate::adapter::SessionInput;
use crate::error::Result;
use crate::events::EngineEvent;

/// Engine playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EngineState {
    /// Nothing prepared, or playback failed
    #[default]
    Idle,

    /// Waiting for enough media to play
    Buffering,

    /// Able to play immediately
    Ready,

    /// Reached the end of the item list
    Ended,
}

/// Engine-native media item
///
/// One per song, tagged with the song id so callbacks can be mapped back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    /// Song id the item was built from
    pub media_id: SongId,

    /// Where the engine loads the media from
    pub locator: MediaLocator,

    /// Display title
    pub title: String,

    /// Display artist
    pub artist: String,

    /// Artwork locator
    pub artwork: String,

    /// Duration from catalog metadata
    pub duration_ms: u64,
}

impl MediaItem {
    /// Build the engine item for a song
    pub fn from_song(song: &Song) -> Result<Self> {
        Ok(Self {
            media_id: song.id,
            locator: song.locator()?,
            title: song.title.clone(),
            artist: song.artist.clone(),
            artwork: song.artwork.clone(),
            duration_ms: u64::from(song.duration_secs) * 1000,
        })
    }
}

/// Handle returned by [`MediaEngine::add_listener`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Where an engine delivers its events
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: UnboundedSender<SessionInput>,
}

impl EventSink {
    pub(crate) fn new(tx: UnboundedSender<SessionInput>) -> Self {
        Self { tx }
    }

    /// Deliver an event
    ///
    /// Returns `false` once the receiving session has shut down.
    pub fn emit(&self, event: EngineEvent) -> bool {
        self.tx.send(SessionInput::Engine(event)).is_ok()
    }

    /// Whether the receiving session is still running
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// External media engine
///
/// Mirrors the subset of a platform player the adapter needs. Implementations
/// must be callable from any thread and must not call back into the adapter;
/// events go through the [`EventSink`] only.
#[cfg_attr(test, mockall::automock)]
pub trait MediaEngine: Send + Sync {
    /// Number of loaded media items
    fn media_item_count(&self) -> usize;

    /// Song id of the item at `index`
    fn media_id_at(&self, index: usize) -> Option<SongId>;

    /// Index of the current item
    fn current_index(&self) -> Option<usize>;

    /// Song id of the current item
    fn current_media_id(&self) -> Option<SongId>;

    /// Replace the item list
    fn set_media_items(&self, items: Vec<MediaItem>);

    /// Remove every item
    fn clear_media_items(&self);

    /// Current playback state
    fn playback_state(&self) -> EngineState;

    /// Whether audio is being produced right now
    fn is_playing(&self) -> bool;

    /// Whether media is being loaded
    fn is_loading(&self) -> bool;

    /// Acquire resources for the current item
    fn prepare(&self);

    /// Start or resume playback
    fn play(&self);

    /// Pause playback
    fn pause(&self);

    /// Jump to an item at a position
    fn seek_to_item(&self, index: usize, position_ms: u64);

    /// Seek within the current item
    fn seek_to(&self, position_ms: u64);

    /// Move to the previous item in play order
    fn seek_to_previous(&self);

    /// Move to the next item in play order
    fn seek_to_next(&self);

    /// Duration of the current item, `None` while unknown
    fn duration_ms(&self) -> Option<u64>;

    /// Current position in milliseconds
    fn current_position_ms(&self) -> u64;

    /// How far media has been buffered, in milliseconds
    fn buffered_position_ms(&self) -> u64;

    /// Engine-reported repeat mode
    fn repeat_mode(&self) -> lyra_core::RepeatMode;

    /// Request a repeat mode
    fn set_repeat_mode(&self, mode: lyra_core::RepeatMode);

    /// Engine-reported shuffle flag
    fn shuffle_enabled(&self) -> bool;

    /// Request a shuffle flag
    fn set_shuffle_enabled(&self, enabled: bool);

    /// Last playback failure, if the engine is in an error state
    fn player_error(&self) -> Option<crate::error::PlaybackError>;

    /// Register an event listener
    fn add_listener(&self, sink: EventSink) -> ListenerId;

    /// Unregister an event listener
    fn remove_listener(&self, id: ListenerId);

    /// Release this connection to the engine
    fn release(&self);
}

/// Asynchronously establishes an engine connection
#[async_trait]
pub trait EngineConnector: Send + Sync {
    /// Connect to the engine
    ///
    /// May fail transiently; the caller decides whether to try again.
    async fn connect(&self) -> Result<Arc<dyn MediaEngine>>;
}
