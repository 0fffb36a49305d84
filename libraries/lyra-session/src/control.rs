//! Engine commands behind each user intent
//!
//! Free functions over `&dyn MediaEngine` so they can be exercised against a
//! mock engine without a running session.

use lyra_core::{RepeatMode, Song, SongId};
use std::collections::VecDeque;
use tracing::{debug, warn};

use crate::engine::{EngineState, MediaEngine, MediaItem};

/// What happened to a seek request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekOutcome {
    /// Seek issued to the engine at this position
    Issued(u64),

    /// Engine does not know the duration yet; nothing issued
    DurationUnknown,

    /// Target lies past the known duration; nothing issued
    BeyondDuration {
        /// Requested position
        target_ms: u64,
        /// Engine-reported duration
        duration_ms: u64,
    },
}

/// Prepare the engine if it is idle
pub(crate) fn ensure_prepared(engine: &dyn MediaEngine) {
    if engine.playback_state() == EngineState::Idle {
        engine.prepare();
    }
}

/// Load `songs` into the engine if it has no items yet
///
/// Returns whether items were loaded. Songs whose locator does not resolve are
/// skipped with a warning.
pub(crate) fn load_playlist(engine: &dyn MediaEngine, songs: &[Song]) -> bool {
    if engine.media_item_count() != 0 {
        debug!("Engine already holds media items, keeping them");
        return false;
    }

    let items: Vec<MediaItem> = songs
        .iter()
        .filter_map(|song| match MediaItem::from_song(song) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(song_id = %song.id, "Skipping song: {}", e);
                None
            }
        })
        .collect();

    debug!(count = items.len(), "Loading media items");
    engine.set_media_items(items);
    true
}

/// Make `id` the current item and play it
pub(crate) fn select_song(engine: &dyn MediaEngine, id: SongId) {
    let index = (0..engine.media_item_count()).find(|&i| engine.media_id_at(i) == Some(id));

    match index {
        Some(index) if engine.current_index() != Some(index) => {
            engine.seek_to_item(index, 0);
        }
        Some(_) => {}
        None => debug!(song_id = %id, "Selected song is not loaded in the engine"),
    }

    ensure_prepared(engine);
    engine.play();
}

pub(crate) fn play_pause(engine: &dyn MediaEngine) {
    if engine.is_playing() {
        engine.pause();
    } else {
        ensure_prepared(engine);
        engine.play();
    }
}

pub(crate) fn skip_previous(engine: &dyn MediaEngine) {
    ensure_prepared(engine);
    engine.seek_to_previous();
}

pub(crate) fn skip_next(engine: &dyn MediaEngine) {
    ensure_prepared(engine);
    engine.seek_to_next();
}

/// Seek to `seconds` (fraction truncated)
pub(crate) fn seek(engine: &dyn MediaEngine, seconds: f32) -> SeekOutcome {
    let Some(duration_ms) = engine.duration_ms() else {
        return SeekOutcome::DurationUnknown;
    };

    let target_ms = (seconds.max(0.0) as u64).saturating_mul(1000);
    if target_ms > duration_ms {
        return SeekOutcome::BeyondDuration {
            target_ms,
            duration_ms,
        };
    }

    engine.seek_to(target_ms);
    SeekOutcome::Issued(target_ms)
}

/// Request the mode after `requested` and return it
pub(crate) fn cycle_repeat(engine: &dyn MediaEngine, requested: RepeatMode) -> RepeatMode {
    let next = requested.next();
    engine.set_repeat_mode(next);
    next
}

/// Repeat modes requested from the engine and not yet confirmed
///
/// Presses cycle from the last requested mode while requests are
/// outstanding. A confirmation that matches none of them came from another
/// controller and resets the cycle to the engine's mode.
#[derive(Debug, Default)]
pub(crate) struct RepeatRequests {
    mode: RepeatMode,
    pending: VecDeque<RepeatMode>,
}

impl RepeatRequests {
    /// Start over from the engine-reported `mode`
    pub(crate) fn reset(&mut self, mode: RepeatMode) {
        self.mode = mode;
        self.pending.clear();
    }

    /// Request the next mode and remember it as outstanding
    pub(crate) fn cycle(&mut self, engine: &dyn MediaEngine) -> RepeatMode {
        let next = cycle_repeat(engine, self.mode);
        self.mode = next;
        self.pending.push_back(next);
        next
    }

    /// Record an engine-confirmed mode
    pub(crate) fn confirm(&mut self, mode: RepeatMode) {
        match self.pending.iter().position(|requested| *requested == mode) {
            Some(index) => {
                self.pending.drain(..=index);
            }
            None => {
                if !self.pending.is_empty() {
                    debug!(%mode, "Repeat mode changed elsewhere, dropping outstanding requests");
                }
                self.reset(mode);
            }
        }
    }

    pub(crate) fn mode(&self) -> RepeatMode {
        self.mode
    }
}

/// Request the inverse of the engine-reported shuffle flag
pub(crate) fn toggle_shuffle(engine: &dyn MediaEngine) -> bool {
    let enabled = !engine.shuffle_enabled();
    engine.set_shuffle_enabled(enabled);
    enabled
}
