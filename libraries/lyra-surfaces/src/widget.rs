//! Home-screen widget surface
//!
//! The widget host renders from its own key/value store, so the current song
//! and position are mirrored into it. Missing keys read back as sentinels:
//! `i32::MIN` for integers, `i64::MIN` for longs and the empty string.

use lyra_core::{Song, SongId};
use lyra_session::{ControlSurface, PlayerState, StateSubscriber};
use tracing::debug;

use crate::preferences::{PreferenceStore, PreferenceValue};

pub const ID_KEY: &str = "widgetIdKey";
pub const SONG_NAME_KEY: &str = "widgetSongNameKey";
pub const ARTIST_NAME_KEY: &str = "artistNameKey";
pub const SOURCE_KEY: &str = "widgetSourceKey";
pub const THUMB_KEY: &str = "widgetThumbKey";
pub const DURATION_SECONDS_KEY: &str = "widgetDurationSecondsKey";
pub const CURRENT_POSITION_KEY: &str = "widgetCurrentPositionKey";

const NO_INT: i32 = i32::MIN;
const NO_LONG: i64 = i64::MIN;

/// What the widget shows, read back from the store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetState {
    /// `None` until a song has been stored
    pub song: Option<Song>,

    /// `None` until a position has been stored
    pub position_ms: Option<u64>,
}

/// Store `song` and `position_ms` for the widget
pub fn save(store: &mut dyn PreferenceStore, song: &Song, position_ms: u64) {
    store.set(ID_KEY, PreferenceValue::Int(song.id.get()));
    store.set(SONG_NAME_KEY, PreferenceValue::Text(song.title.clone()));
    store.set(ARTIST_NAME_KEY, PreferenceValue::Text(song.artist.clone()));
    store.set(SOURCE_KEY, PreferenceValue::Text(song.source.clone()));
    store.set(THUMB_KEY, PreferenceValue::Text(song.artwork.clone()));
    store.set(
        DURATION_SECONDS_KEY,
        PreferenceValue::Int(stored_duration(song.duration_secs)),
    );
    store.set(
        CURRENT_POSITION_KEY,
        PreferenceValue::Long(stored_position(position_ms)),
    );
}

/// Whether the store already holds exactly `song` at `position_ms`
pub fn is_stored(store: &dyn PreferenceStore, song: &Song, position_ms: u64) -> bool {
    store.get_int(ID_KEY) == Some(song.id.get())
        && store.get_text(SONG_NAME_KEY).as_deref() == Some(song.title.as_str())
        && store.get_text(ARTIST_NAME_KEY).as_deref() == Some(song.artist.as_str())
        && store.get_text(SOURCE_KEY).as_deref() == Some(song.source.as_str())
        && store.get_text(THUMB_KEY).as_deref() == Some(song.artwork.as_str())
        && store.get_int(DURATION_SECONDS_KEY) == Some(stored_duration(song.duration_secs))
        && store.get_long(CURRENT_POSITION_KEY) == Some(stored_position(position_ms))
}

/// Read the widget state back from the store
pub fn load_state(store: &dyn PreferenceStore) -> WidgetState {
    let id = store.get_int(ID_KEY).unwrap_or(NO_INT);
    let text = |key: &str| store.get_text(key).unwrap_or_default();

    let song = (id != NO_INT).then(|| {
        let duration = store.get_int(DURATION_SECONDS_KEY).unwrap_or(NO_INT);
        Song {
            id: SongId::new(id),
            title: text(SONG_NAME_KEY),
            artist: text(ARTIST_NAME_KEY),
            source: text(SOURCE_KEY),
            artwork: text(THUMB_KEY),
            duration_secs: u32::try_from(duration).unwrap_or(0),
        }
    });

    let position = store.get_long(CURRENT_POSITION_KEY).unwrap_or(NO_LONG);
    WidgetState {
        song,
        position_ms: u64::try_from(position).ok(),
    }
}

fn stored_duration(secs: u32) -> i32 {
    i32::try_from(secs).unwrap_or(i32::MAX)
}

fn stored_position(ms: u64) -> i64 {
    i64::try_from(ms).unwrap_or(i64::MAX)
}

/// Widget button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetAction {
    PlayPause,
    SkipPrevious,
    SkipNext,
}

impl WidgetAction {
    /// Action key carried by the widget's button intent
    pub fn key(self) -> &'static str {
        match self {
            Self::PlayPause => "widgetActionPlayPause",
            Self::SkipPrevious => "widgetSkipPrevious",
            Self::SkipNext => "widgetSkipNext",
        }
    }

    /// Parse an action key; unknown keys are ignored by the host
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "widgetActionPlayPause" => Some(Self::PlayPause),
            "widgetSkipPrevious" => Some(Self::SkipPrevious),
            "widgetSkipNext" => Some(Self::SkipNext),
            _ => None,
        }
    }

    pub fn dispatch(self, controls: &ControlSurface) {
        debug!(action = self.key(), "Widget action");
        match self {
            Self::PlayPause => controls.on_play_pause(),
            Self::SkipPrevious => controls.on_skip_previous(),
            Self::SkipNext => controls.on_skip_next(),
        }
    }
}

/// Handle a raw action key from the widget host
///
/// Returns whether the key named an action.
pub fn handle_action(key: &str, controls: &ControlSurface) -> bool {
    match WidgetAction::from_key(key) {
        Some(action) => {
            action.dispatch(controls);
            true
        }
        None => {
            debug!(key, "Ignoring unknown widget action");
            false
        }
    }
}

/// Keeps a widget store in step with published snapshots
#[derive(Debug)]
pub struct WidgetMirror<S> {
    store: S,
}

impl<S: PreferenceStore> WidgetMirror<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Persist the current song and position unless already stored
    ///
    /// Returns whether the store was written.
    pub fn sync(&mut self, state: &PlayerState) -> bool {
        let Some(song) = state.current_song() else {
            return false;
        };
        let position_ms = state.current_position_ms();
        if is_stored(&self.store, song, position_ms) {
            return false;
        }
        save(&mut self.store, song, position_ms);
        true
    }

    /// Mirror every snapshot until the publisher goes away, then hand the
    /// store back
    pub async fn run(mut self, mut state: StateSubscriber) -> S {
        self.sync(&state.snapshot());
        while let Ok(snapshot) = state.changed().await {
            if self.sync(&snapshot) {
                debug!(position_ms = snapshot.current_position_ms(), "Widget state stored");
            }
        }
        self.store
    }

    pub fn state(&self) -> WidgetState {
        load_state(&self.store)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
