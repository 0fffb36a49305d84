//! Control surface handed to presentation layers

use lyra_core::Song;

use crate::adapter::PlayerAdapter;
use crate::control::SeekOutcome;
use crate::publisher::StateSubscriber;

/// User intents, bound to one adapter
///
/// Stable across state updates and reconnects: each call resolves the
/// connected engine at call time. Calls made while no engine is connected are
/// dropped.
#[derive(Debug, Clone)]
pub struct ControlSurface {
    adapter: PlayerAdapter,
}

impl ControlSurface {
    pub(crate) fn new(adapter: PlayerAdapter) -> Self {
        Self { adapter }
    }

    /// Pause if playing, otherwise play
    pub fn on_play_pause(&self) {
        self.adapter.on_play_pause();
    }

    pub fn on_skip_next(&self) {
        self.adapter.on_skip_next();
    }

    pub fn on_skip_previous(&self) {
        self.adapter.on_skip_previous();
    }

    /// Seek to `seconds` into the current song
    pub fn on_seek(&self, seconds: f32) -> Option<SeekOutcome> {
        self.adapter.on_seek(seconds)
    }

    /// Play `song`
    pub fn on_song_click(&self, song: &Song) {
        self.adapter.select_song(song);
    }

    pub fn on_change_repeat_mode(&self) {
        self.adapter.change_repeat_mode();
    }

    pub fn on_change_shuffle_mode(&self) {
        self.adapter.change_shuffle_mode();
    }
}

/// Everything a presentation layer needs: state to read, intents to invoke
#[derive(Debug, Clone)]
pub struct PlayerScreen {
    /// Snapshot reader
    pub state: StateSubscriber,

    /// Intent functions
    pub controls: ControlSurface,
}
