//! Engine events
//!
//! The push-stream an engine delivers to its listeners. Every variant maps to
//! exactly one snapshot update in [`PlayerState::apply`](crate::PlayerState::apply).

use lyra_core::{RepeatMode, SongId};
use serde::{Deserialize, Serialize};

use crate::engine::EngineState;
use crate::error::PlaybackError;

/// Events emitted by a media engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// The current media item changed (`None` when the item list emptied)
    ItemTransition {
        /// Song id tagged on the new item
        media_id: Option<SongId>,
    },

    /// The engine started or stopped producing audio
    IsPlayingChanged(bool),

    /// The engine moved between idle, buffering, ready and ended
    PlaybackStateChanged(EngineState),

    /// The engine started or stopped loading media
    IsLoadingChanged(bool),

    /// Playback failed
    PlayerError(PlaybackError),

    /// The position jumped (seek, item change, repeat)
    PositionDiscontinuity {
        /// New position in milliseconds
        position_ms: u64,
    },

    /// The engine confirmed a repeat mode
    RepeatModeChanged(RepeatMode),

    /// The engine confirmed a shuffle flag
    ShuffleModeChanged(bool),
}

impl EngineEvent {
    /// Short name used in log lines
    pub fn name(&self) -> &'static str {
        match self {
            Self::ItemTransition { .. } => "item-transition",
            Self::IsPlayingChanged(_) => "playing-changed",
            Self::PlaybackStateChanged(_) => "playback-state-changed",
            Self::IsLoadingChanged(_) => "loading-changed",
            Self::PlayerError(_) => "error",
            Self::PositionDiscontinuity { .. } => "position-discontinuity",
            Self::RepeatModeChanged(_) => "repeat-mode-changed",
            Self::ShuffleModeChanged(_) => "shuffle-changed",
        }
    }
}
