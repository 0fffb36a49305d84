//! Player state snapshots
//!
//! A [`PlayerState`] is one immutable view of playback. Every change produces
//! a new snapshot; nothing is mutated in place once published.

use lyra_core::{RepeatMode, Song, SongId};
use std::sync::Arc;

use crate::engine::{EngineState, MediaEngine};
use crate::error::PlaybackError;
use crate::events::EngineEvent;

/// Canonical playback snapshot
///
/// Invariant: `current_song`, when present, is the id of a song in
/// `playlist`. Every constructor and transition below upholds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerState {
    is_playing: bool,
    is_buffering: bool,
    current_position_ms: u64,
    buffered_position_ms: u64,
    playlist: Arc<[Song]>,
    current_song: Option<SongId>,
    repeat_mode: RepeatMode,
    shuffle_active: bool,
    last_error: Option<PlaybackError>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            is_playing: false,
            is_buffering: false,
            current_position_ms: 0,
            buffered_position_ms: 0,
            playlist: Arc::from(Vec::<Song>::new()),
            current_song: None,
            repeat_mode: RepeatMode::Off,
            shuffle_active: false,
            last_error: None,
        }
    }
}

/// Values read directly from a connected engine
///
/// Used to seed the first snapshot of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSnapshot {
    pub is_playing: bool,
    pub is_loading: bool,
    pub playback_state: EngineState,
    pub current_position_ms: u64,
    pub buffered_position_ms: u64,
    pub current_media_id: Option<SongId>,
    pub repeat_mode: RepeatMode,
    pub shuffle_enabled: bool,
    pub error: Option<PlaybackError>,
}

impl EngineSnapshot {
    /// Read every seeded value from the engine
    pub fn read(engine: &dyn MediaEngine) -> Self {
        Self {
            is_playing: engine.is_playing(),
            is_loading: engine.is_loading(),
            playback_state: engine.playback_state(),
            current_position_ms: engine.current_position_ms(),
            buffered_position_ms: engine.buffered_position_ms(),
            current_media_id: engine.current_media_id(),
            repeat_mode: engine.repeat_mode(),
            shuffle_enabled: engine.shuffle_enabled(),
            error: engine.player_error(),
        }
    }
}

impl PlayerState {
    /// First snapshot of a session
    #[must_use]
    pub fn seeded(playlist: Arc<[Song]>, engine: &EngineSnapshot) -> Self {
        let current_song = lookup(&playlist, engine.current_media_id);
        Self {
            is_playing: engine.is_playing,
            is_buffering: engine.playback_state == EngineState::Buffering || engine.is_loading,
            current_position_ms: engine.current_position_ms,
            buffered_position_ms: engine.buffered_position_ms,
            playlist,
            current_song,
            repeat_mode: engine.repeat_mode,
            shuffle_active: engine.shuffle_enabled,
            last_error: engine.error.clone(),
        }
    }

    /// Apply one engine event
    #[must_use]
    pub fn apply(&self, event: &EngineEvent) -> Self {
        let mut next = self.clone();
        match event {
            EngineEvent::ItemTransition { media_id } => {
                next.current_song = lookup(&next.playlist, *media_id);
            }
            EngineEvent::IsPlayingChanged(playing) => {
                next.is_playing = *playing;
            }
            EngineEvent::PlaybackStateChanged(state) => {
                next.is_buffering = *state == EngineState::Buffering;
                if *state != EngineState::Idle {
                    next.last_error = None;
                }
            }
            EngineEvent::IsLoadingChanged(loading) => {
                // Loading finishing does not end buffering; only a playback
                // state change does.
                if *loading {
                    next.is_buffering = true;
                }
            }
            EngineEvent::PlayerError(error) => {
                next.last_error = Some(error.clone());
            }
            EngineEvent::PositionDiscontinuity { position_ms } => {
                next.current_position_ms = *position_ms;
            }
            EngineEvent::RepeatModeChanged(mode) => {
                next.repeat_mode = *mode;
            }
            EngineEvent::ShuffleModeChanged(enabled) => {
                next.shuffle_active = *enabled;
            }
        }
        next
    }

    /// Replace the playlist, dropping a current song that is no longer in it
    #[must_use]
    pub fn with_playlist(&self, playlist: Arc<[Song]>) -> Self {
        let current_song = lookup(&playlist, self.current_song);
        Self {
            playlist,
            current_song,
            ..self.clone()
        }
    }

    /// Republish polled positions
    #[must_use]
    pub fn with_positions(&self, current_position_ms: u64, buffered_position_ms: u64) -> Self {
        Self {
            current_position_ms,
            buffered_position_ms,
            ..self.clone()
        }
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_buffering(&self) -> bool {
        self.is_buffering
    }

    pub fn current_position_ms(&self) -> u64 {
        self.current_position_ms
    }

    pub fn buffered_position_ms(&self) -> u64 {
        self.buffered_position_ms
    }

    /// Songs in playlist order
    pub fn playlist(&self) -> &[Song] {
        &self.playlist
    }

    /// Id of the current song
    pub fn current_song_id(&self) -> Option<SongId> {
        self.current_song
    }

    /// The current song, resolved against the playlist
    pub fn current_song(&self) -> Option<&Song> {
        let id = self.current_song?;
        self.playlist.iter().find(|song| song.id == id)
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat_mode
    }

    pub fn shuffle_active(&self) -> bool {
        self.shuffle_active
    }

    /// Last playback error, displayable to the user
    pub fn last_error(&self) -> Option<&PlaybackError> {
        self.last_error.as_ref()
    }
}

fn lookup(playlist: &[Song], id: Option<SongId>) -> Option<SongId> {
    let id = id?;
    playlist.iter().any(|song| song.id == id).then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playlist() -> Arc<[Song]> {
        vec![
            Song::new(1, "Song A", "Artist A", "a", "", 180),
            Song::new(2, "Song B", "Artist B", "b", "", 200),
        ]
        .into()
    }

    fn with_songs() -> PlayerState {
        PlayerState::default().with_playlist(playlist())
    }

    fn transition(id: Option<i32>) -> EngineEvent {
        EngineEvent::ItemTransition {
            media_id: id.map(SongId::new),
        }
    }

    #[test]
    fn default_snapshot_is_empty() {
        let state = PlayerState::default();
        assert!(state.playlist().is_empty());
        assert!(state.current_song().is_none());
        assert_eq!(state.repeat_mode(), RepeatMode::Off);
        assert!(!state.is_playing());
        assert!(state.last_error().is_none());
    }

    #[test]
    fn item_transition_resolves_known_ids() {
        let state = with_songs().apply(&transition(Some(2)));
        assert_eq!(state.current_song().unwrap().title, "Song B");
    }

    #[test]
    fn item_transition_to_unknown_id_clears_current_song() {
        let state = with_songs()
            .apply(&transition(Some(1)))
            .apply(&transition(Some(99)));
        assert_eq!(state.current_song_id(), None);
    }

    #[test]
    fn buffering_follows_playback_state() {
        let state = with_songs().apply(&EngineEvent::PlaybackStateChanged(EngineState::Buffering));
        assert!(state.is_buffering());

        let state = state.apply(&EngineEvent::PlaybackStateChanged(EngineState::Ready));
        assert!(!state.is_buffering());
    }

    #[test]
    fn loading_finished_keeps_buffering_flag() {
        let state = with_songs()
            .apply(&EngineEvent::IsLoadingChanged(true))
            .apply(&EngineEvent::IsLoadingChanged(false));
        assert!(state.is_buffering());
    }

    #[test]
    fn error_survives_idle_and_clears_on_leaving_idle() {
        let error = PlaybackError::network("timeout");
        let state = with_songs()
            .apply(&EngineEvent::PlaybackStateChanged(EngineState::Buffering))
            .apply(&EngineEvent::PlayerError(error.clone()))
            .apply(&EngineEvent::PlaybackStateChanged(EngineState::Idle));
        assert_eq!(state.last_error(), Some(&error));

        let state = state.apply(&EngineEvent::PlaybackStateChanged(EngineState::Ready));
        assert!(state.last_error().is_none());
    }

    #[test]
    fn repeat_and_shuffle_follow_confirmations() {
        let state = with_songs()
            .apply(&EngineEvent::RepeatModeChanged(RepeatMode::One))
            .apply(&EngineEvent::ShuffleModeChanged(true));
        assert_eq!(state.repeat_mode(), RepeatMode::One);
        assert!(state.shuffle_active());
    }

    #[test]
    fn discontinuity_moves_position_only() {
        let state = with_songs()
            .with_positions(1_000, 5_000)
            .apply(&EngineEvent::PositionDiscontinuity { position_ms: 42 });
        assert_eq!(state.current_position_ms(), 42);
        assert_eq!(state.buffered_position_ms(), 5_000);
    }

    #[test]
    fn replacing_playlist_drops_dangling_current_song() {
        let state = with_songs().apply(&transition(Some(2)));
        let state = state.with_playlist(vec![Song::new(1, "Song A", "Artist A", "a", "", 180)].into());
        assert_eq!(state.current_song_id(), None);

        let state = with_songs().apply(&transition(Some(1)));
        let state = state.with_playlist(playlist());
        assert_eq!(state.current_song_id(), Some(SongId::new(1)));
    }

    #[test]
    fn seeded_snapshot_maps_loading_to_buffering() {
        let engine = EngineSnapshot {
            is_playing: true,
            is_loading: true,
            playback_state: EngineState::Ready,
            current_position_ms: 3_000,
            buffered_position_ms: 9_000,
            current_media_id: Some(SongId::new(2)),
            repeat_mode: RepeatMode::All,
            shuffle_enabled: true,
            error: None,
        };
        let state = PlayerState::seeded(playlist(), &engine);
        assert!(state.is_buffering());
        assert!(state.is_playing());
        assert_eq!(state.current_song_id(), Some(SongId::new(2)));
        assert_eq!(state.repeat_mode(), RepeatMode::All);
        assert_eq!(state.current_position_ms(), 3_000);
    }

    #[test]
    fn seeded_snapshot_buffers_while_engine_buffers() {
        let engine = EngineSnapshot {
            is_playing: false,
            is_loading: false,
            playback_state: EngineState::Buffering,
            current_position_ms: 0,
            buffered_position_ms: 0,
            current_media_id: Some(SongId::new(1)),
            repeat_mode: RepeatMode::Off,
            shuffle_enabled: false,
            error: None,
        };
        assert!(PlayerState::seeded(playlist(), &engine).is_buffering());

        let ready = EngineSnapshot {
            playback_state: EngineState::Ready,
            ..engine
        };
        assert!(!PlayerState::seeded(playlist(), &ready).is_buffering());
    }

    #[test]
    fn seeded_snapshot_ignores_items_outside_playlist() {
        let engine = EngineSnapshot {
            is_playing: false,
            is_loading: false,
            playback_state: EngineState::Idle,
            current_position_ms: 0,
            buffered_position_ms: 0,
            current_media_id: Some(SongId::new(7)),
            repeat_mode: RepeatMode::Off,
            shuffle_enabled: false,
            error: None,
        };
        assert!(PlayerState::seeded(playlist(), &engine).current_song().is_none());
    }
}
