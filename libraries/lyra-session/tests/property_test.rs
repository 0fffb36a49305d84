//! Property-based tests for the state model
//!
//! Uses proptest to verify snapshot invariants across random event sequences.

use lyra_core::{RepeatMode, Song, SongId};
use lyra_session::{EngineEvent, EngineSnapshot, EngineState, PlaybackError, PlayerState};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

// ===== Helpers =====

fn arbitrary_playlist() -> impl Strategy<Value = Vec<Song>> {
    prop::collection::hash_set(0i32..20, 0..8).prop_map(|ids| {
        ids.into_iter()
            .map(|id| Song::new(id, format!("Song {id}"), "Artist", format!("song_{id}"), "", 120))
            .collect()
    })
}

fn arbitrary_repeat() -> impl Strategy<Value = RepeatMode> {
    prop::sample::select(vec![RepeatMode::Off, RepeatMode::All, RepeatMode::One])
}

fn arbitrary_engine_state() -> impl Strategy<Value = EngineState> {
    prop::sample::select(vec![
        EngineState::Idle,
        EngineState::Buffering,
        EngineState::Ready,
        EngineState::Ended,
    ])
}

fn arbitrary_event() -> impl Strategy<Value = EngineEvent> {
    prop_oneof![
        proptest::option::of(0i32..25).prop_map(|id| EngineEvent::ItemTransition {
            media_id: id.map(SongId::new)
        }),
        any::<bool>().prop_map(EngineEvent::IsPlayingChanged),
        arbitrary_engine_state().prop_map(EngineEvent::PlaybackStateChanged),
        any::<bool>().prop_map(EngineEvent::IsLoadingChanged),
        "[a-z ]{1,12}".prop_map(|m| EngineEvent::PlayerError(PlaybackError::network(m))),
        (0u64..600_000).prop_map(|position_ms| EngineEvent::PositionDiscontinuity { position_ms }),
        arbitrary_repeat().prop_map(EngineEvent::RepeatModeChanged),
        any::<bool>().prop_map(EngineEvent::ShuffleModeChanged),
    ]
}

/// A snapshot update as the session task would apply it
#[derive(Debug, Clone)]
enum Step {
    Event(EngineEvent),
    Playlist(Vec<Song>),
    Poll(u64, u64),
}

fn arbitrary_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        8 => arbitrary_event().prop_map(Step::Event),
        1 => arbitrary_playlist().prop_map(Step::Playlist),
        1 => (0u64..600_000, 0u64..600_000).prop_map(|(c, b)| Step::Poll(c, b)),
    ]
}

fn current_is_in_playlist(state: &PlayerState) -> bool {
    match state.current_song_id() {
        None => true,
        Some(id) => state.playlist().iter().any(|song| song.id == id),
    }
}

// ===== Property Tests =====

proptest! {
    /// Property: the current song is always absent or present in the playlist
    #[test]
    fn current_song_never_dangles(
        playlist in arbitrary_playlist(),
        seeded_id in proptest::option::of(0i32..25),
        steps in prop::collection::vec(arbitrary_step(), 0..60)
    ) {
        let engine = EngineSnapshot {
            is_playing: false,
            is_loading: false,
            playback_state: EngineState::Ready,
            current_position_ms: 0,
            buffered_position_ms: 0,
            current_media_id: seeded_id.map(SongId::new),
            repeat_mode: RepeatMode::Off,
            shuffle_enabled: false,
            error: None,
        };
        let mut state = PlayerState::seeded(Arc::from(playlist), &engine);
        prop_assert!(current_is_in_playlist(&state));

        for step in steps {
            state = match step {
                Step::Event(event) => state.apply(&event),
                Step::Playlist(songs) => state.with_playlist(Arc::from(songs)),
                Step::Poll(current, buffered) => state.with_positions(current, buffered),
            };
            prop_assert!(current_is_in_playlist(&state), "dangling current song: {:?}", state);
            prop_assert_eq!(
                state.current_song().map(|s| s.id),
                state.current_song_id()
            );
        }
    }

    /// Property: the last playback-state event alone decides buffering,
    /// unless a later loading(true) raised it again
    #[test]
    fn buffering_tracks_last_state_or_loading(
        events in prop::collection::vec(arbitrary_event(), 1..40)
    ) {
        let mut state = PlayerState::default();
        let mut expected = false;
        for event in &events {
            state = state.apply(event);
            match event {
                EngineEvent::PlaybackStateChanged(s) => expected = *s == EngineState::Buffering,
                EngineEvent::IsLoadingChanged(true) => expected = true,
                _ => {}
            }
        }
        prop_assert_eq!(state.is_buffering(), expected);
    }

    /// Property: an error survives until playback leaves idle
    #[test]
    fn error_cleared_only_by_non_idle_state(
        message in "[a-z]{1,10}",
        states in prop::collection::vec(arbitrary_engine_state(), 0..10)
    ) {
        let error = PlaybackError::decoder(message);
        let mut state = PlayerState::default().apply(&EngineEvent::PlayerError(error.clone()));
        let mut cleared = false;
        for s in states {
            state = state.apply(&EngineEvent::PlaybackStateChanged(s));
            cleared |= s != EngineState::Idle;
        }
        prop_assert_eq!(state.last_error().is_none(), cleared);
    }

    /// Property: the repeat cycle has period three and visits every mode
    #[test]
    fn repeat_cycle_visits_every_mode(start in arbitrary_repeat(), presses in 0usize..30) {
        let mut mode = start;
        let mut seen = HashSet::new();
        for _ in 0..presses {
            mode = mode.next();
            seen.insert(mode);
        }
        let expected = (0..presses % 3).fold(start, |m, _| m.next());
        prop_assert_eq!(mode, expected);
        if presses >= 3 {
            prop_assert_eq!(seen.len(), 3);
        }
    }
}
