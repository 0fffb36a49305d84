//! Deterministic in-process media engine
//!
//! [`SimulatedEngine`] behaves like a platform player without producing audio:
//! it keeps an item list and play order, moves through idle/buffering/ready/
//! ended, advances position only when told to, and pushes the same events a
//! real engine would. Tests and the CLI drive it directly.

use async_trait::async_trait;
use lyra_core::{RepeatMode, SongId};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use crate::engine::{EngineConnector, EngineState, EventSink, ListenerId, MediaEngine, MediaItem};
use crate::error::{PlaybackError, Result, SessionError};
use crate::events::EngineEvent;

/// Within this position, "previous" moves to the previous item instead of
/// restarting the current one
const MAX_SEEK_TO_PREVIOUS_MS: u64 = 3000;

/// How the simulated engine reports duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurationReport {
    /// Item metadata duration, known once prepared
    #[default]
    Metadata,

    /// Always unknown
    Unset,

    /// Always this value
    Fixed(u64),
}

/// Command received by the simulated engine, in call order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    SetMediaItems(Vec<SongId>),
    ClearMediaItems,
    Prepare,
    Play,
    Pause,
    SeekToItem { index: usize, position_ms: u64 },
    SeekTo(u64),
    SeekToPrevious,
    SeekToNext,
    SetRepeatMode(RepeatMode),
    SetShuffle(bool),
    Release,
}

#[derive(Debug, Clone, Copy)]
enum Confirmation {
    Repeat(RepeatMode),
    Shuffle(bool),
}

/// In-process engine for tests and headless runs
pub struct SimulatedEngine {
    inner: Mutex<Inner>,
}

struct Inner {
    items: Vec<MediaItem>,
    order: Vec<usize>,
    current: Option<usize>,
    state: EngineState,
    play_when_ready: bool,
    playing: bool,
    loading: bool,
    position_ms: u64,
    buffered_ms: u64,
    repeat: RepeatMode,
    shuffle: bool,
    error: Option<PlaybackError>,
    duration: DurationReport,
    hold_buffering: bool,
    defer_confirmations: bool,
    pending: VecDeque<Confirmation>,
    listeners: Vec<(ListenerId, EventSink)>,
    next_listener: u64,
    commands: Vec<EngineCommand>,
    releases: usize,
    rng: StdRng,
}

impl Default for SimulatedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SimulatedEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("SimulatedEngine")
            .field("items", &inner.items.len())
            .field("current", &inner.current)
            .field("state", &inner.state)
            .field("playing", &inner.playing)
            .field("position_ms", &inner.position_ms)
            .finish_non_exhaustive()
    }
}

impl SimulatedEngine {
    pub fn new() -> Self {
        Self::with_seed(0x5eed)
    }

    /// Engine whose shuffle order is derived from `seed`
    pub fn with_seed(seed: u64) -> Self {
        Self {
            inner: Mutex::new(Inner {
                items: Vec::new(),
                order: Vec::new(),
                current: None,
                state: EngineState::Idle,
                play_when_ready: false,
                playing: false,
                loading: false,
                position_ms: 0,
                buffered_ms: 0,
                repeat: RepeatMode::Off,
                shuffle: false,
                error: None,
                duration: DurationReport::Metadata,
                hold_buffering: false,
                defer_confirmations: false,
                pending: VecDeque::new(),
                listeners: Vec::new(),
                next_listener: 0,
                commands: Vec::new(),
                releases: 0,
                rng: StdRng::seed_from_u64(seed),
            }),
        }
    }

    pub fn set_duration_report(&self, report: DurationReport) {
        self.inner.lock().duration = report;
    }

    /// Keep prepared items in buffering until [`finish_buffering`](Self::finish_buffering)
    pub fn hold_buffering(&self, hold: bool) {
        self.inner.lock().hold_buffering = hold;
    }

    /// Leave buffering for ready
    pub fn finish_buffering(&self) {
        let mut inner = self.inner.lock();
        if inner.state == EngineState::Buffering {
            inner.finish_buffering();
        }
    }

    /// Queue repeat and shuffle changes until [`confirm_pending`](Self::confirm_pending)
    pub fn defer_confirmations(&self, defer: bool) {
        self.inner.lock().defer_confirmations = defer;
    }

    /// Apply queued repeat and shuffle changes, returning how many there were
    pub fn confirm_pending(&self) -> usize {
        let mut inner = self.inner.lock();
        let pending: Vec<_> = inner.pending.drain(..).collect();
        for confirmation in &pending {
            inner.confirm(*confirmation);
        }
        pending.len()
    }

    /// Advance playback by `ms`
    ///
    /// Only moves while playing. Crossing the end of an item follows the
    /// repeat mode and play order.
    pub fn advance(&self, ms: u64) {
        let mut inner = self.inner.lock();
        let mut remaining = ms;

        while inner.playing && remaining > 0 {
            let length = inner.current_item().map_or(0, |item| item.duration_ms);
            let room = length.saturating_sub(inner.position_ms);
            if remaining < room {
                inner.position_ms += remaining;
                break;
            }
            remaining -= room;
            inner.end_of_item();
            if length == 0 {
                break;
            }
        }
    }

    /// Fail playback with `error`
    pub fn fail(&self, error: PlaybackError) {
        let mut inner = self.inner.lock();
        inner.error = Some(error.clone());
        inner.emit(EngineEvent::PlayerError(error));
        inner.set_loading(false);
        inner.set_state(EngineState::Idle);
    }

    /// Push an arbitrary event to every listener
    pub fn inject(&self, event: EngineEvent) {
        self.inner.lock().emit(event);
    }

    pub fn listener_count(&self) -> usize {
        self.inner.lock().listeners.len()
    }

    /// Commands received so far
    pub fn commands(&self) -> Vec<EngineCommand> {
        self.inner.lock().commands.clone()
    }

    pub fn clear_commands(&self) {
        self.inner.lock().commands.clear();
    }

    /// How many times the engine was released
    pub fn release_count(&self) -> usize {
        self.inner.lock().releases
    }
}

impl Inner {
    fn emit(&mut self, event: EngineEvent) {
        self.listeners.retain(|(_, sink)| sink.emit(event.clone()));
    }

    fn current_item(&self) -> Option<&MediaItem> {
        self.items.get(self.current?)
    }

    fn current_id(&self) -> Option<SongId> {
        self.current_item().map(|item| item.media_id)
    }

    fn set_state(&mut self, state: EngineState) {
        if self.state != state {
            self.state = state;
            self.emit(EngineEvent::PlaybackStateChanged(state));
        }
        self.refresh_playing();
    }

    fn set_loading(&mut self, loading: bool) {
        if self.loading != loading {
            self.loading = loading;
            self.emit(EngineEvent::IsLoadingChanged(loading));
        }
    }

    fn refresh_playing(&mut self) {
        let playing = self.play_when_ready && self.state == EngineState::Ready;
        if self.playing != playing {
            self.playing = playing;
            self.emit(EngineEvent::IsPlayingChanged(playing));
        }
    }

    fn start_buffering(&mut self) {
        self.buffered_ms = self.position_ms;
        self.set_state(EngineState::Buffering);
        self.set_loading(true);
        if !self.hold_buffering {
            self.finish_buffering();
        }
    }

    fn finish_buffering(&mut self) {
        self.buffered_ms = self.current_item().map_or(0, |item| item.duration_ms);
        self.set_loading(false);
        self.set_state(EngineState::Ready);
    }

    fn move_to(&mut self, index: usize, position_ms: u64) {
        let previous = self.current_id();
        self.current = Some(index);
        self.position_ms = position_ms;
        self.emit(EngineEvent::PositionDiscontinuity { position_ms });

        if self.current_id() != previous {
            let media_id = self.current_id();
            self.emit(EngineEvent::ItemTransition { media_id });
        }
        if self.state != EngineState::Idle {
            self.start_buffering();
        }
    }

    fn rebuild_order(&mut self) {
        self.order = (0..self.items.len()).collect();
        if self.shuffle {
            self.order.shuffle(&mut self.rng);
            if let Some(current) = self.current {
                if let Some(at) = self.order.iter().position(|&i| i == current) {
                    self.order.swap(0, at);
                }
            }
        }
    }

    fn neighbour(&self, forward: bool, wrap: bool) -> Option<usize> {
        let current = self.current?;
        let at = self.order.iter().position(|&i| i == current)?;
        let last = self.order.len().checked_sub(1)?;
        let target = match (forward, at == last, at == 0) {
            (true, false, _) => at + 1,
            (true, true, _) if wrap => 0,
            (false, _, false) => at - 1,
            (false, _, true) if wrap => last,
            _ => return None,
        };
        self.order.get(target).copied()
    }

    fn end_of_item(&mut self) {
        match self.repeat {
            RepeatMode::One => {
                let media_id = self.current_id();
                self.position_ms = 0;
                self.emit(EngineEvent::ItemTransition { media_id });
            }
            mode => match self.neighbour(true, mode == RepeatMode::All) {
                Some(next) => {
                    let previous = self.current_id();
                    self.current = Some(next);
                    self.position_ms = 0;
                    let media_id = self.current_id();
                    if media_id != previous || self.items.len() == 1 {
                        self.emit(EngineEvent::ItemTransition { media_id });
                    }
                    self.buffered_ms = self.current_item().map_or(0, |item| item.duration_ms);
                }
                None => {
                    self.position_ms = self.current_item().map_or(0, |item| item.duration_ms);
                    self.set_state(EngineState::Ended);
                }
            },
        }
    }

    fn confirm(&mut self, confirmation: Confirmation) {
        match confirmation {
            Confirmation::Repeat(mode) => {
                if self.repeat != mode {
                    self.repeat = mode;
                    self.emit(EngineEvent::RepeatModeChanged(mode));
                }
            }
            Confirmation::Shuffle(enabled) => {
                if self.shuffle != enabled {
                    self.shuffle = enabled;
                    self.rebuild_order();
                    self.emit(EngineEvent::ShuffleModeChanged(enabled));
                }
            }
        }
    }

    fn request(&mut self, confirmation: Confirmation) {
        if self.defer_confirmations {
            self.pending.push_back(confirmation);
        } else {
            self.confirm(confirmation);
        }
    }
}

impl MediaEngine for SimulatedEngine {
    fn media_item_count(&self) -> usize {
        self.inner.lock().items.len()
    }

    fn media_id_at(&self, index: usize) -> Option<SongId> {
        self.inner.lock().items.get(index).map(|item| item.media_id)
    }

    fn current_index(&self) -> Option<usize> {
        self.inner.lock().current
    }

    fn current_media_id(&self) -> Option<SongId> {
        self.inner.lock().current_id()
    }

    fn set_media_items(&self, items: Vec<MediaItem>) {
        let mut inner = self.inner.lock();
        inner.commands.push(EngineCommand::SetMediaItems(
            items.iter().map(|item| item.media_id).collect(),
        ));

        let previous = inner.current_id();
        inner.current = (!items.is_empty()).then_some(0);
        inner.items = items;
        inner.position_ms = 0;
        inner.rebuild_order();

        let media_id = inner.current_id();
        if media_id != previous {
            inner.emit(EngineEvent::ItemTransition { media_id });
        }
        if media_id.is_none() && inner.state != EngineState::Idle {
            inner.set_state(EngineState::Ended);
        }
    }

    fn clear_media_items(&self) {
        let mut inner = self.inner.lock();
        inner.commands.push(EngineCommand::ClearMediaItems);

        let had_item = inner.current.is_some();
        inner.items.clear();
        inner.order.clear();
        inner.current = None;
        inner.position_ms = 0;
        inner.buffered_ms = 0;
        if had_item {
            inner.emit(EngineEvent::ItemTransition { media_id: None });
        }
        inner.play_when_ready = false;
        inner.set_loading(false);
        inner.set_state(EngineState::Idle);
    }

    fn playback_state(&self) -> EngineState {
        self.inner.lock().state
    }

    fn is_playing(&self) -> bool {
        self.inner.lock().playing
    }

    fn is_loading(&self) -> bool {
        self.inner.lock().loading
    }

    fn prepare(&self) {
        let mut inner = self.inner.lock();
        inner.commands.push(EngineCommand::Prepare);
        if inner.state != EngineState::Idle {
            return;
        }

        inner.error = None;
        if inner.items.is_empty() {
            inner.set_state(EngineState::Ended);
        } else {
            inner.start_buffering();
        }
    }

    fn play(&self) {
        let mut inner = self.inner.lock();
        inner.commands.push(EngineCommand::Play);
        inner.play_when_ready = true;
        inner.refresh_playing();
    }

    fn pause(&self) {
        let mut inner = self.inner.lock();
        inner.commands.push(EngineCommand::Pause);
        inner.play_when_ready = false;
        inner.refresh_playing();
    }

    fn seek_to_item(&self, index: usize, position_ms: u64) {
        let mut inner = self.inner.lock();
        inner.commands.push(EngineCommand::SeekToItem { index, position_ms });
        if index < inner.items.len() {
            inner.move_to(index, position_ms);
        }
    }

    fn seek_to(&self, position_ms: u64) {
        let mut inner = self.inner.lock();
        inner.commands.push(EngineCommand::SeekTo(position_ms));
        if let Some(index) = inner.current {
            inner.move_to(index, position_ms);
        }
    }

    fn seek_to_previous(&self) {
        let mut inner = self.inner.lock();
        inner.commands.push(EngineCommand::SeekToPrevious);
        let Some(current) = inner.current else {
            return;
        };

        let wrap = inner.repeat == RepeatMode::All;
        let target = if inner.position_ms > MAX_SEEK_TO_PREVIOUS_MS {
            current
        } else {
            inner.neighbour(false, wrap).unwrap_or(current)
        };
        inner.move_to(target, 0);
    }

    fn seek_to_next(&self) {
        let mut inner = self.inner.lock();
        inner.commands.push(EngineCommand::SeekToNext);
        let wrap = inner.repeat != RepeatMode::Off;
        if let Some(next) = inner.neighbour(true, wrap) {
            inner.move_to(next, 0);
        }
    }

    fn duration_ms(&self) -> Option<u64> {
        let inner = self.inner.lock();
        match inner.duration {
            DurationReport::Metadata if inner.state != EngineState::Idle => {
                inner.current_item().map(|item| item.duration_ms)
            }
            DurationReport::Metadata | DurationReport::Unset => None,
            DurationReport::Fixed(ms) => Some(ms),
        }
    }

    fn current_position_ms(&self) -> u64 {
        self.inner.lock().position_ms
    }

    fn buffered_position_ms(&self) -> u64 {
        self.inner.lock().buffered_ms
    }

    fn repeat_mode(&self) -> RepeatMode {
        self.inner.lock().repeat
    }

    fn set_repeat_mode(&self, mode: RepeatMode) {
        let mut inner = self.inner.lock();
        inner.commands.push(EngineCommand::SetRepeatMode(mode));
        inner.request(Confirmation::Repeat(mode));
    }

    fn shuffle_enabled(&self) -> bool {
        self.inner.lock().shuffle
    }

    fn set_shuffle_enabled(&self, enabled: bool) {
        let mut inner = self.inner.lock();
        inner.commands.push(EngineCommand::SetShuffle(enabled));
        inner.request(Confirmation::Shuffle(enabled));
    }

    fn player_error(&self) -> Option<PlaybackError> {
        self.inner.lock().error.clone()
    }

    fn add_listener(&self, sink: EventSink) -> ListenerId {
        let mut inner = self.inner.lock();
        let id = ListenerId(inner.next_listener);
        inner.next_listener += 1;
        inner.listeners.push((id, sink));
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.inner.lock().listeners.retain(|(listener, _)| *listener != id);
    }

    fn release(&self) {
        let mut inner = self.inner.lock();
        inner.commands.push(EngineCommand::Release);
        inner.releases += 1;
        inner.play_when_ready = false;
        inner.refresh_playing();
    }
}

/// Connector handing out a shared [`SimulatedEngine`]
///
/// Attempts can be made to fail, or held until a gate is opened.
pub struct SimulatedConnector {
    engine: Arc<SimulatedEngine>,
    failures: Mutex<VecDeque<String>>,
    gate: Option<Arc<Notify>>,
    attempts: AtomicUsize,
}

impl SimulatedConnector {
    pub fn new(engine: Arc<SimulatedEngine>) -> Self {
        Self {
            engine,
            failures: Mutex::new(VecDeque::new()),
            gate: None,
            attempts: AtomicUsize::new(0),
        }
    }

    /// Hold every attempt until the returned gate is notified
    ///
    /// Each `notify_one` releases one attempt.
    pub fn gated(engine: Arc<SimulatedEngine>) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let connector = Self {
            gate: Some(Arc::clone(&gate)),
            ..Self::new(engine)
        };
        (connector, gate)
    }

    /// Make the next attempt fail with `reason`
    pub fn fail_next(&self, reason: impl Into<String>) {
        self.failures.lock().push_back(reason.into());
    }

    /// Number of connection attempts so far
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EngineConnector for SimulatedConnector {
    async fn connect(&self) -> Result<Arc<dyn MediaEngine>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let failure = self.failures.lock().pop_front();
        if let Some(reason) = failure {
            return Err(SessionError::Connection(reason));
        }

        let engine: Arc<dyn MediaEngine> = self.engine.clone();
        Ok(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyra_core::Song;
    use tokio::sync::mpsc;

    fn items(durations: &[u32]) -> Vec<MediaItem> {
        durations
            .iter()
            .zip(1..)
            .map(|(secs, id)| {
                MediaItem::from_song(&Song::new(id, "Title", "Artist", "track", "", *secs)).unwrap()
            })
            .collect()
    }

    fn listen(engine: &SimulatedEngine) -> mpsc::UnboundedReceiver<crate::adapter::SessionInput> {
        let (tx, rx) = mpsc::unbounded_channel();
        engine.add_listener(EventSink::new(tx));
        rx
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<crate::adapter::SessionInput>) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        while let Ok(input) = rx.try_recv() {
            if let crate::adapter::SessionInput::Engine(event) = input {
                events.push(event);
            }
        }
        events
    }

    #[test]
    fn prepare_moves_through_buffering_to_ready() {
        let engine = SimulatedEngine::new();
        engine.set_media_items(items(&[10, 20]));
        let mut rx = listen(&engine);

        engine.prepare();

        assert_eq!(engine.playback_state(), EngineState::Ready);
        assert_eq!(
            drain(&mut rx),
            vec![
                EngineEvent::PlaybackStateChanged(EngineState::Buffering),
                EngineEvent::IsLoadingChanged(true),
                EngineEvent::IsLoadingChanged(false),
                EngineEvent::PlaybackStateChanged(EngineState::Ready),
            ]
        );
    }

    #[test]
    fn playing_requires_ready() {
        let engine = SimulatedEngine::new();
        engine.set_media_items(items(&[10]));
        engine.hold_buffering(true);
        engine.prepare();
        engine.play();
        assert!(!engine.is_playing());

        engine.finish_buffering();
        assert!(engine.is_playing());
    }

    #[test]
    fn advance_crosses_into_next_item() {
        let engine = SimulatedEngine::new();
        engine.set_media_items(items(&[10, 20]));
        engine.prepare();
        engine.play();

        engine.advance(12_000);

        assert_eq!(engine.current_media_id(), Some(SongId::new(2)));
        assert_eq!(engine.current_position_ms(), 2_000);
    }

    #[test]
    fn last_item_ends_without_repeat() {
        let engine = SimulatedEngine::new();
        engine.set_media_items(items(&[10]));
        engine.prepare();
        engine.play();

        engine.advance(60_000);

        assert_eq!(engine.playback_state(), EngineState::Ended);
        assert!(!engine.is_playing());
        assert_eq!(engine.current_position_ms(), 10_000);
    }

    #[test]
    fn repeat_one_restarts_current_item() {
        let engine = SimulatedEngine::new();
        engine.set_media_items(items(&[10, 20]));
        engine.set_repeat_mode(RepeatMode::One);
        engine.prepare();
        engine.play();

        engine.advance(11_000);

        assert_eq!(engine.current_media_id(), Some(SongId::new(1)));
        assert!(engine.is_playing());
    }

    #[test]
    fn next_wraps_only_with_repeat() {
        let engine = SimulatedEngine::new();
        engine.set_media_items(items(&[10, 20]));
        engine.seek_to_item(1, 0);

        engine.seek_to_next();
        assert_eq!(engine.current_index(), Some(1));

        engine.set_repeat_mode(RepeatMode::All);
        engine.seek_to_next();
        assert_eq!(engine.current_index(), Some(0));
    }

    #[test]
    fn previous_restarts_after_threshold() {
        let engine = SimulatedEngine::new();
        engine.set_media_items(items(&[10, 20]));
        engine.seek_to_item(1, 5_000);

        engine.seek_to_previous();
        assert_eq!(engine.current_index(), Some(1));
        assert_eq!(engine.current_position_ms(), 0);

        engine.seek_to_previous();
        assert_eq!(engine.current_index(), Some(0));
    }

    #[test]
    fn shuffle_keeps_current_item_first() {
        let engine = SimulatedEngine::with_seed(7);
        engine.set_media_items(items(&[1, 1, 1, 1, 1, 1]));
        engine.seek_to_item(3, 0);
        engine.set_shuffle_enabled(true);

        let mut visited = vec![3];
        for _ in 0..5 {
            engine.seek_to_next();
            visited.push(engine.current_index().unwrap());
        }
        visited.sort_unstable();
        assert_eq!(visited, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn deferred_confirmations_arrive_in_order() {
        let engine = SimulatedEngine::new();
        let mut rx = listen(&engine);
        engine.defer_confirmations(true);

        engine.set_repeat_mode(RepeatMode::All);
        engine.set_repeat_mode(RepeatMode::One);
        assert_eq!(engine.repeat_mode(), RepeatMode::Off);
        assert!(drain(&mut rx).is_empty());

        assert_eq!(engine.confirm_pending(), 2);
        assert_eq!(
            drain(&mut rx),
            vec![
                EngineEvent::RepeatModeChanged(RepeatMode::All),
                EngineEvent::RepeatModeChanged(RepeatMode::One),
            ]
        );
    }

    #[test]
    fn failure_reports_error_then_idle() {
        let engine = SimulatedEngine::new();
        engine.set_media_items(items(&[10]));
        engine.prepare();
        engine.play();
        let mut rx = listen(&engine);

        engine.fail(PlaybackError::network("timeout"));

        let events = drain(&mut rx);
        assert_eq!(events[0], EngineEvent::PlayerError(PlaybackError::network("timeout")));
        assert!(events.contains(&EngineEvent::PlaybackStateChanged(EngineState::Idle)));
        assert!(events.contains(&EngineEvent::IsPlayingChanged(false)));

        engine.prepare();
        assert!(engine.player_error().is_none());
    }

    #[test]
    fn duration_reports() {
        let engine = SimulatedEngine::new();
        engine.set_media_items(items(&[10]));
        assert_eq!(engine.duration_ms(), None);

        engine.prepare();
        assert_eq!(engine.duration_ms(), Some(10_000));

        engine.set_duration_report(DurationReport::Unset);
        assert_eq!(engine.duration_ms(), None);

        engine.set_duration_report(DurationReport::Fixed(190_000));
        assert_eq!(engine.duration_ms(), Some(190_000));
    }

    #[test]
    fn closed_listeners_are_dropped() {
        let engine = SimulatedEngine::new();
        drop(listen(&engine));
        assert_eq!(engine.listener_count(), 1);

        engine.inject(EngineEvent::IsPlayingChanged(true));
        assert_eq!(engine.listener_count(), 0);
    }

    #[tokio::test]
    async fn connector_fails_once_then_connects() {
        let connector = SimulatedConnector::new(Arc::new(SimulatedEngine::new()));
        connector.fail_next("engine busy");

        assert!(connector.connect().await.is_err());
        assert!(connector.connect().await.is_ok());
        assert_eq!(connector.attempts(), 2);
    }
}
