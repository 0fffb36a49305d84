//! Headless playback run
//!
//! Wires a simulated engine into a player session with both surfaces
//! attached, drives simulated time forward and reports where playback ended.

use lyra_core::{Catalog, RepeatMode, Song, SongId};
use lyra_session::{
    PlayerAdapter, PlayerState, SimulatedConnector, SimulatedEngine, StateSubscriber,
};
use lyra_surfaces::{
    Artwork, ArtworkCache, DirectoryArtworkResolver, MemoryPreferences, NotificationBridge,
    NotificationRenderer, NowPlaying, WidgetMirror, WidgetState,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::error::{CliError, Result};

/// Simulated playback per tick
const TICK_SIMULATED_MS: u64 = 1000;

/// What to play and for how long
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayRequest {
    /// Song to start; the first catalog entry when `None`
    pub song: Option<SongId>,

    /// Simulated seconds to play
    pub seconds: u64,
}

/// Outcome of a playback run
#[derive(Debug, Clone)]
pub struct PlayReport {
    /// The song that was selected
    pub started: Song,

    /// Last snapshot before disconnecting
    pub final_state: PlayerState,

    /// Widget state as persisted
    pub widget: WidgetState,

    /// Number of logged snapshot changes
    pub changes: usize,

    pub notifications_shown: usize,
}

/// Notification renderer writing to the log
#[derive(Debug, Default)]
pub struct LoggingRenderer {
    shown: usize,
    hidden: usize,
}

impl LoggingRenderer {
    pub fn shown(&self) -> usize {
        self.shown
    }

    pub fn hidden(&self) -> usize {
        self.hidden
    }
}

impl NotificationRenderer for LoggingRenderer {
    fn show(&mut self, now_playing: &NowPlaying, artwork: &Artwork) {
        self.shown += 1;
        info!(
            title = %now_playing.title,
            artist = %now_playing.artist,
            playing = now_playing.is_playing,
            placeholder = matches!(artwork, Artwork::Placeholder),
            "Notification"
        );
    }

    fn hide(&mut self) {
        self.hidden += 1;
        info!("Notification hidden");
    }
}

/// Play `request` against a simulated engine
///
/// The widget store at the configured path is loaded first and written back
/// after the session disconnects.
pub async fn play(config: &AppConfig, catalog: &Catalog, request: PlayRequest) -> Result<PlayReport> {
    let song = pick_song(catalog, request.song)?.clone();

    let engine = Arc::new(SimulatedEngine::new());
    let connector = Arc::new(SimulatedConnector::new(Arc::clone(&engine)));
    let adapter = PlayerAdapter::new(connector, catalog.shared(), config.session.clone())?;

    let store = MemoryPreferences::load_or_default(&config.widget.store_path)?;
    let widget = tokio::spawn(WidgetMirror::new(store).run(adapter.subscribe()));

    let resolver = Arc::new(DirectoryArtworkResolver::new(&config.artwork.directory));
    let bridge = NotificationBridge::new(
        LoggingRenderer::default(),
        ArtworkCache::new(resolver, config.artwork.cache_capacity),
    );
    let notification = tokio::spawn(bridge.run(adapter.subscribe()));
    let changes = tokio::spawn(log_changes(adapter.subscribe()));

    adapter.connect();
    adapter.wait_until_connected().await?;

    info!(id = %song.id, title = %song.title, "Selecting song");
    adapter.select_song(&song);

    let mut ticker = tokio::time::interval(Duration::from_millis(config.playback.tick_ms));
    ticker.tick().await;
    for _ in 0..request.seconds {
        ticker.tick().await;
        engine.advance(TICK_SIMULATED_MS);
    }

    let final_state = adapter.state();
    adapter.disconnect();
    drop(adapter);

    let store = widget.await?;
    if let Some(parent) = config.widget.store_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    store.save(&config.widget.store_path)?;
    info!(path = %config.widget.store_path.display(), "Widget state saved");

    let renderer = notification.await?;
    let changes = changes.await?;

    Ok(PlayReport {
        started: song,
        final_state,
        widget: lyra_surfaces::widget::load_state(&store),
        changes,
        notifications_shown: renderer.shown(),
    })
}

fn pick_song(catalog: &Catalog, id: Option<SongId>) -> Result<&Song> {
    match id {
        Some(id) => catalog.find(id).ok_or(CliError::UnknownSong(id.get())),
        None => catalog.songs().first().ok_or(CliError::EmptyCatalog),
    }
}

/// The parts of a snapshot worth an info line
#[derive(Debug, Clone, PartialEq, Eq)]
struct Headline {
    song: Option<SongId>,
    playing: bool,
    buffering: bool,
    repeat: RepeatMode,
    shuffle: bool,
    error: Option<String>,
}

impl Headline {
    fn of(state: &PlayerState) -> Self {
        Self {
            song: state.current_song_id(),
            playing: state.is_playing(),
            buffering: state.is_buffering(),
            repeat: state.repeat_mode(),
            shuffle: state.shuffle_active(),
            error: state.last_error().map(ToString::to_string),
        }
    }
}

async fn log_changes(mut state: StateSubscriber) -> usize {
    let mut last = Headline::of(&state.snapshot());
    let mut changes = 0;

    while let Ok(snapshot) = state.changed().await {
        let next = Headline::of(&snapshot);
        if next == last {
            debug!(
                position_ms = snapshot.current_position_ms(),
                buffered_ms = snapshot.buffered_position_ms(),
                "Position"
            );
            continue;
        }

        changes += 1;
        info!(
            song = ?snapshot.current_song().map(|s| s.title.as_str()),
            playing = next.playing,
            buffering = next.buffering,
            repeat = %next.repeat,
            shuffle = next.shuffle,
            error = ?next.error,
            position_ms = snapshot.current_position_ms(),
            "State changed"
        );
        last = next;
    }

    changes
}
