//! Player engine adapter
//!
//! Owns the engine connection and the session task. The session task is the
//! only writer of [`PlayerState`]: engine events, playlist replacements and
//! position polls all arrive on one channel or timer and are applied in order.
//!
//! ```text
//! engine ──EventSink──▶ session task ──update──▶ StatePublisher ──▶ readers
//!   ▲                        ▲
//!   └──── commands ──── PlayerAdapter ◀──── ControlSurface
//! ```

use lyra_core::{RepeatMode, Song, SongId};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::control::{self, RepeatRequests, SeekOutcome};
use crate::engine::{EngineConnector, EventSink, ListenerId, MediaEngine};
use crate::error::{Result, SessionError};
use crate::events::EngineEvent;
use crate::publisher::{StatePublisher, StateSubscriber};
use crate::state::{EngineSnapshot, PlayerState};
use crate::surface::{ControlSurface, PlayerScreen};

/// Inputs processed by the session task
#[derive(Debug)]
pub(crate) enum SessionInput {
    /// Event pushed by the engine
    Engine(EngineEvent),

    /// First snapshot of a session
    Seed {
        engine: EngineSnapshot,
        playlist: Arc<[Song]>,
    },

    /// Playlist replaced while connected
    Playlist(Arc<[Song]>),
}

/// Engine connection status
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// No connection, none in progress
    #[default]
    Disconnected,

    /// Waiting for the engine
    Connecting,

    /// Setup finished; commands reach the engine
    Connected,

    /// Last attempt failed
    Failed(String),
}

impl ConnectionStatus {
    /// Whether commands currently reach the engine
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

/// Player engine adapter
///
/// Cheap to clone; clones share one connection. Dropping the last clone
/// disconnects.
///
/// # Example
///
/// ```rust,no_run
/// use lyra_core::Catalog;
/// use lyra_session::{PlayerAdapter, SessionConfig, SimulatedConnector, SimulatedEngine};
/// use std::sync::Arc;
///
/// # async fn run(catalog: Catalog) -> lyra_session::Result<()> {
/// let engine = Arc::new(SimulatedEngine::new());
/// let adapter = PlayerAdapter::new(
///     Arc::new(SimulatedConnector::new(engine)),
///     catalog.shared(),
///     SessionConfig::default(),
/// )?;
///
/// adapter.connect();
/// adapter.wait_until_connected().await?;
///
/// let screen = adapter.screen();
/// screen.controls.on_play_pause();
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PlayerAdapter {
    shared: Arc<Shared>,
}

struct Shared {
    connector: Arc<dyn EngineConnector>,
    publisher: Arc<StatePublisher>,
    playlist: Mutex<Arc<[Song]>>,
    connection: Mutex<Connection>,
    attempts: AtomicU64,
    repeat: Arc<Mutex<RepeatRequests>>,
    poll_interval: watch::Sender<Duration>,
    status: watch::Sender<ConnectionStatus>,
}

enum Connection {
    Disconnected,
    Connecting { attempt: u64, task: JoinHandle<()> },
    Connected(Session),
}

impl Connection {
    fn is_attempt(&self, id: u64) -> bool {
        matches!(self, Self::Connecting { attempt, .. } if *attempt == id)
    }
}

struct Session {
    engine: Arc<dyn MediaEngine>,
    listener: ListenerId,
    input: mpsc::UnboundedSender<SessionInput>,
    task: JoinHandle<()>,
}

impl Session {
    fn close(self) {
        self.task.abort();
        self.engine.remove_listener(self.listener);
        self.engine.release();
    }
}

impl PlayerAdapter {
    /// Create a disconnected adapter for `playlist`
    pub fn new(
        connector: Arc<dyn EngineConnector>,
        playlist: Arc<[Song]>,
        config: SessionConfig,
    ) -> Result<Self> {
        config.validate()?;

        let (poll_interval, _) = watch::channel(config.poll_interval());
        let (status, _) = watch::channel(ConnectionStatus::Disconnected);

        Ok(Self {
            shared: Arc::new(Shared {
                connector,
                publisher: Arc::new(StatePublisher::default()),
                playlist: Mutex::new(playlist),
                connection: Mutex::new(Connection::Disconnected),
                attempts: AtomicU64::new(0),
                repeat: Arc::new(Mutex::new(RepeatRequests::default())),
                poll_interval,
                status,
            }),
        })
    }

    /// Start connecting to the engine
    ///
    /// Returns immediately; setup runs on a spawned task once the connector
    /// resolves. Does nothing while a connection is pending or established.
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect(&self) {
        let mut connection = self.shared.connection.lock();
        if !matches!(*connection, Connection::Disconnected) {
            debug!("Connect ignored, engine connection already active");
            return;
        }

        let attempt = self.shared.attempts.fetch_add(1, Ordering::Relaxed);
        self.shared.status.send_replace(ConnectionStatus::Connecting);
        info!(attempt, "Connecting to media engine");

        let shared = Arc::downgrade(&self.shared);
        let connector = Arc::clone(&self.shared.connector);
        let task = tokio::spawn(async move {
            let result = connector.connect().await;
            complete_connect(&shared, attempt, result);
        });

        *connection = Connection::Connecting { attempt, task };
    }

    /// Release the engine and stop the session task
    ///
    /// Safe to call at any time, any number of times.
    pub fn disconnect(&self) {
        self.shared.teardown();
        self.shared
            .status
            .send_replace(ConnectionStatus::Disconnected);
    }

    /// Replace the playlist
    ///
    /// When connected the engine's items are cleared and reloaded. Otherwise
    /// the playlist is loaded by the next successful connect.
    pub fn set_playlist(&self, songs: Vec<Song>) {
        let playlist: Arc<[Song]> = songs.into();
        // Held across the reload so concurrent replacements reach the engine
        // in the order they are stored.
        let mut current = self.shared.playlist.lock();
        *current = Arc::clone(&playlist);
        self.shared.reload(playlist);
    }

    /// Play `song`, moving to it first if it is not current
    pub fn select_song(&self, song: &Song) {
        self.select_song_id(song.id);
    }

    /// Play the song with `id`
    pub fn select_song_id(&self, id: SongId) {
        if let Some(engine) = self.shared.engine("select_song") {
            control::select_song(engine.as_ref(), id);
        }
    }

    pub fn on_play_pause(&self) {
        if let Some(engine) = self.shared.engine("play_pause") {
            control::play_pause(engine.as_ref());
        }
    }

    pub fn on_skip_previous(&self) {
        if let Some(engine) = self.shared.engine("skip_previous") {
            control::skip_previous(engine.as_ref());
        }
    }

    pub fn on_skip_next(&self) {
        if let Some(engine) = self.shared.engine("skip_next") {
            control::skip_next(engine.as_ref());
        }
    }

    /// Seek to `seconds` into the current song
    ///
    /// Returns `None` when no engine is connected.
    pub fn on_seek(&self, seconds: f32) -> Option<SeekOutcome> {
        let engine = self.shared.engine("seek")?;
        let outcome = control::seek(engine.as_ref(), seconds);
        match outcome {
            SeekOutcome::Issued(position_ms) => debug!(position_ms, "Seek issued"),
            SeekOutcome::DurationUnknown => debug!("Seek ignored, duration unknown"),
            SeekOutcome::BeyondDuration {
                target_ms,
                duration_ms,
            } => debug!(target_ms, duration_ms, "Seek ignored, past end of song"),
        }
        Some(outcome)
    }

    /// Request the next repeat mode, Off → All → One → Off
    ///
    /// Cycles from the last requested mode while requests are unconfirmed, so
    /// presses are never lost; otherwise from the engine-confirmed mode.
    pub fn change_repeat_mode(&self) -> Option<RepeatMode> {
        let engine = self.shared.engine("change_repeat_mode")?;
        let mode = self.shared.repeat.lock().cycle(engine.as_ref());
        debug!(%mode, "Repeat mode requested");
        Some(mode)
    }

    /// Request the inverse of the engine-reported shuffle flag
    pub fn change_shuffle_mode(&self) -> Option<bool> {
        let engine = self.shared.engine("change_shuffle_mode")?;
        let enabled = control::toggle_shuffle(engine.as_ref());
        debug!(enabled, "Shuffle requested");
        Some(enabled)
    }

    /// Change how often positions are polled
    ///
    /// Applies to the running session. Zero is rejected.
    pub fn set_poll_interval(&self, interval: Duration) {
        if interval.is_zero() {
            warn!("Ignoring zero poll interval");
            return;
        }
        self.shared.poll_interval.send_replace(interval);
    }

    pub fn poll_interval(&self) -> Duration {
        *self.shared.poll_interval.borrow()
    }

    /// Current snapshot
    pub fn state(&self) -> PlayerState {
        self.shared.publisher.snapshot()
    }

    /// New state reader
    pub fn subscribe(&self) -> StateSubscriber {
        self.shared.publisher.subscribe()
    }

    /// Control surface bound to this adapter
    pub fn controls(&self) -> ControlSurface {
        ControlSurface::new(self.clone())
    }

    /// State reader and control surface for one presentation layer
    pub fn screen(&self) -> PlayerScreen {
        PlayerScreen {
            state: self.subscribe(),
            controls: self.controls(),
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.shared.status.borrow().clone()
    }

    /// Receiver for connection status changes
    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.shared.status.subscribe()
    }

    /// Wait for the pending connection to finish setup
    ///
    /// Fails if the attempt fails or the adapter is disconnected first.
    pub async fn wait_until_connected(&self) -> Result<()> {
        let mut status = self.shared.status.subscribe();
        let status = status
            .wait_for(|status| !matches!(status, ConnectionStatus::Connecting))
            .await
            .map_err(|_| SessionError::connection("adapter dropped"))?
            .clone();

        match status {
            ConnectionStatus::Connected => Ok(()),
            ConnectionStatus::Failed(reason) => Err(SessionError::Connection(reason)),
            _ => Err(SessionError::connection("not connecting")),
        }
    }
}

impl std::fmt::Debug for PlayerAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerAdapter")
            .field("status", &*self.shared.status.borrow())
            .field("poll_interval", &*self.shared.poll_interval.borrow())
            .finish_non_exhaustive()
    }
}

impl Shared {
    /// Connected engine, if any
    ///
    /// The connection lock is released before the caller issues commands.
    fn engine(&self, command: &str) -> Option<Arc<dyn MediaEngine>> {
        match &*self.connection.lock() {
            Connection::Connected(session) => Some(Arc::clone(&session.engine)),
            _ => {
                debug!(command, "Engine not connected, dropping command");
                None
            }
        }
    }

    fn attach(&self, attempt: u64, engine: Arc<dyn MediaEngine>) {
        let playlist = Arc::clone(&*self.playlist.lock());

        control::load_playlist(engine.as_ref(), &playlist);
        control::ensure_prepared(engine.as_ref());

        let (input, inbox) = mpsc::unbounded_channel();
        let listener = engine.add_listener(EventSink::new(input.clone()));
        self.repeat.lock().reset(engine.repeat_mode());

        let seed = SessionInput::Seed {
            engine: EngineSnapshot::read(engine.as_ref()),
            playlist: Arc::clone(&playlist),
        };
        // Receiver is alive until the task below is spawned
        let _ = input.send(seed);

        let task = tokio::spawn(run_session(
            Arc::clone(&engine),
            Arc::clone(&self.publisher),
            Arc::clone(&self.repeat),
            inbox,
            self.poll_interval.subscribe(),
        ));
        let session = Session {
            engine,
            listener,
            input,
            task,
        };

        let mut connection = self.connection.lock();
        if !connection.is_attempt(attempt) {
            drop(connection);
            debug!(attempt, "Connection abandoned during setup");
            session.close();
            return;
        }
        *connection = Connection::Connected(session);
        drop(connection);

        info!(attempt, songs = playlist.len(), "Media engine connected");
        self.status.send_replace(ConnectionStatus::Connected);

        let latest = self.playlist.lock();
        if !Arc::ptr_eq(&latest, &playlist) {
            self.reload(Arc::clone(&latest));
        }
    }

    fn fail(&self, attempt: u64, error: &SessionError) {
        let mut connection = self.connection.lock();
        if !connection.is_attempt(attempt) {
            return;
        }
        *connection = Connection::Disconnected;
        drop(connection);

        warn!(attempt, "Media engine connection failed: {}", error);
        self.status
            .send_replace(ConnectionStatus::Failed(error.to_string()));
    }

    fn reload(&self, playlist: Arc<[Song]>) {
        let (engine, input) = match &*self.connection.lock() {
            Connection::Connected(session) => {
                (Arc::clone(&session.engine), session.input.clone())
            }
            _ => return,
        };

        // Publish the new playlist before the engine reports the item changes
        if input.send(SessionInput::Playlist(playlist.clone())).is_err() {
            return;
        }

        debug!(songs = playlist.len(), "Reloading engine items");
        engine.clear_media_items();
        control::load_playlist(engine.as_ref(), &playlist);
        control::ensure_prepared(engine.as_ref());
    }

    fn teardown(&self) {
        let previous = std::mem::replace(&mut *self.connection.lock(), Connection::Disconnected);
        match previous {
            Connection::Disconnected => {}
            Connection::Connecting { attempt, task } => {
                debug!(attempt, "Cancelling pending connection");
                task.abort();
            }
            Connection::Connected(session) => {
                info!("Releasing media engine");
                session.close();
            }
        }
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn complete_connect(
    shared: &Weak<Shared>,
    attempt: u64,
    result: Result<Arc<dyn MediaEngine>>,
) {
    let Some(shared) = shared.upgrade() else {
        if let Ok(engine) = result {
            engine.release();
        }
        return;
    };

    match result {
        Ok(engine) => shared.attach(attempt, engine),
        Err(e) => shared.fail(attempt, &e),
    }
}

async fn run_session(
    engine: Arc<dyn MediaEngine>,
    publisher: Arc<StatePublisher>,
    repeat: Arc<Mutex<RepeatRequests>>,
    mut inbox: mpsc::UnboundedReceiver<SessionInput>,
    mut poll_interval: watch::Receiver<Duration>,
) {
    let mut ticker = poll_timer(*poll_interval.borrow_and_update());

    loop {
        tokio::select! {
            biased;

            input = inbox.recv() => {
                let Some(input) = input else { break };
                if let SessionInput::Engine(EngineEvent::RepeatModeChanged(mode)) = &input {
                    repeat.lock().confirm(*mode);
                }
                publisher.update(|state| reduce(state, input));
            }
            changed = poll_interval.changed() => {
                if changed.is_err() {
                    break;
                }
                let period = *poll_interval.borrow_and_update();
                debug!(?period, "Poll interval changed");
                ticker = poll_timer(period);
            }
            _ = ticker.tick() => {
                let current = engine.current_position_ms();
                let buffered = engine.buffered_position_ms();
                publisher.update(|state| state.with_positions(current, buffered));
            }
        }
    }

    debug!("Session task finished");
}

fn reduce(state: &PlayerState, input: SessionInput) -> PlayerState {
    match input {
        SessionInput::Engine(event) => {
            debug!(event = event.name(), "Engine event");
            state.apply(&event)
        }
        SessionInput::Seed { engine, playlist } => PlayerState::seeded(playlist, &engine),
        SessionInput::Playlist(playlist) => state.with_playlist(playlist),
    }
}

fn poll_timer(period: Duration) -> time::Interval {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}
