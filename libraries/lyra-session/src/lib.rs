//! Lyra Session
//!
//! Bridges a push-based media engine to a pull-based state model.
//!
//! This crate provides:
//! - **Engine abstraction**: `MediaEngine`, `EngineConnector`, `EngineEvent`
//! - **State model**: immutable `PlayerState` snapshots
//! - **Publishing**: `StatePublisher` / `StateSubscriber` (one writer, many readers)
//! - **Adapter**: `PlayerAdapter` owns the engine connection and the session task
//! - **Control surface**: `ControlSurface` and `PlayerScreen` for presentation layers
//! - **Simulation**: `SimulatedEngine` for tests and headless runs
//!
//! # Architecture
//!
//! Every snapshot write happens on a single session task spawned per engine
//! connection. Engine events arrive through an `EventSink`; position and
//! buffered position are polled on a timer, since engines do not push
//! continuous position updates. Commands go straight to the engine and are
//! confirmed by the events it pushes back.
//!
//! # Example
//!
//! ```rust,no_run
//! use lyra_core::Catalog;
//! use lyra_session::{PlayerAdapter, SessionConfig, SimulatedConnector, SimulatedEngine};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Catalog::load("catalog.toml")?;
//! let engine = Arc::new(SimulatedEngine::new());
//! let adapter = PlayerAdapter::new(
//!     Arc::new(SimulatedConnector::new(Arc::clone(&engine))),
//!     catalog.shared(),
//!     SessionConfig::default(),
//! )?;
//!
//! adapter.connect();
//! adapter.wait_until_connected().await?;
//!
//! let mut screen = adapter.screen();
//! if let Some(song) = catalog.songs().last() {
//!     screen.controls.on_song_click(song);
//! }
//!
//! let state = screen.state.wait_for(|s| s.is_playing()).await?;
//! println!("Now playing: {:?}", state.current_song().map(|s| &s.title));
//!
//! adapter.disconnect();
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod adapter;
pub mod config;
mod control;
pub mod engine;
pub mod error;
pub mod events;
pub mod publisher;
pub mod simulated;
pub mod state;
pub mod surface;

pub use adapter::{ConnectionStatus, PlayerAdapter};
pub use config::SessionConfig;
pub use control::SeekOutcome;
pub use engine::{EngineConnector, EngineState, EventSink, ListenerId, MediaEngine, MediaItem};
pub use error::{PlaybackError, PlaybackErrorKind, Result, SessionError};
pub use events::EngineEvent;
pub use publisher::{PublisherClosed, StatePublisher, StateSubscriber};
pub use simulated::{DurationReport, EngineCommand, SimulatedConnector, SimulatedEngine};
pub use state::{EngineSnapshot, PlayerState};
pub use surface::{ControlSurface, PlayerScreen};
