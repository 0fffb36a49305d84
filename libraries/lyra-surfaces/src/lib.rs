//! Lyra Surfaces
//!
//! Presentation surfaces that mirror player state outside the app UI.
//!
//! This crate provides:
//! - **Widget**: preference-backed widget state, the `WidgetMirror` that keeps
//!   it current, and the widget's button actions
//! - **Notification**: the `NotificationBridge` that shows and hides the
//!   now-playing notification, with cached artwork resolution
//!
//! Both surfaces only read `PlayerState` snapshots; user input goes back
//! through the session's `ControlSurface`.

#![forbid(unsafe_code)]

pub mod error;
pub mod notification;
pub mod preferences;
pub mod widget;

pub use error::{Result, SurfaceError};
pub use notification::{
    Artwork, ArtworkCache, ArtworkResolver, DirectoryArtworkResolver, NotificationBridge,
    NotificationRenderer, NowPlaying,
};
pub use preferences::{MemoryPreferences, PreferenceStore, PreferenceValue};
pub use widget::{WidgetAction, WidgetMirror, WidgetState};
