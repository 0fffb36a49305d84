//! Lyra CLI
//!
//! Headless player driving the simulated engine through a full session:
//! catalog loading, connection, transport control, widget persistence and the
//! now-playing notification.

pub mod config;
pub mod error;
pub mod player;

pub use config::AppConfig;
pub use error::{CliError, Result};
pub use player::{play, LoggingRenderer, PlayReport, PlayRequest};
