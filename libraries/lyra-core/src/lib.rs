//! Lyra Core
//!
//! Platform-agnostic domain types, catalog loading, and error handling for Lyra.
//!
//! The core crate defines:
//! - **Domain Types**: `Song`, `SongId`, `MediaLocator`, `RepeatMode`
//! - **Catalog**: the immutable, ordered list of playable songs
//! - **Error Handling**: `CoreError` and `Result`
//!
//! # Example
//!
//! ```rust
//! use lyra_core::{Catalog, SongId};
//!
//! let catalog = Catalog::from_toml_str(r#"
//!     [[songs]]
//!     id = 1
//!     title = "Opening"
//!     artist = "Lyra Ensemble"
//!     source = "https://media.example.com/opening.mp3"
//!     artwork = "https://media.example.com/opening.jpg"
//!     duration_secs = 180
//! "#).unwrap();
//!
//! assert_eq!(catalog.len(), 1);
//! assert!(catalog.find(SongId::new(1)).is_some());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod error;
pub mod types;

pub use catalog::Catalog;
pub use error::{CoreError, Result};
pub use types::{MediaLocator, RepeatMode, Song, SongId};
