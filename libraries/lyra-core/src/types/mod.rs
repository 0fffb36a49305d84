//! Domain types shared by every Lyra crate

mod repeat;
mod song;

pub use repeat::RepeatMode;
pub use song::{MediaLocator, Song, SongId};
