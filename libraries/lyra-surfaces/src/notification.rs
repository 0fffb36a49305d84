//! System notification surface
//!
//! Shows what is playing with transport controls. The bridge only calls into
//! the renderer when the presented content changes, and hides the
//! notification once when nothing is current.

use lru::LruCache;
use lyra_core::Song;
use lyra_session::{PlayerState, StateSubscriber};
use std::num::NonZeroUsize;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{Result, SurfaceError};

/// Content of the now-playing notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    pub title: String,
    pub artist: String,

    /// Artwork locator from the catalog
    pub artwork: String,

    /// Selects the play or pause action
    pub is_playing: bool,
}

impl NowPlaying {
    /// Content for the current snapshot, if a song is current
    pub fn from_state(state: &PlayerState) -> Option<Self> {
        state.current_song().map(|song| Self::new(song, state.is_playing()))
    }

    pub fn new(song: &Song, is_playing: bool) -> Self {
        Self {
            title: song.title.clone(),
            artist: song.artist.clone(),
            artwork: song.artwork.clone(),
            is_playing,
        }
    }
}

/// Artwork handed to the renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artwork {
    /// Encoded image bytes
    Image(Arc<[u8]>),

    /// Resolution failed or no artwork; render the bundled placeholder
    Placeholder,
}

/// Draws the system notification
#[cfg_attr(test, mockall::automock)]
pub trait NotificationRenderer: Send {
    /// Show or refresh the notification
    fn show(&mut self, now_playing: &NowPlaying, artwork: &Artwork);

    /// Remove the notification
    fn hide(&mut self);
}

/// Turns an artwork locator into image bytes
#[cfg_attr(test, mockall::automock)]
pub trait ArtworkResolver: Send + Sync {
    fn resolve(&self, locator: &str) -> Result<Vec<u8>>;
}

/// Resolves bundled artwork from a directory
///
/// Remote locators are not fetched and resolve to an error. Locators must be
/// plain relative paths inside the directory.
#[derive(Debug, Clone)]
pub struct DirectoryArtworkResolver {
    root: PathBuf,
}

impl DirectoryArtworkResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ArtworkResolver for DirectoryArtworkResolver {
    fn resolve(&self, locator: &str) -> Result<Vec<u8>> {
        if locator.starts_with("http") {
            return Err(SurfaceError::artwork(locator, "remote artwork is not fetched"));
        }
        let relative = Path::new(locator);
        if !relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
        {
            return Err(SurfaceError::artwork(locator, "locator escapes the artwork directory"));
        }
        let path = self.root.join(relative);
        std::fs::read(&path).map_err(|e| SurfaceError::artwork(locator, e.to_string()))
    }
}

/// Resolved artwork by locator
///
/// Failures are not cached, so a later lookup tries again.
pub struct ArtworkCache {
    resolver: Arc<dyn ArtworkResolver>,
    cache: LruCache<String, Artwork>,
}

impl ArtworkCache {
    /// Cache holding up to `capacity` images (at least one)
    pub fn new(resolver: Arc<dyn ArtworkResolver>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            resolver,
            cache: LruCache::new(capacity),
        }
    }

    /// Artwork for `locator`, falling back to the placeholder
    pub fn get(&mut self, locator: &str) -> Artwork {
        if locator.is_empty() {
            return Artwork::Placeholder;
        }
        if let Some(artwork) = self.cache.get(locator) {
            return artwork.clone();
        }

        match self.resolver.resolve(locator) {
            Ok(bytes) => {
                let artwork = Artwork::Image(bytes.into());
                self.cache.put(locator.to_string(), artwork.clone());
                artwork
            }
            Err(e) => {
                warn!("Using placeholder artwork: {}", e);
                Artwork::Placeholder
            }
        }
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

/// Keeps the notification in step with published snapshots
pub struct NotificationBridge<R> {
    renderer: R,
    artwork: ArtworkCache,
    shown: Option<NowPlaying>,
}

impl<R: NotificationRenderer> NotificationBridge<R> {
    pub fn new(renderer: R, artwork: ArtworkCache) -> Self {
        Self {
            renderer,
            artwork,
            shown: None,
        }
    }

    /// Reflect `state` in the notification
    ///
    /// Returns whether the renderer was called.
    pub fn update(&mut self, state: &PlayerState) -> bool {
        match NowPlaying::from_state(state) {
            Some(now_playing) => {
                if self.shown.as_ref() == Some(&now_playing) {
                    return false;
                }
                let artwork = self.artwork.get(&now_playing.artwork);
                debug!(title = %now_playing.title, "Showing notification");
                self.renderer.show(&now_playing, &artwork);
                self.shown = Some(now_playing);
                true
            }
            None => {
                if self.shown.take().is_none() {
                    return false;
                }
                debug!("Hiding notification");
                self.renderer.hide();
                true
            }
        }
    }

    /// Follow snapshots until the publisher goes away, then hide and hand the
    /// renderer back
    pub async fn run(mut self, mut state: StateSubscriber) -> R {
        self.update(&state.snapshot());
        while let Ok(snapshot) = state.changed().await {
            self.update(&snapshot);
        }
        if self.shown.take().is_some() {
            self.renderer.hide();
        }
        self.renderer
    }

    pub fn is_shown(&self) -> bool {
        self.shown.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyra_core::{RepeatMode, SongId};
    use lyra_session::{EngineEvent, EngineSnapshot, EngineState};

    fn playlist() -> Arc<[Song]> {
        vec![
            Song::new(1, "Song A", "Artist A", "a", "a.jpg", 180),
            Song::new(2, "Song B", "Artist B", "b", "", 200),
        ]
        .into()
    }

    fn state_at(id: Option<i32>) -> PlayerState {
        PlayerState::seeded(
            playlist(),
            &EngineSnapshot {
                is_playing: false,
                is_loading: false,
                playback_state: EngineState::Ready,
                current_position_ms: 0,
                buffered_position_ms: 0,
                current_media_id: id.map(SongId::new),
                repeat_mode: RepeatMode::Off,
                shuffle_enabled: false,
                error: None,
            },
        )
    }

    fn resolver_returning(bytes: &'static [u8]) -> Arc<dyn ArtworkResolver> {
        let mut resolver = MockArtworkResolver::new();
        resolver
            .expect_resolve()
            .returning(move |_| Ok(bytes.to_vec()));
        Arc::new(resolver)
    }

    #[test]
    fn artwork_is_resolved_once_per_locator() {
        let mut resolver = MockArtworkResolver::new();
        resolver
            .expect_resolve()
            .withf(|locator: &str| locator == "a.jpg")
            .times(1)
            .returning(|_| Ok(vec![1, 2, 3]));
        let mut cache = ArtworkCache::new(Arc::new(resolver), 4);

        assert_eq!(cache.get("a.jpg"), Artwork::Image(Arc::from(vec![1u8, 2, 3])));
        assert_eq!(cache.get("a.jpg"), Artwork::Image(Arc::from(vec![1u8, 2, 3])));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failed_artwork_falls_back_to_placeholder() {
        let mut resolver = MockArtworkResolver::new();
        resolver
            .expect_resolve()
            .times(2)
            .returning(|locator| Err(SurfaceError::artwork(locator, "not found")));
        let mut cache = ArtworkCache::new(Arc::new(resolver), 4);

        assert_eq!(cache.get("missing.jpg"), Artwork::Placeholder);
        assert_eq!(cache.get("missing.jpg"), Artwork::Placeholder);
        assert!(cache.is_empty());
    }

    #[test]
    fn empty_locator_is_placeholder_without_resolving() {
        let mut resolver = MockArtworkResolver::new();
        resolver.expect_resolve().never();
        let mut cache = ArtworkCache::new(Arc::new(resolver), 1);

        assert_eq!(cache.get(""), Artwork::Placeholder);
    }

    #[test]
    fn bridge_shows_on_change_and_hides_once() {
        let mut renderer = MockNotificationRenderer::new();
        renderer.expect_show().times(3).return_const(());
        renderer.expect_hide().times(1).return_const(());
        let mut bridge = NotificationBridge::new(renderer, ArtworkCache::new(resolver_returning(b"img"), 2));

        let a = state_at(Some(1));
        assert!(bridge.update(&a));
        assert!(!bridge.update(&a.with_positions(5_000, 9_000)));

        let playing = a.apply(&EngineEvent::IsPlayingChanged(true));
        assert!(bridge.update(&playing));

        assert!(bridge.update(&state_at(Some(2))));

        assert!(bridge.update(&state_at(None)));
        assert!(!bridge.update(&state_at(None)));
        assert!(!bridge.is_shown());
    }

    #[test]
    fn directory_resolver_reads_bundled_files_only() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("cover.jpg"), b"jpeg").unwrap();
        let resolver = DirectoryArtworkResolver::new(dir.path());

        assert_eq!(resolver.resolve("cover.jpg").unwrap(), b"jpeg".to_vec());
        assert!(resolver.resolve("absent.jpg").is_err());
        assert!(resolver.resolve("https://media.example.com/cover.jpg").is_err());
    }

    #[test]
    fn directory_resolver_stays_inside_its_directory() {
        let parent = tempfile::TempDir::new().unwrap();
        let root = parent.path().join("artwork");
        std::fs::create_dir_all(root.join("albums")).unwrap();
        std::fs::write(root.join("albums").join("cover.jpg"), b"jpeg").unwrap();
        std::fs::write(parent.path().join("secret.txt"), b"secret").unwrap();
        let resolver = DirectoryArtworkResolver::new(&root);

        assert_eq!(resolver.resolve("albums/cover.jpg").unwrap(), b"jpeg".to_vec());
        assert!(resolver.resolve("../secret.txt").is_err());
        assert!(resolver.resolve("albums/../../secret.txt").is_err());
        assert!(resolver.resolve("./albums/cover.jpg").is_err());

        let absolute = parent.path().join("secret.txt");
        assert!(resolver.resolve(absolute.to_str().unwrap()).is_err());
    }
}
