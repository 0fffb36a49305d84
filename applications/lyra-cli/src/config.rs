/// Application configuration
use crate::error::{CliError, Result};
use lyra_session::SessionConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file read when no path is given
pub const DEFAULT_CONFIG_PATH: &str = "lyra.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default = "default_catalog")]
    pub catalog: CatalogSettings,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default = "default_widget")]
    pub widget: WidgetSettings,

    #[serde(default = "default_artwork")]
    pub artwork: ArtworkSettings,

    #[serde(default = "default_playback")]
    pub playback: PlaybackSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogSettings {
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WidgetSettings {
    /// Where the widget's key/value store is persisted
    #[serde(default = "default_widget_store_path")]
    pub store_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtworkSettings {
    /// Directory holding bundled artwork
    #[serde(default = "default_artwork_directory")]
    pub directory: PathBuf,

    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybackSettings {
    /// Wall-clock time per simulated second, in milliseconds
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; the default config file is optional.
    /// Environment variables are prefixed with `LYRA_` and use `__` between
    /// nested keys, e.g. `LYRA_SESSION__POLL_INTERVAL_MS`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        settings = match path {
            Some(path) => settings.add_source(config::File::from(path).required(true)),
            None => settings
                .add_source(config::File::from(Path::new(DEFAULT_CONFIG_PATH)).required(false)),
        };

        settings = settings.add_source(
            config::Environment::with_prefix("LYRA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.session
            .validate()
            .map_err(|e| CliError::Config(e.to_string()))?;

        if self.catalog.path.as_os_str().is_empty() {
            return Err(CliError::Config("catalog path is required".to_string()));
        }

        if self.widget.store_path.as_os_str().is_empty() {
            return Err(CliError::Config(
                "widget store path is required (set LYRA_WIDGET__STORE_PATH)".to_string(),
            ));
        }

        if self.artwork.cache_capacity == 0 {
            return Err(CliError::Config(
                "artwork cache capacity must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog: default_catalog(),
            session: SessionConfig::default(),
            widget: default_widget(),
            artwork: default_artwork(),
            playback: default_playback(),
        }
    }
}

// Default values
fn default_catalog() -> CatalogSettings {
    CatalogSettings {
        path: default_catalog_path(),
    }
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("catalog.toml")
}

fn default_widget() -> WidgetSettings {
    WidgetSettings {
        store_path: default_widget_store_path(),
    }
}

fn default_widget_store_path() -> PathBuf {
    PathBuf::from("./data/widget.json")
}

fn default_artwork() -> ArtworkSettings {
    ArtworkSettings {
        directory: default_artwork_directory(),
        cache_capacity: default_cache_capacity(),
    }
}

fn default_artwork_directory() -> PathBuf {
    PathBuf::from("./artwork")
}

fn default_cache_capacity() -> usize {
    16
}

fn default_playback() -> PlaybackSettings {
    PlaybackSettings {
        tick_ms: default_tick_ms(),
    }
}

fn default_tick_ms() -> u64 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.session.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.catalog.path, PathBuf::from("catalog.toml"));
    }

    #[test]
    fn loads_partial_file_over_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lyra.toml");
        std::fs::write(
            &path,
            "[session]\npoll_interval_ms = 250\n\n[widget]\nstore_path = \"state/widget.json\"\n",
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();

        assert_eq!(config.session.poll_interval_ms, 250);
        assert_eq!(config.widget.store_path, PathBuf::from("state/widget.json"));
        assert_eq!(config.artwork.cache_capacity, 16);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = AppConfig::load(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let mut config = AppConfig::default();
        config.session.poll_interval_ms = 0;
        assert!(matches!(config.validate(), Err(CliError::Config(_))));
    }

    #[test]
    fn zero_cache_capacity_is_rejected() {
        let mut config = AppConfig::default();
        config.artwork.cache_capacity = 0;
        assert!(config.validate().is_err());
    }
}
