//! End-to-end runs of the headless player

use lyra_cli::{play, AppConfig, CliError, PlayRequest};
use lyra_core::{Catalog, Song, SongId};
use lyra_surfaces::{widget, MemoryPreferences};
use tempfile::TempDir;

fn catalog() -> Catalog {
    Catalog::new(vec![
        Song::new(4, "First", "Artist", "first", "first.jpg", 60),
        Song::new(9, "Second", "Artist", "second", "second.jpg", 60),
    ])
    .unwrap()
}

fn config_in(dir: &TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.widget.store_path = dir.path().join("state").join("widget.json");
    config.artwork.directory = dir.path().join("artwork");
    config
}

#[tokio::test(start_paused = true)]
async fn play_persists_widget_state() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    std::fs::create_dir_all(&config.artwork.directory).unwrap();
    std::fs::write(config.artwork.directory.join("second.jpg"), b"jpeg").unwrap();

    let request = PlayRequest {
        song: Some(SongId::new(9)),
        seconds: 5,
    };
    let report = play(&config, &catalog(), request).await.unwrap();

    assert_eq!(report.started.id, SongId::new(9));
    assert_eq!(report.final_state.current_song_id(), Some(SongId::new(9)));
    assert!(report.final_state.is_playing());
    assert!(report.changes >= 1);
    assert!(report.notifications_shown >= 1);
    assert_eq!(report.widget.song.as_ref().map(|s| s.id), Some(SongId::new(9)));

    let stored = MemoryPreferences::load(&config.widget.store_path).unwrap();
    assert_eq!(widget::load_state(&stored), report.widget);
}

#[tokio::test(start_paused = true)]
async fn play_runs_into_the_next_song() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);

    let request = PlayRequest {
        song: None,
        seconds: 70,
    };
    let report = play(&config, &catalog(), request).await.unwrap();

    assert_eq!(report.started.id, SongId::new(4));
    assert_eq!(report.final_state.current_song_id(), Some(SongId::new(9)));
    assert!(report.final_state.current_position_ms() <= 10_000);
}

#[tokio::test]
async fn unknown_song_fails_before_touching_the_store() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);

    let request = PlayRequest {
        song: Some(SongId::new(99)),
        seconds: 1,
    };
    let result = play(&config, &catalog(), request).await;

    assert!(matches!(result, Err(CliError::UnknownSong(99))));
    assert!(!config.widget.store_path.exists());
}
