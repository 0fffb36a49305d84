/// CLI error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Catalog error: {0}")]
    Catalog(#[from] lyra_core::CoreError),

    #[error("Session error: {0}")]
    Session(#[from] lyra_session::SessionError),

    #[error("Surface error: {0}")]
    Surface(#[from] lyra_surfaces::SurfaceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Song {0} is not in the catalog")]
    UnknownSong(i32),

    #[error("Catalog is empty")]
    EmptyCatalog,
}
