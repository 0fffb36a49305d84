/// Lyra - headless music player
use clap::{Parser, Subcommand};
use lyra_cli::{play, AppConfig, PlayRequest};
use lyra_core::{Catalog, SongId};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lyra-cli")]
#[command(about = "Lyra headless player driving a simulated engine", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "LYRA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the songs in the catalog
    Catalog,
    /// Play a song for a number of simulated seconds
    Play {
        /// Song id; defaults to the first catalog entry
        #[arg(short, long)]
        song: Option<i32>,
        /// Simulated seconds to play
        #[arg(long, default_value_t = 10)]
        seconds: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lyra_cli=info,lyra_session=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    config.validate()?;

    match cli.command {
        Commands::Catalog => {
            list_catalog(&config)?;
        }
        Commands::Play { song, seconds } => {
            play_song(&config, song, seconds).await?;
        }
    }

    Ok(())
}

fn list_catalog(config: &AppConfig) -> anyhow::Result<()> {
    let catalog = Catalog::load(&config.catalog.path)?;

    println!("Catalog ({} songs):", catalog.len());
    for song in catalog.songs() {
        let minutes = song.duration_secs / 60;
        let seconds = song.duration_secs % 60;
        println!(
            "  {:>4}  {} - {} ({}:{:02})",
            song.id.get(),
            song.artist,
            song.title,
            minutes,
            seconds
        );
    }

    Ok(())
}

async fn play_song(config: &AppConfig, song: Option<i32>, seconds: u64) -> anyhow::Result<()> {
    let catalog = Catalog::load(&config.catalog.path)?;
    tracing::info!("Loaded {} songs from {}", catalog.len(), config.catalog.path.display());

    let request = PlayRequest {
        song: song.map(SongId::new),
        seconds,
    };
    let report = play(config, &catalog, request).await?;

    let state = &report.final_state;
    println!("Started: {} - {}", report.started.artist, report.started.title);
    match state.current_song() {
        Some(current) => println!(
            "Now: {} at {}s ({})",
            current.title,
            state.current_position_ms() / 1000,
            if state.is_playing() { "playing" } else { "paused" }
        ),
        None => println!("Now: nothing"),
    }
    println!(
        "State changes: {}, notifications: {}",
        report.changes, report.notifications_shown
    );
    if let Some(error) = state.last_error() {
        println!("Last error: {error}");
    }

    Ok(())
}
