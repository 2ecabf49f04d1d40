/// Coder Music - headless player for coding sessions
mod config;
mod simulated;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use coder_catalog::{random_coding_query, CatalogClient, CodingPlaylist};
use coder_core::{CredentialGate, Track};
use coder_playback::{format_time, PlayerEvent, PlayerService};
use crate::config::AppConfig;
use crate::simulated::SimulatedWidget;
use std::path::PathBuf;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "coder-music")]
#[command(about = "Music for coding, from the command line", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for tracks
    Search {
        /// Search phrase (a random coding query when omitted)
        query: Option<String>,
        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// List a playlist's tracks
    Playlist {
        /// Preset name (lofi, electronic, classical, ambient, focus) or playlist id
        playlist: String,
        /// Maximum number of entries
        #[arg(short, long, default_value_t = 50)]
        limit: u32,
    },
    /// Search and play the results against a simulated widget
    Play {
        /// Search phrase (a random coding query when omitted)
        query: Option<String>,
        /// Stop after this many tracks have finished
        #[arg(long)]
        max_tracks: Option<usize>,
        /// Simulated seconds per real second
        #[arg(long, default_value_t = 30.0)]
        speed: f64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "coder_music=info,coder_playback=info,coder_catalog=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    config.validate()?;

    let gate = CredentialGate::new();
    if let Some(key) = &config.api_key {
        gate.set_credential(key.as_str())?;
    }
    let client = CatalogClient::new(config.catalog.clone())?;

    match cli.command {
        Commands::Search { query, limit } => {
            search(&client, &gate, query, limit.unwrap_or(0)).await?;
        }
        Commands::Playlist { playlist, limit } => {
            playlist_tracks(&client, &gate, &playlist, limit).await?;
        }
        Commands::Play {
            query,
            max_tracks,
            speed,
        } => {
            play(&config, &client, gate, query, max_tracks, speed).await?;
        }
    }

    Ok(())
}

fn require_key(gate: &CredentialGate) -> anyhow::Result<String> {
    gate.credential()
        .context("An API key is required (set CODER_MUSIC_API_KEY or api_key in the config file)")
}

fn print_tracks(tracks: &[Track]) {
    for (i, track) in tracks.iter().enumerate() {
        let duration = if track.duration.is_empty() {
            "--:--"
        } else {
            track.duration.as_str()
        };
        println!(
            "{:>3}. {} [{}] - {}",
            i + 1,
            track.title,
            duration,
            track.channel_title
        );
    }
}

async fn search(
    client: &CatalogClient,
    gate: &CredentialGate,
    query: Option<String>,
    limit: u32,
) -> anyhow::Result<()> {
    let key = require_key(gate)?;
    let query = query.unwrap_or_else(|| random_coding_query().to_string());

    println!("Searching for \"{}\"", query);
    let tracks = client.try_search(&query, &key, limit).await?;
    if tracks.is_empty() {
        println!("No tracks found");
    } else {
        print_tracks(&tracks);
    }
    Ok(())
}

async fn playlist_tracks(
    client: &CatalogClient,
    gate: &CredentialGate,
    playlist: &str,
    limit: u32,
) -> anyhow::Result<()> {
    let key = require_key(gate)?;
    let playlist_id = playlist
        .parse::<CodingPlaylist>()
        .map_or_else(|_| playlist.to_string(), |preset| preset.playlist_id().to_string());

    let tracks = client.try_playlist_videos(&playlist_id, &key, limit).await?;
    println!("Playlist {} ({} tracks)", playlist, tracks.len());
    print_tracks(&tracks);
    Ok(())
}

async fn play(
    config: &AppConfig,
    client: &CatalogClient,
    gate: CredentialGate,
    query: Option<String>,
    max_tracks: Option<usize>,
    speed: f64,
) -> anyhow::Result<()> {
    require_key(&gate)?;
    let query = query.unwrap_or_else(|| random_coding_query().to_string());

    let tracks = client
        .search_gated(&gate, &query, config.catalog.max_results)
        .await;
    if tracks.is_empty() {
        bail!("No tracks found for \"{}\"", query);
    }
    println!("Queued {} tracks for \"{}\"", tracks.len(), query);

    let (sender, embed_events) = coder_playback::event_channel();
    let widget = SimulatedWidget::new(sender, speed).with_tracks(&tracks);
    let (service, handle) = PlayerService::new(&config.player, widget, embed_events, gate);
    let task = service.spawn();

    let mut events = handle.events();
    handle.play_track(tracks[0].clone(), Some(tracks.clone())).await?;

    let mut finished = 0usize;
    loop {
        let event = tokio::select! {
            event = events.recv() => event,
            _ = tokio::signal::ctrl_c() => {
                println!("Interrupted");
                break;
            }
        };

        match event {
            Ok(PlayerEvent::TrackChanged { track_id, .. }) => {
                let snapshot = handle.snapshot();
                let title = snapshot
                    .current_track
                    .as_ref()
                    .map_or(track_id.as_str(), |t| t.title.as_str());
                let position = snapshot.current_index.map_or(0, |i| i + 1);
                println!("> [{}/{}] {}", position, snapshot.queue_len, title);
            }
            Ok(PlayerEvent::PositionUpdate {
                current_time,
                duration,
            }) if current_time > 0.0 => {
                println!("  {} / {}", format_time(current_time), format_time(duration));
            }
            Ok(PlayerEvent::TrackFinished { .. }) => {
                finished += 1;
                if max_tracks.is_some_and(|max| finished >= max) {
                    println!("Played {} tracks", finished);
                    break;
                }
            }
            Ok(PlayerEvent::QueueExhausted) => {
                println!("Queue finished");
                break;
            }
            Ok(PlayerEvent::Error { message, .. }) => {
                println!("  error: {}", message);
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Event subscriber lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }

    handle.shutdown().await?;
    task.await?;
    Ok(())
}
