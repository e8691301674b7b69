//! yt-channel-lister - print every video of a YouTube channel.
//!
//! Main entry point: merges configuration, runs the paginated listing and
//! prints one line per video.

mod config;
mod output;
mod youtube;

use anyhow::{Context, Result};
use clap::Parser;
use config::{Config, ENV_OAUTH_TOKEN, ListingSource};
use output::write_videos;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, debug, warn};
use youtube::{ListingTarget, YouTubeClient, list_videos};

/// Lists all videos of a YouTube channel, newest first
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Config file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listing endpoint to enumerate the channel with
    #[arg(short, long, value_enum)]
    source: Option<ListingSource>,

    /// List this playlist instead of the channel uploads (implies --source uploads)
    #[arg(long)]
    playlist_id: Option<String>,

    /// Attach the viewer rating to each video
    #[arg(short, long)]
    ratings: bool,

    /// Log each API call to stderr
    #[arg(short, long)]
    verbose: bool,
}

/// Main application entry point.
///
/// # Details
/// Prints the listing to stdout on success. On failure prints a single
/// `Error: ...` line to stderr and exits with a failure status.
#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = Config::load(args.config.as_deref())?;
    config.apply_env(|name| std::env::var(name).ok());

    if let Some(source) = args.source {
        config.source = source;
    }
    if let Some(playlist_id) = args.playlist_id {
        config.playlist_id = Some(playlist_id);
        config.source = ListingSource::Uploads;
    }
    if args.ratings {
        config.ratings = true;
    }

    config.validate()?;

    if config.ratings && config.oauth_access_token.is_none() {
        warn!("Rating lookups need an OAuth access token; set {ENV_OAUTH_TOKEN}");
    }

    let client = YouTubeClient::new(&config)?;
    let target = resolve_target(&client, &config).await?;
    debug!(?target, ratings = config.ratings, "Listing videos");

    let videos = list_videos(&client, &target, config.ratings)
        .await
        .context("Failed to list channel videos")?;
    debug!(count = videos.len(), "Listing complete");

    write_videos(&mut io::stdout().lock(), &videos).context("Failed to write video list")?;

    Ok(())
}

/// Turn the configured source into the target of the listing calls.
///
/// # Details
/// For `uploads` without an explicit playlist, asks the API for the
/// channel's uploads playlist first.
async fn resolve_target(client: &YouTubeClient, config: &Config) -> Result<ListingTarget> {
    match config.source {
        ListingSource::Search => Ok(ListingTarget::Search {
            channel_id: config.channel_id.clone(),
        }),
        ListingSource::Uploads => {
            let playlist_id = match config.playlist() {
                Some(id) => id.to_string(),
                None => client
                    .uploads_playlist(&config.channel_id)
                    .await
                    .context("Failed to resolve the channel uploads playlist")?,
            };
            Ok(ListingTarget::Playlist { playlist_id })
        }
    }
}
