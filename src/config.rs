//! Configuration management for the channel lister.
//!
//! Settings come from an optional JSONC file, then the process environment
//! (including a `.env` file), then command-line flags, each layer overriding
//! the previous one.

use anyhow::{Context, Result};
use clap::ValueEnum;
use dirs::config_dir;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "YOUTUBE_API_KEY";
/// Environment variable holding the channel ID.
pub const ENV_CHANNEL_ID: &str = "YOUTUBE_CHANNEL_ID";
/// Environment variable holding an explicit playlist ID.
pub const ENV_PLAYLIST_ID: &str = "YOUTUBE_PLAYLIST_ID";
/// Environment variable holding an OAuth2 access token.
pub const ENV_OAUTH_TOKEN: &str = "YOUTUBE_OAUTH_TOKEN";

/// Which listing endpoint enumerates the channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ListingSource {
    /// search.list filtered by channel, newest first
    #[default]
    Search,
    /// playlistItems.list over the channel's uploads playlist
    Uploads,
}

/// Application configuration structure.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// YouTube Data API v3 key
    pub api_key: String,
    /// Channel whose videos are listed
    pub channel_id: String,
    /// Playlist to list instead of resolving the channel's uploads
    pub playlist_id: Option<String>,
    /// OAuth2 access token, needed upstream for rating lookups
    pub oauth_access_token: Option<String>,
    /// Listing endpoint to use
    pub source: ListingSource,
    /// Whether to attach the viewer rating to each video
    pub ratings: bool,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Root of the YouTube Data API
    pub api_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            channel_id: String::new(),
            playlist_id: None,
            oauth_access_token: None,
            source: ListingSource::Search,
            ratings: false,
            request_timeout_secs: 30,
            api_base_url: "https://www.googleapis.com/youtube/v3".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file.
    ///
    /// # Arguments
    /// * `path` - Optional path to config file. If None, uses default location.
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    ///
    /// # Details
    /// If no config file exists, returns default configuration; the
    /// environment usually supplies everything.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path()?,
        };

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = serde_json::from_str(&strip_line_comments(&content))
            .with_context(|| format!("Failed to deserialize config: {}", config_path.display()))?;

        Ok(config)
    }

    /// Get default configuration file path.
    ///
    /// # Details
    /// Returns `$XDG_CONFIG_HOME/yt-channel-lister/config.jsonc` or
    /// `~/.config/yt-channel-lister/config.jsonc`.
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir =
            config_dir().ok_or_else(|| anyhow::anyhow!("Failed to determine config directory"))?;
        Ok(config_dir.join("yt-channel-lister").join("config.jsonc"))
    }

    /// Override fields with values found through `lookup`.
    ///
    /// # Arguments
    /// * `lookup` - Returns the value of an environment variable, if set
    ///
    /// # Details
    /// Empty values are ignored so a blank line in `.env` does not wipe a
    /// value from the config file.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_API_KEY) {
            self.api_key = v;
        }
        if let Some(v) = get(ENV_CHANNEL_ID) {
            self.channel_id = v;
        }
        if let Some(v) = get(ENV_PLAYLIST_ID) {
            self.playlist_id = Some(v);
        }
        if let Some(v) = get(ENV_OAUTH_TOKEN) {
            self.oauth_access_token = Some(v);
        }
    }

    /// Check that the listing can be attempted at all.
    ///
    /// # Returns
    /// * `Result<()>` - Ok, or an error naming the missing setting
    ///
    /// # Details
    /// A channel ID is not needed when listing an explicit playlist.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            anyhow::bail!("YouTube API key is required. Set {ENV_API_KEY} or api_key in config");
        }

        let has_playlist = self.source == ListingSource::Uploads && self.playlist().is_some();
        if self.channel_id.trim().is_empty() && !has_playlist {
            anyhow::bail!("Channel ID is required. Set {ENV_CHANNEL_ID} or channel_id in config");
        }

        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than zero");
        }

        Ok(())
    }

    /// The explicit playlist to list, ignoring blank values.
    pub fn playlist(&self) -> Option<&str> {
        self.playlist_id
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

/// Drop `//` comments that are not inside a string.
///
/// Quote counting is simplified and does not handle escaped quotes.
fn strip_line_comments(content: &str) -> String {
    content
        .lines()
        .map(|line| {
            let comment = line
                .match_indices("//")
                .map(|(pos, _)| pos)
                .find(|&pos| line[..pos].matches('"').count() % 2 == 0);
            match comment {
                Some(pos) => line[..pos].trim_end(),
                None => line,
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
