//! YouTube Data API v3 models and data structures.
//!
//! Contains the video list model and the wire shapes of the listing,
//! channel and rating responses.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;

/// Rating the authorized viewer gave a video.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Like,
    Dislike,
    None,
    Unspecified,
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Rating::Like => "like",
            Rating::Dislike => "dislike",
            Rating::None => "none",
            Rating::Unspecified => "unspecified",
        };
        f.write_str(s)
    }
}

/// A single video of a channel listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Video {
    /// YouTube video ID
    pub id: String,
    /// Resource kind reported by the API (e.g. `youtube#video`)
    pub kind: String,
    /// Video title
    pub title: String,
    /// Video description
    #[allow(dead_code)] // Part of the listing model; not printed
    pub description: String,
    /// Video published date
    #[allow(dead_code)] // Parsed to reject malformed bodies; display uses published_raw
    pub published_at: DateTime<Utc>,
    /// Published date exactly as the API sent it
    pub published_raw: String,
    /// Viewer rating, attached after the listing call
    pub rating: Option<Rating>,
}

impl Video {
    /// Published date as the API sent it, e.g. `2024-01-15T10:00:00Z`.
    pub fn format_published(&self) -> &str {
        &self.published_raw
    }
}

/// One listing response, already converted to videos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub videos: Vec<Video>,
    pub next_page_token: Option<String>,
    pub total_results: u32,
    pub results_per_page: u32,
}

/// What a listing call enumerates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingTarget {
    /// `search.list` restricted to a channel, newest first
    Search { channel_id: String },
    /// `playlistItems.list` over a playlist, usually the channel uploads
    Playlist { playlist_id: String },
}

/// YouTube API list response wrapper.
#[derive(Debug, Deserialize)]
#[serde(
    rename_all = "camelCase",
    bound(deserialize = "T: Deserialize<'de>")
)]
pub struct ApiResponse<T> {
    /// Response items; omitted when nothing matched
    #[serde(default)]
    pub items: Vec<T>,
    /// Next page token for pagination
    pub next_page_token: Option<String>,
    /// Result counts; absent on some endpoints
    #[serde(default)]
    pub page_info: ApiPageInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPageInfo {
    #[serde(default)]
    pub total_results: u32,
    #[serde(default)]
    pub results_per_page: u32,
}

/// Item of a `search.list` response.
#[derive(Debug, Deserialize)]
pub struct ApiSearchItem {
    pub id: ApiSearchItemId,
    pub snippet: ApiSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSearchItemId {
    pub kind: String,
    pub video_id: String,
}

/// Snippet shared by search and playlist items.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSnippet {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub published_at: String,
    /// Only present on playlist items
    pub resource_id: Option<ApiResourceId>,
}

/// Resource a playlist item points at.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResourceId {
    pub kind: String,
    pub video_id: String,
}

/// Item of a `playlistItems.list` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPlaylistItem {
    pub snippet: ApiSnippet,
    pub content_details: Option<ApiPlaylistItemDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPlaylistItemDetails {
    /// Missing for private or deleted videos
    pub video_published_at: Option<String>,
}

/// Item of a `channels.list` response with `part=contentDetails`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiChannelItem {
    pub content_details: ApiChannelDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiChannelDetails {
    pub related_playlists: ApiRelatedPlaylists,
}

#[derive(Debug, Deserialize)]
pub struct ApiRelatedPlaylists {
    pub uploads: String,
}

/// `videos.getRating` response.
#[derive(Debug, Deserialize)]
pub struct ApiRatingResponse {
    #[serde(default)]
    pub items: Vec<VideoRating>,
}

/// One entry of a bulk rating lookup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRating {
    pub video_id: String,
    pub rating: Rating,
}

fn parse_published(raw: &str) -> anyhow::Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .map_err(|e| anyhow::anyhow!("Failed to parse published date {raw:?}: {e}"))?
        .with_timezone(&Utc))
}

impl TryFrom<ApiSearchItem> for Video {
    type Error = anyhow::Error;

    fn try_from(item: ApiSearchItem) -> Result<Self, Self::Error> {
        Ok(Self {
            published_at: parse_published(&item.snippet.published_at)?,
            published_raw: item.snippet.published_at,
            id: item.id.video_id,
            kind: item.id.kind,
            title: item.snippet.title,
            description: item.snippet.description,
            rating: None,
        })
    }
}

impl TryFrom<ApiPlaylistItem> for Video {
    type Error = anyhow::Error;

    /// Convert a playlist item to a Video.
    ///
    /// # Details
    /// Prefers the video's own publish date over the time it was added to
    /// the playlist, falling back to the latter when the video is private.
    fn try_from(item: ApiPlaylistItem) -> Result<Self, Self::Error> {
        let resource = item
            .snippet
            .resource_id
            .ok_or_else(|| anyhow::anyhow!("Playlist item has no resourceId"))?;

        let published_raw = item
            .content_details
            .and_then(|cd| cd.video_published_at)
            .unwrap_or(item.snippet.published_at);

        Ok(Self {
            published_at: parse_published(&published_raw)?,
            published_raw,
            id: resource.video_id,
            kind: resource.kind,
            title: item.snippet.title,
            description: item.snippet.description,
            rating: None,
        })
    }
}
