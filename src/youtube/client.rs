//! YouTube Data API v3 client implementation.
//!
//! Handles the listing, channel and rating endpoints over HTTP.

use crate::config::Config;
use crate::youtube::error::UpstreamError;
use crate::youtube::lister::{PAGE_SIZE, VideoApi};
use crate::youtube::models::{
    ApiChannelItem, ApiPlaylistItem, ApiRatingResponse, ApiResponse, ApiSearchItem,
    ListingTarget, Page, Video, VideoRating,
};
use anyhow::{Context, Result};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// YouTube Data API v3 client.
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// OAuth2 access token, required upstream for rating lookups
    access_token: Option<String>,
    /// Base URL for YouTube Data API
    base_url: String,
}

impl YouTubeClient {
    /// Create a new YouTube client from configuration.
    ///
    /// # Arguments
    /// * `config` - Application configuration
    ///
    /// # Returns
    /// * `Result<YouTubeClient>` - New client or error
    ///
    /// # Details
    /// Requires an API key. The request timeout comes from
    /// `request_timeout_secs` and the API root from `api_base_url`.
    pub fn new(config: &Config) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(anyhow::anyhow!(
                "YouTube API key is required. Set YOUTUBE_API_KEY or api_key in config.jsonc"
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            access_token: config.oauth_access_token.clone(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve the playlist holding all uploads of a channel.
    ///
    /// # Arguments
    /// * `channel_id` - YouTube channel ID
    ///
    /// # Returns
    /// * `Result<String, UpstreamError>` - Uploads playlist ID
    ///
    /// # Details
    /// Uses channels.list with `part=contentDetails`.
    pub async fn uploads_playlist(&self, channel_id: &str) -> Result<String, UpstreamError> {
        let url = format!("{}/channels", self.base_url);
        let params = [
            ("part", "contentDetails"),
            ("id", channel_id),
            ("key", self.api_key.as_str()),
        ];

        let response = self.client.get(&url).query(&params).send().await?;
        let api_response: ApiResponse<ApiChannelItem> = parse_json(response).await?;

        api_response
            .items
            .into_iter()
            .next()
            .map(|channel| channel.content_details.related_playlists.uploads)
            .ok_or_else(|| UpstreamError::new(format!("Channel not found: {channel_id}")))
    }

    async fn search_page(
        &self,
        channel_id: &str,
        page_token: Option<&str>,
    ) -> Result<Page, UpstreamError> {
        let url = format!("{}/search", self.base_url);
        let max_results = PAGE_SIZE.to_string();
        let mut params = vec![
            ("part", "id,snippet"),
            ("channelId", channel_id),
            ("order", "date"),
            ("type", "video"),
            ("maxResults", max_results.as_str()),
            ("key", self.api_key.as_str()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let response = self.client.get(&url).query(&params).send().await?;
        let api_response: ApiResponse<ApiSearchItem> = parse_json(response).await?;

        into_page(api_response)
    }

    async fn playlist_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<Page, UpstreamError> {
        let url = format!("{}/playlistItems", self.base_url);
        let max_results = PAGE_SIZE.to_string();
        let mut params = vec![
            ("part", "snippet,contentDetails"),
            ("playlistId", playlist_id),
            ("maxResults", max_results.as_str()),
            ("key", self.api_key.as_str()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let response = self.client.get(&url).query(&params).send().await?;
        let api_response: ApiResponse<ApiPlaylistItem> = parse_json(response).await?;

        into_page(api_response)
    }
}

impl VideoApi for YouTubeClient {
    async fn list_page(
        &self,
        target: &ListingTarget,
        page_token: Option<&str>,
    ) -> Result<Page, UpstreamError> {
        match target {
            ListingTarget::Search { channel_id } => self.search_page(channel_id, page_token).await,
            ListingTarget::Playlist { playlist_id } => {
                self.playlist_page(playlist_id, page_token).await
            }
        }
    }

    /// Uses videos.getRating; the bearer token is sent when configured.
    async fn get_ratings(&self, video_ids: &[String]) -> Result<Vec<VideoRating>, UpstreamError> {
        let url = format!("{}/videos/getRating", self.base_url);
        let ids = video_ids.join(",");
        let params = [("id", ids.as_str()), ("key", self.api_key.as_str())];

        let mut request = self.client.get(&url).query(&params);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let api_response: ApiRatingResponse = parse_json(response).await?;

        Ok(api_response.items)
    }
}

/// Check the status and decode the body of an API response.
async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, UpstreamError> {
    let status = response.status();
    debug!(url = %response.url().path(), %status, "YouTube API response");

    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(UpstreamError::new(format!(
            "YouTube API error ({}): {}",
            status, error_text
        )));
    }

    let body = response.text().await?;
    serde_json::from_str(&body)
        .map_err(|e| UpstreamError::new(format!("Failed to parse YouTube API response: {e}")))
}

fn into_page<T>(api_response: ApiResponse<T>) -> Result<Page, UpstreamError>
where
    Video: TryFrom<T, Error = anyhow::Error>,
{
    let videos = api_response
        .items
        .into_iter()
        .map(Video::try_from)
        .collect::<Result<Vec<_>>>()?;

    Ok(Page {
        videos,
        next_page_token: api_response.next_page_token,
        total_results: api_response.page_info.total_results,
        results_per_page: api_response.page_info.results_per_page,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::youtube::lister::list_videos;
    use crate::youtube::models::Rating;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Recorded request lines (`GET /path?query HTTP/1.1`) and headers.
    type Requests = Arc<Mutex<Vec<String>>>;

    /// Serve each canned `(status, body)` to one connection, in order.
    async fn serve(responses: Vec<(u16, String)>) -> (String, Requests) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests: Requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = requests.clone();

        tokio::spawn(async move {
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = socket.read(&mut chunk).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                }
                recorded
                    .lock()
                    .unwrap()
                    .push(String::from_utf8_lossy(&buf).into_owned());

                let reply = format!(
                    "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                socket.write_all(reply.as_bytes()).await.unwrap();
                socket.shutdown().await.ok();
            }
        });

        (format!("http://{addr}"), requests)
    }

    fn client(base_url: &str) -> YouTubeClient {
        // Bypass any proxy from the environment so requests reach the local listener.
        YouTubeClient {
            client: Client::builder().no_proxy().build().unwrap(),
            api_key: "test_key".to_string(),
            access_token: Some("oauth_token".to_string()),
            base_url: base_url.to_string(),
        }
    }

    fn search_body(ids: &[&str], next: Option<&str>) -> String {
        let items: Vec<serde_json::Value> = ids
            .iter()
            .map(|id| {
                serde_json::json!({
                    "kind": "youtube#searchResult",
                    "id": { "kind": "youtube#video", "videoId": id },
                    "snippet": {
                        "title": format!("Title {id}"),
                        "description": "",
                        "publishedAt": "2024-01-15T10:00:00Z"
                    }
                })
            })
            .collect();
        let mut body = serde_json::json!({
            "kind": "youtube#searchListResponse",
            "pageInfo": { "totalResults": 3, "resultsPerPage": 50 },
            "items": items
        });
        if let Some(token) = next {
            body["nextPageToken"] = serde_json::json!(token);
        }
        body.to_string()
    }

    #[test]
    fn test_client_new_requires_api_key() {
        let config = Config::default();
        assert!(YouTubeClient::new(&config).is_err());
    }

    #[test]
    fn test_client_new_with_api_key() {
        let config = Config {
            api_key: "test_key".to_string(),
            api_base_url: "http://localhost:8080/youtube/v3/".to_string(),
            ..Config::default()
        };
        let client = YouTubeClient::new(&config).unwrap();
        assert_eq!(client.base_url, "http://localhost:8080/youtube/v3");
        assert!(client.access_token.is_none());
    }

    #[tokio::test]
    async fn test_search_page_request_and_parse() {
        let (base_url, requests) = serve(vec![(200, search_body(&["a", "b"], Some("NEXT")))]).await;
        let target = ListingTarget::Search {
            channel_id: "UC123".to_string(),
        };

        let page = client(&base_url)
            .list_page(&target, Some("PREV"))
            .await
            .unwrap();

        assert_eq!(page.videos.len(), 2);
        assert_eq!(page.videos[1].id, "b");
        assert_eq!(page.next_page_token.as_deref(), Some("NEXT"));
        assert_eq!(page.total_results, 3);

        let request = requests.lock().unwrap()[0].clone();
        assert!(request.starts_with("GET /search?"));
        assert!(request.contains("channelId=UC123"));
        assert!(request.contains("maxResults=50"));
        assert!(request.contains("order=date"));
        assert!(request.contains("pageToken=PREV"));
        assert!(request.contains("key=test_key"));
    }

    #[tokio::test]
    async fn test_playlist_page_request() {
        let body = serde_json::json!({
            "items": [{
                "snippet": {
                    "title": "Upload",
                    "description": "d",
                    "publishedAt": "2024-03-01T00:00:00Z",
                    "resourceId": { "kind": "youtube#video", "videoId": "up1" }
                },
                "contentDetails": { "videoId": "up1", "videoPublishedAt": "2024-02-28T00:00:00Z" }
            }]
        })
        .to_string();
        let (base_url, requests) = serve(vec![(200, body)]).await;
        let target = ListingTarget::Playlist {
            playlist_id: "UU123".to_string(),
        };

        let page = client(&base_url).list_page(&target, None).await.unwrap();

        assert_eq!(page.videos[0].id, "up1");
        assert!(page.next_page_token.is_none());
        let request = requests.lock().unwrap()[0].clone();
        assert!(request.starts_with("GET /playlistItems?"));
        assert!(request.contains("playlistId=UU123"));
        assert!(!request.contains("pageToken"));
    }

    #[tokio::test]
    async fn test_error_status_becomes_upstream_error() {
        let body = r#"{"error":{"code":403,"message":"quotaExceeded"}}"#.to_string();
        let (base_url, _requests) = serve(vec![(403, body)]).await;
        let target = ListingTarget::Search {
            channel_id: "UC123".to_string(),
        };

        let err = client(&base_url)
            .list_page(&target, None)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("403"));
        assert!(err.to_string().contains("quotaExceeded"));
    }

    #[tokio::test]
    async fn test_malformed_body_becomes_upstream_error() {
        let (base_url, _requests) = serve(vec![(200, r#"{"items": 7}"#.to_string())]).await;
        let target = ListingTarget::Search {
            channel_id: "UC123".to_string(),
        };

        let result = client(&base_url).list_page(&target, None).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_get_ratings_sends_joined_ids_and_bearer() {
        let body = r#"{"items":[{"videoId":"a","rating":"like"}]}"#.to_string();
        let (base_url, requests) = serve(vec![(200, body)]).await;

        let ratings = client(&base_url)
            .get_ratings(&["a".to_string(), "b".to_string()])
            .await
            .unwrap();

        assert_eq!(
            ratings,
            vec![VideoRating {
                video_id: "a".to_string(),
                rating: Rating::Like
            }]
        );
        let request = requests.lock().unwrap()[0].clone();
        assert!(request.starts_with("GET /videos/getRating?"));
        assert!(request.contains("id=a%2Cb"));
        assert!(request.to_lowercase().contains("authorization: bearer oauth_token"));
    }

    #[tokio::test]
    async fn test_uploads_playlist_lookup() {
        let body = r#"{"items":[{"contentDetails":{"relatedPlaylists":{"likes":"","uploads":"UUabc"}}}]}"#
            .to_string();
        let (base_url, requests) = serve(vec![(200, body)]).await;

        let playlist = client(&base_url).uploads_playlist("UCabc").await.unwrap();

        assert_eq!(playlist, "UUabc");
        assert!(requests.lock().unwrap()[0].contains("id=UCabc"));
    }

    #[tokio::test]
    async fn test_uploads_playlist_unknown_channel() {
        let (base_url, _requests) = serve(vec![(200, r#"{"items":[]}"#.to_string())]).await;

        let err = client(&base_url).uploads_playlist("UCnope").await.unwrap_err();

        assert!(err.to_string().contains("UCnope"));
    }

    #[tokio::test]
    async fn test_list_videos_over_http_follows_tokens() {
        let (base_url, requests) = serve(vec![
            (200, search_body(&["a", "b"], Some("P2"))),
            (200, search_body(&["c"], None)),
        ])
        .await;
        let target = ListingTarget::Search {
            channel_id: "UC123".to_string(),
        };

        let videos = list_videos(&client(&base_url), &target, false)
            .await
            .unwrap();

        let ids: Vec<&str> = videos.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests[1].contains("pageToken=P2"));
    }
}
