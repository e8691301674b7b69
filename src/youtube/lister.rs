//! Paginated channel listing with optional rating enrichment.
//!
//! Walks the continuation tokens of a listing endpoint until the upstream
//! stops returning one, concatenating pages in arrival order.

use crate::youtube::error::UpstreamError;
use crate::youtube::models::{ListingTarget, Page, Video, VideoRating};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Largest page size the YouTube Data API accepts.
pub const PAGE_SIZE: u32 = 50;

/// The two upstream calls the lister needs.
///
/// Implemented over HTTP by [`crate::youtube::YouTubeClient`].
#[allow(async_fn_in_trait)]
pub trait VideoApi {
    /// Fetch one page of the listing, starting after `page_token` if given.
    async fn list_page(
        &self,
        target: &ListingTarget,
        page_token: Option<&str>,
    ) -> Result<Page, UpstreamError>;

    /// Look up the viewer's rating for all `video_ids` in one call.
    async fn get_ratings(&self, video_ids: &[String]) -> Result<Vec<VideoRating>, UpstreamError>;
}

/// Fetch every video of `target`, across all result pages.
///
/// # Arguments
/// * `api` - Upstream implementation
/// * `target` - Channel search or playlist to enumerate
/// * `with_ratings` - Whether to attach the viewer rating to each video
///
/// # Returns
/// * `Result<Vec<Video>, UpstreamError>` - All videos in page order, or the first failure
///
/// # Details
/// Pages are fetched strictly one after another. Any failed call aborts the
/// whole listing; videos from pages that already succeeded are discarded.
pub async fn list_videos<A: VideoApi>(
    api: &A,
    target: &ListingTarget,
    with_ratings: bool,
) -> Result<Vec<Video>, UpstreamError> {
    let mut videos = Vec::new();
    let mut seen = HashSet::new();
    let mut page_token: Option<String> = None;
    let mut page_number = 0usize;

    loop {
        page_number += 1;
        let mut page = api.list_page(target, page_token.as_deref()).await?;

        debug!(
            page = page_number,
            items = page.videos.len(),
            total_results = page.total_results,
            results_per_page = page.results_per_page,
            has_next = page.next_page_token.is_some(),
            "Fetched listing page"
        );

        if with_ratings {
            enrich_with_ratings(api, &mut page.videos).await?;
        }

        for video in &page.videos {
            if !seen.insert(video.id.clone()) {
                warn!(video_id = %video.id, page = page_number, "Video listed more than once");
            }
        }
        videos.extend(page.videos);

        // An empty token means the same as no token.
        page_token = page.next_page_token.filter(|token| !token.is_empty());
        if page_token.is_none() {
            break;
        }
    }

    Ok(videos)
}

/// Attach ratings to one page of videos with a single bulk lookup.
async fn enrich_with_ratings<A: VideoApi>(
    api: &A,
    videos: &mut [Video],
) -> Result<(), UpstreamError> {
    if videos.is_empty() {
        return Ok(());
    }

    let ids: Vec<String> = videos.iter().map(|video| video.id.clone()).collect();
    let ratings = api.get_ratings(&ids).await?;
    debug!(
        requested = ids.len(),
        returned = ratings.len(),
        "Fetched ratings"
    );

    attach_ratings(videos, ratings);
    Ok(())
}

/// Set each video's rating from `ratings`, matched by video ID.
///
/// Videos missing from `ratings` keep whatever rating they had.
pub fn attach_ratings(videos: &mut [Video], ratings: Vec<VideoRating>) {
    let by_id: HashMap<String, _> = ratings
        .into_iter()
        .map(|entry| (entry.video_id, entry.rating))
        .collect();

    for video in videos.iter_mut() {
        if let Some(rating) = by_id.get(&video.id) {
            video.rating = Some(*rating);
        }
    }
}
