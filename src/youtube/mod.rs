//! YouTube Data API v3 integration module.
//!
//! Provides the HTTP client and the paginated channel listing built on it.

pub mod client;
pub mod error;
pub mod lister;
pub mod models;

pub use client::YouTubeClient;
pub use lister::list_videos;
pub use models::{ListingTarget, Video};
