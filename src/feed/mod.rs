// src/feed/mod.rs
pub mod types;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::clock::DayBoundary;
use crate::error::FetchError;
use crate::feed::types::{FeedPost, ImageSource, PostsPage};
use crate::sources::{media_pick_for, MediaPick};
use crate::transport::Transport;

pub const POST_TYPE_IMAGE: &str = "image";

/// Reads a profile's post history and extracts today's menu image.
#[derive(Clone)]
pub struct FeedClient {
    transport: Transport,
    base_url: String,
    boundary: DayBoundary,
}

impl FeedClient {
    pub fn new(transport: Transport, base_url: impl Into<String>, boundary: DayBoundary) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            boundary,
        }
    }

    pub fn feed_url(&self, key: &str) -> String {
        format!("{}/{}/posts", self.base_url.trim_end_matches('/'), key)
    }

    async fn fetch_posts(&self, url: &str) -> Result<Vec<FeedPost>, FetchError> {
        let resp = self.transport.send(self.transport.client().get(url)).await?;
        let status = resp.status;
        if status != StatusCode::OK {
            return Err(FetchError::UnexpectedStatus {
                status,
                url: url.to_string(),
            });
        }
        let page: PostsPage = serde_json::from_slice(&resp.body)?;
        Ok(page.items.unwrap_or_default())
    }
}

#[async_trait]
impl ImageSource for FeedClient {
    async fn get_image(&self, key: &str) -> Result<String, FetchError> {
        let pick = media_pick_for(key).ok_or_else(|| FetchError::UnknownSource(key.to_string()))?;

        let url = self.feed_url(key);
        tracing::info!(url = %url, "fetching feed");

        let posts = self.fetch_posts(&url).await?;
        select_image(&posts, self.boundary.now_millis(), pick)
    }
}

/// Apply the date filter and the media selection rule to a post list.
///
/// The first post (in feed order) that is an image post created at or after
/// `boundary_ms` wins; later qualifying posts are ignored.
pub fn select_image(
    posts: &[FeedPost],
    boundary_ms: i64,
    pick: MediaPick,
) -> Result<String, FetchError> {
    if posts.is_empty() {
        return Err(FetchError::EmptyFeed);
    }

    let post = posts
        .iter()
        .find(|p| p.created_at >= boundary_ms && p.post_type == POST_TYPE_IMAGE)
        .ok_or(FetchError::NoImageToday)?;

    pick.select(&post.media)
        .map(|m| m.large_url.clone())
        .filter(|u| !u.is_empty())
        .ok_or(FetchError::NoImageToday)
}
