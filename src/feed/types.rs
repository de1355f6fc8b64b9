// src/feed/types.rs
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// Body of `GET <feed-base>/<key>/posts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostsPage {
    #[serde(default)]
    pub items: Option<Vec<FeedPost>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedPost {
    #[serde(default)]
    pub created_at: i64, // unix millis
    #[serde(rename = "type", default)]
    pub post_type: String, // e.g. "image", "text"
    #[serde(default)]
    pub media: Vec<Media>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Media {
    #[serde(rename = "type", default)]
    pub media_type: String,
    #[serde(default)]
    pub large_url: String,
}

/// Anything that can resolve a source key to today's menu image URL.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn get_image(&self, key: &str) -> Result<String, FetchError>;
}
