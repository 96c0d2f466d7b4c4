//! Feed domain types shared by the cache and the remote source

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

/// A single image in the feed, as seen by the application
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeedImage {
    /// Unique identifier of the image
    pub id: Uuid,
    /// Optional caption
    pub description: Option<String>,
    /// Optional place name
    pub location: Option<String>,
    /// Where the image itself can be downloaded from
    pub url: Url,
}

impl FeedImage {
    /// Creates an image with no description or location
    pub fn new(id: Uuid, url: Url) -> Self {
        Self {
            id,
            description: None,
            location: None,
            url,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Anything that can produce the current feed
///
/// Implemented by the local cache and by the remote source, so callers can
/// swap one for the other or chain them.
#[async_trait]
pub trait FeedLoader: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn load(&self) -> Result<Vec<FeedImage>, Self::Error>;
}
