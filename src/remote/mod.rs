//! Remote feed source
//!
//! Fetches the feed over HTTP so it can be shown and cached. Only the shape of
//! the response is checked here; deciding what to do with the result is left
//! to the caller.

mod mapper;

pub use mapper::map;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use url::Url;

use crate::feed::{FeedImage, FeedLoader};

/// Errors that can occur when fetching the remote feed
#[derive(Debug, Error)]
pub enum RemoteFeedError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Connectivity(#[from] reqwest::Error),

    /// The response had an unexpected status or payload
    #[error("Invalid feed data")]
    InvalidData,
}

/// Client for fetching the feed from a remote endpoint
#[derive(Debug, Clone)]
pub struct RemoteFeedLoader {
    client: Client,
    url: Url,
}

impl RemoteFeedLoader {
    pub fn new(url: Url) -> Self {
        Self::with_client(Client::new(), url)
    }

    /// Create a loader with a custom HTTP client
    pub fn with_client(client: Client, url: Url) -> Self {
        Self { client, url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl FeedLoader for RemoteFeedLoader {
    type Error = RemoteFeedError;

    async fn load(&self) -> Result<Vec<FeedImage>, RemoteFeedError> {
        let response = self.client.get(self.url.clone()).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        map(&body, status)
    }
}
