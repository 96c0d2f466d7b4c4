//! Storage contract for the single cached feed slot

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::feed::FeedImage;

/// Persisted representation of a feed image
///
/// Kept separate from [`FeedImage`] so the storage layout can evolve without
/// touching the application-facing type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalFeedImage {
    pub id: Uuid,
    pub description: Option<String>,
    pub location: Option<String>,
    pub url: Url,
}

impl From<&FeedImage> for LocalFeedImage {
    fn from(image: &FeedImage) -> Self {
        Self {
            id: image.id,
            description: image.description.clone(),
            location: image.location.clone(),
            url: image.url.clone(),
        }
    }
}

impl From<&LocalFeedImage> for FeedImage {
    fn from(image: &LocalFeedImage) -> Self {
        Self {
            id: image.id,
            description: image.description.clone(),
            location: image.location.clone(),
            url: image.url.clone(),
        }
    }
}

/// The entire cache contents as of `timestamp`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedFeed {
    pub feed: Vec<LocalFeedImage>,
    pub timestamp: DateTime<Utc>,
}

/// Outcome of a successful retrieval
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievedCache {
    /// Nothing has been inserted, or the last snapshot was deleted
    Empty,
    /// The snapshot currently held by the store
    Found(CachedFeed),
}

/// Failures surfaced by a [`FeedStore`]
#[derive(Debug, Error)]
pub enum StoreError {
    /// The stored record could not be located or read
    #[error("Failed to look up cached feed: {0}")]
    Lookup(#[source] std::io::Error),

    /// The stored record exists but could not be decoded
    #[error("Failed to decode cached feed: {0}")]
    Decode(#[source] serde_json::Error),

    /// A write, replace or removal could not be committed
    #[error("Failed to commit cached feed: {0}")]
    Commit(#[source] std::io::Error),
}

/// Pending result of a store operation
pub type StoreFuture<T> = BoxFuture<'static, Result<T, StoreError>>;

/// Asynchronous storage for exactly one cached feed
///
/// Each operation is issued when the method is called; the returned future
/// only delivers the result and may be awaited on any task or runtime.
/// Implementations must apply operations issued against the same instance in
/// issue order, even when a later one is issued before an earlier one has
/// completed.
pub trait FeedStore: Send + Sync {
    /// Removes the cached feed. Succeeds when the slot is already empty.
    fn delete_cached_feed(&self) -> StoreFuture<()>;

    /// Replaces the slot's contents with `feed` cached at `timestamp`
    ///
    /// Does not delete first; callers wanting delete-then-insert semantics
    /// issue [`delete_cached_feed`](Self::delete_cached_feed) themselves.
    fn insert(&self, feed: Vec<LocalFeedImage>, timestamp: DateTime<Utc>) -> StoreFuture<()>;

    /// Reads the current snapshot
    fn retrieve(&self) -> StoreFuture<RetrievedCache>;
}
