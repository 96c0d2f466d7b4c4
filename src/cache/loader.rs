//! Save, load and validate use cases over a [`FeedStore`]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::policy::FeedCachePolicy;
use super::store::{FeedStore, LocalFeedImage, RetrievedCache, StoreError, StoreFuture};
use crate::feed::{FeedImage, FeedLoader};

/// Source of the current time
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Keeps the last fetched feed in a [`FeedStore`] and serves it while fresh
///
/// `save` always deletes the previous snapshot before inserting the new one.
/// If the insert then fails the cache is left empty, not restored, so a failed
/// save means "nothing cached" rather than "previous feed cached".
///
/// Work started with [`spawn_save`](Self::spawn_save),
/// [`spawn_load`](Self::spawn_load) or [`validate_cache`](Self::validate_cache)
/// is tied to this loader: once it is dropped, pending results are discarded,
/// completions are never called and no further store operations are issued.
pub struct LocalFeedLoader {
    store: Arc<dyn FeedStore>,
    current_date: Clock,
    shutdown: CancellationToken,
}

impl LocalFeedLoader {
    pub fn new<F>(store: Arc<dyn FeedStore>, current_date: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        Self {
            store,
            current_date: Arc::new(current_date),
            shutdown: CancellationToken::new(),
        }
    }

    /// Creates a loader that timestamps and validates against `Utc::now`
    pub fn with_system_clock(store: Arc<dyn FeedStore>) -> Self {
        Self::new(store, Utc::now)
    }

    /// Replaces the cached feed with `feed`, timestamped with the current date
    ///
    /// Store failures are returned unchanged; the insert is never attempted if
    /// deleting the previous snapshot fails.
    pub async fn save(&self, feed: &[FeedImage]) -> Result<(), StoreError> {
        let deletion = self.store.delete_cached_feed();
        insert_after(
            deletion,
            Arc::clone(&self.store),
            Arc::clone(&self.current_date),
            to_local(feed),
        )
        .await
    }

    /// Returns the cached feed if it is still valid, or an empty feed
    ///
    /// An empty or expired cache is not an error. Loading never deletes, even
    /// when the cached feed has expired.
    pub async fn load(&self) -> Result<Vec<FeedImage>, StoreError> {
        feed_from(self.store.retrieve(), Arc::clone(&self.current_date)).await
    }

    /// Background variant of [`save`](Self::save)
    ///
    /// The deletion is issued before this returns. `completion` runs on a
    /// runtime worker and is skipped if the loader is dropped first.
    pub fn spawn_save<F>(&self, feed: &[FeedImage], completion: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<(), StoreError>) + Send + 'static,
    {
        let save = insert_after(
            self.store.delete_cached_feed(),
            Arc::clone(&self.store),
            Arc::clone(&self.current_date),
            to_local(feed),
        );
        self.spawn_guarded(async move { completion(save.await) })
    }

    /// Background variant of [`load`](Self::load)
    pub fn spawn_load<F>(&self, completion: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<Vec<FeedImage>, StoreError>) + Send + 'static,
    {
        let load = feed_from(self.store.retrieve(), Arc::clone(&self.current_date));
        self.spawn_guarded(async move { completion(load.await) })
    }

    /// Deletes the cached feed if it has expired or cannot be read
    ///
    /// Fire-and-forget: failures are logged, never returned. The handle can be
    /// awaited to know when the check has finished. Must be called from within
    /// a Tokio runtime.
    pub fn validate_cache(&self) -> JoinHandle<()> {
        let retrieval = self.store.retrieve();
        let store = Arc::clone(&self.store);
        let current_date = Arc::clone(&self.current_date);

        self.spawn_guarded(async move {
            let should_delete = match retrieval.await {
                Err(error) => {
                    warn!(%error, "cached feed could not be retrieved, deleting it");
                    true
                }
                Ok(RetrievedCache::Found(cache)) => {
                    let expired = !FeedCachePolicy::validate(cache.timestamp, current_date());
                    if expired {
                        debug!(cached_at = %cache.timestamp, "cached feed expired, deleting it");
                    }
                    expired
                }
                Ok(RetrievedCache::Empty) => false,
            };

            if should_delete {
                if let Err(error) = store.delete_cached_feed().await {
                    warn!(%error, "failed to delete invalid cached feed");
                }
            }
        })
    }

    fn spawn_guarded<F>(&self, operation: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    debug!("feed loader dropped, discarding pending cache operation");
                }
                _ = operation => {}
            }
        })
    }
}

impl Drop for LocalFeedLoader {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl std::fmt::Debug for LocalFeedLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalFeedLoader")
            .field("shut_down", &self.shutdown.is_cancelled())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl FeedLoader for LocalFeedLoader {
    type Error = StoreError;

    async fn load(&self) -> Result<Vec<FeedImage>, StoreError> {
        LocalFeedLoader::load(self).await
    }
}

async fn insert_after(
    deletion: StoreFuture<()>,
    store: Arc<dyn FeedStore>,
    current_date: Clock,
    feed: Vec<LocalFeedImage>,
) -> Result<(), StoreError> {
    deletion.await?;
    store.insert(feed, current_date()).await
}

async fn feed_from(
    retrieval: StoreFuture<RetrievedCache>,
    current_date: Clock,
) -> Result<Vec<FeedImage>, StoreError> {
    match retrieval.await? {
        RetrievedCache::Found(cache) if FeedCachePolicy::validate(cache.timestamp, current_date()) => {
            Ok(cache.feed.iter().map(FeedImage::from).collect())
        }
        RetrievedCache::Found(cache) => {
            debug!(cached_at = %cache.timestamp, "cached feed expired, loading empty feed");
            Ok(Vec::new())
        }
        RetrievedCache::Empty => Ok(Vec::new()),
    }
}

fn to_local(feed: &[FeedImage]) -> Vec<LocalFeedImage> {
    feed.iter().map(LocalFeedImage::from).collect()
}
