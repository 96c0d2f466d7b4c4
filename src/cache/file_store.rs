//! File-backed feed store
//!
//! Persists the cached feed as a single JSON file. All file access happens on
//! one dedicated worker thread that runs queued operations in FIFO order, which
//! is what gives [`FileFeedStore`] its serial execution guarantee.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use super::store::{
    CachedFeed, FeedStore, LocalFeedImage, RetrievedCache, StoreError, StoreFuture,
};

/// File name used inside the platform cache directory
const STORE_FILE_NAME: &str = "feed-store.json";

/// On-disk layout of the cached feed
#[derive(Debug, Serialize, Deserialize)]
struct ManagedCache {
    /// When the feed was cached
    timestamp: DateTime<Utc>,
    /// Feed images in insertion order
    feed: Vec<ManagedFeedImage>,
}

/// On-disk layout of a single feed image
#[derive(Debug, Serialize, Deserialize)]
struct ManagedFeedImage {
    id: uuid::Uuid,
    description: Option<String>,
    location: Option<String>,
    url: url::Url,
}

impl ManagedCache {
    fn new(feed: Vec<LocalFeedImage>, timestamp: DateTime<Utc>) -> Self {
        let feed = feed
            .into_iter()
            .map(|image| ManagedFeedImage {
                id: image.id,
                description: image.description,
                location: image.location,
                url: image.url,
            })
            .collect();
        Self { timestamp, feed }
    }

    fn into_cached_feed(self) -> CachedFeed {
        let feed = self
            .feed
            .into_iter()
            .map(|image| LocalFeedImage {
                id: image.id,
                description: image.description,
                location: image.location,
                url: image.url,
            })
            .collect();
        CachedFeed {
            feed,
            timestamp: self.timestamp,
        }
    }
}

type Job = Box<dyn FnOnce(&StoreFile) + Send>;

/// Feed store persisting to a JSON file through a single background worker
///
/// The worker thread exits once the store is dropped and every operation
/// already queued has run.
#[derive(Debug)]
pub struct FileFeedStore {
    path: PathBuf,
    queue: mpsc::UnboundedSender<Job>,
}

impl FileFeedStore {
    /// Opens a store at `path`, starting its worker thread
    ///
    /// The file and its parent directories are created on the first insert.
    pub fn new(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let (queue, mut jobs) = mpsc::unbounded_channel::<Job>();
        let file = StoreFile { path: path.clone() };

        thread::Builder::new()
            .name("feed-store".to_string())
            .spawn(move || {
                while let Some(job) = jobs.blocking_recv() {
                    job(&file);
                }
                debug!(path = %file.path.display(), "feed store worker stopped");
            })?;

        Ok(Self { path, queue })
    }

    /// Returns the XDG-compliant default location of the store file
    ///
    /// Uses `~/.cache/feedcache/feed-store.json` on Linux, or the equivalent
    /// on other platforms. Returns `None` if no home directory can be found.
    pub fn default_path() -> Option<PathBuf> {
        let project_dirs = ProjectDirs::from("", "", "feedcache")?;
        Some(project_dirs.cache_dir().join(STORE_FILE_NAME))
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Queues `action` on the worker and returns a future for its result
    ///
    /// If the worker is gone the future fails with a `BrokenPipe` error,
    /// reported through `stopped`.
    fn perform<T, F>(&self, stopped: fn(io::Error) -> StoreError, action: F) -> StoreFuture<T>
    where
        T: Send + 'static,
        F: FnOnce(&StoreFile) -> Result<T, StoreError> + Send + 'static,
    {
        let (reply, result) = oneshot::channel();
        let job: Job = Box::new(move |file: &StoreFile| {
            // The caller may have stopped waiting; the work is still applied.
            let _ = reply.send(action(file));
        });

        if self.queue.send(job).is_err() {
            debug!(path = %self.path.display(), "feed store worker is gone");
        }

        Box::pin(async move {
            match result.await {
                Ok(outcome) => outcome,
                Err(_) => Err(stopped(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "feed store worker stopped",
                ))),
            }
        })
    }
}

impl FeedStore for FileFeedStore {
    fn delete_cached_feed(&self) -> StoreFuture<()> {
        self.perform(StoreError::Commit, |file| file.delete())
    }

    fn insert(&self, feed: Vec<LocalFeedImage>, timestamp: DateTime<Utc>) -> StoreFuture<()> {
        self.perform(StoreError::Commit, move |file| file.write(&ManagedCache::new(feed, timestamp)))
    }

    fn retrieve(&self) -> StoreFuture<RetrievedCache> {
        self.perform(StoreError::Lookup, |file| {
            Ok(match file.find()? {
                Some(cache) => RetrievedCache::Found(cache.into_cached_feed()),
                None => RetrievedCache::Empty,
            })
        })
    }
}

/// File access owned by the worker thread
struct StoreFile {
    path: PathBuf,
}

impl StoreFile {
    /// Sibling path used to stage writes before replacing the store file
    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn find(&self) -> Result<Option<ManagedCache>, StoreError> {
        let content = match fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Lookup(e)),
        };

        serde_json::from_slice(&content)
            .map(Some)
            .map_err(StoreError::Decode)
    }

    fn write(&self, cache: &ManagedCache) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(StoreError::Commit)?;
        }

        let json = serde_json::to_string_pretty(cache)
            .map_err(|e| StoreError::Commit(io::Error::new(io::ErrorKind::InvalidData, e)))?;

        let staging = self.staging_path();
        fs::write(&staging, json).map_err(StoreError::Commit)?;
        fs::rename(&staging, &self.path).map_err(StoreError::Commit)?;

        debug!(
            path = %self.path.display(),
            images = cache.feed.len(),
            "cached feed committed"
        );
        Ok(())
    }

    fn delete(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "cached feed deleted");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Commit(e)),
        }
    }
}
