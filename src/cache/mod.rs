//! Local feed cache
//!
//! [`LocalFeedLoader`] implements the save, load and validate use cases on top
//! of any [`FeedStore`]. The store holds at most one snapshot of the feed; a
//! snapshot is served only while [`FeedCachePolicy`] considers it fresh.
//! [`FileFeedStore`] is the on-disk store used by the application.

mod file_store;
mod loader;
mod policy;
mod store;

pub use file_store::FileFeedStore;
pub use loader::{Clock, LocalFeedLoader};
pub use policy::{add_calendar_days, FeedCachePolicy, MAX_CACHE_AGE_DAYS};
pub use store::{CachedFeed, FeedStore, LocalFeedImage, RetrievedCache, StoreError, StoreFuture};
