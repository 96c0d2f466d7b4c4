//! feedcache library
//!
//! Keeps the last fetched image feed on disk so it can be shown without a
//! network round-trip, and invalidates that copy once it is seven days old.

pub mod cache;
pub mod cli;
pub mod feed;
pub mod remote;

pub use cache::{FeedStore, FileFeedStore, LocalFeedLoader, StoreError};
pub use feed::{FeedImage, FeedLoader};
pub use remote::{RemoteFeedError, RemoteFeedLoader};
