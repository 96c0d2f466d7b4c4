//! Shared helpers for the cache use-case tests

#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use feedcache::cache::{
    add_calendar_days, FeedStore, LocalFeedImage, LocalFeedLoader, RetrievedCache, StoreError,
    StoreFuture, MAX_CACHE_AGE_DAYS,
};
use feedcache::FeedImage;
use futures::FutureExt;
use tokio::sync::oneshot;
use uuid::Uuid;

/// Message recorded by [`FeedStoreSpy`] for each operation it receives
#[derive(Debug, Clone, PartialEq)]
pub enum ReceivedMessage {
    DeleteCachedFeed,
    Insert(Vec<LocalFeedImage>, DateTime<Utc>),
    Retrieve,
}

/// How the spy answers an operation
#[derive(Debug, Clone)]
pub enum Stub<T> {
    Succeed(T),
    Fail,
    /// Keep the operation pending until it is released
    Hold,
}

struct Operation<T> {
    stub: Stub<T>,
    held: Vec<oneshot::Sender<Result<T, StoreError>>>,
}

impl<T: Clone + Send + 'static> Operation<T> {
    fn new(stub: Stub<T>) -> Self {
        Self {
            stub,
            held: Vec::new(),
        }
    }

    fn respond(&mut self) -> StoreFuture<T> {
        match &self.stub {
            Stub::Succeed(value) => futures::future::ready(Ok(value.clone())).boxed(),
            Stub::Fail => futures::future::ready(Err(any_store_error())).boxed(),
            Stub::Hold => {
                let (reply, result) = oneshot::channel();
                self.held.push(reply);
                async move { result.await.unwrap_or_else(|_| Err(any_store_error())) }.boxed()
            }
        }
    }

    fn release(&mut self, outcome: Result<T, StoreError>) {
        assert!(!self.held.is_empty(), "no held operation to release");
        // The waiting side may already be gone.
        let _ = self.held.remove(0).send(outcome);
    }
}

/// Test double recording every store operation in issue order
///
/// Every operation succeeds by default, with retrieval returning an empty
/// cache.
pub struct FeedStoreSpy {
    messages: Mutex<Vec<ReceivedMessage>>,
    deletion: Mutex<Operation<()>>,
    insertion: Mutex<Operation<()>>,
    retrieval: Mutex<Operation<RetrievedCache>>,
}

impl FeedStoreSpy {
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            deletion: Mutex::new(Operation::new(Stub::Succeed(()))),
            insertion: Mutex::new(Operation::new(Stub::Succeed(()))),
            retrieval: Mutex::new(Operation::new(Stub::Succeed(RetrievedCache::Empty))),
        }
    }

    pub fn received_messages(&self) -> Vec<ReceivedMessage> {
        self.messages.lock().unwrap().clone()
    }

    pub fn stub_deletion(&self, stub: Stub<()>) {
        self.deletion.lock().unwrap().stub = stub;
    }

    pub fn stub_insertion(&self, stub: Stub<()>) {
        self.insertion.lock().unwrap().stub = stub;
    }

    pub fn stub_retrieval(&self, stub: Stub<RetrievedCache>) {
        self.retrieval.lock().unwrap().stub = stub;
    }

    pub fn complete_deletion(&self, outcome: Result<(), StoreError>) {
        self.deletion.lock().unwrap().release(outcome);
    }

    pub fn complete_insertion(&self, outcome: Result<(), StoreError>) {
        self.insertion.lock().unwrap().release(outcome);
    }

    pub fn complete_retrieval(&self, outcome: Result<RetrievedCache, StoreError>) {
        self.retrieval.lock().unwrap().release(outcome);
    }

    fn record(&self, message: ReceivedMessage) {
        self.messages.lock().unwrap().push(message);
    }
}

impl FeedStore for FeedStoreSpy {
    fn delete_cached_feed(&self) -> StoreFuture<()> {
        self.record(ReceivedMessage::DeleteCachedFeed);
        self.deletion.lock().unwrap().respond()
    }

    fn insert(&self, feed: Vec<LocalFeedImage>, timestamp: DateTime<Utc>) -> StoreFuture<()> {
        self.record(ReceivedMessage::Insert(feed, timestamp));
        self.insertion.lock().unwrap().respond()
    }

    fn retrieve(&self) -> StoreFuture<RetrievedCache> {
        self.record(ReceivedMessage::Retrieve);
        self.retrieval.lock().unwrap().respond()
    }
}

/// Creates a loader over a fresh spy with the clock fixed at `now`
pub fn make_sut(now: DateTime<Utc>) -> (LocalFeedLoader, Arc<FeedStoreSpy>) {
    let store = Arc::new(FeedStoreSpy::new());
    let sut = LocalFeedLoader::new(store.clone(), move || now);
    (sut, store)
}

pub fn any_store_error() -> StoreError {
    StoreError::Lookup(io::Error::other("any error"))
}

pub fn unique_image() -> FeedImage {
    FeedImage::new(Uuid::new_v4(), "https://any-url.com".parse().unwrap())
        .with_description("any description")
        .with_location("any location")
}

/// A feed of two unique images, as the application and the store see it
pub fn unique_images() -> (Vec<FeedImage>, Vec<LocalFeedImage>) {
    let model = vec![
        unique_image(),
        FeedImage::new(Uuid::new_v4(), "https://another-url.com".parse().unwrap()),
    ];
    let local = model.iter().map(LocalFeedImage::from).collect();
    (model, local)
}

/// A fixed reference date away from any daylight saving transition
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 20, 12, 0, 0).unwrap()
}

/// The earliest timestamp that is already expired at `date`
pub fn minus_feed_cache_max_age(date: DateTime<Utc>) -> DateTime<Utc> {
    add_calendar_days(&Local, date, -(MAX_CACHE_AGE_DAYS as i64))
        .expect("date arithmetic should succeed")
}

pub fn adding_days(date: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    add_calendar_days(&Local, date, days).expect("date arithmetic should succeed")
}

pub fn adding_seconds(date: DateTime<Utc>, seconds: i64) -> DateTime<Utc> {
    date + Duration::seconds(seconds)
}

/// Collects the results passed to completion callbacks
pub fn completion_recorder<T: Send + 'static>() -> (Arc<Mutex<Vec<T>>>, impl FnOnce(T) + Send + 'static) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    (received, move |result| sink.lock().unwrap().push(result))
}
