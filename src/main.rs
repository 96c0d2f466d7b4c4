//! feedcache - keep a local copy of an image feed
//!
//! Populates the cache from a remote endpoint or a file, prints the cached
//! feed while it is fresh, and drops it once it has expired.

use std::fs;
use std::io;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

use feedcache::cli::{Cli, Command, Settings};
use feedcache::{FeedImage, FeedLoader, FileFeedStore, LocalFeedLoader, RemoteFeedLoader};

/// Sets up stderr logging, honouring `RUST_LOG` over the default filter
fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();
}

/// Writes the feed to stdout as pretty JSON
fn print_feed(feed: &[FeedImage]) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(feed)?);
    Ok(())
}

/// Fetches the remote feed and replaces the cache with it
async fn fetch_and_save(
    cache: &LocalFeedLoader,
    url: Url,
) -> Result<Vec<FeedImage>, Box<dyn std::error::Error>> {
    let remote = RemoteFeedLoader::new(url);
    let feed = remote.load().await?;
    info!(url = %remote.url(), images = feed.len(), "fetched remote feed");

    cache.save(&feed).await?;
    Ok(feed)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = Settings::from_cli(&cli)?;
    init_logging(settings.log_filter);

    let store = FileFeedStore::new(&settings.store_path)?;
    info!(path = %store.path().display(), "opened feed store");
    let cache = LocalFeedLoader::with_system_clock(Arc::new(store));

    match cli.command {
        Command::Fetch { url } => {
            let feed = fetch_and_save(&cache, url).await?;
            info!(images = feed.len(), "cache replaced");
        }
        Command::Import { file } => {
            let content = fs::read_to_string(&file)?;
            let feed: Vec<FeedImage> = serde_json::from_str(&content)?;
            cache.save(&feed).await?;
            info!(file = %file.display(), images = feed.len(), "cache replaced");
        }
        Command::Load => {
            let feed = cache.load().await?;
            print_feed(&feed)?;
        }
        Command::Validate => {
            cache.validate_cache().await?;
        }
        Command::Show { url } => {
            let cached = match cache.load().await {
                Ok(feed) => feed,
                Err(error) => {
                    warn!(%error, "failed to load cached feed");
                    Vec::new()
                }
            };

            let feed = if cached.is_empty() {
                fetch_and_save(&cache, url).await?
            } else {
                cached
            };
            print_feed(&feed)?;
        }
    }

    Ok(())
}
