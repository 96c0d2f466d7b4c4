//! Command-line interface parsing for feedcache
//!
//! This module handles parsing of CLI arguments using clap and resolves them
//! into the [`Settings`] the binary runs with.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

use crate::cache::FileFeedStore;

/// Default log filter
const DEFAULT_LOG_FILTER: &str = "feedcache=info,warn";

/// Log filter used with `--verbose`
const VERBOSE_LOG_FILTER: &str = "feedcache=debug,info";

/// Error types for resolving CLI arguments
#[derive(Debug, Error)]
pub enum CliError {
    /// No `--store` was given and no platform cache directory exists
    #[error("Could not determine a cache directory; pass --store <PATH>")]
    NoCacheDirectory,
}

/// feedcache - keep a local copy of an image feed
#[derive(Parser, Debug)]
#[command(name = "feedcache")]
#[command(about = "Keep a local copy of an image feed, valid for seven days")]
#[command(version)]
pub struct Cli {
    /// Path of the feed store file (defaults to the platform cache directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Fetch the feed from a remote endpoint and replace the cache with it
    Fetch {
        /// Feed endpoint
        #[arg(long)]
        url: Url,
    },
    /// Replace the cache with a feed read from a JSON file
    Import {
        /// JSON array of feed images
        file: PathBuf,
    },
    /// Print the cached feed as JSON if it is still valid
    Load,
    /// Delete the cached feed if it has expired or cannot be read
    Validate,
    /// Print the cached feed, fetching and caching it when nothing is cached
    Show {
        /// Feed endpoint used when the cache is empty
        #[arg(long)]
        url: Url,
    },
}

/// Settings derived from CLI arguments
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Location of the feed store file
    pub store_path: PathBuf,
    /// Log filter used when `RUST_LOG` is not set
    pub log_filter: &'static str,
}

impl Settings {
    /// Resolves settings from parsed CLI arguments
    ///
    /// # Returns
    /// * `Ok(Settings)` with the explicit or default store path
    /// * `Err(CliError::NoCacheDirectory)` if no path can be determined
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        Self::resolve(cli, FileFeedStore::default_path())
    }

    fn resolve(cli: &Cli, default_path: Option<PathBuf>) -> Result<Self, CliError> {
        let store_path = cli
            .store
            .clone()
            .or(default_path)
            .ok_or(CliError::NoCacheDirectory)?;

        let log_filter = if cli.verbose {
            VERBOSE_LOG_FILTER
        } else {
            DEFAULT_LOG_FILTER
        };

        Ok(Settings {
            store_path,
            log_filter,
        })
    }
}
