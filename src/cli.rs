//! Command-line interface parsing for flashquiz
//!
//! This module handles parsing of CLI arguments using clap and resolving them
//! (together with their environment variable fallbacks) into a [`Config`]
//! that knows how to build a [`ContentSession`].

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Duration;
use clap::{Parser, Subcommand, ValueEnum};
use thiserror::Error;

use crate::cache::{CacheManager, CACHE_TTL_HOURS};
use crate::fetch::{
    AlwaysOnline, CachePolicy, Connectivity, ContentFetcher, ReqwestClient, StaticConnectivity,
    DEFAULT_INVENTORY_URL,
};
use crate::session::ContentSession;

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// The TTL must be a positive number of hours within chrono's range
    #[error("Invalid TTL: {0} hours. The cache TTL must be at least 1 hour")]
    InvalidTtl(i64),

    /// An empty inventory URL was given
    #[error("Invalid inventory URL: the URL must not be empty")]
    EmptyInventoryUrl,

    /// No cache directory was given and none could be determined
    #[error("Could not determine a cache directory; pass --cache-dir")]
    NoCacheDir,
}

/// Cache policy as spelled on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Always go to the network while online
    WhenOnline,
    /// Use fresh cached data unless --refresh is given
    OnDemand,
}

impl From<PolicyArg> for CachePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::WhenOnline => CachePolicy::RevalidateWhenOnline,
            PolicyArg::OnDemand => CachePolicy::RevalidateOnDemand,
        }
    }
}

/// flashquiz - browse and cache quiz and flashcard content
#[derive(Parser, Debug)]
#[command(name = "flashquiz")]
#[command(about = "Browse and cache quiz and flashcard content")]
#[command(version)]
pub struct Cli {
    /// URL of the inventory manifest (Gist page URLs are accepted)
    #[arg(long, global = true, env = "FLASHQUIZ_INVENTORY_URL", value_name = "URL")]
    pub inventory_url: Option<String>,

    /// Directory holding the cache file
    #[arg(long, global = true, env = "FLASHQUIZ_CACHE_DIR", value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// How long cached documents stay fresh
    #[arg(long, global = true, value_name = "HOURS", default_value_t = CACHE_TTL_HOURS, allow_negative_numbers = true)]
    pub ttl_hours: i64,

    /// When fresh cached data may be used instead of the network
    #[arg(long, global = true, value_enum, default_value_t = PolicyArg::WhenOnline)]
    pub policy: PolicyArg,

    /// Treat the device as offline (prefer cached data)
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List games and their items
    Inventory {
        /// Skip the cache and fetch a new inventory
        #[arg(long)]
        refresh: bool,
    },
    /// Show the questions or flashcards of one item
    Show {
        /// Game the item belongs to
        game: String,
        /// Title of the item
        title: String,
        /// Skip the cache and fetch the content again
        #[arg(long)]
        refresh: bool,
    },
    /// Download every content document into the cache
    Prefetch,
    /// Show how old the cached data is
    Status,
    /// Delete all cached data
    Clear,
    /// Clear the cache and fetch a new inventory
    Refresh,
}

/// Settings resolved from CLI arguments and environment
#[derive(Debug, Clone)]
pub struct Config {
    pub inventory_url: String,
    pub cache_dir: Option<PathBuf>,
    pub ttl: Duration,
    pub policy: CachePolicy,
    pub offline: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inventory_url: DEFAULT_INVENTORY_URL.to_string(),
            cache_dir: None,
            ttl: Duration::hours(CACHE_TTL_HOURS),
            policy: CachePolicy::default(),
            offline: false,
        }
    }
}

impl Config {
    /// Creates a Config from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(Config)` with appropriate settings
    /// * `Err(CliError)` if a value is out of range
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if cli.ttl_hours <= 0 {
            return Err(CliError::InvalidTtl(cli.ttl_hours));
        }
        let ttl = Duration::try_hours(cli.ttl_hours).ok_or(CliError::InvalidTtl(cli.ttl_hours))?;

        let inventory_url = match &cli.inventory_url {
            Some(url) if url.trim().is_empty() => return Err(CliError::EmptyInventoryUrl),
            Some(url) => url.trim().to_string(),
            None => DEFAULT_INVENTORY_URL.to_string(),
        };

        Ok(Config {
            inventory_url,
            cache_dir: cli.cache_dir.clone(),
            ttl,
            policy: cli.policy.into(),
            offline: cli.offline,
        })
    }

    /// Builds the cache manager for this configuration
    pub fn cache_manager(&self) -> Result<CacheManager, CliError> {
        let cache = match &self.cache_dir {
            Some(dir) => CacheManager::with_dir(dir.clone()),
            None => CacheManager::new().ok_or(CliError::NoCacheDir)?,
        };
        Ok(cache.with_ttl(self.ttl))
    }

    /// Builds a session fetching over HTTP
    pub fn build_session(&self) -> Result<ContentSession, CliError> {
        let connectivity: Arc<dyn Connectivity> = if self.offline {
            Arc::new(StaticConnectivity::new(false))
        } else {
            Arc::new(AlwaysOnline)
        };

        let fetcher = ContentFetcher::new(Arc::new(ReqwestClient::new()), self.cache_manager()?)
            .with_inventory_url(self.inventory_url.clone())
            .with_policy(self.policy)
            .with_connectivity(connectivity);

        Ok(ContentSession::new(fetcher))
    }
}
