//! Cache-or-network retrieval of inventory and content documents
//!
//! [`ContentFetcher`] decides for every request whether to serve from cache,
//! go to the network, or fall back to stale cached data. Every outcome is a
//! [`FetchResult`]; errors never escape as `Err`.

mod connectivity;
mod fetcher;
mod http;

pub use connectivity::{AlwaysOnline, Connectivity, StaticConnectivity};
pub use fetcher::{ContentFetcher, DEFAULT_INVENTORY_URL};
pub use http::{HttpClient, ReqwestClient};

use thiserror::Error;

/// Warning attached to stale data served after a network failure
pub const STALE_AFTER_NETWORK_ERROR: &str = "Network error, cached data used";

/// Warning attached to stale data served after the network returned a bad document
pub const STALE_AFTER_INVALID_FORMAT: &str = "Invalid format received, cached data used";

/// Error when the inventory is malformed and nothing is cached
pub const INVALID_INVENTORY_FORMAT: &str = "Invalid inventory format";

/// Error used when a failure carries no message of its own
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Errors that can occur while fetching a document
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP {status}: {status_text}")]
    Status { status: u16, status_text: String },

    /// Failed to parse the response body
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// The inventory document failed validation
    #[error("{}", INVALID_INVENTORY_FORMAT)]
    InvalidInventory,

    /// A content document does not match its item's type
    #[error("Invalid content format: {0}")]
    InvalidContent(#[from] crate::data::ContentError),

    /// The host could not be reached (connection refused or timed out)
    #[error("Network unavailable: {0}")]
    Network(String),
}

/// When a request may be answered from a fresh cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Go to the network whenever online; fresh cache entries are served
    /// only while offline
    #[default]
    RevalidateWhenOnline,
    /// Serve fresh cache entries unless a refresh is explicitly forced
    RevalidateOnDemand,
}

impl CachePolicy {
    /// Whether to skip the fresh-cache read for this request
    pub fn bypass_cache(&self, force_refresh: bool, online: bool) -> bool {
        match self {
            CachePolicy::RevalidateWhenOnline => force_refresh || online,
            CachePolicy::RevalidateOnDemand => force_refresh,
        }
    }
}

/// Outcome of a fetch
///
/// * `data: None` - total failure, `error` says why
/// * `data: Some`, `error: None` - success
/// * `data: Some`, `error: Some` - partial success (stale data served); the
///   error is a warning to surface, not a failure
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult<T> {
    pub data: Option<T>,
    pub error: Option<String>,
    pub from_cache: bool,
}

impl<T> FetchResult<T> {
    /// Fresh data straight from the network
    pub fn fresh(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            from_cache: false,
        }
    }

    /// Fresh data from the cache
    pub fn cached(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            from_cache: true,
        }
    }

    /// Stale cached data served with a warning
    pub fn stale(data: T, warning: impl Into<String>) -> Self {
        Self {
            data: Some(data),
            error: Some(warning.into()),
            from_cache: true,
        }
    }

    /// Nothing could be obtained
    pub fn failure(error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            data: None,
            error: Some(if error.is_empty() {
                UNKNOWN_ERROR.to_string()
            } else {
                error
            }),
            from_cache: false,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.data.is_none()
    }

    pub fn is_partial(&self) -> bool {
        self.data.is_some() && self.error.is_some()
    }
}
