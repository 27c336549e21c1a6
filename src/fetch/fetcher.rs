//! Content fetcher coordinating cache and network
//!
//! Both `fetch_inventory` and `fetch_content` follow the same protocol:
//! - Unless the cache policy says to bypass it, serve a fresh cache entry
//! - Otherwise fetch from the network (after Gist URL normalization)
//! - Validate, write through to the cache and return the new data
//! - On network failure or invalid data, serve the stale cache entry with a
//!   warning, or fail if there is none

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::{
    AlwaysOnline, CachePolicy, Connectivity, FetchError, FetchResult, HttpClient,
    INVALID_INVENTORY_FORMAT, STALE_AFTER_INVALID_FORMAT, STALE_AFTER_NETWORK_ERROR,
};
use crate::cache::CacheManager;
use crate::data::{is_valid_inventory, to_raw_gist_url, Content, InventoryItem};

/// Inventory manifest used when none is configured
pub const DEFAULT_INVENTORY_URL: &str = "https://gist.githubusercontent.com/guillaumejay/684d9dc87e9e158477b0e4fc4164f422/raw/9bd622a913e951bb1e43ee59833e4462f15a4f36/FQ-Inventaire.json";

/// Fetches inventory and content documents through the cache
#[derive(Clone)]
pub struct ContentFetcher {
    http_client: Arc<dyn HttpClient>,
    cache: CacheManager,
    connectivity: Arc<dyn Connectivity>,
    policy: CachePolicy,
    inventory_url: String,
    validate_before_cache: bool,
}

impl std::fmt::Debug for ContentFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentFetcher")
            .field("cache", &self.cache)
            .field("connectivity", &self.connectivity)
            .field("policy", &self.policy)
            .field("inventory_url", &self.inventory_url)
            .field("validate_before_cache", &self.validate_before_cache)
            .finish_non_exhaustive()
    }
}

impl ContentFetcher {
    /// Creates a fetcher with the default inventory URL
    ///
    /// The fetcher starts out assuming it is online, revalidating whenever
    /// online, and checking content shape before caching it.
    pub fn new(http_client: Arc<dyn HttpClient>, cache: CacheManager) -> Self {
        Self {
            http_client,
            cache,
            connectivity: Arc::new(AlwaysOnline),
            policy: CachePolicy::default(),
            inventory_url: DEFAULT_INVENTORY_URL.to_string(),
            validate_before_cache: true,
        }
    }

    /// Sets the online/offline signal
    pub fn with_connectivity(mut self, connectivity: Arc<dyn Connectivity>) -> Self {
        self.connectivity = connectivity;
        self
    }

    /// Sets the cache bypass policy
    pub fn with_policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the inventory manifest URL
    pub fn with_inventory_url(mut self, url: impl Into<String>) -> Self {
        self.inventory_url = url.into();
        self
    }

    /// Chooses whether content shape is checked before caching
    ///
    /// With `false`, any JSON document is cached as soon as it arrives and
    /// shape problems only surface when the session decodes it.
    pub fn with_content_validation(mut self, enabled: bool) -> Self {
        self.validate_before_cache = enabled;
        self
    }

    /// Changes the inventory manifest URL at runtime
    pub fn set_inventory_url(&mut self, url: impl Into<String>) {
        self.inventory_url = url.into();
        info!(url = %self.inventory_url, "Inventory URL changed");
    }

    pub fn inventory_url(&self) -> &str {
        &self.inventory_url
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    fn bypass_cache(&self, force_refresh: bool) -> bool {
        self.policy
            .bypass_cache(force_refresh, self.connectivity.is_online())
    }

    /// Fetches the inventory manifest
    ///
    /// # Arguments
    /// * `force_refresh` - Skip the fresh-cache read regardless of policy
    ///
    /// # Returns
    /// The inventory, or stale cached inventory with a warning, or a failure.
    pub async fn fetch_inventory(&self, force_refresh: bool) -> FetchResult<Vec<InventoryItem>> {
        if !self.bypass_cache(force_refresh) {
            if let Some(items) = self.cache.get_inventory() {
                debug!(count = items.len(), "Inventory served from cache");
                return FetchResult::cached(items);
            }
        }

        let url = to_raw_gist_url(&self.inventory_url);
        info!(%url, "Fetching inventory");

        let doc = match self.http_client.get_json(&url).await {
            Ok(doc) => doc,
            Err(e) => return self.stale_inventory(STALE_AFTER_NETWORK_ERROR, e),
        };

        if !is_valid_inventory(&doc) {
            return self.stale_inventory(STALE_AFTER_INVALID_FORMAT, FetchError::InvalidInventory);
        }

        match serde_json::from_value::<Vec<InventoryItem>>(doc) {
            Ok(items) => {
                self.cache.set_inventory(&items);
                FetchResult::fresh(items)
            }
            Err(e) => {
                warn!(error = %e, "Inventory passed validation but failed to decode");
                self.stale_inventory(STALE_AFTER_INVALID_FORMAT, FetchError::InvalidInventory)
            }
        }
    }

    fn stale_inventory(&self, warning: &str, cause: FetchError) -> FetchResult<Vec<InventoryItem>> {
        match self.cache.get_stale_inventory() {
            Some(items) => {
                warn!(error = %cause, "Serving stale inventory");
                FetchResult::stale(items, warning)
            }
            None => {
                warn!(error = %cause, "Inventory unavailable");
                match cause {
                    FetchError::InvalidInventory => FetchResult::failure(INVALID_INVENTORY_FORMAT),
                    other => FetchResult::failure(other.to_string()),
                }
            }
        }
    }

    /// Fetches the raw content document for an inventory item
    ///
    /// The document is cached under the item's normalized URL. Decoding it
    /// into [`Content`] is left to the caller.
    pub async fn fetch_content(&self, item: &InventoryItem, force_refresh: bool) -> FetchResult<Value> {
        let url = to_raw_gist_url(&item.url);

        if !self.bypass_cache(force_refresh) {
            if let Some(doc) = self.cache.get_content(&url) {
                debug!(%url, "Content served from cache");
                return FetchResult::cached(doc);
            }
        }

        info!(%url, title = %item.title, "Fetching content");

        let doc = match self.http_client.get_json(&url).await {
            Ok(doc) => doc,
            Err(e) => return self.stale_content(&url, STALE_AFTER_NETWORK_ERROR, e),
        };

        if self.validate_before_cache {
            if let Err(e) = Content::from_document(item.kind, &doc) {
                return self.stale_content(&url, STALE_AFTER_INVALID_FORMAT, e.into());
            }
        }

        self.cache.set_content(&url, &doc);
        FetchResult::fresh(doc)
    }

    fn stale_content(&self, url: &str, warning: &str, cause: FetchError) -> FetchResult<Value> {
        match self.cache.get_stale_content(url) {
            Some(doc) => {
                warn!(%url, error = %cause, "Serving stale content");
                FetchResult::stale(doc, warning)
            }
            None => {
                warn!(%url, error = %cause, "Content unavailable");
                FetchResult::failure(cause.to_string())
            }
        }
    }

    /// Deletes everything in the cache
    pub fn clear_cache(&self) {
        info!("Clearing cache");
        self.cache.clear_all();
    }
}
