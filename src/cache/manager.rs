//! Cache manager for persisting fetched inventory and content
//!
//! Provides a `CacheManager` that keeps the whole cache as one JSON document
//! under a single storage key, with per-entry timestamps and a format
//! version. Expired entries are kept around so callers can fall back to
//! them when the network is unavailable.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use super::clock::{Clock, SystemClock};
use super::storage::{FileStorage, Storage, StorageError};
use crate::data::{is_valid_inventory_items, InventoryItem};

/// Storage key holding the serialized cache document
pub const CACHE_KEY: &str = "flashquiz_cache";

/// Format version written into every entry; entries from another version are expired
pub const CACHE_VERSION: &str = "1.0.0";

/// Time-to-live for cache entries in hours
pub const CACHE_TTL_HOURS: i64 = 24;

/// Errors from loading or saving the cache document
#[derive(Debug, Error)]
pub enum CacheError {
    /// The storage medium failed
    #[error("cache storage error: {0}")]
    Storage(#[from] StorageError),

    /// The stored document is not valid cache JSON
    #[error("corrupt cache document: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// A cached value with the metadata needed to judge its freshness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The cached data
    pub data: T,
    /// When the data was cached, in epoch milliseconds
    pub timestamp: i64,
    /// Cache format version the entry was written under
    pub version: String,
}

impl<T> CacheEntry<T> {
    /// Returns true if the entry is too old or from another cache version
    ///
    /// An entry is still fresh at exactly `timestamp + ttl`. Timestamps far
    /// in the past saturate and count as expired.
    pub fn is_expired(&self, now_ms: i64, ttl: Duration, version: &str) -> bool {
        now_ms.saturating_sub(self.timestamp) > ttl.num_milliseconds() || self.version != version
    }
}

/// Root of the persisted cache document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheData {
    /// The inventory manifest, if one has been cached
    #[serde(default)]
    pub inventory: Option<CacheEntry<Vec<InventoryItem>>>,
    /// Raw content documents keyed by their normalized URL
    #[serde(default)]
    pub content: HashMap<String, CacheEntry<Value>>,
}

/// Reads and writes the cache document with TTL and version checks
///
/// Every operation round-trips the whole document through storage, so
/// concurrent writers race and the last write wins. Read failures and
/// corrupt documents behave like an empty cache; write failures are logged
/// and otherwise ignored.
#[derive(Debug, Clone)]
pub struct CacheManager {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    version: String,
}

impl CacheManager {
    /// Creates a CacheManager backed by files in the XDG cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        FileStorage::new().map(|storage| Self::with_storage(Arc::new(storage)))
    }

    /// Creates a CacheManager backed by files in a custom directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self::with_storage(Arc::new(FileStorage::with_dir(cache_dir)))
    }

    /// Creates a CacheManager on top of any storage medium
    pub fn with_storage(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            clock: Arc::new(SystemClock),
            ttl: Duration::hours(CACHE_TTL_HOURS),
            version: CACHE_VERSION.to_string(),
        }
    }

    /// Replaces the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the entry time-to-live
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Replaces the running cache version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Loads the cache document from storage
    ///
    /// # Returns
    /// * `Ok(CacheData)` - the stored document, or an empty one if nothing is stored
    /// * `Err(CacheError)` - if the medium fails or the document doesn't parse
    pub fn load(&self) -> Result<CacheData, CacheError> {
        match self.storage.get(CACHE_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(CacheData::default()),
        }
    }

    /// Saves the cache document to storage, replacing what was there
    pub fn save(&self, data: &CacheData) -> Result<(), CacheError> {
        let json = serde_json::to_string(data)?;
        self.storage.set(CACHE_KEY, &json)?;
        Ok(())
    }

    fn read_data(&self) -> CacheData {
        self.load().unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring unreadable cache");
            CacheData::default()
        })
    }

    fn write_data(&self, data: &CacheData) {
        if let Err(e) = self.save(data) {
            warn!(error = %e, "Dropping cache write");
        }
    }

    fn is_fresh<T>(&self, entry: &CacheEntry<T>) -> bool {
        !entry.is_expired(self.clock.now_ms(), self.ttl, &self.version)
    }

    fn entry<T>(&self, data: T) -> CacheEntry<T> {
        CacheEntry {
            data,
            timestamp: self.clock.now_ms(),
            version: self.version.clone(),
        }
    }

    /// Returns the cached inventory if present and not expired
    pub fn get_inventory(&self) -> Option<Vec<InventoryItem>> {
        self.read_data()
            .inventory
            .filter(|entry| self.is_fresh(entry))
            .map(|entry| entry.data)
    }

    /// Returns the cached inventory regardless of age or version
    pub fn get_stale_inventory(&self) -> Option<Vec<InventoryItem>> {
        self.read_data().inventory.map(|entry| entry.data)
    }

    /// Caches the inventory if it passes validation
    ///
    /// # Returns
    /// * `true` if the inventory was valid and a write was attempted
    /// * `false` if it was rejected; the stored cache is left untouched
    pub fn set_inventory(&self, items: &[InventoryItem]) -> bool {
        if !is_valid_inventory_items(items) {
            debug!(count = items.len(), "Rejected invalid inventory");
            return false;
        }

        let mut data = self.read_data();
        data.inventory = Some(self.entry(items.to_vec()));
        self.write_data(&data);
        true
    }

    /// Returns the cached content for `url` if present and not expired
    pub fn get_content(&self, url: &str) -> Option<Value> {
        self.read_data()
            .content
            .remove(url)
            .filter(|entry| self.is_fresh(entry))
            .map(|entry| entry.data)
    }

    /// Returns the cached content for `url` regardless of age or version
    pub fn get_stale_content(&self, url: &str) -> Option<Value> {
        self.read_data().content.remove(url).map(|entry| entry.data)
    }

    /// Caches a content document under `url`, without validation
    pub fn set_content(&self, url: &str, doc: &Value) {
        let mut data = self.read_data();
        data.content.insert(url.to_string(), self.entry(doc.clone()));
        self.write_data(&data);
    }

    /// Deletes the whole cache document
    pub fn clear_all(&self) {
        if let Err(e) = self.storage.remove(CACHE_KEY) {
            warn!(error = %e, "Failed to clear cache");
        }
    }

    /// Timestamp of the cached inventory, for showing the cache age
    pub fn get_cache_timestamp(&self) -> Option<i64> {
        self.read_data().inventory.map(|entry| entry.timestamp)
    }
}
