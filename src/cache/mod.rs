//! Cache module for storing fetched documents locally
//!
//! This module provides a cache manager that persists the inventory manifest
//! and content documents in a single JSON document with a 24-hour TTL and a
//! format version. Expired entries stay readable through the `get_stale_*`
//! methods, allowing the application to use stale data when the network is
//! unavailable.

mod clock;
mod manager;
mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use manager::{
    CacheData, CacheEntry, CacheError, CacheManager, CACHE_KEY, CACHE_TTL_HOURS, CACHE_VERSION,
};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
