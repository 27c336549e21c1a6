//! flashquiz library
//!
//! Client-side content cache and retrieval layer for a quiz and flashcard
//! app: fetches an inventory manifest and per-item content documents from a
//! remote JSON host, caches them locally with a time-based expiry, and falls
//! back to stale cached data when the network fails.

pub mod cache;
pub mod cli;
pub mod data;
pub mod fetch;
pub mod session;

pub use session::{ContentSession, LoadStatus};
