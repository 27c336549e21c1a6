//! Content session state
//!
//! This module holds the state a front end binds to: the loaded inventory and
//! its grouping by game, the selected game and item, the decoded content of
//! the selected item, and separate loading/error state for the inventory and
//! for content.

use tracing::{debug, warn};

use crate::data::{group_by_game, Content, GroupedInventory, InventoryItem};
use crate::fetch::{ContentFetcher, UNKNOWN_ERROR};

/// Error shown when content doesn't match its item's declared type
pub const INVALID_CONTENT_FORMAT: &str = "Invalid content format";

/// Loading state of one kind of data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

impl LoadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadStatus::Idle => "idle",
            LoadStatus::Loading => "loading",
            LoadStatus::Success => "success",
            LoadStatus::Error => "error",
        }
    }
}

/// Inventory, selection and content state for one consumer
///
/// A session owns its fetcher; there is no shared global state. Warnings from
/// partial successes (stale data) land in `error`/`content_error` while the
/// status stays `Success`.
#[derive(Debug)]
pub struct ContentSession {
    fetcher: ContentFetcher,
    inventory: Vec<InventoryItem>,
    grouped: GroupedInventory,
    /// Inventory loading state
    pub status: LoadStatus,
    /// Inventory error, or a warning when `status` is `Success`
    pub error: Option<String>,
    /// Currently selected game
    pub selected_game: Option<String>,
    /// Item whose content was last requested
    pub selected_item: Option<InventoryItem>,
    /// Decoded content of `selected_item`
    pub selected_content: Option<Content>,
    /// Content loading state
    pub content_status: LoadStatus,
    /// Content error, or a warning when `content_status` is `Success`
    pub content_error: Option<String>,
}

impl ContentSession {
    /// Creates an empty session on top of a fetcher
    pub fn new(fetcher: ContentFetcher) -> Self {
        Self {
            fetcher,
            inventory: Vec::new(),
            grouped: GroupedInventory::new(),
            status: LoadStatus::Idle,
            error: None,
            selected_game: None,
            selected_item: None,
            selected_content: None,
            content_status: LoadStatus::Idle,
            content_error: None,
        }
    }

    pub fn fetcher(&self) -> &ContentFetcher {
        &self.fetcher
    }

    /// The loaded inventory, in manifest order
    pub fn inventory(&self) -> &[InventoryItem] {
        &self.inventory
    }

    /// The inventory grouped by game
    pub fn grouped_inventory(&self) -> &GroupedInventory {
        &self.grouped
    }

    /// Game names, sorted
    pub fn games(&self) -> Vec<&str> {
        self.grouped.keys().map(String::as_str).collect()
    }

    /// Items of the selected game, empty if no game is selected
    pub fn selected_game_items(&self) -> &[InventoryItem] {
        self.selected_game
            .as_ref()
            .and_then(|game| self.grouped.get(game))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn set_inventory(&mut self, items: Vec<InventoryItem>) {
        self.grouped = group_by_game(&items);
        self.inventory = items;
    }

    /// Loads the inventory through the fetcher
    pub async fn load_inventory(&mut self, force_refresh: bool) {
        self.status = LoadStatus::Loading;
        self.error = None;

        let result = self.fetcher.fetch_inventory(force_refresh).await;

        match result.data {
            Some(items) => {
                debug!(count = items.len(), from_cache = result.from_cache, "Inventory loaded");
                self.set_inventory(items);
                self.status = LoadStatus::Success;
                self.error = result.error;
            }
            None => {
                self.status = LoadStatus::Error;
                self.error = Some(result.error.unwrap_or_else(|| UNKNOWN_ERROR.to_string()));
            }
        }
    }

    /// Loads and decodes the content of `item`, making it the selected item
    ///
    /// The fetched document must match the item's declared type; a mismatch
    /// ends in `Error` even when the fetch itself succeeded.
    pub async fn load_content(&mut self, item: &InventoryItem, force_refresh: bool) {
        self.selected_item = Some(item.clone());
        self.content_status = LoadStatus::Loading;
        self.content_error = None;

        let result = self.fetcher.fetch_content(item, force_refresh).await;

        let Some(doc) = result.data else {
            self.selected_content = None;
            self.content_status = LoadStatus::Error;
            self.content_error = Some(result.error.unwrap_or_else(|| UNKNOWN_ERROR.to_string()));
            return;
        };

        match Content::from_document(item.kind, &doc) {
            Ok(content) => {
                self.selected_content = Some(content);
                self.content_status = LoadStatus::Success;
                self.content_error = result.error;
            }
            Err(e) => {
                warn!(title = %item.title, kind = %item.kind, error = %e, "Content does not match its type");
                self.selected_content = None;
                self.content_status = LoadStatus::Error;
                self.content_error = Some(INVALID_CONTENT_FORMAT.to_string());
            }
        }
    }

    /// Selects a game and drops the item selection
    pub fn select_game(&mut self, game: impl Into<String>) {
        self.selected_game = Some(game.into());
        self.selected_item = None;
        self.selected_content = None;
    }

    /// Drops game, item and content selection
    pub fn clear_selection(&mut self) {
        self.selected_game = None;
        self.clear_game_selection();
    }

    /// Drops item and content selection, keeping the selected game
    pub fn clear_game_selection(&mut self) {
        self.selected_item = None;
        self.selected_content = None;
        self.content_error = None;
        self.content_status = LoadStatus::Idle;
    }

    /// Clears the whole cache and reloads the inventory from the network
    pub async fn refresh_all(&mut self) {
        self.fetcher.clear_cache();
        self.selected_content = None;
        self.content_error = None;
        self.content_status = LoadStatus::Idle;
        self.load_inventory(true).await;
    }

    /// Finds the first item titled `title` in `game`
    pub fn find_item_by_title(&self, game: &str, title: &str) -> Option<&InventoryItem> {
        self.grouped
            .get(game)?
            .iter()
            .find(|item| item.title == title)
    }

    /// Looks up an item by game and title and loads its content
    ///
    /// # Returns
    /// * `true` if the item exists and its content loaded successfully
    /// * `false` otherwise
    pub async fn load_content_by_title(&mut self, game: &str, title: &str) -> bool {
        let Some(item) = self.find_item_by_title(game, title).cloned() else {
            return false;
        };
        self.load_content(&item, false).await;
        self.content_status == LoadStatus::Success
    }
}
