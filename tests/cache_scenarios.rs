//! End-to-end scenarios for the cache, fetcher and session
//!
//! Uses a scripted HTTP client so every network outcome (success, bad
//! payload, transport failure) can be chosen per URL.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Duration;
use serde_json::{json, Value};

use flashquiz::cache::{CacheManager, ManualClock, MemoryStorage, CACHE_TTL_HOURS};
use flashquiz::data::{Content, ContentType, InventoryItem};
use flashquiz::fetch::{
    CachePolicy, ContentFetcher, FetchError, HttpClient, StaticConnectivity,
    STALE_AFTER_NETWORK_ERROR,
};
use flashquiz::session::INVALID_CONTENT_FORMAT;
use flashquiz::{ContentSession, LoadStatus};

const INVENTORY_URL: &str = "https://hosting.example/inventory.json";
const DECK_URL: &str = "https://hosting.example/deck.json";
const T0: i64 = 1_700_000_000_000;

enum Reply {
    Json(Value),
    Status(u16),
    Down,
}

/// Scripted transport keyed by URL
#[derive(Default)]
struct ScriptedHttp {
    replies: Mutex<HashMap<String, Reply>>,
    calls: AtomicUsize,
}

impl ScriptedHttp {
    fn reply(&self, url: &str, reply: Reply) {
        self.replies.lock().unwrap().insert(url.to_string(), reply);
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpClient for ScriptedHttp {
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.replies.lock().unwrap().get(url) {
            Some(Reply::Json(doc)) => Ok(doc.clone()),
            Some(Reply::Status(code)) => Err(FetchError::Status {
                status: *code,
                status_text: "Scripted".to_string(),
            }),
            Some(Reply::Down) | None => Err(FetchError::Network("connection refused".to_string())),
        }
    }
}

struct Harness {
    http: Arc<ScriptedHttp>,
    clock: Arc<ManualClock>,
    online: Arc<StaticConnectivity>,
    storage: Arc<MemoryStorage>,
    fetcher: ContentFetcher,
}

fn harness(policy: CachePolicy) -> Harness {
    let http = Arc::new(ScriptedHttp::default());
    let clock = Arc::new(ManualClock::new(T0));
    let online = Arc::new(StaticConnectivity::new(true));
    let storage = Arc::new(MemoryStorage::new());
    let cache = CacheManager::with_storage(storage.clone()).with_clock(clock.clone());
    let fetcher = ContentFetcher::new(http.clone(), cache)
        .with_inventory_url(INVENTORY_URL)
        .with_connectivity(online.clone())
        .with_policy(policy);
    Harness {
        http,
        clock,
        online,
        storage,
        fetcher,
    }
}

fn deck_item() -> InventoryItem {
    InventoryItem {
        title: "Numbers".to_string(),
        kind: ContentType::Flash,
        game: "French".to_string(),
        url: DECK_URL.to_string(),
    }
}

fn inventory_doc(games: &[&str]) -> Value {
    Value::Array(
        games
            .iter()
            .enumerate()
            .map(|(i, game)| {
                json!({
                    "titre": format!("item{}", i),
                    "type": "Quizz",
                    "jeux": game,
                    "url": format!("https://hosting.example/{}.json", i),
                })
            })
            .collect(),
    )
}

#[tokio::test]
async fn test_stale_content_served_when_network_throws() {
    let h = harness(CachePolicy::RevalidateWhenOnline);
    let deck = json!({"flashcards": [{"f": "un", "b": "one"}]});
    h.http.reply(DECK_URL, Reply::Json(deck.clone()));
    h.fetcher.fetch_content(&deck_item(), false).await;

    h.http.reply(DECK_URL, Reply::Down);
    let result = h.fetcher.fetch_content(&deck_item(), false).await;

    assert_eq!(result.data, Some(deck));
    assert_eq!(result.error.as_deref(), Some(STALE_AFTER_NETWORK_ERROR));
    assert!(result.from_cache);
}

#[tokio::test]
async fn test_non_success_status_is_a_network_failure() {
    let h = harness(CachePolicy::RevalidateWhenOnline);

    h.http.reply(DECK_URL, Reply::Status(503));
    let result = h.fetcher.fetch_content(&deck_item(), false).await;

    assert!(result.is_failure());
    assert_eq!(result.error.as_deref(), Some("HTTP 503: Scripted"));
}

#[tokio::test]
async fn test_offline_uses_fresh_cache_online_revalidates() {
    let h = harness(CachePolicy::RevalidateWhenOnline);
    h.http.reply(INVENTORY_URL, Reply::Json(inventory_doc(&["A"])));
    h.fetcher.fetch_inventory(false).await;

    h.online.set_online(false);
    let offline = h.fetcher.fetch_inventory(false).await;
    assert!(offline.from_cache);
    assert_eq!(h.http.calls(), 1);

    h.online.set_online(true);
    let online = h.fetcher.fetch_inventory(false).await;
    assert!(!online.from_cache);
    assert_eq!(h.http.calls(), 2);
}

#[tokio::test]
async fn test_on_demand_policy_ignores_connectivity() {
    let h = harness(CachePolicy::RevalidateOnDemand);
    h.http.reply(INVENTORY_URL, Reply::Json(inventory_doc(&["A"])));

    h.fetcher.fetch_inventory(false).await;
    let cached = h.fetcher.fetch_inventory(false).await;
    assert!(cached.from_cache);

    let forced = h.fetcher.fetch_inventory(true).await;
    assert!(!forced.from_cache);
    assert_eq!(h.http.calls(), 2);
}

#[tokio::test]
async fn test_expired_cache_goes_to_network() {
    let h = harness(CachePolicy::RevalidateOnDemand);
    h.http.reply(INVENTORY_URL, Reply::Json(inventory_doc(&["A"])));
    h.fetcher.fetch_inventory(false).await;

    h.clock
        .advance(Duration::hours(CACHE_TTL_HOURS).num_milliseconds() + 1);
    h.http.reply(INVENTORY_URL, Reply::Json(inventory_doc(&["A", "B"])));
    let result = h.fetcher.fetch_inventory(false).await;

    assert!(!result.from_cache);
    assert_eq!(result.data.map(|items| items.len()), Some(2));
}

#[tokio::test]
async fn test_flash_item_served_array_ends_in_error_legacy_ordering() {
    let h = harness(CachePolicy::RevalidateWhenOnline);
    let fetcher = h.fetcher.clone().with_content_validation(false);
    h.http.reply(DECK_URL, Reply::Json(json!([{"f": "x", "b": "y"}])));
    let mut session = ContentSession::new(fetcher);

    session.load_content(&deck_item(), false).await;

    assert_eq!(session.content_status, LoadStatus::Error);
    assert_eq!(session.content_error.as_deref(), Some(INVALID_CONTENT_FORMAT));
    // The bad document was cached before the session rejected it
    assert!(session.fetcher().cache().get_content(DECK_URL).is_some());
}

#[tokio::test]
async fn test_flash_item_served_array_ends_in_error_validating() {
    let h = harness(CachePolicy::RevalidateWhenOnline);
    h.http.reply(DECK_URL, Reply::Json(json!([{"f": "x", "b": "y"}])));
    let mut session = ContentSession::new(h.fetcher.clone());

    session.load_content(&deck_item(), false).await;

    assert_eq!(session.content_status, LoadStatus::Error);
    assert!(session
        .content_error
        .as_deref()
        .unwrap()
        .starts_with("Invalid content format"));
    assert!(session.fetcher().cache().get_stale_content(DECK_URL).is_none());
}

#[tokio::test]
async fn test_clear_cache_then_reads_are_empty() {
    let h = harness(CachePolicy::RevalidateOnDemand);
    h.http.reply(INVENTORY_URL, Reply::Json(inventory_doc(&["A"])));
    h.fetcher.fetch_inventory(false).await;
    assert_eq!(h.fetcher.cache().get_cache_timestamp(), Some(T0));

    h.fetcher.clear_cache();

    assert!(h.fetcher.cache().get_inventory().is_none());
    assert!(h.fetcher.cache().get_cache_timestamp().is_none());
}

#[tokio::test]
async fn test_grouping_sorted_games_stable_members() {
    let h = harness(CachePolicy::RevalidateWhenOnline);
    h.http.reply(INVENTORY_URL, Reply::Json(inventory_doc(&["B", "A", "B"])));
    let mut session = ContentSession::new(h.fetcher.clone());

    session.load_inventory(false).await;

    assert_eq!(session.games(), vec!["A", "B"]);
    let titles: Vec<&str> = session.grouped_inventory()["B"]
        .iter()
        .map(|item| item.title.as_str())
        .collect();
    assert_eq!(titles, vec!["item0", "item2"]);
}

#[tokio::test]
async fn test_quota_exceeded_still_returns_network_data() {
    let h = harness(CachePolicy::RevalidateWhenOnline);
    h.storage.set_fail_writes(true);
    h.http.reply(DECK_URL, Reply::Json(json!({"flashcards": []})));

    let result = h.fetcher.fetch_content(&deck_item(), false).await;

    assert!(!result.is_failure());
    assert!(h.fetcher.cache().get_stale_content(DECK_URL).is_none());
}

#[tokio::test]
async fn test_load_content_by_title_end_to_end() {
    let h = harness(CachePolicy::RevalidateWhenOnline);
    h.http.reply(
        INVENTORY_URL,
        Reply::Json(json!([{"title": "Numbers", "type": "Flash", "game": "French", "url": DECK_URL}])),
    );
    h.http.reply(
        DECK_URL,
        Reply::Json(json!({"flashcards": [{"front": "deux", "back": "two"}]})),
    );
    let mut session = ContentSession::new(h.fetcher.clone());
    session.load_inventory(false).await;

    assert!(session.load_content_by_title("French", "Numbers").await);
    match &session.selected_content {
        Some(Content::Flashcards(cards)) => assert_eq!(cards[0].back, "two"),
        other => panic!("expected flashcards, got {:?}", other),
    }
}
