//! Tests for the in-memory summary store.

use std::time::Duration;

use flashbook::cache::{CacheConfig, CacheKey, InMemoryStore, SummaryStore};
use flashbook::{BlockType, ContentBlock, GenerationNotes, SummaryRequest, SummaryResponse};

fn response(title: &str) -> SummaryResponse {
    SummaryResponse {
        unit_title: title.to_string(),
        blocks: vec![
            ContentBlock::text(BlockType::CoreIdea, "one"),
            ContentBlock::text(BlockType::Explanation, "two"),
            ContentBlock::text(BlockType::Takeaway, "three"),
        ],
        visual_slots_used: 0,
        cached: false,
        notes: GenerationNotes::default(),
    }
}

fn key(content: &str) -> CacheKey {
    CacheKey::derive(&SummaryRequest::new(content))
}

fn store_with_ttl(ttl: Duration) -> InMemoryStore {
    InMemoryStore::new(&CacheConfig::new().ttl(ttl))
}

// ============================================================================
// Round trip
// ============================================================================

#[tokio::test]
async fn round_trip_only_flips_cached_flag() {
    let store = InMemoryStore::new(&CacheConfig::default());
    let original = response("Unit");
    store.put(key("a"), original.clone()).await;

    let entry = store.get(&key("a")).await.expect("entry should be live");
    assert!(entry.response.cached);

    let mut expected = original;
    expected.cached = true;
    assert_eq!(entry.response, expected);
}

#[tokio::test]
async fn hit_count_increments_per_lookup() {
    let store = InMemoryStore::new(&CacheConfig::default());
    store.put(key("a"), response("Unit")).await;

    assert_eq!(store.get(&key("a")).await.unwrap().hit_count, 1);
    assert_eq!(store.get(&key("a")).await.unwrap().hit_count, 2);
}

#[tokio::test]
async fn put_overwrites_existing_entry() {
    let store = InMemoryStore::new(&CacheConfig::default());
    store.put(key("a"), response("First")).await;
    store.put(key("a"), response("Second")).await;

    let entry = store.get(&key("a")).await.unwrap();
    assert_eq!(entry.response.unit_title, "Second");
    assert_eq!(entry.hit_count, 1);
    assert_eq!(store.stats().await.entries, 1);
}

#[tokio::test]
async fn unknown_key_is_a_miss() {
    let store = InMemoryStore::new(&CacheConfig::default());
    assert!(store.get(&key("missing")).await.is_none());

    let stats = store.stats().await;
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 0);
}

// ============================================================================
// Expiry
// ============================================================================

#[tokio::test]
async fn expired_entry_is_removed_and_counted_once() {
    let store = store_with_ttl(Duration::from_millis(30));
    store.put(key("a"), response("Unit")).await;

    tokio::time::sleep(Duration::from_millis(60)).await;

    assert!(store.get(&key("a")).await.is_none());
    let stats = store.stats().await;
    assert_eq!(stats.evictions, 1);
    assert_eq!(stats.entries, 0);
    assert_eq!(stats.misses, 1);

    // Second lookup is a plain miss, not another eviction.
    assert!(store.get(&key("a")).await.is_none());
    let stats = store.stats().await;
    assert_eq!(stats.evictions, 1);
    assert_eq!(stats.misses, 2);
}

#[tokio::test]
async fn sweep_on_interval_removes_expired_entries() {
    let store = InMemoryStore::new(
        &CacheConfig::new()
            .ttl(Duration::from_millis(30))
            .cleanup_interval(3),
    );
    store.put(key("a"), response("A")).await;
    store.put(key("b"), response("B")).await;

    tokio::time::sleep(Duration::from_millis(60)).await;

    // Third store triggers the sweep.
    store.put(key("c"), response("C")).await;
    let stats = store.stats().await;
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.evictions, 2);
    assert_eq!(stats.stores, 3);
}

#[tokio::test]
async fn purge_expired_reports_removed_count() {
    let store = store_with_ttl(Duration::from_millis(30));
    store.put(key("a"), response("A")).await;
    tokio::time::sleep(Duration::from_millis(60)).await;
    store.put(key("b"), response("B")).await;

    assert_eq!(store.purge_expired(), 1);
    assert_eq!(store.stats().await.entries, 1);
    assert!(store.get(&key("b")).await.is_some());
}

// ============================================================================
// Admin operations
// ============================================================================

#[tokio::test]
async fn invalidate_removes_single_entry() {
    let store = InMemoryStore::new(&CacheConfig::default());
    store.put(key("a"), response("A")).await;
    store.put(key("b"), response("B")).await;

    assert!(store.invalidate(&key("a")).await);
    assert!(!store.invalidate(&key("a")).await);
    assert!(store.get(&key("a")).await.is_none());
    assert!(store.get(&key("b")).await.is_some());
}

#[tokio::test]
async fn clear_returns_count_and_keeps_counters() {
    let store = InMemoryStore::new(&CacheConfig::default());
    store.put(key("a"), response("A")).await;
    store.put(key("b"), response("B")).await;
    let _ = store.get(&key("a")).await;

    assert_eq!(store.clear().await, 2);

    let stats = store.stats().await;
    assert_eq!(stats.entries, 0);
    assert_eq!(stats.stores, 2);
    assert_eq!(stats.hits, 1);
    assert_eq!(store.clear().await, 0);
}

#[tokio::test]
async fn stats_report_hit_rate() {
    let store = InMemoryStore::new(&CacheConfig::default());
    assert_eq!(store.stats().await.hit_rate_percent, 0.0);

    store.put(key("a"), response("A")).await;
    let _ = store.get(&key("a")).await;
    let _ = store.get(&key("a")).await;
    let _ = store.get(&key("missing")).await;

    let stats = store.stats().await;
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hit_rate_percent, 66.67);
}

#[tokio::test]
async fn concurrent_access_keeps_counters_consistent() {
    let store = std::sync::Arc::new(InMemoryStore::new(&CacheConfig::default()));
    store.put(key("shared"), response("Shared")).await;

    let mut handles = Vec::new();
    for _ in 0..16 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            for _ in 0..25 {
                let _ = store.get(&key("shared")).await;
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let stats = store.stats().await;
    assert_eq!(stats.hits, 400);
    assert_eq!(store.get(&key("shared")).await.unwrap().hit_count, 401);
}
