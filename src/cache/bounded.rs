//! Capacity-bounded summary store backed by moka.
//!
//! Unlike [`InMemoryStore`](super::InMemoryStore), expiry and capacity
//! eviction are handled by moka's own housekeeping. Evictions are counted
//! from the eviction listener, so the `evictions` figure can lag behind
//! until moka runs its pending maintenance (forced before reporting stats).

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use async_trait::async_trait;
use moka::notification::RemovalCause;
use moka::sync::Cache;
use tracing::{debug, info};

use super::{CacheConfig, CacheEntry, CacheKey, CacheStats, SummaryStore};
use crate::telemetry;
use crate::types::SummaryResponse;

const BACKEND: &str = "bounded";

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    stores: AtomicU64,
    evictions: AtomicU64,
}

/// Entry as held inside moka. Immutable apart from the hit counter.
#[derive(Debug)]
struct StoredEntry {
    entry: CacheEntry,
    hits: AtomicU64,
}

/// Moka-backed LRU + TTL store with a hard entry ceiling.
pub struct BoundedStore {
    cache: Cache<CacheKey, Arc<StoredEntry>>,
    counters: Arc<Counters>,
    ttl: std::time::Duration,
}

impl BoundedStore {
    /// Create a new store with the configured TTL and capacity.
    pub fn new(config: &CacheConfig) -> Self {
        let counters = Arc::new(Counters::default());
        let listener_counters = Arc::clone(&counters);

        let cache = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(config.ttl)
            .eviction_listener(move |_key, _value, cause: RemovalCause| {
                if cause.was_evicted() {
                    listener_counters.evictions.fetch_add(1, Ordering::Relaxed);
                    metrics::counter!(telemetry::CACHE_EVICTIONS_TOTAL, "backend" => BACKEND)
                        .increment(1);
                }
            })
            .build();

        Self {
            cache,
            counters,
            ttl: config.ttl,
        }
    }
}

#[async_trait]
impl SummaryStore for BoundedStore {
    fn name(&self) -> &str {
        BACKEND
    }

    async fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        let Some(stored) = self.cache.get(key) else {
            self.counters.misses.fetch_add(1, Ordering::Relaxed);
            metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "backend" => BACKEND).increment(1);
            debug!(key = key.short(), "cache miss");
            return None;
        };

        let hit_count = stored.hits.fetch_add(1, Ordering::Relaxed) + 1;
        self.counters.hits.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(telemetry::CACHE_HITS_TOTAL, "backend" => BACKEND).increment(1);
        info!(key = key.short(), hits = hit_count, "cache hit");

        let mut served = stored.entry.served();
        served.hit_count = hit_count;
        Some(served)
    }

    async fn put(&self, key: CacheKey, response: SummaryResponse) {
        let short = key.short().to_string();
        let stored = StoredEntry {
            entry: CacheEntry::new(response, Instant::now(), self.ttl),
            hits: AtomicU64::new(0),
        };
        self.cache.insert(key, Arc::new(stored));
        self.counters.stores.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(telemetry::CACHE_STORES_TOTAL, "backend" => BACKEND).increment(1);
        info!(key = %short, "cached response");
    }

    async fn invalidate(&self, key: &CacheKey) -> bool {
        let removed = self.cache.remove(key).is_some();
        if removed {
            info!(key = key.short(), "invalidated cache entry");
        }
        removed
    }

    async fn clear(&self) -> u64 {
        self.cache.run_pending_tasks();
        let count = self.cache.entry_count();
        self.cache.invalidate_all();
        self.cache.run_pending_tasks();
        info!(count, "cleared cache entries");
        count
    }

    async fn stats(&self) -> CacheStats {
        self.cache.run_pending_tasks();
        CacheStats::from_counters(
            self.counters.hits.load(Ordering::Relaxed),
            self.counters.misses.load(Ordering::Relaxed),
            self.counters.stores.load(Ordering::Relaxed),
            self.counters.evictions.load(Ordering::Relaxed),
            self.cache.entry_count(),
        )
    }
}
