//! Summary cache subsystem.
//!
//! Summaries are stored under a [`CacheKey`] derived from the request's
//! semantically relevant fields. Two stores implement [`SummaryStore`]:
//!
//! - [`InMemoryStore`]: the default. A single mutex guards the entry map
//!   and the hit/miss/store/eviction counters. Expired entries are removed
//!   at lookup time and by a sweep that runs every Nth store.
//!
//! - [`BoundedStore`]: moka-backed LRU + TTL cache for deployments that
//!   need a hard memory ceiling. Opt in via [`CacheConfig::backend`].
//!
//! # Replacing the store
//!
//! The [`Summarizer`](crate::Summarizer) only talks to `Arc<dyn SummaryStore>`.
//! A durable backend (redis, a database table) implements the same trait and
//! is injected through
//! [`FlashbookBuilder::store()`](crate::FlashbookBuilder::store). Keys are
//! stable hex strings, so they are safe to share across processes.

pub mod bounded;
pub mod key;
pub mod memory;

pub use bounded::BoundedStore;
pub use key::CacheKey;
pub use memory::InMemoryStore;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::SummaryResponse;

/// A cached summary together with its bookkeeping.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The normalized payload. Stored with `cached = false`; copies handed
    /// out by [`SummaryStore::get`] have it set to `true`.
    pub response: SummaryResponse,
    pub created_at: Instant,
    pub expires_at: Instant,
    /// Number of lookups served by this entry, including the current one.
    pub hit_count: u64,
}

impl CacheEntry {
    /// Build a fresh entry expiring `ttl` after `now`.
    pub fn new(mut response: SummaryResponse, now: Instant, ttl: Duration) -> Self {
        response.cached = false;
        Self {
            response,
            created_at: now,
            expires_at: now + ttl,
            hit_count: 0,
        }
    }

    /// An entry is expired once `now` is strictly past `expires_at`.
    pub fn is_expired(&self, now: Instant) -> bool {
        now > self.expires_at
    }

    /// Copy of the entry as served to a caller.
    pub(crate) fn served(&self) -> Self {
        let mut entry = self.clone();
        entry.response.cached = true;
        entry
    }
}

/// Point-in-time cache statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub stores: u64,
    pub evictions: u64,
    pub entries: u64,
    /// `hits / (hits + misses) * 100`, rounded to two decimals; 0 before
    /// any lookup.
    pub hit_rate_percent: f64,
}

impl CacheStats {
    /// Assemble stats from raw counters, computing the hit rate.
    pub fn from_counters(hits: u64, misses: u64, stores: u64, evictions: u64, entries: u64) -> Self {
        let total = hits + misses;
        let hit_rate_percent = if total == 0 {
            0.0
        } else {
            let rate = hits as f64 / total as f64 * 100.0;
            (rate * 100.0).round() / 100.0
        };
        Self {
            hits,
            misses,
            stores,
            evictions,
            entries,
            hit_rate_percent,
        }
    }
}

/// Storage contract for summaries.
///
/// Implementations must be safe to share across tasks. Store faults are
/// never surfaced: a failing backend reports a miss on `get` and drops
/// writes on `put`.
#[async_trait]
pub trait SummaryStore: Send + Sync {
    /// Backend name for logging and metrics.
    fn name(&self) -> &str;

    /// Look up a live entry. Expired entries are removed and reported as a
    /// miss.
    async fn get(&self, key: &CacheKey) -> Option<CacheEntry>;

    /// Insert or overwrite the entry for `key`.
    async fn put(&self, key: CacheKey, response: SummaryResponse);

    /// Remove one entry. Returns whether it was present.
    async fn invalidate(&self, key: &CacheKey) -> bool;

    /// Remove every entry, returning how many there were.
    async fn clear(&self) -> u64;

    /// Current entry count, counters and hit rate.
    async fn stats(&self) -> CacheStats;
}

/// Which [`SummaryStore`] implementation to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Unbounded map with lazy expiry ([`InMemoryStore`]).
    #[default]
    Memory,
    /// Capacity-bounded moka cache ([`BoundedStore`]).
    Bounded,
}

/// Configuration for the summary cache.
///
/// ```rust
/// # use flashbook::cache::{CacheConfig, StoreBackend};
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .ttl(Duration::from_secs(3600))
///     .cleanup_interval(50)
///     .backend(StoreBackend::Bounded)
///     .max_entries(5_000);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Store implementation. Default: [`StoreBackend::Memory`].
    pub backend: StoreBackend,
    /// Time-to-live for entries. Default: 24 hours.
    pub ttl: Duration,
    /// Run the expiry sweep after every Nth store. Default: 100.
    pub cleanup_interval: u64,
    /// Capacity of the bounded store. Ignored by the in-memory store.
    /// Default: 10,000.
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            ttl: Duration::from_secs(86_400),
            cleanup_interval: 100,
            max_entries: 10_000,
        }
    }
}

impl CacheConfig {
    /// Create a new config with the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the store implementation.
    pub fn backend(mut self, backend: StoreBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Set the time-to-live for entries.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set how many stores pass between expiry sweeps (minimum 1).
    pub fn cleanup_interval(mut self, n: u64) -> Self {
        self.cleanup_interval = n.max(1);
        self
    }

    /// Set the bounded store's capacity.
    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = n;
        self
    }

    /// Build the configured store.
    pub fn build_store(&self) -> std::sync::Arc<dyn SummaryStore> {
        match self.backend {
            StoreBackend::Memory => std::sync::Arc::new(InMemoryStore::new(self)),
            StoreBackend::Bounded => std::sync::Arc::new(BoundedStore::new(self)),
        }
    }
}
