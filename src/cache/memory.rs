//! Default in-process summary store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, info};

use super::{CacheConfig, CacheEntry, CacheKey, CacheStats, SummaryStore};
use crate::telemetry;
use crate::types::SummaryResponse;

const BACKEND: &str = "memory";

#[derive(Debug, Default)]
struct Counters {
    hits: u64,
    misses: u64,
    stores: u64,
    evictions: u64,
}

#[derive(Debug, Default)]
struct State {
    entries: HashMap<CacheKey, CacheEntry>,
    counters: Counters,
}

/// Unbounded in-memory store with lazy expiry.
///
/// One mutex guards the map and all counters, so a reader never observes a
/// half-updated entry. Every operation is a short, non-awaiting critical
/// section. Expired entries are removed when looked up, and a full sweep
/// runs after every `cleanup_interval` stores.
pub struct InMemoryStore {
    state: Mutex<State>,
    ttl: Duration,
    cleanup_interval: u64,
}

impl InMemoryStore {
    /// Create an empty store from the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            state: Mutex::new(State::default()),
            ttl: config.ttl,
            cleanup_interval: config.cleanup_interval.max(1),
        }
    }

    /// A poisoned lock only means another thread panicked mid-operation.
    /// Entries are replaced wholesale, so the map itself is still coherent.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Remove all expired entries. Returns how many were removed.
    ///
    /// Runs automatically every `cleanup_interval` stores; exposed for
    /// callers that want to reclaim memory on their own schedule.
    pub fn purge_expired(&self) -> u64 {
        let mut state = self.lock();
        let removed = sweep(&mut state, Instant::now());
        drop(state);
        if removed > 0 {
            info!(removed, "cleaned up expired cache entries");
        }
        removed
    }
}

fn sweep(state: &mut State, now: Instant) -> u64 {
    let before = state.entries.len();
    state.entries.retain(|_, entry| !entry.is_expired(now));
    let removed = (before - state.entries.len()) as u64;
    state.counters.evictions += removed;
    if removed > 0 {
        metrics::counter!(telemetry::CACHE_EVICTIONS_TOTAL, "backend" => BACKEND)
            .increment(removed);
    }
    removed
}

#[async_trait]
impl SummaryStore for InMemoryStore {
    fn name(&self) -> &str {
        BACKEND
    }

    async fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        let now = Instant::now();
        let mut state = self.lock();

        match state.entries.get(key).map(|entry| entry.is_expired(now)) {
            None => {
                state.counters.misses += 1;
                drop(state);
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "backend" => BACKEND)
                    .increment(1);
                debug!(key = key.short(), "cache miss");
                None
            }
            Some(true) => {
                state.entries.remove(key);
                state.counters.misses += 1;
                state.counters.evictions += 1;
                drop(state);
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "backend" => BACKEND)
                    .increment(1);
                metrics::counter!(telemetry::CACHE_EVICTIONS_TOTAL, "backend" => BACKEND)
                    .increment(1);
                debug!(key = key.short(), "cache entry expired");
                None
            }
            Some(false) => {
                let served = state.entries.get_mut(key).map(|entry| {
                    entry.hit_count += 1;
                    entry.served()
                });
                state.counters.hits += 1;
                drop(state);

                metrics::counter!(telemetry::CACHE_HITS_TOTAL, "backend" => BACKEND).increment(1);
                if let Some(entry) = &served {
                    info!(key = key.short(), hits = entry.hit_count, "cache hit");
                }
                served
            }
        }
    }

    async fn put(&self, key: CacheKey, response: SummaryResponse) {
        let now = Instant::now();
        let short = key.short().to_string();
        let mut state = self.lock();

        state
            .entries
            .insert(key, CacheEntry::new(response, now, self.ttl));
        state.counters.stores += 1;
        let total = state.entries.len();

        let swept = if state.counters.stores % self.cleanup_interval == 0 {
            Some(sweep(&mut state, now))
        } else {
            None
        };
        drop(state);

        metrics::counter!(telemetry::CACHE_STORES_TOTAL, "backend" => BACKEND).increment(1);
        info!(key = %short, entries = total, "cached response");
        if let Some(removed) = swept.filter(|n| *n > 0) {
            info!(removed, "cleaned up expired cache entries");
        }
    }

    async fn invalidate(&self, key: &CacheKey) -> bool {
        let removed = self.lock().entries.remove(key).is_some();
        if removed {
            info!(key = key.short(), "invalidated cache entry");
        }
        removed
    }

    async fn clear(&self) -> u64 {
        let mut state = self.lock();
        let count = state.entries.len() as u64;
        state.entries.clear();
        drop(state);
        info!(count, "cleared cache entries");
        count
    }

    async fn stats(&self) -> CacheStats {
        let state = self.lock();
        let c = &state.counters;
        CacheStats::from_counters(
            c.hits,
            c.misses,
            c.stores,
            c.evictions,
            state.entries.len() as u64,
        )
    }
}
