//! Telemetry metric name constants.
//!
//! Centralised metric names for flashbook operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `flashbook_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `backend`: store implementation ("memory" | "bounded")
//! - `generator`: generator name (e.g. "gemini")
//! - `status`: outcome: "ok" or "error"
//! - `reason`: why a fallback was served

/// Cache lookups that returned a live entry.
///
/// Labels: `backend`.
pub const CACHE_HITS_TOTAL: &str = "flashbook_cache_hits_total";

/// Cache lookups that found nothing or an expired entry.
///
/// Labels: `backend`.
pub const CACHE_MISSES_TOTAL: &str = "flashbook_cache_misses_total";

/// Normalized results written to the store.
///
/// Labels: `backend`.
pub const CACHE_STORES_TOTAL: &str = "flashbook_cache_stores_total";

/// Entries removed because they expired (or, for the bounded store, were
/// pushed out by capacity).
///
/// Labels: `backend`.
pub const CACHE_EVICTIONS_TOTAL: &str = "flashbook_cache_evictions_total";

/// Generator invocations.
///
/// Labels: `generator`, `status` ("ok" | "error").
pub const GENERATIONS_TOTAL: &str = "flashbook_generations_total";

/// Generator call duration in seconds.
///
/// Labels: `generator`.
pub const GENERATION_DURATION_SECONDS: &str = "flashbook_generation_duration_seconds";

/// Fallback results served instead of generated ones.
///
/// Labels: `reason` ("generation_failed" | "malformed_output" | "sparse_result").
pub const FALLBACKS_TOTAL: &str = "flashbook_fallbacks_total";

/// Retry attempts (not counting the initial request).
///
/// Labels: `generator`.
pub const RETRIES_TOTAL: &str = "flashbook_retries_total";
