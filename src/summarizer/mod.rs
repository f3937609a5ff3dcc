//! Summary orchestration: cache lookup, generation, validation, fallback.
//!
//! A request flows through
//!
//! ```text
//! CHECK_CACHE ─ hit ──────────────────────────────────────────► RETURN (cached)
//!      └─ miss ─► GENERATE ─ ok ─► VALIDATE ─ ok, ≥3 blocks ─► STORE ─► RETURN
//!                    │                 ├─ ok, <3 blocks ─┐
//!                    │                 └─ malformed ─────┤
//!                    └─ error / timeout ─────────────────┴─► FALLBACK ─► RETURN
//! ```
//!
//! The store lookup, the generator call and the store write are separate
//! steps; no store lock is held while the generator runs. Two concurrent
//! misses for the same key both generate, and the later write wins.

mod builder;
mod fallback;

pub use builder::{Flashbook, FlashbookBuilder};
pub use fallback::{FallbackReason, content_preview, fallback_response};

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};

use crate::Result;
use crate::cache::{CacheKey, CacheStats, SummaryStore};
use crate::generator::SummaryGenerator;
use crate::normalize::normalize;
use crate::telemetry;
use crate::types::{RequestLimits, SummaryRequest, SummaryResponse};

/// Produces structured summaries, serving repeats from the cache.
///
/// Construct through [`Flashbook::builder()`]. Cheap to share behind an
/// `Arc`; all methods take `&self`.
pub struct Summarizer {
    store: Arc<dyn SummaryStore>,
    generator: Arc<dyn SummaryGenerator>,
    limits: RequestLimits,
    generation_timeout: Duration,
}

impl Summarizer {
    pub(crate) fn new(
        store: Arc<dyn SummaryStore>,
        generator: Arc<dyn SummaryGenerator>,
        limits: RequestLimits,
        generation_timeout: Duration,
    ) -> Self {
        Self {
            store,
            generator,
            limits,
            generation_timeout,
        }
    }

    /// Validate `request`, then summarize it.
    ///
    /// The only error is [`FlashbookError::InvalidRequest`](crate::FlashbookError::InvalidRequest);
    /// generation problems are absorbed into a fallback summary.
    pub async fn handle(&self, request: SummaryRequest) -> Result<SummaryResponse> {
        let request = request.validated(&self.limits).inspect_err(|e| {
            warn!(error = %e, "rejected summary request");
        })?;
        Ok(self.summarize(&request).await)
    }

    /// Summarize an already validated request. Never fails.
    #[instrument(skip(self, request), fields(mode = %request.mode))]
    pub async fn summarize(&self, request: &SummaryRequest) -> SummaryResponse {
        info!(
            book_id = request.book_id.as_deref().unwrap_or("-"),
            chapter = request.chapter_title.as_deref().unwrap_or("-"),
            text_len = request.content.chars().count(),
            "summary request"
        );

        let key = CacheKey::derive(request);
        if let Some(entry) = self.store.get(&key).await {
            debug!(key = key.short(), hits = entry.hit_count, "serving cached summary");
            return entry.response;
        }

        match self.generate(request).await {
            Ok(response) => {
                self.store.put(key, response.clone()).await;
                info!(blocks = response.blocks.len(), "generated summary");
                response
            }
            Err(reason) => {
                metrics::counter!(telemetry::FALLBACKS_TOTAL, "reason" => reason.as_str())
                    .increment(1);
                warn!(%reason, "serving fallback summary");
                fallback_response(request)
            }
        }
    }

    /// Run the generator and validator. `Err` names the fallback reason.
    async fn generate(
        &self,
        request: &SummaryRequest,
    ) -> std::result::Result<SummaryResponse, FallbackReason> {
        let generator = self.generator.name().to_owned();
        let start = Instant::now();

        let outcome = tokio::time::timeout(self.generation_timeout, self.generator.generate(request))
            .await
            .unwrap_or(Err(crate::FlashbookError::Timeout(self.generation_timeout)));

        metrics::histogram!(telemetry::GENERATION_DURATION_SECONDS, "generator" => generator.clone())
            .record(start.elapsed().as_secs_f64());
        let status = if outcome.is_ok() { "ok" } else { "error" };
        metrics::counter!(telemetry::GENERATIONS_TOTAL, "generator" => generator.clone(), "status" => status)
            .increment(1);

        let raw = outcome.map_err(|e| {
            warn!(generator = %generator, error = %e, "generation failed");
            FallbackReason::GenerationFailed
        })?;

        let response = normalize(&raw, request).map_err(|_| FallbackReason::MalformedOutput)?;
        if response.is_sparse() {
            return Err(FallbackReason::SparseResult);
        }
        Ok(response)
    }

    /// Current cache statistics.
    pub async fn cache_stats(&self) -> CacheStats {
        self.store.stats().await
    }

    /// Drop every cached summary. Returns the number removed.
    pub async fn clear_cache(&self) -> u64 {
        self.store.clear().await
    }

    /// Drop the cached summary for `request`, if any.
    ///
    /// Surrounding whitespace in the content is ignored, matching the key
    /// used by [`handle`](Self::handle).
    pub async fn invalidate(&self, request: &SummaryRequest) -> bool {
        let key = if request.content.trim().len() == request.content.len() {
            CacheKey::derive(request)
        } else {
            let mut trimmed = request.clone();
            trimmed.content = request.content.trim().to_string();
            CacheKey::derive(&trimmed)
        };
        self.store.invalidate(&key).await
    }

    /// Request limits applied by [`handle`](Self::handle).
    pub fn limits(&self) -> &RequestLimits {
        &self.limits
    }

    /// Name of the active generator.
    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    /// Name of the active store backend.
    pub fn store_name(&self) -> &str {
        self.store.name()
    }
}
