//! Builder for configuring summarizer instances

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::Summarizer;
use crate::cache::{CacheConfig, SummaryStore};
use crate::generator::{GeminiClient, GeminiConfig, RetryConfig, RetryingGenerator, SummaryGenerator};
use crate::types::RequestLimits;
use crate::{FlashbookError, Result};

/// Default upper bound on one generation, retries included.
const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(180);

/// Main entry point for creating summarizer instances.
pub struct Flashbook;

impl Flashbook {
    /// Create a new builder for configuring the summarizer.
    pub fn builder() -> FlashbookBuilder {
        FlashbookBuilder::new()
    }
}

/// Builder for configuring [`Summarizer`] instances.
///
/// ```rust,no_run
/// # use flashbook::{Flashbook, RetryConfig};
/// # fn main() -> flashbook::Result<()> {
/// let summarizer = Flashbook::builder()
///     .gemini(std::env::var("GEMINI_API_KEY").unwrap_or_default())
///     .retry(RetryConfig::new().max_attempts(2))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct FlashbookBuilder {
    gemini_key: Option<String>,
    gemini_config: GeminiConfig,
    generator: Option<Arc<dyn SummaryGenerator>>,
    store: Option<Arc<dyn SummaryStore>>,
    cache: CacheConfig,
    retry: RetryConfig,
    limits: RequestLimits,
    generation_timeout: Duration,
}

impl Default for FlashbookBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FlashbookBuilder {
    pub fn new() -> Self {
        Self {
            gemini_key: None,
            gemini_config: GeminiConfig::default(),
            generator: None,
            store: None,
            cache: CacheConfig::default(),
            retry: RetryConfig::default(),
            limits: RequestLimits::default(),
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }

    /// Generate with Google Gemini.
    pub fn gemini(mut self, api_key: impl Into<String>) -> Self {
        self.gemini_key = Some(api_key.into());
        self
    }

    /// Gemini model name (default: `gemini-2.5-flash`).
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.gemini_config.model = model.into();
        self
    }

    /// Full Gemini client settings.
    pub fn gemini_config(mut self, config: GeminiConfig) -> Self {
        self.gemini_config = config;
        self
    }

    /// Use a custom generator instead of Gemini.
    ///
    /// Takes precedence over [`gemini()`](Self::gemini).
    pub fn generator(mut self, generator: Arc<dyn SummaryGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Use a custom store. Overrides [`cache()`](Self::cache).
    pub fn store(mut self, store: Arc<dyn SummaryStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Configure the built-in store.
    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.cache = config;
        self
    }

    /// Retry policy for transient generator errors.
    ///
    /// Use [`RetryConfig::disabled()`] to call the generator exactly once.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = config;
        self
    }

    /// Request shape limits.
    pub fn limits(mut self, limits: RequestLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Upper bound on one generation, retries included (default: 180s).
    pub fn generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    /// Build the summarizer.
    ///
    /// Fails with [`FlashbookError::NoGenerator`] when neither a Gemini key
    /// nor a custom generator was supplied.
    pub fn build(self) -> Result<Summarizer> {
        let generator: Arc<dyn SummaryGenerator> = match (self.generator, self.gemini_key) {
            (Some(generator), _) => generator,
            (None, Some(key)) => Arc::new(GeminiClient::with_config(key, self.gemini_config)?),
            (None, None) => return Err(FlashbookError::NoGenerator),
        };

        let generator: Arc<dyn SummaryGenerator> = if self.retry.max_attempts > 1 {
            Arc::new(RetryingGenerator::new(generator, self.retry))
        } else {
            generator
        };

        let store = self.store.unwrap_or_else(|| self.cache.build_store());

        info!(
            generator = generator.name(),
            store = store.name(),
            timeout_secs = self.generation_timeout.as_secs(),
            "summarizer ready"
        );
        Ok(Summarizer::new(
            store,
            generator,
            self.limits,
            self.generation_timeout,
        ))
    }
}
