//! Generators: the external step that turns chapter text into raw
//! structured output.
//!
//! A [`SummaryGenerator`] returns the model's raw text. It makes no promise
//! about that text's shape; [`normalize`](crate::normalize) is responsible
//! for turning it into a valid summary. Any error (transport, auth, empty
//! output) is absorbed by the [`Summarizer`](crate::Summarizer), which
//! serves a fallback instead.
//!
//! # Context contract
//!
//! `prev_context` and `next_context` are passed along for continuity
//! awareness only. Implementations must instruct the model never to
//! summarize or quote them; nothing downstream checks this mechanically.

mod gemini;
pub mod prompt;
pub mod retry;

pub use gemini::{GeminiClient, GeminiConfig};
pub use retry::{RetryConfig, RetryingGenerator};

use async_trait::async_trait;

use crate::Result;
use crate::types::SummaryRequest;

/// Produces raw structured output for a summary request.
#[async_trait]
pub trait SummaryGenerator: Send + Sync {
    /// Generator name for logging and metrics.
    fn name(&self) -> &str;

    /// Generate raw output for a validated request.
    ///
    /// Returns the model's text verbatim, possibly wrapped in a code fence.
    async fn generate(&self, request: &SummaryRequest) -> Result<String>;
}
