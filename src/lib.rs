//! Flashbook - cached, fault-tolerant chapter summarization
//!
//! This crate turns a chapter of text into a short, structured learning
//! unit (a title plus 3–8 typed blocks) using an LLM generator. Results are
//! cached under a content-derived key so repeat requests skip generation,
//! and any generation problem degrades to a deterministic fallback instead
//! of an error.
//!
//! # Example
//!
//! ```rust,no_run
//! use flashbook::{Flashbook, SummaryMode, SummaryRequest};
//!
//! #[tokio::main]
//! async fn main() -> flashbook::Result<()> {
//!     let summarizer = Flashbook::builder()
//!         .gemini("your-gemini-key")
//!         .build()?;
//!
//!     let request = SummaryRequest::new(std::fs::read_to_string("chapter-3.txt").unwrap())
//!         .chapter_title("The Storm")
//!         .mode(SummaryMode::Chapter);
//!
//!     let summary = summarizer.handle(request).await?;
//!     for block in &summary.blocks {
//!         println!("[{}] {}", block.block_type, block.body);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Custom generators and stores
//!
//! Anything implementing [`SummaryGenerator`] can replace Gemini, and any
//! [`SummaryStore`](cache::SummaryStore) can replace the in-process cache:
//!
//! ```rust,ignore
//! let summarizer = Flashbook::builder()
//!     .generator(Arc::new(MyGenerator::new()))
//!     .store(Arc::new(MyRedisStore::connect(url)?))
//!     .build()?;
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod generator;
pub mod normalize;
mod summarizer;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use error::{FlashbookError, Result};
pub use generator::{GeminiClient, GeminiConfig, RetryConfig, RetryingGenerator, SummaryGenerator};
pub use summarizer::{
    FallbackReason, Flashbook, FlashbookBuilder, Summarizer, content_preview, fallback_response,
};

pub use types::{
    BlockType, ContentBlock, GenerationNotes, RequestLimits, SummaryMode, SummaryRequest,
    SummaryResponse,
};

/// Crate version, for CLI `--version` output.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
