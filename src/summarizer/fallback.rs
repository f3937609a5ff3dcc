//! Deterministic fallback summary.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{BlockType, ContentBlock, GenerationNotes, SummaryRequest, SummaryResponse};

/// Characters of content shown in the fallback's first block.
const PREVIEW_CHARS: usize = 300;

const FALLBACK_TITLE: &str = "Chapter Summary";

/// Why a fallback summary was served instead of a generated one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// The generator failed (transport, auth, timeout, empty output).
    GenerationFailed,
    /// The generator's text could not be parsed.
    MalformedOutput,
    /// Parsed output had fewer than three usable blocks.
    SparseResult,
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackReason::GenerationFailed => "generation_failed",
            FallbackReason::MalformedOutput => "malformed_output",
            FallbackReason::SparseResult => "sparse_result",
        }
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the fallback summary for `request`.
///
/// Depends on the request alone, so the same request always yields the same
/// response. Fallbacks are never cached.
pub fn fallback_response(request: &SummaryRequest) -> SummaryResponse {
    let unit_title = request
        .chapter_title
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(FALLBACK_TITLE)
        .to_string();

    SummaryResponse {
        unit_title,
        blocks: vec![
            ContentBlock::text(
                BlockType::CoreIdea,
                format!("This chapter covers: {}", content_preview(&request.content)),
            ),
            ContentBlock::text(
                BlockType::Insight,
                "AI summary generation encountered an issue. Please try again or continue reading.",
            ),
            ContentBlock::text(
                BlockType::Takeaway,
                "Consider reviewing the full chapter for complete understanding.",
            ),
        ],
        visual_slots_used: 0,
        cached: false,
        notes: GenerationNotes::default(),
    }
}

/// First 300 characters of `content`, trimmed, with `...` when cut.
pub fn content_preview(content: &str) -> String {
    match content.char_indices().nth(PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", content[..idx].trim()),
        None => content.trim().to_string(),
    }
}
