//! Validation and normalization of raw generator output.
//!
//! [`normalize`] turns untrusted generator text into a [`SummaryResponse`]
//! that satisfies every structural invariant:
//!
//! - at most [`MAX_BLOCKS`] blocks, taken from the front in generator order;
//! - every block type drawn from the closed [`BlockType`] enum;
//! - at most [`MAX_VISUAL_SLOTS`] blocks with `image_hint`, and
//!   `visual_slots_used` equal to that count;
//! - `context_used_only_for_continuity` always set.
//!
//! Field-level problems are repaired in place. Only a structural parse
//! failure is reported, as [`ValidationFailure`]. A result with fewer than
//! [`MIN_USABLE_BLOCKS`] blocks is still returned; the caller decides
//! whether that is acceptable (see [`SummaryResponse::is_sparse`]).

use tracing::{debug, warn};

use crate::types::{
    BlockType, ContentBlock, GenerationNotes, MAX_BLOCKS, MAX_VISUAL_SLOTS, MIN_USABLE_BLOCKS,
    RawBlock, RawGeneratorOutput, SummaryRequest, SummaryResponse,
};

const MAX_SLIDE_TITLE_CHARS: usize = 30;
const MAX_HEADLINE_CHARS: usize = 100;
const MAX_IMAGE_PROMPT_CHARS: usize = 500;

/// Title used when neither the generator nor the request supplies one.
const DEFAULT_UNIT_TITLE: &str = "Learning Unit";

/// Generator output could not be parsed into the expected structure.
///
/// The detail carries the parser's message. It is meant for logs, not for
/// end users.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}: {detail}")]
pub struct ValidationFailure {
    /// Stable reason code.
    pub reason: &'static str,
    /// Parser error text.
    pub detail: String,
}

impl ValidationFailure {
    pub const MALFORMED_OUTPUT: &'static str = "malformed_output";

    fn malformed(detail: impl Into<String>) -> Self {
        Self {
            reason: Self::MALFORMED_OUTPUT,
            detail: detail.into(),
        }
    }
}

/// Remove a surrounding markdown code fence, if present.
///
/// Handles a leading ```` ```json ```` or ```` ``` ```` and a trailing
/// ```` ``` ````, each independently.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut cleaned = raw.trim();
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest;
    } else if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest;
    }
    cleaned.trim()
}

/// Parse generator text into [`RawGeneratorOutput`].
pub fn parse_raw(raw: &str) -> Result<RawGeneratorOutput, ValidationFailure> {
    serde_json::from_str(strip_code_fences(raw))
        .map_err(|e| ValidationFailure::malformed(e.to_string()))
}

/// Validate and normalize generator text for `request`.
pub fn normalize(
    raw: &str,
    request: &SummaryRequest,
) -> Result<SummaryResponse, ValidationFailure> {
    let parsed = parse_raw(raw).inspect_err(|e| {
        warn!(error = %e, "failed to parse generator output");
        debug!(raw = %preview(raw, 500), "unparseable generator output");
    })?;
    Ok(normalize_parsed(parsed, request))
}

/// Normalize already-parsed output. Infallible: every field is repaired.
pub fn normalize_parsed(raw: RawGeneratorOutput, request: &SummaryRequest) -> SummaryResponse {
    let notes = GenerationNotes {
        compression_applied: raw.note_flag("compression_applied"),
        long_chapter_handled: raw.note_flag("long_chapter_handled"),
        context_used_only_for_continuity: true,
    };

    let unit_title = raw
        .unit_title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .or(request.chapter_title.as_deref())
        .unwrap_or(DEFAULT_UNIT_TITLE)
        .to_string();

    let received = raw.blocks.len();
    let mut visual_slots_used = 0;
    let blocks: Vec<ContentBlock> = raw
        .blocks
        .into_iter()
        .take(MAX_BLOCKS)
        .filter(|b| !b.is_empty())
        .map(|b| {
            let block = normalize_block(b, visual_slots_used < MAX_VISUAL_SLOTS);
            if block.image_hint {
                visual_slots_used += 1;
            }
            block
        })
        .collect();

    if blocks.len() != received {
        debug!(received, kept = blocks.len(), "dropped excess or empty blocks");
    }
    if blocks.len() < MIN_USABLE_BLOCKS {
        warn!(blocks = blocks.len(), "generator returned too few usable blocks");
    }

    SummaryResponse {
        unit_title,
        blocks,
        visual_slots_used,
        cached: false,
        notes,
    }
}

/// Repair one block. `visual_allowed` is false once the visual cap is spent.
fn normalize_block(raw: RawBlock, visual_allowed: bool) -> ContentBlock {
    let image_hint = raw.image_hint.unwrap_or(false) && visual_allowed;
    let image_prompt = if image_hint {
        truncate_chars(raw.image_prompt.unwrap_or_default(), MAX_IMAGE_PROMPT_CHARS)
    } else {
        String::new()
    };

    ContentBlock {
        block_type: BlockType::from_tag(raw.tag.as_deref().unwrap_or_default()),
        slide_title: truncate_chars(raw.slide_title.unwrap_or_default(), MAX_SLIDE_TITLE_CHARS),
        headline: truncate_chars(raw.headline.unwrap_or_default(), MAX_HEADLINE_CHARS),
        body: raw.body.unwrap_or_default(),
        text: raw.text.unwrap_or_default(),
        lyric_lines: raw.lyric_lines.unwrap_or_default(),
        image_hint,
        image_prompt,
    }
}

fn truncate_chars(mut s: String, max: usize) -> String {
    if let Some((idx, _)) = s.char_indices().nth(max) {
        s.truncate(idx);
    }
    s
}

fn preview(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
