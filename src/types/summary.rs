//! Normalized summary types returned to callers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum number of blocks in a summary.
pub const MAX_BLOCKS: usize = 8;

/// Minimum number of usable blocks before a result counts as sparse.
pub const MIN_USABLE_BLOCKS: usize = 3;

/// Maximum number of blocks flagged for illustration.
pub const MAX_VISUAL_SLOTS: usize = 2;

/// Semantic type of a content block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    // Story-focused
    Scene,
    Reveal,
    Emotion,
    Tension,
    Insight,
    Quote,
    Visual,
    LyricScroll,
    // Legacy learning-slide types
    CoreIdea,
    Explanation,
    Example,
    Takeaway,
    Nuance,
    Contrast,
    Reflection,
}

impl BlockType {
    /// Every known block type, in declaration order.
    pub const ALL: [BlockType; 15] = [
        BlockType::Scene,
        BlockType::Reveal,
        BlockType::Emotion,
        BlockType::Tension,
        BlockType::Insight,
        BlockType::Quote,
        BlockType::Visual,
        BlockType::LyricScroll,
        BlockType::CoreIdea,
        BlockType::Explanation,
        BlockType::Example,
        BlockType::Takeaway,
        BlockType::Nuance,
        BlockType::Contrast,
        BlockType::Reflection,
    ];

    /// Category used for tags that match no known type.
    pub const DEFAULT: BlockType = BlockType::Insight;

    /// Wire name of the block type.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Scene => "scene",
            BlockType::Reveal => "reveal",
            BlockType::Emotion => "emotion",
            BlockType::Tension => "tension",
            BlockType::Insight => "insight",
            BlockType::Quote => "quote",
            BlockType::Visual => "visual",
            BlockType::LyricScroll => "lyric_scroll",
            BlockType::CoreIdea => "core_idea",
            BlockType::Explanation => "explanation",
            BlockType::Example => "example",
            BlockType::Takeaway => "takeaway",
            BlockType::Nuance => "nuance",
            BlockType::Contrast => "contrast",
            BlockType::Reflection => "reflection",
        }
    }

    /// Map a free-text tag from generator output to a block type.
    ///
    /// Matching is exact: `"SCENE"` and `" scene"` are unrecognised.
    /// Anything unrecognised becomes [`BlockType::DEFAULT`].
    pub fn from_tag(tag: &str) -> BlockType {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == tag)
            .unwrap_or(Self::DEFAULT)
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single slide of the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: BlockType,
    /// One or two word slide title (at most 30 characters).
    #[serde(default)]
    pub slide_title: String,
    /// Short headline (at most 100 characters).
    #[serde(default)]
    pub headline: String,
    /// Main narrative content.
    #[serde(default)]
    pub body: String,
    /// Legacy content field.
    #[serde(default)]
    pub text: String,
    /// Flowing lines for `lyric_scroll` blocks.
    #[serde(default)]
    pub lyric_lines: Vec<String>,
    /// Whether this block should be illustrated.
    #[serde(default)]
    pub image_hint: bool,
    /// Illustration prompt; empty unless `image_hint` is set.
    #[serde(default)]
    pub image_prompt: String,
}

impl ContentBlock {
    /// A plain text block with no illustration.
    pub fn text(block_type: BlockType, text: impl Into<String>) -> Self {
        Self {
            block_type,
            slide_title: String::new(),
            headline: String::new(),
            body: String::new(),
            text: text.into(),
            lyric_lines: Vec::new(),
            image_hint: false,
            image_prompt: String::new(),
        }
    }
}

/// Metadata about how the summary was generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationNotes {
    /// The chapter was compressed to fit the output limits.
    #[serde(default)]
    pub compression_applied: bool,
    /// Special handling was applied for long content.
    #[serde(default)]
    pub long_chapter_handled: bool,
    /// Context fields informed continuity only and are absent from the output.
    #[serde(default = "default_true")]
    pub context_used_only_for_continuity: bool,
}

impl Default for GenerationNotes {
    fn default() -> Self {
        Self {
            compression_applied: false,
            long_chapter_handled: false,
            context_used_only_for_continuity: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// The normalized, structured summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub unit_title: String,
    pub blocks: Vec<ContentBlock>,
    /// Number of blocks with `image_hint` set (0..=2).
    #[serde(default)]
    pub visual_slots_used: usize,
    /// Whether this response was served from the cache.
    #[serde(default)]
    pub cached: bool,
    #[serde(default)]
    pub notes: GenerationNotes,
}

impl SummaryResponse {
    /// True when there are too few blocks to serve as a real summary.
    pub fn is_sparse(&self) -> bool {
        self.blocks.len() < MIN_USABLE_BLOCKS
    }

    /// Count of blocks currently flagged for illustration.
    pub fn visual_block_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.image_hint).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_tag_matches_every_known_type() {
        for t in BlockType::ALL {
            assert_eq!(BlockType::from_tag(t.as_str()), t);
        }
    }

    #[test]
    fn from_tag_is_exact() {
        assert_eq!(BlockType::from_tag("  core_idea "), BlockType::Insight);
        assert_eq!(BlockType::from_tag("LYRIC_SCROLL"), BlockType::Insight);
        assert_eq!(BlockType::from_tag("Scene"), BlockType::Insight);
    }

    #[test]
    fn unknown_tag_maps_to_insight() {
        assert_eq!(BlockType::from_tag("plot_twist"), BlockType::Insight);
        assert_eq!(BlockType::from_tag(""), BlockType::Insight);
    }

    #[test]
    fn as_str_matches_serde_name() {
        for t in BlockType::ALL {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
        }
    }

    #[test]
    fn block_serializes_type_field() {
        let block = ContentBlock::text(BlockType::Quote, "hi");
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "quote");
        assert_eq!(json["text"], "hi");
        assert_eq!(json["image_hint"], false);
    }

    #[test]
    fn notes_default_marks_context_continuity() {
        assert!(GenerationNotes::default().context_used_only_for_continuity);
    }
}
