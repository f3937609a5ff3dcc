//! Summary request types and shape validation.

use serde::{Deserialize, Serialize};

use crate::{FlashbookError, Result};

/// How the generator should approach the chapter text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryMode {
    /// Full chapter summary as a learning unit.
    #[default]
    Chapter,
    /// Extract and explain the core concept.
    Concept,
    /// Identify and break down a principle or law.
    Law,
}

impl SummaryMode {
    /// Wire name of the mode, also used as cache key material.
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryMode::Chapter => "chapter",
            SummaryMode::Concept => "concept",
            SummaryMode::Law => "law",
        }
    }
}

impl std::fmt::Display for SummaryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SummaryMode {
    type Err = FlashbookError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "chapter" => Ok(SummaryMode::Chapter),
            "concept" => Ok(SummaryMode::Concept),
            "law" => Ok(SummaryMode::Law),
            other => Err(FlashbookError::InvalidRequest(format!(
                "unknown mode '{other}' (expected chapter, concept or law)"
            ))),
        }
    }
}

/// A request to summarize one chunk of a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRequest {
    /// Optional book identifier, part of the cache key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_id: Option<String>,

    /// Optional chapter title, used in the prompt and as a fallback title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_title: Option<String>,

    /// The chapter text to summarize.
    #[serde(rename = "text_chunk")]
    pub content: String,

    #[serde(default)]
    pub mode: SummaryMode,

    /// Text preceding the chunk. Continuity awareness only; never summarized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_context: Option<String>,

    /// Text following the chunk. Continuity awareness only; never summarized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_context: Option<String>,
}

impl SummaryRequest {
    /// Create a chapter-mode request for the given content.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            book_id: None,
            chapter_title: None,
            content: content.into(),
            mode: SummaryMode::default(),
            prev_context: None,
            next_context: None,
        }
    }

    /// Set the book identifier.
    pub fn book_id(mut self, book_id: impl Into<String>) -> Self {
        self.book_id = Some(book_id.into());
        self
    }

    /// Set the chapter title.
    pub fn chapter_title(mut self, title: impl Into<String>) -> Self {
        self.chapter_title = Some(title.into());
        self
    }

    /// Set the summary mode.
    pub fn mode(mut self, mode: SummaryMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the preceding-chapter context.
    pub fn prev_context(mut self, context: impl Into<String>) -> Self {
        self.prev_context = Some(context.into());
        self
    }

    /// Set the following-chapter context.
    pub fn next_context(mut self, context: impl Into<String>) -> Self {
        self.next_context = Some(context.into());
        self
    }

    /// Check the request shape against `limits`.
    ///
    /// Returns the request with surrounding whitespace trimmed from the
    /// content, which is the form used for key derivation and generation.
    /// Lengths are counted in characters, not bytes.
    pub fn validated(mut self, limits: &RequestLimits) -> Result<Self> {
        let trimmed = self.content.trim();
        let len = trimmed.chars().count();
        if len < limits.min_content_chars {
            return Err(FlashbookError::InvalidRequest(format!(
                "text_chunk must contain at least {} meaningful characters (got {len})",
                limits.min_content_chars
            )));
        }
        if len > limits.max_content_chars {
            return Err(FlashbookError::InvalidRequest(format!(
                "text_chunk must be at most {} characters (got {len})",
                limits.max_content_chars
            )));
        }
        if trimmed.len() != self.content.len() {
            self.content = trimmed.to_string();
        }

        if let Some(title) = &self.chapter_title {
            check_max("chapter_title", title, limits.max_title_chars)?;
        }
        if let Some(ctx) = &self.prev_context {
            check_max("prev_context", ctx, limits.max_context_chars)?;
        }
        if let Some(ctx) = &self.next_context {
            check_max("next_context", ctx, limits.max_context_chars)?;
        }

        Ok(self)
    }
}

fn check_max(field: &str, value: &str, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len > max {
        return Err(FlashbookError::InvalidRequest(format!(
            "{field} must be at most {max} characters (got {len})"
        )));
    }
    Ok(())
}

/// Request shape limits, checked before the summarizer runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestLimits {
    /// Minimum content length after trimming (default: 100).
    #[serde(default = "default_min_content")]
    pub min_content_chars: usize,
    /// Maximum content length (default: 15000).
    #[serde(default = "default_max_content")]
    pub max_content_chars: usize,
    /// Maximum length of each context field (default: 2000).
    #[serde(default = "default_max_context")]
    pub max_context_chars: usize,
    /// Maximum chapter title length (default: 200).
    #[serde(default = "default_max_title")]
    pub max_title_chars: usize,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            min_content_chars: default_min_content(),
            max_content_chars: default_max_content(),
            max_context_chars: default_max_context(),
            max_title_chars: default_max_title(),
        }
    }
}

fn default_min_content() -> usize {
    100
}

fn default_max_content() -> usize {
    15_000
}

fn default_max_context() -> usize {
    2_000
}

fn default_max_title() -> usize {
    200
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_round_trips_through_str() {
        for mode in [SummaryMode::Chapter, SummaryMode::Concept, SummaryMode::Law] {
            assert_eq!(mode.as_str().parse::<SummaryMode>().unwrap(), mode);
        }
        assert!("poem".parse::<SummaryMode>().is_err());
    }

    #[test]
    fn deserializes_wire_names() {
        let json = r#"{"text_chunk": "abc", "mode": "law", "chapter_title": "One"}"#;
        let req: SummaryRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.content, "abc");
        assert_eq!(req.mode, SummaryMode::Law);
        assert_eq!(req.chapter_title.as_deref(), Some("One"));
        assert!(req.book_id.is_none());
    }

    #[test]
    fn mode_defaults_to_chapter() {
        let req: SummaryRequest = serde_json::from_str(r#"{"text_chunk": "abc"}"#).unwrap();
        assert_eq!(req.mode, SummaryMode::Chapter);
    }

    #[test]
    fn unknown_mode_is_rejected_at_parse_time() {
        let result = serde_json::from_str::<SummaryRequest>(r#"{"text_chunk": "a", "mode": "x"}"#);
        assert!(result.is_err());
    }
}
