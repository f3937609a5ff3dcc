//! Prompt construction for summary generation.

use crate::types::{SummaryMode, SummaryRequest};

/// Characters of each context field forwarded to the model.
const CONTEXT_PREVIEW_CHARS: usize = 500;

/// System instruction describing the output contract.
pub const SYSTEM_PROMPT: &str = r#"You design learning content. Turn the target chapter text into a short sequence of structured learning slides.

Rules:
1. Use ONLY the target chapter text as source material.
2. Previous and next context exist so you can keep continuity. Never summarize, quote or mention them.
3. Reply with a single JSON object that follows the schema below. No markdown, no commentary.
4. Produce between 5 and 8 slides.

Preferred slide order:
1. core_idea - the central concept
2. explanation - the idea broken down
3. example - a concrete illustration
4. insight - a deeper observation or implication
5. takeaway - what the reader should carry away
Optional, still within the 8-slide limit: nuance, contrast, reflection.
Story-driven chapters may instead use: scene, reveal, emotion, tension, quote, visual.

Formatting:
- 2 to 4 sentences per slide.
- For flowing passages use type "lyric_scroll" and put the lines in lyric_lines.
- Mark at most 2 slides with image_hint=true, only for strongly visual moments, and describe the picture in image_prompt.

Schema:
{
  "unit_title": "string",
  "blocks": [
    {
      "type": "core_idea|explanation|example|insight|takeaway|nuance|contrast|reflection|lyric_scroll|scene|reveal|emotion|tension|quote|visual",
      "slide_title": "one or two words",
      "headline": "five to ten words",
      "body": "main content",
      "lyric_lines": [],
      "image_hint": false,
      "image_prompt": ""
    }
  ],
  "visual_slots_used": 0,
  "notes": {
    "compression_applied": false,
    "long_chapter_handled": false
  }
}"#;

/// Instruction line for each mode.
pub fn mode_instruction(mode: SummaryMode) -> &'static str {
    match mode {
        SummaryMode::Chapter => "Summarize this chapter as a learning unit.",
        SummaryMode::Concept => "Extract and explain the core concept in this text.",
        SummaryMode::Law => "Identify the principle or law in this text and break it down.",
    }
}

/// Build the user prompt for a request.
///
/// Context fields are cut to 500 characters and clearly fenced off from the
/// target text.
pub fn build_user_prompt(request: &SummaryRequest) -> String {
    let mut parts = vec![format!("MODE: {}", mode_instruction(request.mode))];

    if let Some(prev) = non_empty(request.prev_context.as_deref()) {
        parts.push(format!(
            "\n[PREVIOUS CONTEXT - continuity only, do NOT summarize]:\n{}...",
            head(prev, CONTEXT_PREVIEW_CHARS)
        ));
    }
    if let Some(next) = non_empty(request.next_context.as_deref()) {
        parts.push(format!(
            "\n[NEXT CONTEXT - continuity only, do NOT summarize]:\n{}...",
            head(next, CONTEXT_PREVIEW_CHARS)
        ));
    }
    if let Some(title) = non_empty(request.chapter_title.as_deref()) {
        parts.push(format!("\nCHAPTER TITLE: {title}"));
    }

    parts.push(format!(
        "\n--- TARGET CHAPTER TEXT (summarize ONLY this) ---\n{}\n--- END OF TARGET CHAPTER ---",
        request.content
    ));
    parts.push("\nReturn the JSON object now.".to_string());

    parts.join("\n")
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}

fn head(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
