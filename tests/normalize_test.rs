//! Tests for generator output validation and normalization.

use flashbook::normalize::{ValidationFailure, normalize};
use flashbook::{BlockType, SummaryRequest};
use serde_json::json;

fn request() -> SummaryRequest {
    SummaryRequest::new("chapter body").chapter_title("Request Title")
}

fn block(tag: &str, image_hint: bool) -> serde_json::Value {
    json!({
        "type": tag,
        "slide_title": "Title",
        "headline": "A headline",
        "body": "Some body text.",
        "image_hint": image_hint,
        "image_prompt": if image_hint { "a lighthouse at dusk" } else { "" },
    })
}

fn output(blocks: Vec<serde_json::Value>) -> String {
    json!({
        "unit_title": "Generated",
        "blocks": blocks,
        "visual_slots_used": 99,
        "notes": { "compression_applied": true }
    })
    .to_string()
}

// ============================================================================
// Structure
// ============================================================================

#[test]
fn keeps_blocks_in_generator_order() {
    let raw = output(vec![
        block("core_idea", false),
        block("example", false),
        block("takeaway", false),
    ]);
    let response = normalize(&raw, &request()).unwrap();

    let types: Vec<_> = response.blocks.iter().map(|b| b.block_type).collect();
    assert_eq!(
        types,
        vec![BlockType::CoreIdea, BlockType::Example, BlockType::Takeaway]
    );
    assert_eq!(response.unit_title, "Generated");
    assert!(!response.cached);
}

#[test]
fn truncates_to_eight_blocks() {
    let raw = output((0..12).map(|_| block("insight", false)).collect());
    let response = normalize(&raw, &request()).unwrap();
    assert_eq!(response.blocks.len(), 8);
}

#[test]
fn cap_applies_before_empty_blocks_are_dropped() {
    let mut blocks = vec![json!({ "type": "insight" })];
    blocks.extend((1..=9).map(|i| json!({ "type": "insight", "body": format!("body {i}") })));
    let response = normalize(&output(blocks), &request()).unwrap();

    let bodies: Vec<_> = response.blocks.iter().map(|b| b.body.as_str()).collect();
    assert_eq!(
        bodies,
        vec!["body 1", "body 2", "body 3", "body 4", "body 5", "body 6", "body 7"]
    );
}

#[test]
fn unknown_tags_become_insight() {
    let raw = output(vec![
        block("scene", false),
        block("definitely-not-a-type", false),
        block("SCENE", false),
        block(" lyric_scroll ", false),
    ]);
    let response = normalize(&raw, &request()).unwrap();
    assert_eq!(response.blocks[0].block_type, BlockType::Scene);
    assert_eq!(response.blocks[1].block_type, BlockType::Insight);
    assert_eq!(response.blocks[2].block_type, BlockType::Insight);
    assert_eq!(response.blocks[3].block_type, BlockType::Insight);
}

#[test]
fn empty_blocks_are_dropped() {
    let raw = output(vec![
        json!({ "type": "insight" }),
        block("core_idea", false),
        json!({ "type": "example", "body": "   " }),
    ]);
    let response = normalize(&raw, &request()).unwrap();
    assert_eq!(response.blocks.len(), 1);
    assert!(response.is_sparse());
}

// ============================================================================
// Visual cap
// ============================================================================

#[test]
fn visual_cap_is_exactly_two() {
    let raw = output(vec![
        block("visual", true),
        block("scene", true),
        block("scene", true),
        block("reveal", true),
        block("insight", false),
    ]);
    let response = normalize(&raw, &request()).unwrap();

    assert_eq!(response.visual_slots_used, 2);
    assert_eq!(response.visual_block_count(), 2);
    assert!(response.blocks[0].image_hint);
    assert!(response.blocks[1].image_hint);
    assert!(!response.blocks[2].image_hint);
    assert!(response.blocks[2].image_prompt.is_empty());
    assert!(!response.blocks[3].image_hint);
}

#[test]
fn visual_slots_ignore_generator_claim() {
    let raw = output(vec![
        block("insight", false),
        block("insight", false),
        block("insight", false),
    ]);
    let response = normalize(&raw, &request()).unwrap();
    assert_eq!(response.visual_slots_used, 0);
}

// ============================================================================
// Field repairs
// ============================================================================

#[test]
fn long_fields_are_truncated() {
    let raw = output(vec![json!({
        "type": "insight",
        "slide_title": "t".repeat(80),
        "headline": "h".repeat(300),
        "body": "b".repeat(2_000),
        "image_hint": true,
        "image_prompt": "p".repeat(900),
    })]);
    let response = normalize(&raw, &request()).unwrap();
    let block = &response.blocks[0];
    assert_eq!(block.slide_title.chars().count(), 30);
    assert_eq!(block.headline.chars().count(), 100);
    assert_eq!(block.image_prompt.chars().count(), 500);
    assert_eq!(block.body.chars().count(), 2_000);
}

#[test]
fn missing_title_falls_back_to_request_title() {
    let raw = json!({ "blocks": [block("insight", false)] }).to_string();
    let response = normalize(&raw, &request()).unwrap();
    assert_eq!(response.unit_title, "Request Title");

    let untitled = SummaryRequest::new("chapter body");
    let response = normalize(&raw, &untitled).unwrap();
    assert_eq!(response.unit_title, "Learning Unit");
}

#[test]
fn continuity_note_is_always_set() {
    let raw = json!({
        "unit_title": "T",
        "blocks": [block("insight", false)],
        "notes": { "context_used_only_for_continuity": false, "long_chapter_handled": "yes" }
    })
    .to_string();
    let response = normalize(&raw, &request()).unwrap();
    assert!(response.notes.context_used_only_for_continuity);
    assert!(!response.notes.long_chapter_handled);
    assert!(!response.notes.compression_applied);
}

#[test]
fn notes_flags_are_carried_over() {
    let raw = output(vec![block("insight", false)]);
    let response = normalize(&raw, &request()).unwrap();
    assert!(response.notes.compression_applied);
    assert!(!response.notes.long_chapter_handled);
}

#[test]
fn wrong_typed_fields_do_not_discard_the_summary() {
    let mut blocks: Vec<_> = (0..5).map(|_| block("insight", false)).collect();
    blocks[1]["image_hint"] = json!("true");
    blocks[2]["lyric_lines"] = json!("x");
    let raw = json!({ "unit_title": "Generated", "blocks": blocks, "notes": [] }).to_string();

    let response = normalize(&raw, &request()).unwrap();
    assert_eq!(response.blocks.len(), 5);
    assert!(!response.blocks[1].image_hint);
    assert!(response.blocks[2].lyric_lines.is_empty());
    assert_eq!(response.blocks[2].body, "Some body text.");
    assert!(!response.notes.compression_applied);
    assert!(response.notes.context_used_only_for_continuity);
}

#[test]
fn fenced_output_is_accepted() {
    let raw = format!("```json\n{}\n```", output(vec![block("insight", false)]));
    let response = normalize(&raw, &request()).unwrap();
    assert_eq!(response.blocks.len(), 1);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn non_json_is_malformed() {
    let err = normalize("Sorry, I can't help with that.", &request()).unwrap_err();
    assert_eq!(err.reason, ValidationFailure::MALFORMED_OUTPUT);
}

#[test]
fn missing_blocks_is_malformed() {
    let err = normalize(r#"{"unit_title": "T"}"#, &request()).unwrap_err();
    assert_eq!(err.reason, ValidationFailure::MALFORMED_OUTPUT);
    assert!(err.detail.contains("blocks"));
}

#[test]
fn two_blocks_parse_but_are_sparse() {
    let raw = output(vec![block("insight", false), block("takeaway", false)]);
    let response = normalize(&raw, &request()).unwrap();
    assert_eq!(response.blocks.len(), 2);
    assert!(response.is_sparse());
}
