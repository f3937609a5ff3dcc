//! Untrusted generator output, as parsed before normalization.
//!
//! Every field tolerates absence, `null` and a value of the wrong JSON type.
//! Nothing here is assumed to satisfy the invariants of
//! [`SummaryResponse`](super::SummaryResponse).

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// Deserialize any JSON value, keeping it only if it converts to `T`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Top-level generator output.
///
/// Only `blocks` is structurally required: output without a block array is
/// not a summary at all.
#[derive(Debug, Clone, Deserialize)]
pub struct RawGeneratorOutput {
    #[serde(default, deserialize_with = "lenient")]
    pub unit_title: Option<String>,
    pub blocks: Vec<RawBlock>,
    /// Generator's own count. Ignored; recomputed during normalization.
    #[serde(default)]
    pub visual_slots_used: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub notes: Option<HashMap<String, serde_json::Value>>,
}

impl RawGeneratorOutput {
    /// Read a boolean note, treating missing or non-boolean values as false.
    pub fn note_flag(&self, key: &str) -> bool {
        self.notes
            .as_ref()
            .and_then(|n| n.get(key))
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }
}

/// One generator block, with a free-text type tag.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBlock {
    #[serde(default, rename = "type", deserialize_with = "lenient")]
    pub tag: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub slide_title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub headline: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub body: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub lyric_lines: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    pub image_hint: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub image_prompt: Option<String>,
}

impl RawBlock {
    /// True when the block carries no readable content at all.
    pub fn is_empty(&self) -> bool {
        fn blank(s: &Option<String>) -> bool {
            s.as_deref().is_none_or(|s| s.trim().is_empty())
        }
        blank(&self.body)
            && blank(&self.text)
            && blank(&self.headline)
            && self
                .lyric_lines
                .as_ref()
                .is_none_or(|lines| lines.iter().all(|l| l.trim().is_empty()))
    }
}
