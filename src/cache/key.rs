//! Content-addressed cache key derivation.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::types::SummaryRequest;

/// Content longer than this (in characters) is keyed on a head+tail window.
const EXCERPT_THRESHOLD: usize = 1_000;

/// Characters taken from each end of long content.
const EXCERPT_EDGE: usize = 500;

/// Hex characters kept from the digest.
const KEY_HEX_LEN: usize = 32;

/// Sentinel for absent optional components.
const NONE_SENTINEL: &str = "none";

/// Opaque, fixed-length identifier for a summary request.
///
/// Derived from book id, chapter title, a bounded content excerpt and the
/// mode. Context fields are deliberately excluded: they inform continuity
/// only and must not split the cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for a request.
    ///
    /// Long content (over 1000 characters) contributes only its first and
    /// last 500 characters, so two bodies that share that window and the
    /// remaining fields map to the same key.
    pub fn derive(request: &SummaryRequest) -> Self {
        let excerpt = content_excerpt(&request.content);
        let material = [
            request.book_id.as_deref().unwrap_or(NONE_SENTINEL),
            request.chapter_title.as_deref().unwrap_or(NONE_SENTINEL),
            excerpt.as_str(),
            request.mode.as_str(),
        ]
        .join("|");

        let digest = hex::encode(Sha256::digest(material.as_bytes()));
        Self(digest[..KEY_HEX_LEN].to_string())
    }

    /// Full hex key.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 8 characters, for log lines.
    pub fn short(&self) -> &str {
        &self.0[..8]
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Full content, or first 500 + last 500 characters when it is long.
fn content_excerpt(content: &str) -> String {
    let len = content.chars().count();
    if len <= EXCERPT_THRESHOLD {
        return content.to_string();
    }
    let head = content.chars().take(EXCERPT_EDGE);
    let tail = content.chars().skip(len - EXCERPT_EDGE);
    head.chain(tail).collect()
}
