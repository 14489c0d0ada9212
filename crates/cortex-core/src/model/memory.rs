use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Metadata;

/// The closed set of memory classes (§3). Empty string is represented as
/// `None` at the API boundary, matching the spec's "empty" enum member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryClass {
    Rule,
    Decision,
    Preference,
    Identity,
    Status,
    Scratch,
}

impl MemoryClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryClass::Rule => "rule",
            MemoryClass::Decision => "decision",
            MemoryClass::Preference => "preference",
            MemoryClass::Identity => "identity",
            MemoryClass::Status => "status",
            MemoryClass::Scratch => "scratch",
        }
    }

    /// Parse, returning `None` for unrecognized or empty input (closed
    /// enum; no silent fallback to a default variant).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "rule" => Some(MemoryClass::Rule),
            "decision" => Some(MemoryClass::Decision),
            "preference" => Some(MemoryClass::Preference),
            "identity" => Some(MemoryClass::Identity),
            "status" => Some(MemoryClass::Status),
            "scratch" => Some(MemoryClass::Scratch),
            _ => None,
        }
    }
}

/// An atomic, immutable-after-insert text unit (§3).
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memory {
    /// Store-assigned id.
    pub id: i64,
    /// Non-empty, post-normalization content.
    pub content: String,
    /// Absolute path or logical origin tag (e.g. `mcp-import`).
    pub source_file: String,
    /// 1-indexed start line in the origin; 0 if synthetic.
    pub source_line: i64,
    /// Hierarchical section path, e.g. `"Trading > Crypto > Strategy"`.
    pub source_section: String,
    /// Deterministic digest over `(content, source_file)`.
    pub content_hash: String,
    /// Optional project tag.
    pub project: Option<String>,
    /// One of the closed memory classes, or `None` for "empty".
    pub memory_class: Option<MemoryClass>,
    /// Ordered string metadata, replaced wholesale on hash collision.
    pub metadata: Metadata,
    pub imported_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A memory not yet assigned an id — what the chunker and hygiene filter
/// pass to the store.
#[derive(Debug, Clone)]
pub struct RawMemory {
    pub content: String,
    pub source_file: String,
    pub source_line: i64,
    pub source_section: String,
    pub project: Option<String>,
    pub memory_class: Option<MemoryClass>,
    pub metadata: Metadata,
}

impl RawMemory {
    /// Deterministic content-hash digest over `(content, source_file)`.
    ///
    /// Uses BLAKE3: fast, collision-resistant, and already the hashing
    /// crate of choice in adjacent memory-engine codebases.
    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.content.as_bytes());
        hasher.update(b"\0");
        hasher.update(self.source_file.as_bytes());
        hasher.finalize().to_hex().to_string()
    }
}
