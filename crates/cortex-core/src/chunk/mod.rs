//! Text normalizer & chunker (§4.A)
//!
//! Produces provenance-tagged chunks from a structured text artifact: a
//! hierarchical header splitter for marked-up text, front-matter stripping,
//! a blank-line paragraph fallback, and a normalization pass that enforces
//! length bounds and drops garbage chunks.

mod frontmatter;
mod headers;
mod normalize;
mod paragraph;

pub use normalize::normalize_chunks;

use crate::model::Metadata;

/// A chunk emitted by the splitters, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawChunk {
    pub content: String,
    /// 1-indexed start line in the source artifact.
    pub source_line: i64,
    pub source_section: String,
    pub metadata: Metadata,
}

/// Split a structured text artifact into chunks (§4.A).
///
/// Strips front matter first (if present), promoting its keys into every
/// resulting chunk's metadata. Then tries the hierarchical header splitter;
/// if the body has no level-2+ headers, falls back to blank-line paragraph
/// splitting.
pub fn chunk_text(text: &str) -> Vec<RawChunk> {
    let (front_matter, body, body_start_line) = frontmatter::strip_front_matter(text);

    let mut chunks = match headers::split_by_headers(body, body_start_line) {
        Some(sections) => sections,
        None => paragraph::split_paragraphs(body, body_start_line),
    };

    if !front_matter.is_empty() {
        for chunk in &mut chunks {
            for (k, v) in &front_matter.0 {
                chunk.metadata.insert(k.clone(), v.clone());
            }
        }
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn front_matter_and_nested_headers() {
        let text = "---\ntitle: Daily Notes\ndate: 2026-01-15\n---\n# Doc\n## Projects\n### Project Alpha\nBody A\n### Project Beta\nBody B\n## Decisions\nBody D\n";
        let chunks = chunk_text(text);
        let sections: std::collections::HashSet<_> =
            chunks.iter().map(|c| c.source_section.clone()).collect();
        assert!(sections.contains("Projects > Project Alpha"));
        assert!(sections.contains("Projects > Project Beta"));
        assert!(sections.contains("Decisions"));
        for c in &chunks {
            assert_eq!(c.metadata.get("title"), Some("Daily Notes"));
            assert_eq!(c.metadata.get("date"), Some("2026-01-15"));
            assert!(c.source_line > 0);
        }
    }

    #[test]
    fn no_headers_falls_back_to_paragraphs() {
        let text = "First paragraph.\n\nSecond paragraph is here.\n\nThird one too.";
        let chunks = chunk_text(text);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.source_section.is_empty()));
    }
}
