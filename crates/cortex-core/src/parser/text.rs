use std::path::Path;

use super::Parser;
use crate::chunk::RawChunk;
use crate::error::Result;

/// Markdown, structured-config (front-matter), and plain-text files all
/// route through the same chunker (§4.A already handles front matter,
/// headers, and paragraph fallback uniformly).
pub struct TextParser;

const EXTENSIONS: &[&str] = &["md", "markdown", "txt", "text", "rst", "adoc"];

impl Parser for TextParser {
    fn can_handle(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| EXTENSIONS.contains(&e.to_lowercase().as_str()))
            .unwrap_or(false)
    }

    fn import(&self, _path: &Path, content: &str) -> Result<Vec<RawChunk>> {
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(crate::chunk::chunk_text(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_markdown_extension() {
        let parser = TextParser;
        assert!(parser.can_handle(Path::new("notes.md")));
        assert!(!parser.can_handle(Path::new("notes.json")));
    }

    #[test]
    fn empty_file_yields_no_chunks_no_error() {
        let parser = TextParser;
        let chunks = parser.import(Path::new("x.md"), "   \n  \n").unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn preserves_section_path_and_lines() {
        let parser = TextParser;
        let content = "## Section\nbody text here that is long enough to survive.\n";
        let chunks = parser.import(Path::new("x.md"), content).unwrap();
        assert_eq!(chunks[0].source_section, "Section");
        assert!(chunks[0].source_line >= 1);
    }
}
