use std::path::Path;

use super::Parser;
use crate::chunk::RawChunk;
use crate::error::{CoreError, Result};
use crate::model::Metadata;

/// JSON files are imported as a single provenance chunk (JSON has no
/// header/paragraph structure to split on); content is validated but not
/// restructured.
pub struct JsonParser;

impl Parser for JsonParser {
    fn can_handle(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
    }

    fn import(&self, path: &Path, content: &str) -> Result<Vec<RawChunk>> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str::<serde_json::Value>(trimmed)
            .map_err(|e| CoreError::Invalid(format!("{}: invalid JSON: {e}", path.display())))?;

        Ok(vec![RawChunk {
            content: trimmed.to_string(),
            source_line: 1,
            source_section: String::new(),
            metadata: Metadata::new(),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_json_extension() {
        let parser = JsonParser;
        assert!(parser.can_handle(Path::new("data.json")));
        assert!(!parser.can_handle(Path::new("data.md")));
    }

    #[test]
    fn valid_json_becomes_one_chunk() {
        let parser = JsonParser;
        let chunks = parser.import(Path::new("d.json"), "{\"a\": 1}").unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].source_line, 1);
    }

    #[test]
    fn invalid_json_is_an_error() {
        let parser = JsonParser;
        assert!(parser.import(Path::new("d.json"), "{not json").is_err());
    }

    #[test]
    fn empty_file_yields_no_chunks() {
        let parser = JsonParser;
        assert!(parser.import(Path::new("d.json"), "   ").unwrap().is_empty());
    }
}
