//! Format parsers (§4.C)
//!
//! Each parser exposes `can_handle(path)` and `import(path) → chunks`. The
//! ingest engine picks a parser by extension, falling back to content
//! sniffing when the extension doesn't match a known format.

mod json;
mod sniff;
mod text;

pub use json::JsonParser;
pub use sniff::{sniff, SniffedKind};
pub use text::TextParser;

use std::path::Path;

use crate::chunk::RawChunk;
use crate::error::Result;

/// A format parser. Parsers must preserve line numbers and section paths;
/// empty or whitespace-only files return no chunks and no error.
pub trait Parser {
    /// Does this parser claim files with this path (by extension)?
    fn can_handle(&self, path: &Path) -> bool;

    /// Parse file contents into chunks.
    fn import(&self, path: &Path, content: &str) -> Result<Vec<RawChunk>>;
}

/// All built-in parsers, in the order the ingest engine tries them.
pub fn builtin_parsers() -> Vec<Box<dyn Parser>> {
    vec![Box::new(JsonParser), Box::new(TextParser)]
}

/// Select a parser for `path` by extension, falling back to content
/// sniffing when no extension matches.
pub fn select_parser<'a>(
    parsers: &'a [Box<dyn Parser>],
    path: &Path,
    content: &str,
) -> &'a dyn Parser {
    for parser in parsers {
        if parser.can_handle(path) {
            return parser.as_ref();
        }
    }
    match sniff(content) {
        SniffedKind::Json => parsers
            .iter()
            .find(|p| p.can_handle(Path::new("x.json")))
            .map(|p| p.as_ref())
            .expect("JsonParser registered"),
        _ => parsers
            .iter()
            .find(|p| p.can_handle(Path::new("x.md")))
            .map(|p| p.as_ref())
            .expect("TextParser registered"),
    }
}

/// Run the selected parser for `path`/`content`.
pub fn parse_file(path: &Path, content: &str) -> Result<Vec<RawChunk>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    let parsers = builtin_parsers();
    let parser = select_parser(&parsers, path, content);
    parser.import(path, content)
}
