use super::RawChunk;
use crate::model::Metadata;

/// Blank-line paragraph fallback splitter (§4.A).
///
/// Used when a body has no level-2+ headers. Consecutive non-blank lines
/// form one paragraph; one or more blank lines separate paragraphs.
/// Every chunk carries an empty `source_section`.
pub fn split_paragraphs(body: &str, body_start_line: i64) -> Vec<RawChunk> {
    let mut chunks = Vec::new();
    let mut current_lines: Vec<&str> = Vec::new();
    let mut current_start_line = body_start_line;
    let mut pending_start = true;

    for (i, line) in body.lines().enumerate() {
        let absolute_line = body_start_line + i as i64;
        if line.trim().is_empty() {
            flush(&mut chunks, &current_lines, current_start_line);
            current_lines.clear();
            pending_start = true;
            continue;
        }
        if pending_start {
            current_start_line = absolute_line;
            pending_start = false;
        }
        current_lines.push(line);
    }
    flush(&mut chunks, &current_lines, current_start_line);

    chunks
}

fn flush(chunks: &mut Vec<RawChunk>, lines: &[&str], start_line: i64) {
    let content = lines.join("\n");
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return;
    }
    chunks.push(RawChunk {
        content: trimmed.to_string(),
        source_line: start_line.max(1),
        source_section: String::new(),
        metadata: Metadata::new(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_paragraphs() {
        let body = "First paragraph.\n\nSecond paragraph is here.\n\nThird one too.";
        let chunks = split_paragraphs(body, 1);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].content, "First paragraph.");
        assert_eq!(chunks[1].content, "Second paragraph is here.");
        assert_eq!(chunks[2].content, "Third one too.");
    }

    #[test]
    fn multi_line_paragraph_preserved() {
        let body = "Line one\nLine two still same paragraph\n\nNext paragraph";
        let chunks = split_paragraphs(body, 5);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content, "Line one\nLine two still same paragraph");
        assert_eq!(chunks[0].source_line, 5);
        assert_eq!(chunks[1].source_line, 7);
    }

    #[test]
    fn empty_body_yields_no_chunks() {
        assert!(split_paragraphs("\n\n\n", 1).is_empty());
    }
}
