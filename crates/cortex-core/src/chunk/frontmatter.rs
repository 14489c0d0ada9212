use crate::model::Metadata;

/// Strip a leading `---\nkey: value\n...\n---\n` front-matter block.
///
/// Returns the parsed metadata, the remaining body, and the 1-indexed line
/// number at which the body starts in the original artifact. If the
/// artifact doesn't begin with a front-matter fence, returns empty metadata,
/// the whole text as body, and line 1.
pub fn strip_front_matter(text: &str) -> (Metadata, &str, i64) {
    let mut lines = text.lines();
    let Some(first) = lines.next() else {
        return (Metadata::new(), text, 1);
    };
    if first.trim() != "---" {
        return (Metadata::new(), text, 1);
    }

    let mut metadata = Metadata::new();
    let mut consumed_lines = 1; // the opening fence
    let mut closed = false;
    for line in lines {
        consumed_lines += 1;
        if line.trim() == "---" {
            closed = true;
            break;
        }
        if let Some((key, value)) = line.split_once(':') {
            metadata.insert(key.trim(), value.trim());
        }
    }

    if !closed {
        // Malformed front matter (no closing fence): treat the whole thing
        // as body rather than silently eating the document.
        return (Metadata::new(), text, 1);
    }

    // Find the byte offset right after the closing fence's newline.
    let mut offset = 0;
    let mut seen = 0;
    for (idx, _) in text.match_indices('\n') {
        seen += 1;
        if seen == consumed_lines {
            offset = idx + 1;
            break;
        }
    }

    let body = &text[offset.min(text.len())..];
    (metadata, body, (consumed_lines + 1) as i64)
}
