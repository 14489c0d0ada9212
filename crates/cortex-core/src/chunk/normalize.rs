use super::RawChunk;
use crate::config::ChunkConfig;

/// Normalize raw chunks: split oversized ones, merge undersized ones, drop
/// garbage chunks (§4.A).
pub fn normalize_chunks(chunks: Vec<RawChunk>, config: &ChunkConfig) -> Vec<RawChunk> {
    let split: Vec<RawChunk> = chunks
        .into_iter()
        .flat_map(|c| split_oversized(c, config.max_chars))
        .collect();

    let merged = merge_undersized(split, config.min_chars, config.max_chars);

    merged.into_iter().filter(|c| !is_garbage(c)).collect()
}

/// If `chunk.content` exceeds `max_chars`, split on blank lines; if any
/// resulting piece still exceeds `max_chars`, split that piece on single
/// newlines; if a single line still exceeds `max_chars`, hard-cut at the
/// last space before the cutoff when that space falls past half the limit,
/// else hard-cut at the limit.
fn split_oversized(chunk: RawChunk, max_chars: usize) -> Vec<RawChunk> {
    if chunk.content.len() <= max_chars {
        return vec![chunk];
    }

    let mut pieces = Vec::new();
    let mut line = chunk.source_line;
    for paragraph in split_on_blank_lines(&chunk.content) {
        let lines_in_paragraph = paragraph.lines().count().max(1) as i64;
        if paragraph.len() <= max_chars {
            pieces.push(sub_chunk(&chunk, paragraph, line));
        } else {
            for sub in split_paragraph_further(&paragraph, max_chars) {
                pieces.push(sub_chunk(&chunk, &sub, line));
            }
        }
        line += lines_in_paragraph;
    }

    if pieces.is_empty() {
        vec![chunk]
    } else {
        pieces
    }
}

fn split_on_blank_lines(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }
    if paragraphs.is_empty() {
        vec![text.to_string()]
    } else {
        paragraphs
    }
}

fn split_paragraph_further(paragraph: &str, max_chars: usize) -> Vec<String> {
    let lines: Vec<&str> = paragraph.lines().collect();
    if lines.len() > 1 {
        let mut out = Vec::new();
        for line in lines {
            if line.len() <= max_chars {
                out.push(line.to_string());
            } else {
                out.extend(hard_cut(line, max_chars));
            }
        }
        out
    } else {
        hard_cut(paragraph, max_chars)
    }
}

/// Hard-cut a single overlong line: cut at the last space before the
/// cutoff when that space falls past half the limit, else cut at the
/// limit exactly.
fn hard_cut(line: &str, max_chars: usize) -> Vec<String> {
    let mut remaining = line;
    let mut out = Vec::new();
    while remaining.len() > max_chars {
        let window = char_boundary_floor(remaining, max_chars);
        let cut = match remaining[..window].rfind(' ') {
            Some(space_idx) if space_idx > max_chars / 2 => space_idx,
            _ => window,
        };
        let (head, tail) = remaining.split_at(cut.max(1));
        out.push(head.trim_end().to_string());
        remaining = tail.trim_start();
    }
    if !remaining.is_empty() {
        out.push(remaining.to_string());
    }
    out
}

fn char_boundary_floor(s: &str, idx: usize) -> usize {
    let mut i = idx.min(s.len());
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn sub_chunk(parent: &RawChunk, content: impl Into<String>, line: i64) -> RawChunk {
    RawChunk {
        content: content.into(),
        source_line: line.max(1),
        source_section: parent.source_section.clone(),
        metadata: parent.metadata.clone(),
    }
}

/// Merge undersized chunks: with the previous chunk from the same source
/// section if the result stays under `max_chars`; else merge forward; else
/// keep as an orphan.
fn merge_undersized(chunks: Vec<RawChunk>, min_chars: usize, max_chars: usize) -> Vec<RawChunk> {
    let mut merged: Vec<RawChunk> = Vec::new();
    // A too-small chunk that couldn't merge backward, held to try merging
    // forward into whichever chunk comes next.
    let mut carry: Option<RawChunk> = None;

    for mut chunk in chunks {
        if let Some(prev_small) = carry.take() {
            if prev_small.source_section == chunk.source_section
                && prev_small.content.len() + 1 + chunk.content.len() <= max_chars
            {
                let mut combined = prev_small.content;
                combined.push('\n');
                combined.push_str(&chunk.content);
                chunk.content = combined;
                chunk.source_line = prev_small.source_line.min(chunk.source_line);
            } else {
                merged.push(prev_small);
            }
        }

        if chunk.content.len() >= min_chars {
            merged.push(chunk);
            continue;
        }

        // Too small: try merging with the previous chunk from the same
        // section first.
        if let Some(last) = merged.last_mut() {
            if last.source_section == chunk.source_section
                && last.content.len() + 1 + chunk.content.len() <= max_chars
            {
                last.content.push('\n');
                last.content.push_str(&chunk.content);
                continue;
            }
        }

        // Hold it to try merging forward with the next chunk.
        carry = Some(chunk);
    }

    if let Some(orphan) = carry {
        if let Some(last) = merged.last_mut() {
            if last.source_section == orphan.source_section
                && last.content.len() + 1 + orphan.content.len() <= max_chars
            {
                last.content.push('\n');
                last.content.push_str(&orphan.content);
                return merged;
            }
        }
        merged.push(orphan);
    }

    merged
}

/// Drop garbage chunks: trimmed length < 20, all digits, or a single word
/// (possibly quoted).
fn is_garbage(chunk: &RawChunk) -> bool {
    let trimmed = chunk.content.trim();
    if trimmed.len() < 20 {
        return true;
    }
    if trimmed.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }
    let unquoted = trimmed.trim_matches(|c| c == '"' || c == '\'');
    if unquoted.split_whitespace().count() <= 1 {
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Metadata;

    fn raw(content: &str, section: &str, line: i64) -> RawChunk {
        RawChunk {
            content: content.to_string(),
            source_line: line,
            source_section: section.to_string(),
            metadata: Metadata::new(),
        }
    }

    #[test]
    fn oversized_chunk_splits_on_blank_lines() {
        let para_a = "a".repeat(900);
        let para_b = "b".repeat(900);
        let content = format!("{para_a}\n\n{para_b}");
        let chunk = raw(&content, "Section", 1);
        let config = ChunkConfig { max_chars: 1500, min_chars: 0 };
        let out = normalize_chunks(vec![chunk], &config);
        assert!(out.len() >= 2);
        assert!(out.iter().all(|c| c.content.len() <= 1500));
    }

    #[test]
    fn single_overlong_line_hard_cuts() {
        let content = "word ".repeat(400); // no blank lines, one long line
        let chunk = raw(content.trim(), "Section", 1);
        let config = ChunkConfig { max_chars: 200, min_chars: 0 };
        let out = normalize_chunks(vec![chunk], &config);
        assert!(out.iter().all(|c| c.content.len() <= 200));
        assert!(out.len() > 1);
    }

    #[test]
    fn undersized_chunk_merges_with_previous_same_section() {
        let chunks = vec![
            raw("This is a reasonably long first chunk of text here.", "Sec", 1),
            raw("short", "Sec", 3),
        ];
        let config = ChunkConfig { max_chars: 1500, min_chars: 20 };
        let out = normalize_chunks(chunks, &config);
        assert_eq!(out.len(), 1);
        assert!(out[0].content.contains("short"));
    }

    #[test]
    fn undersized_orphan_across_sections_kept_if_no_merge_possible() {
        let chunks = vec![raw("short bit", "OnlySection", 1)];
        let config = ChunkConfig { max_chars: 1500, min_chars: 20 };
        let out = normalize_chunks(chunks, &config);
        // Too short to survive (< 20 chars AND no merge candidate) => dropped
        // as garbage once it is the sole, final chunk.
        assert!(out.is_empty() || out[0].content.len() < 20);
    }

    #[test]
    fn garbage_chunks_dropped() {
        let chunks = vec![
            raw("1234567890123456789012", "Sec", 1),
            raw("\"single\"", "Sec", 2),
            raw("This one is long enough and has multiple words in it.", "Sec", 3),
        ];
        let config = ChunkConfig { max_chars: 1500, min_chars: 0 };
        let out = normalize_chunks(chunks, &config);
        assert_eq!(out.len(), 1);
        assert!(out[0].content.starts_with("This one"));
    }
}
