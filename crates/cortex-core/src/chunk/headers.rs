use super::RawChunk;
use crate::model::Metadata;

const STACK_LEVELS: usize = 5; // slots for header levels 2..6

/// Hierarchical header splitter (§4.A).
///
/// Stateful scan tracking a fenced-code-block flag; outside fenced regions,
/// `#`..`######` header lines become section boundaries. Level-1 headers
/// are stored as `title` metadata without ending the current section.
/// Returns `None` if the body has no level-2+ headers at all, signaling the
/// caller to fall back to paragraph splitting.
pub fn split_by_headers(body: &str, body_start_line: i64) -> Option<Vec<RawChunk>> {
    let mut stack: [String; STACK_LEVELS] = Default::default();
    let mut title: Option<String> = None;
    let mut found_level2_plus = false;
    let mut in_fence = false;

    let mut sections = Vec::new();
    let mut current_path = String::new();
    let mut current_start_line = body_start_line;
    let mut current_lines: Vec<&str> = Vec::new();

    let flush = |sections: &mut Vec<RawChunk>,
                 path: &str,
                 start_line: i64,
                 lines: &[&str],
                 title: &Option<String>| {
        let content = lines.join("\n");
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return;
        }
        let mut metadata = Metadata::new();
        if let Some(t) = title {
            metadata.insert("title", t.clone());
        }
        sections.push(RawChunk {
            content: trimmed.to_string(),
            source_line: start_line.max(1),
            source_section: path.to_string(),
            metadata,
        });
    };

    for (i, line) in body.lines().enumerate() {
        let absolute_line = body_start_line + i as i64;
        let trimmed = line.trim_start();

        if trimmed.starts_with("```") {
            in_fence = !in_fence;
            current_lines.push(line);
            continue;
        }

        if !in_fence {
            if let Some((level, text)) = header_level(trimmed) {
                if level == 1 {
                    title = Some(text.to_string());
                    continue;
                }
                flush(
                    &mut sections,
                    &current_path,
                    current_start_line,
                    &current_lines,
                    &title,
                );
                found_level2_plus = true;
                let slot = (level - 2) as usize;
                stack[slot] = text.to_string();
                for deeper in stack.iter_mut().skip(slot + 1) {
                    deeper.clear();
                }
                current_path = stack
                    .iter()
                    .filter(|s| !s.is_empty())
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(" > ");
                current_start_line = absolute_line + 1;
                current_lines = Vec::new();
                continue;
            }
        }

        current_lines.push(line);
    }

    flush(
        &mut sections,
        &current_path,
        current_start_line,
        &current_lines,
        &title,
    );

    if !found_level2_plus {
        return None;
    }
    Some(sections)
}

/// Recognize a header line: 1-6 leading `#` followed by whitespace.
/// Returns `(level, trimmed_text)`.
fn header_level(line: &str) -> Option<(u8, &str)> {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &line[hashes..];
    let rest_start = rest.chars().next();
    if rest_start.is_none() || rest_start.is_some_and(|c| !c.is_whitespace()) {
        return None;
    }
    Some((hashes as u8, rest.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_two_level_sections() {
        let body = "# Doc\n## Projects\n### Project Alpha\nBody A\n### Project Beta\nBody B\n## Decisions\nBody D\n";
        let sections = split_by_headers(body, 1).unwrap();
        let paths: Vec<_> = sections.iter().map(|s| s.source_section.clone()).collect();
        assert!(paths.contains(&"Projects > Project Alpha".to_string()));
        assert!(paths.contains(&"Projects > Project Beta".to_string()));
        assert!(paths.contains(&"Decisions".to_string()));
        assert!(sections.iter().all(|s| s.metadata.get("title") == Some("Doc")));
    }

    #[test]
    fn fenced_code_hides_headers() {
        let body = "## Real Section\n```\n# not a header\n```\ntext\n";
        let sections = split_by_headers(body, 1).unwrap();
        assert_eq!(sections.len(), 1);
        assert!(sections[0].content.contains("# not a header"));
    }

    #[test]
    fn no_headers_returns_none() {
        assert!(split_by_headers("just text\nmore text\n", 1).is_none());
    }

    #[test]
    fn line_numbers_monotonic() {
        let body = "## A\nfirst\n## B\nsecond\nsecond2\n## C\nthird\n";
        let sections = split_by_headers(body, 1).unwrap();
        let mut last = 0;
        for s in &sections {
            assert!(s.source_line >= last);
            last = s.source_line;
        }
    }
}
