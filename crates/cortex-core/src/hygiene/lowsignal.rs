/// Strip memory-context blocks, untrusted metadata fences, and
/// queued-envelope separators from captured conversation text (§4.B).
pub fn sanitize_captured_text(text: &str) -> String {
    let mut out = strip_tagged_block(text, "cortex-memories");
    out = strip_tagged_block(&out, "relevant-memories");
    out = strip_fenced_block(&out, "metadata");
    out = strip_queued_envelope_separators(&out);
    out.trim().to_string()
}

/// Remove `<tag>...</tag>` blocks, including the tags themselves.
fn strip_tagged_block(text: &str, tag: &str) -> String {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let mut out = String::new();
    let mut rest = text;
    while let Some(start) = rest.find(&open) {
        out.push_str(&rest[..start]);
        match rest[start..].find(&close) {
            Some(end) => rest = &rest[start + end + close.len()..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Remove ```` ```tag ... ``` ```` fenced code blocks labeled `tag`.
fn strip_fenced_block(text: &str, tag: &str) -> String {
    let open = format!("```{tag}");
    let mut out = String::new();
    let mut rest = text;
    while let Some(start) = rest.find(&open) {
        out.push_str(&rest[..start]);
        match rest[start + open.len()..].find("```") {
            Some(end) => rest = &rest[start + open.len() + end + 3..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Drop lines that are nothing but a queued-envelope separator, e.g.
/// `---` or `===` used to delimit batched captures.
fn strip_queued_envelope_separators(text: &str) -> String {
    text.lines()
        .filter(|line| {
            let t = line.trim();
            !(t.len() >= 3 && (t.chars().all(|c| c == '-') || t.chars().all(|c| c == '=')))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// If `text` matches a `### User / ### Assistant` envelope, return just the
/// user half; otherwise `None`.
fn extract_user_half(text: &str) -> Option<String> {
    let user_marker = "### User";
    let assistant_marker = "### Assistant";
    let user_start = text.find(user_marker)?;
    let after_user = user_start + user_marker.len();
    let user_end = text[after_user..]
        .find(assistant_marker)
        .map(|i| after_user + i)
        .unwrap_or(text.len());
    Some(text[after_user..user_end].trim().to_string())
}

/// Does the text carry an "important" marker that overrides low-signal
/// suppression? Recognizes an `important:` prefix, an `[important]` or
/// `<important>` bracket/tag, case-insensitively.
fn has_important_marker(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.trim_start().starts_with("important:")
        || lower.contains("[important]")
        || lower.contains("<important>")
}

/// Is `text` an acknowledgement-only body? Only applies to texts of 8 or
/// fewer whitespace-separated tokens.
fn matches_acknowledgement(text: &str, patterns: &[String]) -> bool {
    let token_count = text.split_whitespace().count();
    if token_count == 0 || token_count > 8 {
        return false;
    }
    let normalized = text.trim().trim_matches(|c: char| c.is_ascii_punctuation());
    let lower = normalized.to_lowercase();
    patterns.iter().any(|p| lower == p.to_lowercase())
}

/// Is this body low-signal, per §4.B? Evaluates the `### User` half alone
/// when the text matches a queued conversation envelope.
pub fn is_low_signal(text: &str, min_chars: usize, patterns: &[String]) -> bool {
    let sanitized = sanitize_captured_text(text);
    let evaluated = extract_user_half(&sanitized).unwrap_or(sanitized);

    if has_important_marker(&evaluated) {
        return false;
    }

    let trimmed = evaluated.trim();
    if trimmed.is_empty() {
        return true;
    }
    if trimmed.len() < min_chars {
        return true;
    }
    matches_acknowledgement(trimmed, patterns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_low_signal_patterns;

    #[test]
    fn heartbeat_envelope_is_low_signal() {
        let text = "### User\nHEARTBEAT_OK\n\n### Assistant\nok";
        assert!(is_low_signal(text, 20, &default_low_signal_patterns()));
    }

    #[test]
    fn substantive_envelope_is_not_low_signal() {
        let text = "### User\nQ prefers Sonnet for coding tasks\n\n### Assistant\nSaved";
        assert!(!is_low_signal(text, 20, &default_low_signal_patterns()));
    }

    #[test]
    fn important_marker_overrides_suppression() {
        let text = "important: ok";
        assert!(!is_low_signal(text, 20, &default_low_signal_patterns()));
    }

    #[test]
    fn strips_memory_context_blocks() {
        let text = "<cortex-memories>stale stuff here</cortex-memories>Actual new content that matters here.";
        let sanitized = sanitize_captured_text(text);
        assert!(!sanitized.contains("stale stuff"));
        assert!(sanitized.contains("Actual new content"));
    }

    #[test]
    fn empty_after_sanitization_is_low_signal() {
        let text = "<cortex-memories>only stale stuff</cortex-memories>";
        assert!(is_low_signal(text, 20, &default_low_signal_patterns()));
    }
}
