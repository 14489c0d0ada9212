/// Content-sniffed format kind, used when a file's extension doesn't match
/// a known parser (§4.C).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SniffedKind {
    Json,
    MarkedUp,
    StructuredConfig,
    PlainText,
}

/// Sniff `content`'s format: leading `{`/`[` with parseable JSON ⇒ JSON;
/// leading/contained level-1/2 headers ⇒ marked-up text; leading triple-dash
/// ⇒ structured-config; else plain text.
pub fn sniff(content: &str) -> SniffedKind {
    let trimmed = content.trim_start();

    if (trimmed.starts_with('{') || trimmed.starts_with('['))
        && serde_json::from_str::<serde_json::Value>(trimmed).is_ok()
    {
        return SniffedKind::Json;
    }

    if trimmed.starts_with("---") {
        return SniffedKind::StructuredConfig;
    }

    if content
        .lines()
        .any(|line| line.starts_with("# ") || line.starts_with("## ") || line == "#" || line == "##")
    {
        return SniffedKind::MarkedUp;
    }

    SniffedKind::PlainText
}
