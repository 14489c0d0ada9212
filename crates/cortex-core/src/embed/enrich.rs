/// Render the `[source_stem > section]` prefix prepended to a memory's
/// content before embedding (§4.D step 6). Deterministic given
/// `source_file` and `source_section`.
pub fn enrich_text(content: &str, source_file: &str, source_section: &str) -> String {
    let stem = std::path::Path::new(source_file)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(source_file);

    let prefix = if source_section.is_empty() {
        format!("[{stem}]")
    } else {
        format!("[{stem} > {source_section}]")
    };

    format!("{prefix} {content}")
}
