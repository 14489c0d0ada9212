use std::collections::HashMap;

/// Tokenize for bag-of-tokens similarity: lowercase, split on runs of
/// non-`[a-z0-9]` characters, drop single-character tokens, count
/// occurrences (§4.B).
pub fn tokenize(text: &str) -> HashMap<String, u32> {
    let mut counts = HashMap::new();
    let lower = text.to_lowercase();
    for token in lower.split(|c: char| !(c.is_ascii_lowercase() || c.is_ascii_digit())) {
        if token.chars().count() <= 1 {
            continue;
        }
        *counts.entry(token.to_string()).or_insert(0u32) += 1;
    }
    counts
}

/// Cosine similarity between two bags of token counts.
fn cosine_similarity_tokens(a: &HashMap<String, u32>, b: &HashMap<String, u32>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let dot: f64 = a
        .iter()
        .filter_map(|(tok, count_a)| b.get(tok).map(|count_b| (*count_a as f64) * (*count_b as f64)))
        .sum();
    let norm_a: f64 = a.values().map(|c| (*c as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.values().map(|c| (*c as f64).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Is `candidate` a near-duplicate of anything in `window`? `window` is
/// already filtered by the caller to the most recent (up to 100) memories
/// within `dedupe_window_sec` — this function only scores similarity.
pub fn is_near_duplicate(candidate: &str, window: &[&str], threshold: f64) -> bool {
    let candidate_tokens = tokenize(candidate);
    window
        .iter()
        .any(|existing| cosine_similarity_tokens(&candidate_tokens, &tokenize(existing)) >= threshold)
}
