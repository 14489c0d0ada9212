//! Enricher contract (§6)
//!
//! The enricher itself — an LLM-backed fact extractor — is an external
//! collaborator; only its request/response shape and the core's validation
//! obligations over candidates are in scope here.

use crate::model::{normalize_field, Fact, FactType, FIELD_MAX_LEN};

/// Default confidence applied when a candidate's confidence is out of
/// range (§6).
pub const DEFAULT_CANDIDATE_CONFIDENCE: f64 = 0.7;

/// A raw candidate fact as returned by the enricher, before validation.
#[derive(Debug, Clone)]
pub struct EnricherCandidate {
    pub subject: String,
    pub predicate: String,
    pub object: String,
    pub fact_type: String,
    pub confidence: f64,
    pub source_quote: Option<String>,
    pub reasoning: String,
}

/// A candidate that has passed validation and is ready to insert.
#[derive(Debug, Clone)]
pub struct ValidatedCandidate {
    pub subject: String,
    pub predicate: String,
    pub object: String,
    pub fact_type: FactType,
    pub confidence: f64,
    pub source_quote: Option<String>,
}

/// Validate and filter raw enricher candidates against the closed
/// `fact_type` enum, confidence range, empty fields, subject length, and
/// duplication against already rule-extracted facts (§6):
///
/// - `fact_type` falls back to `kv` if unrecognized.
/// - out-of-range `confidence` becomes [`DEFAULT_CANDIDATE_CONFIDENCE`].
/// - candidates with an empty predicate or object are dropped.
/// - subjects are truncated to [`FIELD_MAX_LEN`].
/// - a candidate is dropped if an existing rule-extracted fact's object
///   contains or equals the candidate's object, case-insensitively.
pub fn validate_candidates(
    candidates: Vec<EnricherCandidate>,
    existing_rule_facts: &[Fact],
) -> Vec<ValidatedCandidate> {
    candidates
        .into_iter()
        .filter_map(|c| validate_one(c, existing_rule_facts))
        .collect()
}

fn validate_one(candidate: EnricherCandidate, existing_rule_facts: &[Fact]) -> Option<ValidatedCandidate> {
    let predicate = normalize_field(&candidate.predicate)?;
    let object = normalize_field(&candidate.object)?;

    let subject = {
        let trimmed = candidate.subject.trim();
        if trimmed.is_empty() {
            return None;
        }
        trimmed.chars().take(FIELD_MAX_LEN).collect::<String>()
    };

    let fact_type = FactType::parse_or_kv(&candidate.fact_type);

    let confidence = if (0.0..=1.0).contains(&candidate.confidence) {
        candidate.confidence
    } else {
        DEFAULT_CANDIDATE_CONFIDENCE
    };

    let object_lower = object.to_lowercase();
    let duplicates_rule_fact = existing_rule_facts.iter().any(|f| {
        let existing_lower = f.object.to_lowercase();
        object_lower.contains(&existing_lower) || object_lower == existing_lower
    });
    if duplicates_rule_fact {
        return None;
    }

    Some(ValidatedCandidate {
        subject,
        predicate,
        object,
        fact_type,
        confidence,
        source_quote: candidate.source_quote,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn rule_fact(object: &str) -> Fact {
        Fact {
            id: 1,
            memory_id: 1,
            subject: "cortex".into(),
            predicate: "uses".into(),
            object: object.into(),
            fact_type: FactType::Kv,
            confidence: 0.9,
            decay_rate: 0.0,
            last_reinforced: Utc::now(),
            superseded_by: None,
            source_quote: None,
            extraction_method: Some("rule".into()),
        }
    }

    fn candidate(subject: &str, predicate: &str, object: &str, fact_type: &str, confidence: f64) -> EnricherCandidate {
        EnricherCandidate {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
            fact_type: fact_type.into(),
            confidence,
            source_quote: None,
            reasoning: "because".into(),
        }
    }

    #[test]
    fn unrecognized_fact_type_falls_back_to_kv() {
        let out = validate_candidates(
            vec![candidate("cortex", "uses", "rust", "nonsense", 0.8)],
            &[],
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].fact_type, FactType::Kv);
    }

    #[test]
    fn out_of_range_confidence_defaults() {
        let out = validate_candidates(vec![candidate("cortex", "uses", "rust", "kv", 5.0)], &[]);
        assert_eq!(out[0].confidence, DEFAULT_CANDIDATE_CONFIDENCE);
    }

    #[test]
    fn empty_predicate_or_object_dropped() {
        let out = validate_candidates(
            vec![
                candidate("cortex", "", "rust", "kv", 0.8),
                candidate("cortex", "uses", "  ", "kv", 0.8),
            ],
            &[],
        );
        assert!(out.is_empty());
    }

    #[test]
    fn duplicate_of_rule_fact_object_dropped() {
        let existing = vec![rule_fact("rust")];
        let out = validate_candidates(
            vec![candidate("cortex", "loves", "Rust programming language", "kv", 0.8)],
            &existing,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn non_duplicate_candidate_survives() {
        let existing = vec![rule_fact("rust")];
        let out = validate_candidates(vec![candidate("cortex", "uses", "sqlite", "kv", 0.8)], &existing);
        assert_eq!(out.len(), 1);
    }
}
