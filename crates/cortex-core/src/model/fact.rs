use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The closed set of fact types (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactType {
    Kv,
    Relationship,
    Preference,
    Temporal,
    Identity,
    Location,
    Decision,
    State,
}

impl FactType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FactType::Kv => "kv",
            FactType::Relationship => "relationship",
            FactType::Preference => "preference",
            FactType::Temporal => "temporal",
            FactType::Identity => "identity",
            FactType::Location => "location",
            FactType::Decision => "decision",
            FactType::State => "state",
        }
    }

    /// Parse, falling back to `Kv` for anything outside the closed enum —
    /// this is the enricher-contract fallback behavior from §6, not a
    /// general-purpose default.
    pub fn parse_or_kv(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "kv" => FactType::Kv,
            "relationship" => FactType::Relationship,
            "preference" => FactType::Preference,
            "temporal" => FactType::Temporal,
            "identity" => FactType::Identity,
            "location" => FactType::Location,
            "decision" => FactType::Decision,
            "state" => FactType::State,
            _ => FactType::Kv,
        }
    }
}

/// An extracted subject-predicate-object assertion (§3).
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fact {
    pub id: i64,
    pub memory_id: i64,
    pub subject: String,
    pub predicate: String,
    pub object: String,
    pub fact_type: FactType,
    pub confidence: f64,
    pub decay_rate: f64,
    pub last_reinforced: DateTime<Utc>,
    pub superseded_by: Option<i64>,
    pub source_quote: Option<String>,
    pub extraction_method: Option<String>,
}

impl Fact {
    /// `confidence · exp(-decay_rate · Δdays)` where `Δdays = max(0, (now −
    /// last_reinforced) / 86400)` (§4.E).
    pub fn effective_confidence_at(&self, now: DateTime<Utc>) -> f64 {
        let delta_days = days_since(self.last_reinforced, now);
        self.confidence * (-self.decay_rate * delta_days).exp()
    }

    /// A fact is active (queryable, graph-traversable) while it hasn't been
    /// superseded.
    pub fn is_active(&self) -> bool {
        self.superseded_by.is_none()
    }

    /// Stale per §4.E: effective confidence strictly below `max_confidence`
    /// AND elapsed days strictly above `max_days`.
    pub fn is_stale_at(&self, now: DateTime<Utc>, max_confidence: f64, max_days: f64) -> bool {
        let delta_days = days_since(self.last_reinforced, now);
        self.effective_confidence_at(now) < max_confidence && delta_days > max_days
    }
}

/// Whole (possibly fractional) days elapsed, floored at zero — timestamps in
/// a valid store never run ahead of `now`, but clock skew shouldn't produce
/// a negative decay exponent.
pub fn days_since(then: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let seconds = (now - then).num_milliseconds() as f64 / 1000.0;
    (seconds / 86_400.0).max(0.0)
}

/// Length cap applied to subject/predicate/object after trimming (§3).
pub const FIELD_MAX_LEN: usize = 500;

/// Trim and validate a fact field: non-empty, length-capped. Returns `None`
/// if the trimmed field is empty.
pub fn normalize_field(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(FIELD_MAX_LEN).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn base_fact(confidence: f64, decay_rate: f64, last_reinforced: DateTime<Utc>) -> Fact {
        Fact {
            id: 1,
            memory_id: 1,
            subject: "cortex".into(),
            predicate: "uses".into(),
            object: "rust".into(),
            fact_type: FactType::Kv,
            confidence,
            decay_rate,
            last_reinforced,
            superseded_by: None,
            source_quote: None,
            extraction_method: None,
        }
    }

    #[test]
    fn decay_monotonically_decreases() {
        let now = Utc::now();
        let f = base_fact(0.9, 0.1, now - Duration::days(10));
        let c0 = f.effective_confidence_at(now - Duration::days(10));
        let c5 = f.effective_confidence_at(now - Duration::days(5));
        let c10 = f.effective_confidence_at(now);
        assert!(c0 > c5);
        assert!(c5 > c10);
    }

    #[test]
    fn zero_decay_rate_never_decays() {
        let now = Utc::now();
        let f = base_fact(0.7, 0.0, now - Duration::days(365));
        assert!((f.effective_confidence_at(now) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn stale_requires_both_conditions() {
        let now = Utc::now();
        // Low confidence but recent: not stale.
        let recent_low = base_fact(0.01, 5.0, now - Duration::hours(1));
        assert!(!recent_low.is_stale_at(now, 0.3, 30.0));

        // Old but still confident (slow decay): not stale.
        let old_high = base_fact(0.99, 0.0001, now - Duration::days(365));
        assert!(!old_high.is_stale_at(now, 0.3, 30.0));

        // Old and low confidence: stale.
        let old_low = base_fact(0.5, 1.0, now - Duration::days(365));
        assert!(old_low.is_stale_at(now, 0.3, 30.0));
    }

    #[test]
    fn field_normalization_trims_and_caps() {
        assert_eq!(normalize_field("  hi  "), Some("hi".to_string()));
        assert_eq!(normalize_field("   "), None);
        let long = "x".repeat(FIELD_MAX_LEN + 50);
        assert_eq!(normalize_field(&long).unwrap().len(), FIELD_MAX_LEN);
    }
}
