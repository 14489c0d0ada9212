//! Fact store (§4.E)
//!
//! Thin, validating wrapper over the store's fact CRUD: normalizes fields,
//! stamps timestamps, and exposes decay-aware staleness filtering.

use chrono::Utc;

use crate::error::{CoreError, Result};
use crate::model::{normalize_field, Fact, FactType};
use crate::store::{FactFilter, Store};

/// A validated, not-yet-persisted fact (§3 invariants: trimmed, non-empty,
/// length-capped subject/predicate/object).
#[derive(Debug, Clone)]
pub struct NewFact {
    pub memory_id: i64,
    pub subject: String,
    pub predicate: String,
    pub object: String,
    pub fact_type: FactType,
    pub confidence: f64,
    pub decay_rate: f64,
    pub source_quote: Option<String>,
    pub extraction_method: Option<String>,
}

/// Validate and insert a new fact (§3, §4.E).
pub fn add_fact(store: &Store, candidate: NewFact) -> Result<Fact> {
    let subject = normalize_field(&candidate.subject)
        .ok_or_else(|| CoreError::Invalid("fact subject is empty after trimming".into()))?;
    let predicate = normalize_field(&candidate.predicate)
        .ok_or_else(|| CoreError::Invalid("fact predicate is empty after trimming".into()))?;
    let object = normalize_field(&candidate.object)
        .ok_or_else(|| CoreError::Invalid("fact object is empty after trimming".into()))?;

    let confidence = candidate.confidence.clamp(0.0, 1.0);
    let decay_rate = candidate.decay_rate.max(0.0);

    let fact = Fact {
        id: 0,
        memory_id: candidate.memory_id,
        subject,
        predicate,
        object,
        fact_type: candidate.fact_type,
        confidence,
        decay_rate,
        last_reinforced: Utc::now(),
        superseded_by: None,
        source_quote: candidate.source_quote,
        extraction_method: candidate.extraction_method,
    };

    let id = store.insert_fact(&fact)?;
    store
        .get_fact(id)?
        .ok_or_else(|| CoreError::Invalid("fact vanished immediately after insert".into()))
}

pub fn get_fact(store: &Store, id: i64) -> Result<Option<Fact>> {
    Ok(store.get_fact(id)?)
}

pub fn list_facts(store: &Store, filter: &FactFilter) -> Result<Vec<Fact>> {
    Ok(store.list_facts(filter)?)
}

/// Facts whose effective confidence has decayed past `max_confidence` and
/// whose last reinforcement is older than `max_days` (§4.E).
pub fn list_stale(store: &Store, max_confidence: f64, max_days: f64, limit: u32) -> Result<Vec<Fact>> {
    let now = Utc::now();
    let mut filter = FactFilter::default();
    filter.active_only = true;
    let candidates = store.list_facts(&filter)?;
    let mut stale: Vec<Fact> = candidates
        .into_iter()
        .filter(|f| f.is_stale_at(now, max_confidence, max_days))
        .collect();
    stale.sort_by(|a, b| {
        a.effective_confidence_at(now)
            .partial_cmp(&b.effective_confidence_at(now))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.id.cmp(&b.id))
    });
    if limit > 0 {
        stale.truncate(limit as usize);
    }
    Ok(stale)
}

/// Set `last_reinforced` to now, resetting effective confidence back to
/// `confidence` (§4.E, §8 invariant 5).
pub fn reinforce_fact(store: &Store, id: i64) -> Result<Fact> {
    Ok(store.reinforce_fact(id)?)
}

/// Mark `old_id` superseded by `new_id`; rejects self-edges and cycles
/// (§3, §8 invariant 6).
pub fn supersede_fact(store: &Store, old_id: i64, new_id: i64) -> Result<()> {
    Ok(store.supersede_fact(old_id, new_id)?)
}
