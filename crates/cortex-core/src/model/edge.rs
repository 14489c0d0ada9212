use serde::{Deserialize, Serialize};

/// Provenance of an edge: was it stated explicitly, or inferred?
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeSource {
    Explicit,
    Inferred,
}

impl EdgeSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeSource::Explicit => "explicit",
            EdgeSource::Inferred => "inferred",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "explicit" => EdgeSource::Explicit,
            _ => EdgeSource::Inferred,
        }
    }
}

/// A typed link between two facts (§3). `edge_type` is free-form (e.g.
/// `relates_to`, `supports`) — unlike `FactType`, the spec does not close
/// this enum.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub source_fact_id: i64,
    pub target_fact_id: i64,
    pub edge_type: String,
    pub confidence: f64,
    pub source: EdgeSource,
}

impl Edge {
    /// No self-edges; `(source, target, type)` is unique (§3 invariant).
    pub fn is_valid(&self) -> bool {
        self.source_fact_id != self.target_fact_id
    }
}
