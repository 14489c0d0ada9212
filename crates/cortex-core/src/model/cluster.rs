use serde::{Deserialize, Serialize};

/// A topic grouping populated by an out-of-band job (§3). Core components
/// read clusters; they never write them.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub id: i64,
    pub name: String,
    pub aliases: Vec<String>,
    pub cohesion: f64,
    pub fact_count: i64,
    pub avg_confidence: f64,
}

/// A `(fact_id, cluster_id, relevance)` association row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterAssociation {
    pub fact_id: i64,
    pub cluster_id: i64,
    pub relevance: f64,
}

/// A top subject within a cluster, by fact count (§4.H).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSubject {
    pub subject: String,
    pub fact_count: i64,
}
