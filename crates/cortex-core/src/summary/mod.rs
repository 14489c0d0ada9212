//! Impact and cluster summarizer (§4.H)

use std::collections::HashSet;

use crate::error::Result;
use crate::graph::{traverse_from_subject, GraphNode, TraversalOptions};
use crate::model::{Cluster, ClusterSubject, Fact};
use crate::store::Store;

pub const DEFAULT_IMPACT_DEPTH: u32 = 3;
pub const DEFAULT_IMPACT_MIN_CONFIDENCE: f64 = 0.3;
pub const DEFAULT_CLUSTER_LIMIT: u32 = 100;
pub const MAX_CLUSTER_LIMIT: u32 = 500;

/// Predicate group a fact is bucketed into for impact summaries (§4.H).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PredicateGroup {
    HasTool,
    HasConfig,
    HasStrategy,
    HasLocation,
    DependsOn,
    RelatedTo,
    Other,
}

impl PredicateGroup {
    pub fn name(&self) -> &'static str {
        match self {
            PredicateGroup::HasTool => "has_tool",
            PredicateGroup::HasConfig => "has_config",
            PredicateGroup::HasStrategy => "has_strategy",
            PredicateGroup::HasLocation => "has_location",
            PredicateGroup::DependsOn => "depends_on",
            PredicateGroup::RelatedTo => "related_to",
            PredicateGroup::Other => "other",
        }
    }

    fn classify(predicate: &str) -> Self {
        let p = predicate.to_lowercase();
        const TOOL: &[&str] = &["tool", "uses", "platform", "app", "service", "stack"];
        const CONFIG: &[&str] = &["config", "setting", "flag", "parameter", "env"];
        const STRATEGY: &[&str] = &["strategy", "approach", "method", "plan"];
        const LOCATION: &[&str] = &["location", "region", "city", "country", "address"];
        const DEPENDS: &[&str] = &["depend", "requires", "blocked"];
        const RELATED: &[&str] = &["relates", "linked", "connected"];

        if TOOL.iter().any(|k| p.contains(k)) {
            PredicateGroup::HasTool
        } else if CONFIG.iter().any(|k| p.contains(k)) {
            PredicateGroup::HasConfig
        } else if STRATEGY.iter().any(|k| p.contains(k)) {
            PredicateGroup::HasStrategy
        } else if LOCATION.iter().any(|k| p.contains(k)) {
            PredicateGroup::HasLocation
        } else if DEPENDS.iter().any(|k| p.contains(k)) {
            PredicateGroup::DependsOn
        } else if RELATED.iter().any(|k| p.contains(k)) {
            PredicateGroup::RelatedTo
        } else {
            PredicateGroup::Other
        }
    }
}

#[derive(Debug, Clone)]
pub struct GroupSummary {
    pub group: PredicateGroup,
    pub fact_count: usize,
    pub avg_confidence: f64,
    pub facts: Vec<Fact>,
}

#[derive(Debug, Clone, Default)]
pub struct ConfidenceDistribution {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone)]
pub struct ImpactSummary {
    pub root_subject: String,
    pub groups: Vec<GroupSummary>,
    pub confidence_distribution: ConfidenceDistribution,
    pub connected_subjects: Vec<String>,
}

/// Subject-seeded impact analysis (§4.H).
pub fn impact(store: &Store, subject: &str, depth: u32, min_confidence: f64) -> Result<ImpactSummary> {
    let options = TraversalOptions {
        max_depth: if depth == 0 { DEFAULT_IMPACT_DEPTH } else { depth.min(5) },
        min_confidence: if min_confidence < 0.0 {
            DEFAULT_IMPACT_MIN_CONFIDENCE
        } else {
            min_confidence
        },
    };
    let nodes: Vec<GraphNode> = traverse_from_subject(store, subject, None, &options)?;

    let mut by_group: std::collections::HashMap<PredicateGroup, Vec<Fact>> = std::collections::HashMap::new();
    let mut distribution = ConfidenceDistribution::default();
    let mut connected: HashSet<String> = HashSet::new();
    let root_lower = subject.trim().to_lowercase();

    for node in &nodes {
        let fact = &node.fact;
        let group = PredicateGroup::classify(&fact.predicate);
        by_group.entry(group).or_default().push(fact.clone());

        if fact.confidence >= 0.7 {
            distribution.high += 1;
        } else if fact.confidence >= 0.3 {
            distribution.medium += 1;
        } else {
            distribution.low += 1;
        }

        if fact.subject.trim().to_lowercase() != root_lower {
            connected.insert(fact.subject.clone());
        }
    }

    let mut groups: Vec<GroupSummary> = by_group
        .into_iter()
        .map(|(group, mut facts)| {
            facts.sort_by(|a, b| {
                b.confidence
                    .partial_cmp(&a.confidence)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.id.cmp(&b.id))
            });
            let avg_confidence = if facts.is_empty() {
                0.0
            } else {
                facts.iter().map(|f| f.confidence).sum::<f64>() / facts.len() as f64
            };
            GroupSummary {
                group,
                fact_count: facts.len(),
                avg_confidence,
                facts,
            }
        })
        .collect();
    groups.sort_by(|a, b| b.fact_count.cmp(&a.fact_count).then(a.group.name().cmp(b.group.name())));

    let mut connected_subjects: Vec<String> = connected.into_iter().collect();
    connected_subjects.sort();

    Ok(ImpactSummary {
        root_subject: subject.to_string(),
        groups,
        confidence_distribution: distribution,
        connected_subjects,
    })
}

#[derive(Debug, Clone)]
pub struct ClusterDetail {
    pub cluster: Cluster,
    pub top_subjects: Vec<ClusterSubject>,
}

#[derive(Debug, Clone)]
pub struct ClustersPayload {
    pub available: bool,
    pub clusters: Vec<ClusterDetail>,
}

/// List clusters with their top subjects, degrading gracefully to
/// `available=false` if the cluster tables hold no rows (§4.H).
pub fn list_clusters(store: &Store, limit: u32) -> Result<ClustersPayload> {
    if !store.clusters_table_has_rows()? {
        return Ok(ClustersPayload {
            available: false,
            clusters: Vec::new(),
        });
    }
    let effective_limit = if limit == 0 {
        DEFAULT_CLUSTER_LIMIT
    } else {
        limit.min(MAX_CLUSTER_LIMIT)
    };
    let clusters = store.list_clusters(effective_limit)?;
    let mut details = Vec::with_capacity(clusters.len());
    for cluster in clusters {
        let top_subjects = store.top_subjects_for_cluster(cluster.id, 5)?;
        details.push(ClusterDetail { cluster, top_subjects });
    }
    Ok(ClustersPayload {
        available: true,
        clusters: details,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Edge, EdgeSource, FactType, Metadata, RawMemory};

    fn seed_memory(store: &Store) -> i64 {
        store
            .insert_memory(&RawMemory {
                content: "impact summary seed memory with enough text".into(),
                source_file: "a.md".into(),
                source_line: 1,
                source_section: String::new(),
                project: None,
                memory_class: None,
                metadata: Metadata::new(),
            })
            .unwrap()
            .memory()
            .id
    }

    fn make_fact(store: &Store, mid: i64, subject: &str, predicate: &str, confidence: f64) -> i64 {
        store
            .insert_fact(&Fact {
                id: 0,
                memory_id: mid,
                subject: subject.into(),
                predicate: predicate.into(),
                object: "thing".into(),
                fact_type: FactType::Kv,
                confidence,
                decay_rate: 0.0,
                last_reinforced: chrono::Utc::now(),
                superseded_by: None,
                source_quote: None,
                extraction_method: None,
            })
            .unwrap()
    }

    #[test]
    fn predicate_group_classification() {
        assert_eq!(PredicateGroup::classify("uses_tool"), PredicateGroup::HasTool);
        assert_eq!(PredicateGroup::classify("has_config_flag"), PredicateGroup::HasConfig);
        assert_eq!(PredicateGroup::classify("prefers_strategy"), PredicateGroup::HasStrategy);
        assert_eq!(PredicateGroup::classify("lives_in_location"), PredicateGroup::HasLocation);
        assert_eq!(PredicateGroup::classify("depends_on"), PredicateGroup::DependsOn);
        assert_eq!(PredicateGroup::classify("relates_to"), PredicateGroup::RelatedTo);
        assert_eq!(PredicateGroup::classify("whatever"), PredicateGroup::Other);
    }

    #[test]
    fn impact_groups_and_orders_facts() {
        let store = Store::open_in_memory().unwrap();
        let mid = seed_memory(&store);
        let root = make_fact(&store, mid, "cortex", "uses_tool", 0.9);
        let neighbor = make_fact(&store, mid, "rust", "uses_tool", 0.8);
        store
            .add_edge(&Edge {
                source_fact_id: root,
                target_fact_id: neighbor,
                edge_type: "relates_to".into(),
                confidence: 0.9,
                source: EdgeSource::Explicit,
            })
            .unwrap();

        let summary = impact(&store, "cortex", 3, 0.3).unwrap();
        assert_eq!(summary.groups.len(), 1);
        assert_eq!(summary.groups[0].group, PredicateGroup::HasTool);
        assert_eq!(summary.groups[0].fact_count, 2);
        assert_eq!(summary.connected_subjects, vec!["rust".to_string()]);
    }

    #[test]
    fn clusters_unavailable_when_no_rows() {
        let store = Store::open_in_memory().unwrap();
        let payload = list_clusters(&store, 100).unwrap();
        assert!(!payload.available);
        assert!(payload.clusters.is_empty());
    }
}
