//! Fact graph traversal (§4.F)
//!
//! Breadth-first walk over the edge table seeded either from an explicit
//! fact id or from all active facts matching a subject. Bounded depth,
//! confidence filtering, and shallowest-depth-wins when a fact is reachable
//! through more than one path.

use std::collections::{HashMap, VecDeque};

use crate::error::Result;
use crate::model::{Edge, Fact};
use crate::store::Store;

pub const MAX_DEPTH: u32 = 5;

/// One fact reached during a traversal, annotated with how it was found.
#[derive(Debug, Clone)]
pub struct GraphNode {
    pub fact: Fact,
    pub hop: u32,
    /// The edge that led here, `None` for seed nodes (hop 0).
    pub via: Option<Edge>,
}

#[derive(Debug, Clone, Default)]
pub struct TraversalOptions {
    /// Inclusive depth bound; clamped to [`MAX_DEPTH`].
    pub max_depth: u32,
    /// Drop edges whose `confidence` is below this threshold before
    /// following them, and drop any fact — seed or neighbor — whose own
    /// `confidence` falls below it (§4.F, §8 invariant 7).
    pub min_confidence: f64,
}

impl TraversalOptions {
    fn effective_max_depth(&self) -> u32 {
        if self.max_depth == 0 {
            MAX_DEPTH
        } else {
            self.max_depth.min(MAX_DEPTH)
        }
    }
}

/// BFS from a single seed fact (§4.F). Visits each fact at most once, at
/// the shallowest depth it's reachable from; emits ordered by
/// `(hop asc, confidence desc, id asc)`.
pub fn traverse_from_fact(store: &Store, seed_id: i64, options: &TraversalOptions) -> Result<Vec<GraphNode>> {
    let Some(seed) = store.get_fact(seed_id)? else {
        return Ok(Vec::new());
    };
    bfs(store, vec![seed], options)
}

/// BFS seeded from every active fact whose subject matches `subject`
/// (case-insensitive, exact), ordered `(confidence desc, id asc)` before
/// traversal begins (§4.F).
pub fn traverse_from_subject(
    store: &Store,
    subject: &str,
    source_file_prefix: Option<&str>,
    options: &TraversalOptions,
) -> Result<Vec<GraphNode>> {
    let seeds = store.facts_by_subject(subject, source_file_prefix, 0)?;
    bfs(store, seeds, options)
}

fn bfs(store: &Store, seeds: Vec<Fact>, options: &TraversalOptions) -> Result<Vec<GraphNode>> {
    let max_depth = options.effective_max_depth();
    let mut visited: HashMap<i64, GraphNode> = HashMap::new();
    let mut queue: VecDeque<(i64, u32)> = VecDeque::new();

    for seed in seeds {
        if visited.contains_key(&seed.id) {
            continue;
        }
        if seed.confidence < options.min_confidence {
            continue;
        }
        let id = seed.id;
        visited.insert(
            id,
            GraphNode {
                fact: seed,
                hop: 0,
                via: None,
            },
        );
        queue.push_back((id, 0));
    }

    while let Some((fact_id, depth)) = queue.pop_front() {
        if depth >= max_depth {
            continue;
        }
        for edge in store.edges_for_fact(fact_id)? {
            if edge.confidence < options.min_confidence {
                continue;
            }
            let neighbor_id = if edge.source_fact_id == fact_id {
                edge.target_fact_id
            } else {
                edge.source_fact_id
            };
            if visited.contains_key(&neighbor_id) {
                continue; // shallowest-depth-wins: first visit is always the shallowest under BFS
            }
            let Some(neighbor) = store.get_fact(neighbor_id)? else {
                continue;
            };
            if neighbor.superseded_by.is_some() {
                continue;
            }
            if neighbor.confidence < options.min_confidence {
                continue;
            }
            let next_depth = depth + 1;
            visited.insert(
                neighbor_id,
                GraphNode {
                    fact: neighbor,
                    hop: next_depth,
                    via: Some(edge),
                },
            );
            queue.push_back((neighbor_id, next_depth));
        }
    }

    let mut nodes: Vec<GraphNode> = visited.into_values().collect();
    nodes.sort_by(|a, b| {
        a.hop
            .cmp(&b.hop)
            .then(b.fact.confidence.partial_cmp(&a.fact.confidence).unwrap_or(std::cmp::Ordering::Equal))
            .then(a.fact.id.cmp(&b.fact.id))
    });
    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EdgeSource, FactType, Metadata, RawMemory};

    fn seed_memory(store: &Store) -> i64 {
        store
            .insert_memory(&RawMemory {
                content: "graph traversal seed memory with enough text".into(),
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

    fn make_fact(store: &Store, mid: i64, subject: &str, confidence: f64) -> i64 {
        store
            .insert_fact(&Fact {
                id: 0,
                memory_id: mid,
                subject: subject.into(),
                predicate: "relates".into(),
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
    fn bfs_respects_depth_bound() {
        let store = Store::open_in_memory().unwrap();
        let mid = seed_memory(&store);
        let ids: Vec<i64> = (0..4).map(|i| make_fact(&store, mid, &format!("n{i}"), 0.9)).collect();
        // chain: n0 -> n1 -> n2 -> n3
        for w in ids.windows(2) {
            store
                .add_edge(&Edge {
                    source_fact_id: w[0],
                    target_fact_id: w[1],
                    edge_type: "relates_to".into(),
                    confidence: 0.9,
                    source: EdgeSource::Explicit,
                })
                .unwrap();
        }
        let options = TraversalOptions {
            max_depth: 1,
            min_confidence: 0.0,
        };
        let nodes = traverse_from_fact(&store, ids[0], &options).unwrap();
        assert_eq!(nodes.len(), 2); // n0 (hop 0), n1 (hop 1)
    }

    #[test]
    fn bfs_filters_low_confidence_edges() {
        let store = Store::open_in_memory().unwrap();
        let mid = seed_memory(&store);
        let a = make_fact(&store, mid, "a", 0.9);
        let b = make_fact(&store, mid, "b", 0.9);
        store
            .add_edge(&Edge {
                source_fact_id: a,
                target_fact_id: b,
                edge_type: "relates_to".into(),
                confidence: 0.1,
                source: EdgeSource::Inferred,
            })
            .unwrap();
        let options = TraversalOptions {
            max_depth: 5,
            min_confidence: 0.5,
        };
        let nodes = traverse_from_fact(&store, a, &options).unwrap();
        assert_eq!(nodes.len(), 1);
    }

    #[test]
    fn bfs_visits_each_fact_once_at_shallowest_depth() {
        let store = Store::open_in_memory().unwrap();
        let mid = seed_memory(&store);
        let a = make_fact(&store, mid, "a", 0.9);
        let b = make_fact(&store, mid, "b", 0.9);
        let c = make_fact(&store, mid, "c", 0.9);
        // diamond: a -> b -> c, a -> c directly
        store
            .add_edge(&Edge {
                source_fact_id: a,
                target_fact_id: b,
                edge_type: "r".into(),
                confidence: 0.9,
                source: EdgeSource::Explicit,
            })
            .unwrap();
        store
            .add_edge(&Edge {
                source_fact_id: b,
                target_fact_id: c,
                edge_type: "r".into(),
                confidence: 0.9,
                source: EdgeSource::Explicit,
            })
            .unwrap();
        store
            .add_edge(&Edge {
                source_fact_id: a,
                target_fact_id: c,
                edge_type: "r".into(),
                confidence: 0.9,
                source: EdgeSource::Explicit,
            })
            .unwrap();
        let options = TraversalOptions {
            max_depth: 5,
            min_confidence: 0.0,
        };
        let nodes = traverse_from_fact(&store, a, &options).unwrap();
        assert_eq!(nodes.len(), 3);
        let c_node = nodes.iter().find(|n| n.fact.id == c).unwrap();
        assert_eq!(c_node.hop, 1); // reached directly, not via b at hop 2
    }

    #[test]
    fn bfs_filters_low_confidence_facts() {
        let store = Store::open_in_memory().unwrap();
        let mid = seed_memory(&store);
        let a = make_fact(&store, mid, "a", 0.9);
        let b = make_fact(&store, mid, "b", 0.1); // low-confidence fact, high-confidence edge
        store
            .add_edge(&Edge {
                source_fact_id: a,
                target_fact_id: b,
                edge_type: "relates_to".into(),
                confidence: 0.9,
                source: EdgeSource::Explicit,
            })
            .unwrap();
        let options = TraversalOptions {
            max_depth: 5,
            min_confidence: 0.5,
        };
        let nodes = traverse_from_fact(&store, a, &options).unwrap();
        assert_eq!(nodes.len(), 1);
        assert!(nodes.iter().all(|n| n.fact.confidence >= 0.5));
    }

    #[test]
    fn bfs_drops_low_confidence_seed() {
        let store = Store::open_in_memory().unwrap();
        let mid = seed_memory(&store);
        let low = make_fact(&store, mid, "low", 0.1);
        let options = TraversalOptions {
            max_depth: 5,
            min_confidence: 0.5,
        };
        let nodes = traverse_from_fact(&store, low, &options).unwrap();
        assert!(nodes.is_empty());
    }

    #[test]
    fn subject_seeded_traversal_orders_seeds_by_confidence() {
        let store = Store::open_in_memory().unwrap();
        let mid = seed_memory(&store);
        make_fact(&store, mid, "rust", 0.5);
        make_fact(&store, mid, "rust", 0.9);
        let options = TraversalOptions::default();
        let nodes = traverse_from_subject(&store, "rust", None, &options).unwrap();
        assert_eq!(nodes.len(), 2);
        assert!(nodes[0].fact.confidence >= nodes[1].fact.confidence);
    }
}
