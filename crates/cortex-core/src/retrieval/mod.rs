//! Retrieval engine (§4.G)
//!
//! BM25, semantic, and hybrid (reciprocal rank fusion) search over stored
//! memories.

use crate::embed::Embedder;
use crate::error::{CoreError, Result};
use crate::model::{cosine_similarity, Memory};
use crate::store::Store;

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 50;
const RRF_K: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    Bm25,
    Semantic,
    #[default]
    Hybrid,
}

#[derive(Debug, Clone)]
pub struct SearchQuery<'a> {
    pub text: &'a str,
    pub mode: SearchMode,
    pub limit: u32,
    pub project: Option<&'a str>,
}

impl<'a> SearchQuery<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            mode: SearchMode::default(),
            limit: DEFAULT_LIMIT,
            project: None,
        }
    }

    fn effective_limit(&self) -> u32 {
        if self.limit == 0 {
            DEFAULT_LIMIT
        } else {
            self.limit.min(MAX_LIMIT)
        }
    }
}

/// A single search hit (§4.G). `bm25_score`/`semantic_score` are populated
/// only for the modes that produced them; in hybrid mode both may be set.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub memory_id: i64,
    pub content: String,
    pub source_file: String,
    pub source_line: i64,
    pub source_section: String,
    pub score: f64,
    pub bm25_score: Option<f64>,
    pub semantic_score: Option<f64>,
}

impl SearchResult {
    fn from_memory(memory: Memory, score: f64) -> Self {
        Self {
            memory_id: memory.id,
            content: memory.content,
            source_file: memory.source_file,
            source_line: memory.source_line,
            source_section: memory.source_section,
            score,
            bm25_score: None,
            semantic_score: None,
        }
    }
}

pub fn search(store: &Store, embedder: Option<&dyn Embedder>, query: &SearchQuery) -> Result<Vec<SearchResult>> {
    let limit = query.effective_limit();
    match query.mode {
        SearchMode::Bm25 => search_bm25(store, query.text, limit, query.project),
        SearchMode::Semantic => {
            let embedder = embedder.ok_or_else(|| {
                CoreError::Invalid("semantic search requires an embedder".into())
            })?;
            search_semantic(store, embedder, query.text, limit)
        }
        SearchMode::Hybrid => search_hybrid(store, embedder, query.text, limit, query.project),
    }
}

fn search_bm25(store: &Store, text: &str, limit: u32, project: Option<&str>) -> Result<Vec<SearchResult>> {
    let rows = store.search_bm25(text, limit, project)?;
    Ok(rows
        .into_iter()
        .map(|(memory, score)| {
            let mut r = SearchResult::from_memory(memory, score);
            r.bm25_score = Some(score);
            r
        })
        .collect())
}

fn search_semantic(store: &Store, embedder: &dyn Embedder, text: &str, limit: u32) -> Result<Vec<SearchResult>> {
    let query_vector = embedder
        .embed(text)
        .map_err(|e| CoreError::Invalid(format!("failed to embed query: {e}")))?;
    let ranked = rank_by_cosine(store, &query_vector, limit)?;
    Ok(ranked
        .into_iter()
        .map(|(memory, score)| {
            let mut r = SearchResult::from_memory(memory, score);
            r.semantic_score = Some(score);
            r
        })
        .collect())
}

fn rank_by_cosine(store: &Store, query_vector: &[f32], limit: u32) -> Result<Vec<(Memory, f64)>> {
    let embeddings = store.all_embeddings()?;
    let mut scored: Vec<(i64, f64)> = embeddings
        .iter()
        .map(|e| (e.memory_id, cosine_similarity(query_vector, &e.vector) as f64))
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then(a.0.cmp(&b.0)));
    scored.truncate(limit as usize);

    let mut results = Vec::with_capacity(scored.len());
    for (memory_id, score) in scored {
        if let Some(memory) = store.get_memory(memory_id)? {
            results.push((memory, score));
        }
    }
    Ok(results)
}

/// Reciprocal rank fusion of independently-run BM25 and semantic candidate
/// lists, each fetched at `2*limit` (§4.G).
fn search_hybrid(
    store: &Store,
    embedder: Option<&dyn Embedder>,
    text: &str,
    limit: u32,
    project: Option<&str>,
) -> Result<Vec<SearchResult>> {
    let fetch = (limit * 2).max(limit);

    let bm25_rows = store.search_bm25(text, fetch, project)?;
    let semantic_rows = match embedder {
        Some(embedder) => {
            let query_vector = embedder
                .embed(text)
                .map_err(|e| CoreError::Invalid(format!("failed to embed query: {e}")))?;
            rank_by_cosine(store, &query_vector, fetch)?
        }
        None => Vec::new(),
    };

    let mut fused: std::collections::HashMap<i64, (Memory, f64, Option<f64>, Option<f64>)> =
        std::collections::HashMap::new();

    for (rank, (memory, score)) in bm25_rows.into_iter().enumerate() {
        let rrf = 1.0 / (RRF_K + (rank as f64 + 1.0));
        let entry = fused
            .entry(memory.id)
            .or_insert_with(|| (memory.clone(), 0.0, None, None));
        entry.1 += rrf;
        entry.2 = Some(score);
    }
    for (rank, (memory, score)) in semantic_rows.into_iter().enumerate() {
        let rrf = 1.0 / (RRF_K + (rank as f64 + 1.0));
        let entry = fused
            .entry(memory.id)
            .or_insert_with(|| (memory.clone(), 0.0, None, None));
        entry.1 += rrf;
        entry.3 = Some(score);
    }

    let mut results: Vec<SearchResult> = fused
        .into_values()
        .map(|(memory, combined, bm25, semantic)| {
            let mut r = SearchResult::from_memory(memory, combined);
            r.bm25_score = bm25;
            r.semantic_score = semantic;
            r
        })
        .collect();
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.memory_id.cmp(&b.memory_id))
    });
    results.truncate(limit as usize);
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::EmbedError;
    use crate::model::{Metadata, RawMemory};

    struct StubEmbedder;
    impl Embedder for StubEmbedder {
        fn embed(&self, _text: &str) -> std::result::Result<Vec<f32>, EmbedError> {
            Ok(vec![1.0, 0.0, 0.0])
        }
        fn embed_batch(&self, texts: &[String]) -> std::result::Result<Vec<Vec<f32>>, EmbedError> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0, 0.0]).collect())
        }
        fn dimensions(&self) -> usize {
            3
        }
    }

    fn seed(store: &Store, content: &str) -> i64 {
        store
            .insert_memory(&RawMemory {
                content: content.into(),
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

    #[test]
    fn bm25_mode_returns_matching_memory() {
        let store = Store::open_in_memory().unwrap();
        seed(&store, "the quick brown fox jumps");
        seed(&store, "totally unrelated content here");
        let query = SearchQuery {
            text: "fox",
            mode: SearchMode::Bm25,
            limit: 10,
            project: None,
        };
        let results = search(&store, None, &query).unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].bm25_score.is_some());
    }

    #[test]
    fn semantic_mode_requires_embedder() {
        let store = Store::open_in_memory().unwrap();
        let query = SearchQuery {
            text: "fox",
            mode: SearchMode::Semantic,
            limit: 10,
            project: None,
        };
        assert!(search(&store, None, &query).is_err());
    }

    #[test]
    fn semantic_mode_ranks_by_cosine() {
        let store = Store::open_in_memory().unwrap();
        let id = seed(&store, "vectorized content");
        store.insert_embedding(id, &[1.0, 0.0, 0.0]).unwrap();
        let embedder = StubEmbedder;
        let query = SearchQuery {
            text: "whatever",
            mode: SearchMode::Semantic,
            limit: 10,
            project: None,
        };
        let results = search(&store, Some(&embedder), &query).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].memory_id, id);
    }

    #[test]
    fn hybrid_mode_fuses_bm25_only_hit() {
        let store = Store::open_in_memory().unwrap();
        seed(&store, "the quick brown fox jumps");
        let embedder = StubEmbedder;
        let query = SearchQuery::new("fox");
        let results = search(&store, Some(&embedder), &query).unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].bm25_score.is_some());
    }
}
