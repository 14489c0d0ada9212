//! Configuration
//!
//! Plain settings structs with defaults matching §6 of the specification.
//! The core never reads environment variables or config files itself — the
//! host assembles a [`Config`] and threads it through, the same way the
//! teacher engine takes a settings struct into `Storage::new`.

use std::collections::HashSet;

use crate::model::MemoryClass;

/// Top-level ingest options (§6).
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Walk directories recursively.
    pub recursive: bool,
    /// Parse and report without writing to the store.
    pub dry_run: bool,
    /// Files larger than this are skipped.
    pub max_file_size: u64,
    /// Optional project tag applied to every ingested memory.
    pub project: Option<String>,
    /// Optional memory class applied to every ingested memory.
    pub memory_class: Option<MemoryClass>,
    /// Whether to auto-tag memories from heuristics (host-defined; the core
    /// only threads the flag through to chunk metadata).
    pub auto_tag: bool,
    /// If non-empty, only files with one of these extensions are imported.
    pub include_extensions: HashSet<String>,
    /// Files with one of these extensions are always skipped.
    pub exclude_extensions: HashSet<String>,
    /// Hygiene filter configuration.
    pub hygiene: HygieneConfig,
    /// Chunk normalization thresholds.
    pub chunk: ChunkConfig,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            dry_run: false,
            max_file_size: 10 * 1024 * 1024,
            project: None,
            memory_class: None,
            auto_tag: false,
            include_extensions: HashSet::new(),
            exclude_extensions: HashSet::new(),
            hygiene: HygieneConfig::default(),
            chunk: ChunkConfig::default(),
        }
    }
}

/// Hygiene filter configuration (§4.B, §6).
#[derive(Debug, Clone)]
pub struct HygieneConfig {
    /// Enable near-duplicate suppression.
    pub capture_dedupe_enabled: bool,
    /// Bag-of-tokens cosine similarity at/above which a chunk is suppressed
    /// as a near-duplicate.
    pub capture_similarity_threshold: f64,
    /// Only memories imported within this many seconds are considered as
    /// near-duplicate candidates.
    pub capture_dedupe_window_sec: i64,
    /// Enable low-signal suppression.
    pub capture_low_signal_enabled: bool,
    /// Bodies shorter than this (after normalization) are low-signal.
    pub capture_min_chars: usize,
    /// Case-insensitive acknowledgement patterns that mark a short body as
    /// low-signal.
    pub capture_low_signal_patterns: Vec<String>,
}

impl Default for HygieneConfig {
    fn default() -> Self {
        Self {
            capture_dedupe_enabled: true,
            capture_similarity_threshold: 0.95,
            capture_dedupe_window_sec: 300,
            capture_low_signal_enabled: true,
            capture_min_chars: 20,
            capture_low_signal_patterns: default_low_signal_patterns(),
        }
    }
}

/// Default one-liner acknowledgement patterns (§4.B). Configurable; these
/// are sensible defaults, not a hardcoded path in the filter itself.
pub fn default_low_signal_patterns() -> Vec<String> {
    [
        "ok",
        "okay",
        "yes",
        "no",
        "sure",
        "thanks",
        "thank you",
        "got it",
        "sounds good",
        "heartbeat_ok",
        "fire the test",
        "ack",
        "done",
        "noted",
        "roger",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Chunk normalization thresholds (§4.A).
#[derive(Debug, Clone, Copy)]
pub struct ChunkConfig {
    /// Chunks longer than this are split further.
    pub max_chars: usize,
    /// Chunks shorter than this are merged with a neighbor.
    pub min_chars: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_chars: 1500,
            min_chars: 50,
        }
    }
}

/// Embedding engine configuration (§4.D, §6).
#[derive(Debug, Clone, Copy)]
pub struct EmbeddingConfig {
    /// Starting (and ceiling) batch size.
    pub batch_size: usize,
    /// Whether the batch size adapts to failures.
    pub adaptive_batching: bool,
    /// Run a health check every N batches (0 disables health checks).
    pub health_check_every: u32,
    /// Maximum number of memory ids fetched per pass.
    pub fetch_limit: u32,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            adaptive_batching: true,
            health_check_every: 5,
            fetch_limit: 10_000,
        }
    }
}

/// Retrieval defaults (§4.G).
#[derive(Debug, Clone, Copy)]
pub struct RetrievalConfig {
    /// Default result limit when none is specified.
    pub default_limit: u32,
    /// Hard cap on the result limit.
    pub max_limit: u32,
    /// RRF constant `k` used by hybrid fusion.
    pub rrf_k: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 50,
            rrf_k: 60.0,
        }
    }
}

/// Impact/cluster summarizer defaults (§4.H).
#[derive(Debug, Clone, Copy)]
pub struct SummaryConfig {
    /// Default traversal depth for impact analysis.
    pub default_depth: u32,
    /// Hard cap on traversal depth.
    pub max_depth: u32,
    /// Default minimum confidence for impact analysis.
    pub default_min_confidence: f64,
    /// Default cluster listing limit.
    pub default_cluster_limit: u32,
    /// Hard cap on cluster listing limit.
    pub max_cluster_limit: u32,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            default_depth: 3,
            max_depth: 5,
            default_min_confidence: 0.3,
            default_cluster_limit: 100,
            max_cluster_limit: 500,
        }
    }
}
