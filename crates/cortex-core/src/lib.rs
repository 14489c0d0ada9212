//! # Cortex Core
//!
//! Local knowledge-memory engine for AI agents: ingest free-form text into
//! content-addressed memories, extract subject-predicate-object facts into
//! a confidence-decaying graph, and retrieve both by keyword, by semantic
//! similarity, or by a hybrid fusion of the two.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use cortex_core::{Store, ingest};
//!
//! let store = Store::open(None)?;
//! let options = cortex_core::config::IngestOptions::default();
//! let result = ingest::ingest_path(&store, "./notes".as_ref(), &options)?;
//! println!("{} new memories", result.memories_new);
//! ```

#![warn(rustdoc::missing_crate_level_docs)]

pub mod chunk;
pub mod config;
pub mod embed;
pub mod enrich;
pub mod error;
pub mod facts;
pub mod graph;
pub mod hygiene;
pub mod ingest;
pub mod model;
pub mod parser;
pub mod retrieval;
pub mod store;
pub mod summary;

pub use config::IngestOptions;
pub use embed::{EmbedError, Embedder};
pub use enrich::{validate_candidates, EnricherCandidate, ValidatedCandidate};
pub use error::{CoreError, Result};
pub use graph::{traverse_from_fact, traverse_from_subject, GraphNode, TraversalOptions};
pub use ingest::{ingest_path, IngestResult, MemoryOutcome};
pub use model::{Edge, EdgeSource, Fact, FactType, Memory, MemoryClass};
pub use retrieval::{search, SearchMode, SearchQuery, SearchResult};
pub use store::Store;
pub use summary::{impact, list_clusters, ImpactSummary};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Convenient imports for common usage.
pub mod prelude {
    pub use crate::{
        ingest_path, search, traverse_from_fact, traverse_from_subject, Embedder, Fact, GraphNode,
        IngestOptions, IngestResult, Memory, MemoryOutcome, Result, SearchMode, SearchQuery,
        SearchResult, Store, TraversalOptions,
    };
}
