//! Embedding engine (§4.D)
//!
//! Adaptive-batch vectorization of memories lacking embeddings, with health
//! checks and failure-driven backoff. The embedder is an external
//! collaborator contract (§6); this module only orchestrates calling it.

mod engine;
mod enrich;

pub use engine::{run_embedding_pass, EmbeddingPassResult};
pub use enrich::enrich_text;

/// An embedder capability (§6 contract). Implementations may wrap a remote
/// service, a local model, or a test double.
pub trait Embedder: Send + Sync {
    /// Embed a single text.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;

    /// Embed a batch of texts; the result is length-preserving.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;

    /// Declared output dimension.
    fn dimensions(&self) -> usize;

    /// Optional liveness probe. Default: always healthy.
    fn health_check(&self) -> Result<(), EmbedError> {
        Ok(())
    }
}

/// An embedder call failure, classified as retryable or terminal so the
/// batching engine knows whether to back off and retry or give up (§6).
#[derive(Debug, Clone, thiserror::Error)]
pub enum EmbedError {
    #[error("transient embedder error: {0}")]
    Retryable(String),
    #[error("terminal embedder error: {0}")]
    Terminal(String),
}

impl EmbedError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, EmbedError::Retryable(_))
    }
}
