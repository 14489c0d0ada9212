use tokio_util::sync::CancellationToken;

use super::{enrich_text, EmbedError, Embedder};
use crate::config::EmbeddingConfig;
use crate::error::{CoreError, Result};
use crate::store::Store;

/// Outcome of one embedding pass (§4.D).
#[derive(Debug, Clone, Default)]
pub struct EmbeddingPassResult {
    pub embedded: u32,
    pub batches_run: u32,
    pub errors: Vec<(i64, String)>,
}

/// Run the adaptive-batch vectorization protocol over every memory lacking
/// an embedding (§4.D). Honors `cancel` at every suspension point.
pub async fn run_embedding_pass(
    store: &Store,
    embedder: &dyn Embedder,
    config: &EmbeddingConfig,
    cancel: &CancellationToken,
) -> Result<EmbeddingPassResult> {
    let ids = store.memory_ids_without_embedding(config.fetch_limit)?;
    let mut result = EmbeddingPassResult::default();

    let original_batch_size = config.batch_size.max(1);
    let mut current_batch_size = original_batch_size;
    let mut consecutive_failures: u32 = 0;
    let mut consecutive_successes: u32 = 0;
    let mut position = 0usize;

    while position < ids.len() {
        if cancel.is_cancelled() {
            return Err(CoreError::Canceled {
                completed: result.embedded as usize,
            });
        }

        result.batches_run += 1;

        if config.health_check_every > 0 && result.batches_run % config.health_check_every == 0 {
            run_health_check(embedder, cancel, result.embedded).await?;
        }

        let end = (position + current_batch_size).min(ids.len());
        let batch_ids = &ids[position..end];

        let mut memories = Vec::with_capacity(batch_ids.len());
        for &id in batch_ids {
            if let Some(m) = store.get_memory(id)? {
                memories.push(m);
            }
        }
        let texts: Vec<String> = memories
            .iter()
            .map(|m| enrich_text(&m.content, &m.source_file, &m.source_section))
            .collect();

        match embedder.embed_batch(&texts) {
            Ok(vectors) if vectors.len() == texts.len() => {
                for (memory, vector) in memories.iter().zip(vectors.iter()) {
                    if vector.is_empty() {
                        result.errors.push((memory.id, "embedder returned an empty vector".into()));
                        continue;
                    }
                    store.insert_embedding(memory.id, vector)?;
                    result.embedded += 1;
                }
                consecutive_failures = 0;
                consecutive_successes += 1;
                if consecutive_successes % 3 == 0 {
                    current_batch_size = (current_batch_size * 2).min(original_batch_size);
                }
                position = end;
            }
            Ok(_) => {
                // Length mismatch: treat the whole batch as failed, same as
                // an embedder error (§4.D step 7).
                let should_retry = handle_batch_failure(
                    store,
                    embedder,
                    &memories,
                    config,
                    cancel,
                    &mut current_batch_size,
                    &mut consecutive_failures,
                    &mut consecutive_successes,
                    &mut result,
                )
                .await?;
                if should_retry {
                    continue; // retry the same position with the halved batch
                }
                position = end;
            }
            Err(_) => {
                let should_retry = handle_batch_failure(
                    store,
                    embedder,
                    &memories,
                    config,
                    cancel,
                    &mut current_batch_size,
                    &mut consecutive_failures,
                    &mut consecutive_successes,
                    &mut result,
                )
                .await?;
                if should_retry {
                    continue; // retry the same position with the halved batch
                }
                position = end;
            }
        }
    }

    Ok(result)
}

/// Handle one failed batch attempt (§4.D steps 4-5). Returns `true` when the
/// batch was only halved and backed off — the caller must retry the same
/// position with the smaller batch, not advance past it. Returns `false`
/// once every memory in `memories` has actually been handled (embedded or
/// recorded as an error), which only happens via the individual-processing
/// fallback.
#[allow(clippy::too_many_arguments)]
async fn handle_batch_failure(
    store: &Store,
    embedder: &dyn Embedder,
    memories: &[crate::model::Memory],
    config: &EmbeddingConfig,
    cancel: &CancellationToken,
    current_batch_size: &mut usize,
    consecutive_failures: &mut u32,
    consecutive_successes: &mut u32,
    result: &mut EmbeddingPassResult,
) -> Result<bool> {
    *consecutive_failures += 1;
    *consecutive_successes = 0;

    if *current_batch_size > 1 && config.adaptive_batching {
        *current_batch_size = (*current_batch_size / 2).max(1);
        let backoff = (2u64.saturating_pow(*consecutive_failures)).min(30);
        tracing::warn!(
            new_batch_size = *current_batch_size,
            backoff_secs = backoff,
            "embedding batch failed, halving batch size and backing off"
        );
        sleep_cancelable(std::time::Duration::from_secs(backoff), cancel).await?;
        return Ok(true);
    }

    // current_batch_size == 1, or adaptive batching disabled: process each
    // memory individually (§4.D step 5).
    for memory in memories {
        let text = enrich_text(&memory.content, &memory.source_file, &memory.source_section);
        match embed_one_with_retry(embedder, &text, cancel).await {
            Ok(vector) if !vector.is_empty() => {
                store.insert_embedding(memory.id, &vector)?;
                result.embedded += 1;
            }
            Ok(_) => {
                tracing::warn!(memory_id = memory.id, "embedder returned an empty vector");
                result.errors.push((memory.id, "embedder returned an empty vector".into()));
            }
            Err(e) => {
                tracing::warn!(memory_id = memory.id, error = %e, "individual embed retry failed");
                result.errors.push((memory.id, e.to_string()));
            }
        }
    }
    Ok(false)
}

async fn embed_one_with_retry(
    embedder: &dyn Embedder,
    text: &str,
    cancel: &CancellationToken,
) -> std::result::Result<Vec<f32>, EmbedError> {
    match embedder.embed(text) {
        Ok(v) => Ok(v),
        Err(e) if e.is_retryable() => {
            if sleep_cancelable(std::time::Duration::from_secs(5), cancel)
                .await
                .is_err()
            {
                return Err(e);
            }
            embedder.embed(text)
        }
        Err(e) => Err(e),
    }
}

async fn run_health_check(embedder: &dyn Embedder, cancel: &CancellationToken, completed: u32) -> Result<()> {
    for attempt in 0..3 {
        if embedder.health_check().is_ok() {
            return Ok(());
        }
        if attempt < 2 {
            sleep_cancelable(std::time::Duration::from_secs(10), cancel).await?;
        }
    }
    Err(CoreError::Fatal {
        completed: completed as usize,
        message: "embedder health check failed after 3 retries".into(),
    })
}

async fn sleep_cancelable(duration: std::time::Duration, cancel: &CancellationToken) -> Result<()> {
    tokio::select! {
        _ = tokio::time::sleep(duration) => Ok(()),
        _ = cancel.cancelled() => Err(CoreError::Canceled { completed: 0 }),
    }
}
