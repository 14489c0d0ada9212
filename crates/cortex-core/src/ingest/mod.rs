//! Ingest engine (§4.C)
//!
//! Orchestrates the chunker (§4.A), the hygiene filter (§4.B), and the
//! store coordinator (§4.I) for single files and whole directories.

mod walk;

use std::path::{Path, PathBuf};

use crate::chunk::{chunk_text, normalize_chunks, RawChunk};
use crate::config::IngestOptions;
use crate::error::{CoreError, Result};
use crate::hygiene;
use crate::model::RawMemory;
use crate::parser;
use crate::store::{InsertOutcome, Store};

pub use walk::walk_directory;

/// A single walk-time or import-time error (§4.C, §7).
#[derive(Debug, Clone)]
pub struct IngestError {
    pub path: PathBuf,
    pub line: Option<i64>,
    pub message: String,
}

/// Aggregated result of one ingest pass (§4.C, §7).
#[derive(Debug, Clone, Default)]
pub struct IngestResult {
    pub files_scanned: u32,
    pub files_imported: u32,
    pub files_skipped: u32,
    pub memories_new: u32,
    pub memories_updated: u32,
    pub memories_unchanged: u32,
    pub memories_near_duped: u32,
    pub errors: Vec<IngestError>,
}

impl IngestResult {
    fn record_outcome(&mut self, outcome: MemoryOutcome) {
        match outcome {
            MemoryOutcome::New => self.memories_new += 1,
            MemoryOutcome::Updated => self.memories_updated += 1,
            MemoryOutcome::Unchanged => self.memories_unchanged += 1,
            MemoryOutcome::NearDuplicate => self.memories_near_duped += 1,
        }
    }

    fn merge(&mut self, other: IngestResult) {
        self.files_scanned += other.files_scanned;
        self.files_imported += other.files_imported;
        self.files_skipped += other.files_skipped;
        self.memories_new += other.memories_new;
        self.memories_updated += other.memories_updated;
        self.memories_unchanged += other.memories_unchanged;
        self.memories_near_duped += other.memories_near_duped;
        self.errors.extend(other.errors);
    }
}

pub enum MemoryOutcome {
    New,
    Updated,
    Unchanged,
    NearDuplicate,
}

/// First 512 bytes contain a zero byte or invalid UTF-8 ⇒ binary (§4.C).
fn looks_binary(bytes: &[u8]) -> bool {
    let sample = &bytes[..bytes.len().min(512)];
    if sample.contains(&0) {
        return true;
    }
    std::str::from_utf8(sample).is_err()
}

/// Ingest a single file or a directory tree, per `options`.
pub fn ingest_path(store: &Store, path: &Path, options: &IngestOptions) -> Result<IngestResult> {
    let absolute = path
        .canonicalize()
        .map_err(|e| CoreError::Invalid(format!("{}: {e}", path.display())))?;

    if absolute.is_dir() {
        if absolute.is_symlink() {
            let mut result = IngestResult::default();
            result.errors.push(IngestError {
                path: absolute,
                line: None,
                message: "symlinked directory rejected".into(),
            });
            return Ok(result);
        }
        return ingest_directory(store, &absolute, options);
    }

    ingest_file(store, &absolute, options)
}

/// Ingest one file. `path` must already be absolute.
pub fn ingest_file(store: &Store, path: &Path, options: &IngestOptions) -> Result<IngestResult> {
    let mut result = IngestResult {
        files_scanned: 1,
        ..Default::default()
    };

    if let Some(parent) = path.parent() {
        if parent.is_symlink() {
            result.files_skipped += 1;
            result.errors.push(IngestError {
                path: path.to_path_buf(),
                line: None,
                message: "symlinked directory rejected".into(),
            });
            return Ok(result);
        }
    }

    let metadata = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) => {
            result.files_skipped += 1;
            result.errors.push(IngestError {
                path: path.to_path_buf(),
                line: None,
                message: e.to_string(),
            });
            return Ok(result);
        }
    };

    if metadata.len() > options.max_file_size {
        result.files_skipped += 1;
        result.errors.push(IngestError {
            path: path.to_path_buf(),
            line: None,
            message: format!("file exceeds max_file_size ({} bytes)", options.max_file_size),
        });
        return Ok(result);
    }

    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            result.files_skipped += 1;
            result.errors.push(IngestError {
                path: path.to_path_buf(),
                line: None,
                message: e.to_string(),
            });
            return Ok(result);
        }
    };

    if looks_binary(&bytes) {
        result.files_skipped += 1;
        result.errors.push(IngestError {
            path: path.to_path_buf(),
            line: None,
            message: "binary content skipped".into(),
        });
        return Ok(result);
    }

    let content = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(_) => {
            result.files_skipped += 1;
            result.errors.push(IngestError {
                path: path.to_path_buf(),
                line: None,
                message: "invalid UTF-8".into(),
            });
            return Ok(result);
        }
    };

    // Evaluate low-signal suppression on the whole pre-chunk body first
    // (§4.B): a captured `### User/### Assistant` envelope whose user half
    // is a one-word acknowledgement is low-signal as a whole, but the
    // header splitter would otherwise carve it into per-speaker chunks that
    // each individually fall under the garbage-length floor and vanish
    // silently instead of being reported as a suppressed memory.
    if options.hygiene.capture_low_signal_enabled
        && hygiene::is_low_signal(
            &content,
            options.hygiene.capture_min_chars,
            &options.hygiene.capture_low_signal_patterns,
        )
    {
        result.files_imported = 1;
        result.memories_unchanged += 1;
        return Ok(result);
    }

    let chunks = match parser::parse_file(path, &content) {
        Ok(c) => c,
        Err(e) => {
            result.files_skipped += 1;
            result.errors.push(IngestError {
                path: path.to_path_buf(),
                line: None,
                message: e.to_string(),
            });
            return Ok(result);
        }
    };

    let normalized = normalize_chunks(chunks, &options.chunk);
    if normalized.is_empty() {
        return Ok(result);
    }

    result.files_imported = 1;

    for chunk in normalized {
        let raw = chunk_to_raw_memory(chunk, path, options);
        match process_memory(store, &raw, options) {
            Ok(outcome) => result.record_outcome(outcome),
            Err(e) => {
                tracing::warn!(path = %path.display(), line = raw.source_line, error = %e, "failed to import chunk");
                result.errors.push(IngestError {
                    path: path.to_path_buf(),
                    line: Some(raw.source_line),
                    message: e.to_string(),
                });
            }
        }
    }

    Ok(result)
}

fn chunk_to_raw_memory(chunk: RawChunk, path: &Path, options: &IngestOptions) -> RawMemory {
    RawMemory {
        content: chunk.content,
        source_file: path.display().to_string(),
        source_line: chunk.source_line,
        source_section: chunk.source_section,
        project: options.project.clone(),
        memory_class: options.memory_class,
        metadata: chunk.metadata,
    }
}

fn ingest_directory(store: &Store, dir: &Path, options: &IngestOptions) -> Result<IngestResult> {
    let mut result = IngestResult::default();
    let (files, walk_errors) = walk_directory(dir, options.recursive, &options.include_extensions, &options.exclude_extensions);
    result.errors.extend(walk_errors);

    for file in files {
        let file_result = ingest_file(store, &file, options)?;
        result.merge(file_result);
    }

    Ok(result)
}

/// Run the hash-dedup, low-signal, and near-duplicate passes in that order
/// (§4.B, §4.C), inserting only if the content survives all three.
pub fn process_memory(store: &Store, raw: &RawMemory, options: &IngestOptions) -> Result<MemoryOutcome> {
    let hash = raw.content_hash();

    if let Some(_existing) = store.get_memory_by_hash(&hash)? {
        if options.dry_run {
            // Parse/report only: mirror the outcome an insert would produce
            // without writing to the store.
            return Ok(if raw.metadata.is_empty() {
                MemoryOutcome::Unchanged
            } else {
                MemoryOutcome::Updated
            });
        }
        return match store.insert_memory(raw)? {
            InsertOutcome::New(_) => Ok(MemoryOutcome::New),
            InsertOutcome::Updated(_) => Ok(MemoryOutcome::Updated),
            InsertOutcome::Unchanged(_) => Ok(MemoryOutcome::Unchanged),
        };
    }

    if options.hygiene.capture_low_signal_enabled
        && hygiene::is_low_signal(
            &raw.content,
            options.hygiene.capture_min_chars,
            &options.hygiene.capture_low_signal_patterns,
        )
    {
        return Ok(MemoryOutcome::Unchanged);
    }

    if options.hygiene.capture_dedupe_enabled {
        let window = store.recent_memories(100)?;
        let now = chrono::Utc::now();
        let in_window: Vec<&str> = window
            .iter()
            .filter(|m| (now - m.imported_at).num_seconds() <= options.hygiene.capture_dedupe_window_sec)
            .map(|m| m.content.as_str())
            .collect();
        if hygiene::is_near_duplicate(&raw.content, &in_window, options.hygiene.capture_similarity_threshold) {
            tracing::debug!(source_file = %raw.source_file, "suppressed near-duplicate memory");
            return Ok(MemoryOutcome::NearDuplicate);
        }
    }

    if options.dry_run {
        return Ok(MemoryOutcome::New);
    }

    match store.insert_memory(raw)? {
        InsertOutcome::New(_) => Ok(MemoryOutcome::New),
        InsertOutcome::Updated(_) => Ok(MemoryOutcome::Updated),
        InsertOutcome::Unchanged(_) => Ok(MemoryOutcome::Unchanged),
    }
}
