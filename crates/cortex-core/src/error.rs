//! Core error taxonomy
//!
//! Every fallible operation in the core returns one of these kinds. The
//! propagation policy (see design docs) is: `Fatal` and `Canceled` bubble up
//! out of batch operations; everything else is classified and aggregated by
//! the caller into a per-item error list.

use std::path::PathBuf;

/// Errors surfaced directly by the store.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Unique-hash collision on insert. A distinguished variant, not a
    /// string match, so callers can recover locally without parsing
    /// `rusqlite`'s error text.
    #[error("duplicate content hash")]
    DuplicateHash,
    /// The referenced row does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// Lock was poisoned by a panicking holder.
    #[error("store lock poisoned")]
    LockPoisoned,
    /// Underlying SQLite error.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// IO error opening/creating the database file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Store could not be initialized.
    #[error("initialization error: {0}")]
    Init(String),
}

/// The top-level error kind for the core engines.
///
/// Mirrors §7 of the specification: `Duplicate` and `Transient` are meant to
/// be recovered locally by the engine that produced them; `Invalid` and
/// `Skipped` are surfaced as per-item entries; only `Fatal` and `Canceled`
/// propagate out of a batch operation.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Unique-hash collision; recovered locally by the ingest engine.
    #[error("duplicate memory")]
    Duplicate,
    /// A file was skipped (too large, binary, symlinked directory, no
    /// importer for its content).
    #[error("skipped {path}: {reason}")]
    Skipped {
        /// The file that was skipped.
        path: PathBuf,
        /// Why it was skipped.
        reason: String,
    },
    /// A retryable failure from an external collaborator (embedder timeout,
    /// rate limit, or any error the collaborator classifies as retryable).
    #[error("transient error: {0}")]
    Transient(String),
    /// Malformed input: bad JSON, invalid memory class, invalid fact type.
    #[error("invalid input: {0}")]
    Invalid(String),
    /// The operation's cancellation token was triggered.
    #[error("operation canceled after {completed} item(s)")]
    Canceled {
        /// Number of items that completed before cancellation.
        completed: usize,
    },
    /// Unrecoverable failure: store corruption, dimension mismatch,
    /// exhausted embedder health retries. Names the position (count of
    /// completed items) so the caller can restart from there.
    #[error("fatal error after {completed} item(s): {message}")]
    Fatal {
        /// Number of items completed before the fatal error.
        completed: usize,
        /// Description of the failure.
        message: String,
    },
    /// A lower-level store error.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<rusqlite::Error> for CoreError {
    fn from(e: rusqlite::Error) -> Self {
        CoreError::Store(StoreError::Database(e))
    }
}

/// Result alias used throughout the core.
pub type Result<T> = std::result::Result<T, CoreError>;
