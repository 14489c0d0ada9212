//! Hygiene filter (§4.B)
//!
//! Three independent passes run by the ingest engine in order: content-hash
//! dedup (store-level, see `store::Store::insert_memory`), low-signal
//! suppression, and near-duplicate suppression.

mod lowsignal;
mod nearduplicate;

pub use lowsignal::{is_low_signal, sanitize_captured_text};
pub use nearduplicate::{is_near_duplicate, tokenize};
