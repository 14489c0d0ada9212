use serde::{Deserialize, Serialize};

/// An insertion-ordered string-to-string mapping.
///
/// `spec.md` calls `Memory::metadata` an "ordered mapping" — a `HashMap`
/// would silently drop that guarantee, so this wraps a `Vec` of pairs
/// instead. Lookups are linear, which is fine: metadata maps are small
/// (front-matter keys, a handful of tags).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(pub Vec<(String, String)>);

impl Metadata {
    /// An empty metadata map.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Look up a key, returning the first match.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Insert or replace a key's value, preserving first-seen order on
    /// replace.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(existing) = self.0.iter_mut().find(|(k, _)| *k == key) {
            existing.1 = value;
        } else {
            self.0.push((key, value));
        }
    }

    /// True if no entries are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serialize to a JSON array of `[key, value]` pairs for storage. A
    /// JSON object would round-trip through `serde_json::Map`, which
    /// without the `preserve_order` feature is a `BTreeMap` and would
    /// re-sort keys alphabetically; an array of pairs preserves insertion
    /// order exactly.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "[]".to_string())
    }

    /// Parse from the `[key, value]`-pairs array format written by
    /// [`to_json`](Self::to_json).
    pub fn from_json(s: &str) -> Self {
        serde_json::from_str::<Vec<(String, String)>>(s)
            .map(Self)
            .unwrap_or_else(|_| Self::new())
    }
}
