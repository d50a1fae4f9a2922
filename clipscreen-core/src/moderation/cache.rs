//! Text embedding cache keyed by the exact word string.
//!
//! Entries are valid for one vocabulary version. The first lookup that
//! observes a newer version empties the cache.

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct TextEmbeddingCache {
    version: u64,
    entries: HashMap<String, Vec<f32>>,
}

impl TextEmbeddingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Brings the cache up to `version`, clearing it if it was built for an
    /// older one.
    pub fn sync(&mut self, version: u64) {
        if version != self.version {
            if !self.entries.is_empty() {
                log::debug!(
                    "Vocabulary changed (v{} -> v{}), dropping {} cached text embeddings",
                    self.version,
                    version,
                    self.entries.len()
                );
            }
            self.entries.clear();
            self.version = version;
        }
    }

    pub fn get(&self, word: &str) -> Option<&[f32]> {
        self.entries.get(word).map(Vec::as_slice)
    }

    pub fn insert(&mut self, word: &str, embedding: Vec<f32>) {
        self.entries.insert(word.to_string(), embedding);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_version_clears_entries() {
        let mut cache = TextEmbeddingCache::new();
        cache.sync(0);
        cache.insert("gun", vec![1.0]);
        cache.sync(0);
        assert_eq!(cache.len(), 1);

        cache.sync(1);
        assert!(cache.is_empty());
        assert_eq!(cache.version(), 1);
    }

    #[test]
    fn keys_are_exact() {
        let mut cache = TextEmbeddingCache::new();
        cache.insert("Gun", vec![1.0]);
        assert!(cache.get("gun").is_none());
        assert_eq!(cache.get("Gun"), Some(&[1.0][..]));
    }
}
