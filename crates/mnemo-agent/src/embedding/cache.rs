//! Bounded least-recently-used cache of embedding vectors.

use std::collections::HashMap;

use sha2::{Digest, Sha256};

/// 128-bit content hash of `text`, as 32 hex characters.
pub fn content_key(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    digest[..16].iter().map(|b| format!("{b:02x}")).collect()
}

#[derive(Debug)]
struct Entry {
    vector: Vec<f32>,
    last_used: u64,
}

/// LRU map from content key to vector.
///
/// Eviction scans for the oldest entry, which is fine at the sizes used here
/// (about a thousand entries).
#[derive(Debug)]
pub struct EmbeddingCache {
    entries: HashMap<String, Entry>,
    capacity: usize,
    tick: u64,
}

impl EmbeddingCache {
    /// Create a cache holding at most `capacity` vectors (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
            tick: 0,
        }
    }

    /// Look up a text, marking it as recently used.
    pub fn get(&mut self, text: &str) -> Option<Vec<f32>> {
        self.tick += 1;
        let tick = self.tick;
        self.entries.get_mut(&content_key(text)).map(|entry| {
            entry.last_used = tick;
            entry.vector.clone()
        })
    }

    pub fn contains(&self, text: &str) -> bool {
        self.entries.contains_key(&content_key(text))
    }

    /// Store a vector, evicting the least recently used entry when full.
    pub fn insert(&mut self, text: &str, vector: Vec<f32>) {
        self.tick += 1;
        let key = content_key(text);
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.evict_oldest();
        }
        self.entries.insert(
            key,
            Entry {
                vector,
                last_used: self.tick,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every entry, returning how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }

    fn evict_oldest(&mut self) {
        if let Some(oldest) = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(key, _)| key.clone())
        {
            self.entries.remove(&oldest);
        }
    }
}
