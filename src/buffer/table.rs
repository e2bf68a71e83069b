//! Pending buffer implementation

use serde_json::Value;

use super::Mapping;
use crate::eviction::entry_size;

/// Uncommitted writes, overlaid on top of the disk mapping
#[derive(Debug, Default, Clone)]
pub struct PendingBuffer {
    data: Mapping,
    /// Approximate size: key bytes plus serialized value bytes
    size: usize,
}

impl PendingBuffer {
    /// Create a new empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a buffered value by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Check whether the key has a buffered value
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Insert or replace a value, returns the new approximate size
    pub fn put(&mut self, key: String, value: Value) -> usize {
        let added = key.len() + entry_size(&value);
        if let Some(old) = self.data.insert(key.clone(), value) {
            self.size -= key.len() + entry_size(&old);
        }
        self.size += added;
        self.size
    }

    /// Insert every pair of the mapping, returns the new approximate size
    pub fn extend(&mut self, mapping: Mapping) -> usize {
        for (key, value) in mapping {
            self.put(key, value);
        }
        self.size
    }

    /// Remove a key, returning its value if it was buffered
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let value = self.data.remove(key)?;
        self.size -= key.len() + entry_size(&value);
        Some(value)
    }

    /// Overlay buffered entries onto `base` (buffer wins on collision)
    pub fn overlay(&self, mut base: Mapping) -> Mapping {
        for (key, value) in &self.data {
            base.insert(key.clone(), value.clone());
        }
        base
    }

    /// Approximate size in bytes
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of buffered entries
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate buffered entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter()
    }

    /// Drop everything (after a successful write)
    pub fn clear(&mut self) {
        self.data.clear();
        self.size = 0;
    }
}
