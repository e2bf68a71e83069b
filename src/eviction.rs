//! Eviction
//!
//! Size estimation and the largest-first reduction used when a store
//! outgrows its byte budget.
//!
//! ## Policy
//! Entries are sized by the compact JSON length of their value, sorted
//! largest first (ties by key ascending) and accepted greedily while the
//! running total stays within budget. The first entry that does not fit
//! ends the scan: smaller entries after it are dropped, not reconsidered.
//!
//! [`reduce_by_bytes`] sizes values only, so the mapping it returns can
//! still serialize above the budget when keys dominate. [`reduce_to_fit`]
//! runs the same scan but charges each entry its full serialized cost
//! (key, colon, value, separator) plus the enclosing braces; its result
//! always serializes within `max_bytes` when `max_bytes >= 2`.

use std::cmp::Reverse;

use serde::Serialize;
use serde_json::Value;

use crate::buffer::Mapping;
use crate::config::EvictionPolicy;

/// Bytes of `{}` around a serialized mapping
const MAPPING_OVERHEAD: usize = 2;

/// Serialized (compact JSON, UTF-8) byte size of a value
pub fn entry_size(value: &Value) -> usize {
    // Serializing a Value into a Vec cannot fail
    serde_json::to_vec(value).map(|bytes| bytes.len()).unwrap_or(0)
}

/// Serialized byte size of `"key":value,` inside a mapping
pub fn keyed_entry_size(key: &str, value: &Value) -> usize {
    let key_size = serde_json::to_vec(key).map(|bytes| bytes.len()).unwrap_or(0);
    key_size + 1 + entry_size(value) + 1
}

/// Serialized byte size of a whole mapping
pub fn mapping_size(mapping: &Mapping) -> usize {
    serde_json::to_vec(mapping).map(|bytes| bytes.len()).unwrap_or(0)
}

/// Reduce a mapping to the largest-first prefix whose values fit `max_bytes`
pub fn reduce_by_bytes(mapping: &Mapping, max_bytes: usize) -> Mapping {
    greedy_largest_first(mapping, 0, max_bytes, |_, value| entry_size(value))
}

/// Reduce a mapping to the largest-first prefix that serializes within
/// `max_bytes`, keys and punctuation included
pub fn reduce_to_fit(mapping: &Mapping, max_bytes: usize) -> Mapping {
    greedy_largest_first(mapping, MAPPING_OVERHEAD, max_bytes, keyed_entry_size)
}

fn greedy_largest_first<F>(mapping: &Mapping, base: usize, max_bytes: usize, size_of: F) -> Mapping
where
    F: Fn(&str, &Value) -> usize,
{
    let mut sized: Vec<(usize, &String, &Value)> = mapping
        .iter()
        .map(|(key, value)| (size_of(key.as_str(), value), key, value))
        .collect();

    sized.sort_by(|a, b| (Reverse(a.0), a.1).cmp(&(Reverse(b.0), b.1)));

    let mut total = base;
    let mut kept = Mapping::new();
    for (size, key, value) in sized {
        if total + size > max_bytes {
            break;
        }
        total += size;
        kept.insert(key.clone(), value.clone());
    }
    kept
}

/// Outcome of a budget check that found the store over its limit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Eviction {
    /// Serialized size of the merged view that breached the budget
    pub total_bytes: usize,

    /// The configured budget
    pub max_bytes: usize,

    /// Keys the reduction drops, in key order
    pub evicted_keys: Vec<String>,

    /// The reduced mapping
    pub retained: Mapping,

    /// Whether the retained mapping was written back to disk
    pub enforced: bool,
}

impl Eviction {
    /// Check `mapping` against `max_bytes`, returning the reduction if over
    ///
    /// `Advisory` reports the value-sized reduction of [`reduce_by_bytes`];
    /// `Enforce` computes [`reduce_to_fit`] so the persisted result lands
    /// within budget.
    pub fn check(mapping: &Mapping, max_bytes: usize, policy: EvictionPolicy) -> Option<Self> {
        let total_bytes = mapping_size(mapping);
        if total_bytes <= max_bytes {
            return None;
        }

        let retained = match policy {
            EvictionPolicy::Advisory => reduce_by_bytes(mapping, max_bytes),
            EvictionPolicy::Enforce => reduce_to_fit(mapping, max_bytes),
        };
        let evicted_keys = mapping
            .keys()
            .filter(|key| !retained.contains_key(*key))
            .cloned()
            .collect();

        Some(Self {
            total_bytes,
            max_bytes,
            evicted_keys,
            retained,
            enforced: false,
        })
    }

    /// Whether the reduction drops anything
    pub fn evicts_anything(&self) -> bool {
        !self.evicted_keys.is_empty()
    }
}
