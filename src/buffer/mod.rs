//! Buffer Module
//!
//! In-memory holding area for writes that have not been persisted yet.
//!
//! ## Responsibilities
//! - Hold key → value overrides set since the last write
//! - Overlay those overrides onto the on-disk mapping (buffer wins)
//! - Track an approximate serialized size for diagnostics
//!
//! ## Data Structure Choice
//! Using BTreeMap so merged views and JSON dumps come out in key order.
//! The buffer is owned by the Store's state lock, so it carries no lock
//! of its own.

mod table;

pub use table::PendingBuffer;

use std::collections::BTreeMap;

/// A flat string-keyed mapping, the unit the store reads and persists
pub type Mapping = BTreeMap<String, serde_json::Value>;
