//! # StashKV
//!
//! A lightweight, file-backed key-value store with:
//! - In-memory buffering of writes until an explicit `write`
//! - One zstd-compressed JSON file per named store
//! - Change detection against the last persisted snapshot
//! - A soft byte budget enforced by largest-first eviction
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Store                               │
//! │           set / get / remove / write / store / json          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┬─────────────────┐
//!          │                         │                 │
//!          ▼                         ▼                 ▼
//!   ┌─────────────┐          ┌─────────────┐   ┌─────────────┐
//!   │   Pending   │          │   Backing   │   │  Eviction   │
//!   │   Buffer    │          │ File (zstd) │   │ (budget)    │
//!   └─────────────┘          └─────────────┘   └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod buffer;
pub mod storage;
pub mod eviction;
pub mod events;
pub mod fsutil;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{StashError, Result};
pub use config::{Config, EvictionPolicy};
pub use buffer::Mapping;
pub use eviction::{reduce_by_bytes, Eviction};
pub use events::{ChannelObserver, StoreEvent, StoreObserver};
pub use store::{Store, StoreStats, WriteOutcome};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of StashKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
