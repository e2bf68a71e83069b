//! Storage Module
//!
//! Persistence of a store's merged mapping to a single compressed file.
//!
//! ## Responsibilities
//! - Derive the backing file path from the store directory and name
//! - Encode a mapping as compact JSON wrapped in a zstd frame
//! - Treat a missing file as an empty store
//! - Surface corrupt content as an error (no repair)
//!
//! ## File Format
//! ```text
//! {store_dir}/${hex(name)}.zst
//! ┌────────────────────────────────────────┐
//! │ Zstd frame (content checksum enabled)  │
//! │ ┌────────────────────────────────────┐ │
//! │ │ UTF-8 JSON object                  │ │
//! │ │ {"key": <value>, ...}              │ │
//! │ └────────────────────────────────────┘ │
//! └────────────────────────────────────────┘
//! ```

mod codec;
mod file;

pub use codec::{decode_mapping, encode_mapping};
pub use file::{BackingFile, FILE_EXTENSION};
