//! Configuration for StashKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::{Result, StashError};

/// Name used when a store is opened without one
pub const DEFAULT_STORE_NAME: &str = "default";

/// Directory used when none is configured (relative to the working directory)
pub const DEFAULT_STORE_DIR: &str = "./.stashkv";

/// Soft byte budget used when none is configured
pub const DEFAULT_MAX_BYTES: usize = 250_000;

/// Zstd level used when none is configured
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

/// Main configuration for a Store instance
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Location
    // -------------------------------------------------------------------------
    /// Directory holding the backing file (created on first write)
    pub store_dir: PathBuf,

    /// Store identity; the backing file name is derived from it
    pub name: String,

    // -------------------------------------------------------------------------
    // Budget
    // -------------------------------------------------------------------------
    /// Soft limit on the serialized size of the merged view (in bytes)
    pub max_bytes: usize,

    /// What happens when a write leaves the store over `max_bytes`
    pub eviction_policy: EvictionPolicy,

    // -------------------------------------------------------------------------
    // Codec
    // -------------------------------------------------------------------------
    /// Zstd compression level (1..=22)
    pub compression_level: i32,
}

/// Behavior when the merged view exceeds the byte budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EvictionPolicy {
    /// Report the reduced mapping, keep the full mapping on disk
    Advisory,

    /// Persist the reduced mapping as the new store contents
    Enforce,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
            name: DEFAULT_STORE_NAME.to_string(),
            max_bytes: DEFAULT_MAX_BYTES,
            eviction_policy: EvictionPolicy::Advisory,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check that the values can back a working store
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(StashError::Config("store name must not be empty".to_string()));
        }
        if self.max_bytes == 0 {
            return Err(StashError::Config("max_bytes must be greater than zero".to_string()));
        }
        if !(1..=22).contains(&self.compression_level) {
            return Err(StashError::Config(format!(
                "compression level {} outside 1..=22",
                self.compression_level
            )));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the directory holding the backing file
    pub fn store_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.store_dir = path.into();
        self
    }

    /// Set the store name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Set the soft byte budget
    pub fn max_bytes(mut self, max_bytes: usize) -> Self {
        self.config.max_bytes = max_bytes;
        self
    }

    /// Set the eviction policy
    pub fn eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.config.eviction_policy = policy;
        self
    }

    /// Set the zstd compression level
    pub fn compression_level(mut self, level: i32) -> Self {
        self.config.compression_level = level;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
