//! Backing file
//!
//! Locates, reads and overwrites the single compressed file of a store.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::buffer::Mapping;
use crate::error::Result;

use super::codec::{decode_mapping, encode_mapping};

/// Extension of every backing file
pub const FILE_EXTENSION: &str = "zst";

/// Handle on a store's backing file
#[derive(Debug, Clone)]
pub struct BackingFile {
    path: PathBuf,
    compression_level: i32,
}

impl BackingFile {
    /// Create a handle for `name` inside `dir` (no I/O)
    pub fn new(dir: &Path, name: &str, compression_level: i32) -> Self {
        Self {
            path: Self::path_for(dir, name),
            compression_level,
        }
    }

    /// Backing file path for a store name
    /// (dir, "cache") → "{dir}/$6361636865.zst"
    pub fn path_for(dir: &Path, name: &str) -> PathBuf {
        dir.join(format!("${}.{}", hex::encode(name.as_bytes()), FILE_EXTENSION))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read and decode the file
    ///
    /// Returns:
    /// - `Ok(Some(mapping))` — file present and valid
    /// - `Ok(None)` — file does not exist
    /// - `Err(_)` — any other I/O error, or corrupt content
    pub fn read(&self) -> Result<Option<Mapping>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        tracing::trace!("Decoding {} bytes from {}", bytes.len(), self.path.display());
        decode_mapping(&bytes).map(Some)
    }

    /// Read the file, treating a missing file as an empty mapping
    pub fn read_or_empty(&self) -> Result<Mapping> {
        Ok(self.read()?.unwrap_or_default())
    }

    /// Compress and overwrite the file, creating the directory if needed
    ///
    /// Returns the number of compressed bytes written.
    pub fn write(&self, mapping: &Mapping) -> Result<u64> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let bytes = encode_mapping(mapping, self.compression_level)?;

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;

        tracing::debug!(
            "Wrote {} entries ({} bytes) to {}",
            mapping.len(),
            bytes.len(),
            self.path.display()
        );

        Ok(bytes.len() as u64)
    }
}
