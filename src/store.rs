//! Store Module
//!
//! The file-backed store that coordinates the buffer, the backing file
//! and the byte budget.
//!
//! ## Responsibilities
//! - Buffer `set` calls in memory until `write`
//! - Merge the buffer over the on-disk mapping for every read and write
//! - Skip rewrites whose content matches the last persisted snapshot
//! - Check the byte budget after each persisting write
//! - Persist removals immediately

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use serde_json::Value;

use crate::buffer::{Mapping, PendingBuffer};
use crate::config::{Config, EvictionPolicy};
use crate::error::Result;
use crate::events::{trace_event, StoreEvent, StoreObserver};
use crate::eviction::Eviction;
use crate::fsutil::{write_tree, DirTree};
use crate::storage::BackingFile;

/// A named key-value store persisted to one compressed file
///
/// ## Concurrency Model
///
/// Every operation takes `state` for its whole duration, so a `write`'s
/// read → merge → compress → persist sequence never interleaves with a
/// `set` or `remove` on the same instance. Observers are notified once
/// the lock is released and may call back into the store.
///
/// Nothing coordinates separate processes sharing a backing file: the
/// last writer wins.
pub struct Store {
    /// Store configuration
    config: Config,

    /// The backing file (path fixed for the store's lifetime)
    file: BackingFile,

    /// Buffer and snapshot, guarded together
    state: Mutex<StoreState>,

    /// Registered observers
    observers: RwLock<Vec<Arc<dyn StoreObserver>>>,

    /// Number of times the backing file was (re)written
    disk_writes: AtomicU64,
}

struct StoreState {
    /// Writes not yet persisted
    pending: PendingBuffer,

    /// Mapping as last written to (or first read from) the backing file
    last_persisted: Mapping,

    /// Compressed size of the last write, 0 if this instance never wrote
    last_persisted_bytes: u64,
}

/// Result of a `write` call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WriteOutcome {
    /// The merged view matched the snapshot, nothing was written
    Unchanged,

    /// The merged view was persisted
    Written {
        /// Entries in the persisted mapping
        entries: usize,

        /// Compressed bytes written
        bytes: u64,

        /// Budget breach found after the write, if any
        eviction: Option<Eviction>,
    },
}

impl WriteOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, WriteOutcome::Written { .. })
    }

    pub fn eviction(&self) -> Option<&Eviction> {
        match self {
            WriteOutcome::Written { eviction, .. } => eviction.as_ref(),
            WriteOutcome::Unchanged => None,
        }
    }
}

/// Point-in-time counters for a store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreStats {
    pub disk_writes: u64,
    pub pending_entries: usize,
    pub pending_bytes: usize,
    pub persisted_entries: usize,
    pub persisted_file_bytes: u64,
}

impl Store {
    /// Open a store with the given config
    ///
    /// Reads the backing file if one exists to seed the persisted
    /// snapshot; a corrupt file fails here. The directory is not created
    /// until the first write.
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;

        let file = BackingFile::new(&config.store_dir, &config.name, config.compression_level);
        let last_persisted = file.read_or_empty()?;

        tracing::debug!(
            "Opened store '{}' at {} ({} persisted entries)",
            config.name,
            file.path().display(),
            last_persisted.len()
        );

        Ok(Self {
            config,
            file,
            state: Mutex::new(StoreState {
                pending: PendingBuffer::new(),
                last_persisted,
                last_persisted_bytes: 0,
            }),
            observers: RwLock::new(Vec::new()),
            disk_writes: AtomicU64::new(0),
        })
    }

    /// Open a named store in `dir` (convenience method)
    ///
    /// Uses default config for everything else
    pub fn open_named(dir: &Path, name: &str) -> Result<Self> {
        Self::open(Config::builder().store_dir(dir).name(name).build())
    }

    /// Register an observer for store events
    pub fn subscribe(&self, observer: impl StoreObserver + 'static) {
        self.observers.write().push(Arc::new(observer));
    }

    // =========================================================================
    // Buffered Writes
    // =========================================================================

    /// Set a key in the pending buffer (no I/O until `write`)
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> &Self {
        self.state.lock().pending.put(key.into(), value.into());
        self
    }

    /// Set several keys in the pending buffer (no I/O until `write`)
    pub fn extend<I, K>(&self, entries: I) -> &Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut state = self.state.lock();
        for (key, value) in entries {
            state.pending.put(key.into(), value);
        }
        drop(state);
        self
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Get a value from the merged view
    ///
    /// Decodes the backing file on every call. `None` means the key is in
    /// neither the buffer nor the file.
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        let state = self.state.lock();
        let on_disk = self.file.read_or_empty()?;

        Ok(state.pending.get(key).or_else(|| on_disk.get(key)).cloned())
    }

    /// The full merged mapping (disk with the buffer on top)
    pub fn store(&self) -> Result<Mapping> {
        let state = self.state.lock();
        self.merged(&state)
    }

    /// The merged mapping as pretty-printed JSON
    pub fn json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.store()?)?)
    }

    /// Write the merged mapping out as a directory tree
    pub fn export_dir(&self, path: &Path) -> Result<()> {
        let tree = DirTree::from_mapping(&self.store()?);
        write_tree(path, &tree)?;

        tracing::info!("Exported store '{}' to {}", self.config.name, path.display());
        Ok(())
    }

    // =========================================================================
    // Persisting Operations
    // =========================================================================

    /// Remove keys from the buffer and from the backing file
    ///
    /// The file is rewritten immediately when a removal changed it. The
    /// buffer is only touched once that rewrite succeeded, so a failed
    /// remove leaves the store as it was. Returns how many of the keys
    /// were found anywhere.
    pub fn remove<I, K>(&self, keys: I) -> Result<usize>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let mut events = Vec::new();
        let mut removed = 0;

        {
            let mut state = self.state.lock();
            let mut on_disk = self.file.read_or_empty()?;
            let mut from_buffer = Vec::new();

            for key in keys {
                let key = key.as_ref();
                let mut found = false;

                if state.pending.contains(key) && !from_buffer.iter().any(|k| k == key) {
                    from_buffer.push(key.to_string());
                    events.push(StoreEvent::RemovedFromBuffer { key: key.to_string() });
                    found = true;
                }
                if on_disk.remove(key).is_some() {
                    events.push(StoreEvent::RemovedFromFile { key: key.to_string() });
                    found = true;
                }
                if found {
                    removed += 1;
                }
            }

            if on_disk != state.last_persisted {
                state.last_persisted_bytes = self.persist(&on_disk)?;
                state.last_persisted = on_disk;
            }

            for key in &from_buffer {
                state.pending.remove(key);
            }
        }

        self.notify(&events);
        Ok(removed)
    }

    /// Flush the buffer to disk if the merged view changed
    ///
    /// Steps:
    /// 1. Merge buffer over the current file
    /// 2. Skip if the file exists and the merge equals the snapshot
    /// 3. Compress and overwrite, record snapshot, clear buffer
    /// 4. Check the byte budget
    ///
    /// If enforcing the budget fails, the events raised before the failure
    /// are still delivered and the error is returned.
    pub fn write(&self) -> Result<WriteOutcome> {
        let mut events = Vec::new();

        let (entries, bytes, eviction) = {
            let mut state = self.state.lock();
            let on_disk = self.file.read()?;
            let file_existed = on_disk.is_some();
            let merged = state.pending.overlay(on_disk.unwrap_or_default());

            if file_existed && merged == state.last_persisted {
                tracing::trace!("Store '{}' unchanged, skipping write", self.config.name);
                return Ok(WriteOutcome::Unchanged);
            }

            let bytes = self.persist(&merged)?;
            let entries = merged.len();
            state.last_persisted = merged;
            state.last_persisted_bytes = bytes;
            state.pending.clear();

            (entries, bytes, self.check_budget(&mut state, &mut events))
        };

        self.notify(&events);
        Ok(WriteOutcome::Written {
            entries,
            bytes,
            eviction: eviction?,
        })
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Path of the backing file
    pub fn file_path(&self) -> &Path {
        self.file.path()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of keys waiting in the buffer
    pub fn pending_len(&self) -> usize {
        self.state.lock().pending.len()
    }

    pub fn stats(&self) -> StoreStats {
        let state = self.state.lock();
        StoreStats {
            disk_writes: self.disk_writes.load(Ordering::SeqCst),
            pending_entries: state.pending.len(),
            pending_bytes: state.pending.size(),
            persisted_entries: state.last_persisted.len(),
            persisted_file_bytes: state.last_persisted_bytes,
        }
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn merged(&self, state: &StoreState) -> Result<Mapping> {
        Ok(state.pending.overlay(self.file.read_or_empty()?))
    }

    /// Overwrite the backing file and count the write
    fn persist(&self, mapping: &Mapping) -> Result<u64> {
        let bytes = self.file.write(mapping)?;
        self.disk_writes.fetch_add(1, Ordering::SeqCst);
        Ok(bytes)
    }

    /// Compare the persisted mapping against the budget (state lock held)
    fn check_budget(
        &self,
        state: &mut StoreState,
        events: &mut Vec<StoreEvent>,
    ) -> Result<Option<Eviction>> {
        let policy = self.config.eviction_policy;
        let Some(mut eviction) =
            Eviction::check(&state.last_persisted, self.config.max_bytes, policy)
        else {
            return Ok(None);
        };

        events.push(StoreEvent::BytesLimitExceeded {
            total_bytes: eviction.total_bytes,
            max_bytes: eviction.max_bytes,
            retained_keys: eviction.retained.len(),
        });

        // Nothing to drop: rewriting would persist identical content
        if policy == EvictionPolicy::Enforce && eviction.evicts_anything() {
            state.last_persisted_bytes = self.persist(&eviction.retained)?;
            state.last_persisted = eviction.retained.clone();
            eviction.enforced = true;
            events.push(StoreEvent::Evicted {
                keys: eviction.evicted_keys.clone(),
            });
        }

        Ok(Some(eviction))
    }

    fn notify(&self, events: &[StoreEvent]) {
        if events.is_empty() {
            return;
        }

        let observers = self.observers.read().clone();
        for event in events {
            trace_event(&self.config.name, event);
            for observer in &observers {
                observer.on_event(event);
            }
        }
    }
}
