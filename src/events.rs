//! Store notifications
//!
//! Informational events raised by the store. Observers are called after
//! the operation has released the store's lock and never influence the
//! data path.

use crossbeam::channel::{self, Receiver, Sender};
use serde::Serialize;

/// Event raised by a Store operation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StoreEvent {
    /// A write left the merged view over the byte budget
    BytesLimitExceeded {
        total_bytes: usize,
        max_bytes: usize,
        retained_keys: usize,
    },

    /// The budget was enforced: these keys were dropped from the file
    Evicted { keys: Vec<String> },

    /// `remove` deleted a key from the pending buffer
    RemovedFromBuffer { key: String },

    /// `remove` deleted a key from the on-disk mapping
    RemovedFromFile { key: String },
}

/// Receives store events
pub trait StoreObserver: Send + Sync {
    fn on_event(&self, event: &StoreEvent);
}

impl<F> StoreObserver for F
where
    F: Fn(&StoreEvent) + Send + Sync,
{
    fn on_event(&self, event: &StoreEvent) {
        self(event)
    }
}

/// Observer that forwards every event over an unbounded channel
pub struct ChannelObserver {
    sender: Sender<StoreEvent>,
}

impl ChannelObserver {
    /// Create the observer and the receiving end of its channel
    pub fn new() -> (Self, Receiver<StoreEvent>) {
        let (sender, receiver) = channel::unbounded();
        (Self { sender }, receiver)
    }
}

impl StoreObserver for ChannelObserver {
    fn on_event(&self, event: &StoreEvent) {
        // Receiver dropped: nobody is listening any more
        let _ = self.sender.send(event.clone());
    }
}

/// Mirror an event to the log
pub(crate) fn trace_event(store: &str, event: &StoreEvent) {
    match event {
        StoreEvent::BytesLimitExceeded { total_bytes, max_bytes, retained_keys } => {
            tracing::warn!(
                "Store '{}' is {} bytes, over its {} byte budget ({} entries fit)",
                store,
                total_bytes,
                max_bytes,
                retained_keys
            );
        }
        StoreEvent::Evicted { keys } => {
            tracing::info!("Store '{}' evicted {} entries", store, keys.len());
        }
        StoreEvent::RemovedFromBuffer { key } => {
            tracing::debug!("Store '{}' removed '{}' from buffer", store, key);
        }
        StoreEvent::RemovedFromFile { key } => {
            tracing::debug!("Store '{}' removed '{}' from file", store, key);
        }
    }
}
