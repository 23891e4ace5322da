//! Shared latest-location store.

use std::sync::Arc;

use parking_lot::RwLock;

use super::LocationReading;

/// Thread-safe single-slot store for the most recent location reading.
///
/// The tracking controller is the sole writer; `update` is crate-private
/// so hosts and other readers cannot publish fixes of their own. Any
/// number of readers on any thread may hold a clone and poll
/// [`current`](LocationStore::current). Updates replace the whole value
/// under a write lock, so a reader never observes a partially-written fix.
///
/// Deactivating the tracker does not clear the store: the last fix stays
/// available to late readers until the process exits.
///
/// # Usage
///
/// ```ignore
/// use geowatch::position::LocationStore;
///
/// let store = service.store();
/// if let Some(reading) = store.current() {
///     println!("Last fix: {}", reading);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct LocationStore {
    slot: Arc<RwLock<Option<LocationReading>>>,
}

impl LocationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            slot: Arc::new(RwLock::new(None)),
        }
    }

    /// Replace the stored reading. Last write wins, no merging.
    pub(crate) fn update(&self, reading: LocationReading) {
        *self.slot.write() = Some(reading);
    }

    /// Get the most recent reading, or `None` if no fix has ever arrived.
    ///
    /// Never blocks beyond the brief read lock; the value is cloned out.
    pub fn current(&self) -> Option<LocationReading> {
        self.slot.read().clone()
    }
}
