//! Position readings and the shared latest-location store.
//!
//! This module holds the value types produced by positioning providers and
//! the single-slot store that publishes the most recent fix to the rest of
//! the process.
//!
//! # Design
//!
//! - **Store**: the last fix a provider delivered, nothing else
//! - **Single writer**: only the tracking controller updates the store
//! - **Many readers**: any component may hold a clone and poll `current()`
//!
//! # Example
//!
//! ```ignore
//! use geowatch::position::LocationStore;
//!
//! let store: LocationStore = service.store();
//! if let Some(reading) = store.current() {
//!     println!("Last fix: {:.4}, {:.4}", reading.latitude, reading.longitude);
//! }
//! ```

mod reading;
mod store;

pub use reading::{LocationReading, ProviderKind};
pub use store::LocationStore;
