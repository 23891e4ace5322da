//! Tracking lifecycle and update pipeline.
//!
//! `TrackingController` owns the activate/deactivate state machine,
//! registers with the configured positioning providers, and forwards each
//! incoming fix to the shared store and the status notification.
//!
//! # Lifecycle
//!
//! ```text
//! activate()    ──► notification raised ──► ACTIVE ──► provider registration
//! fix arrives   ──► store updated ──► notification body refreshed
//! deactivate()  ──► subscriptions released ──► notification cleared ──► INACTIVE
//! ```
//!
//! Registration failures never abort activation: the controller captures
//! each provider's outcome and aggregates them into a [`TrackingStatus`]
//! the host can observe. A fix that races past `deactivate()` is dropped.

mod controller;
mod status;

pub use controller::TrackingController;
pub use status::{TrackingState, TrackingStatus};
