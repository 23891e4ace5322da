//! Host lifecycle shim for background tracking.
//!
//! `TrackingService` is what a host embeds: it wraps the controller in a
//! single-owner lock, runs the bridge task that serializes provider events
//! into it, and maps the host's start/stop entry points onto
//! activate/deactivate. Provider callbacks therefore never run
//! concurrently with each other or with lifecycle calls.
//!
//! The host owns the keep-alive contract (the process must not be
//! terminated while tracking is active); this module only assumes the
//! runtime it was given keeps running.
//!
//! # Example
//!
//! ```ignore
//! use geowatch::service::TrackingService;
//!
//! let service = TrackingService::start(config, providers, sink, runtime.handle().clone());
//! let status = service.activate();
//!
//! // ... fixes flow into service.store() ...
//!
//! service.shutdown();
//! ```

mod runtime;

pub use runtime::TrackingService;
