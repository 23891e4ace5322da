//! Geowatch - Background location tracking for headless hosts
//!
//! This library provides the core of a background tracking daemon: it
//! subscribes to two independent positioning providers (a GNSS receiver
//! feed and a network geolocation lookup), publishes the most recent fix
//! to a shared store, and keeps a persistent low-priority status
//! notification current while tracking runs.
//!
//! # Architecture
//!
//! ```text
//! Providers ──events──► TrackingService bridge ──► TrackingController
//!                                                   ├──► LocationStore (readers poll)
//!                                                   └──► NotificationPresenter ──► sink
//! ```
//!
//! The host calls [`service::TrackingService::activate`] and
//! [`service::TrackingService::deactivate`]; everything in between is
//! asynchronous provider callbacks serialized onto the controller.
//! Location permission (however the platform expresses it) must be in
//! place before activation — the controller reports
//! [`tracker::TrackingStatus::PermissionDenied`] rather than requesting
//! anything itself.

pub mod config;
pub mod notify;
pub mod position;
pub mod provider;
pub mod service;
pub mod tracker;
