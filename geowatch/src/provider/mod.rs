//! Positioning provider abstraction
//!
//! This module provides the registration seam between the tracking
//! controller and the sources that produce position fixes, plus the two
//! built-in providers: a GNSS receiver feed over UDP (primary,
//! high-accuracy) and a network geolocation lookup over HTTP (secondary,
//! coarse fallback).
//!
//! # Registration contract
//!
//! [`PositionProvider::subscribe`] either succeeds and returns a
//! [`SubscriptionHandle`], or fails fast with a
//! [`ProviderError`] — permission denied or provider unavailable. A handle
//! is released exactly once by consuming it; after release no further
//! events are produced for that subscription.
//!
//! # Example
//!
//! ```ignore
//! use geowatch::provider::{GnssUdpProvider, PositionProvider, UpdatePolicy};
//!
//! let provider = GnssUdpProvider::new(49005, runtime.handle().clone());
//! let (tx, rx) = tokio::sync::mpsc::channel(32);
//! let handle = provider.subscribe(&UpdatePolicy::default(), tx)?;
//! // ... fixes arrive on rx ...
//! handle.release();
//! ```

mod gnss;
mod http;
mod network;
mod policy;
mod types;

pub use gnss::GnssUdpProvider;
pub use http::{HttpClient, ReqwestClient};
pub use network::NetworkLookupProvider;
pub use policy::{UpdatePolicy, UpdateThrottle};
pub use types::{
    PositionProvider, ProviderError, ProviderEvent, ProviderHealth, SubscriptionHandle,
};

#[cfg(test)]
pub use http::tests::MockHttpClient;
