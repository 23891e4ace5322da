//! Status notification for background tracking.
//!
//! While tracking is active the host keeps a persistent, low-priority,
//! non-dismissible notification visible so the operator always knows the
//! device's position is being observed. This module owns the logical
//! content of that notification; the displayed copy belongs to whatever
//! notification system the host wires in through [`NotificationSink`].
//!
//! # Identity
//!
//! A sink exposes exactly one notification slot. Repeated `present()`
//! calls replace the displayed content in place — they never stack.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use geowatch::notify::{NotificationPresenter, StatusNotification};
//!
//! let sink = StatusNotification::new();
//! let presenter = NotificationPresenter::new(Arc::new(sink.clone()), "Location Tracking Active");
//!
//! presenter.present_initial();
//! assert!(sink.is_present());
//!
//! presenter.clear();
//! assert!(!sink.is_present());
//! ```

mod presenter;
mod sink;

pub use presenter::NotificationPresenter;
pub use sink::{NotificationContent, NotificationSink, StatusNotification};

#[cfg(test)]
pub use sink::tests::{RecordingSink, SinkCall};
