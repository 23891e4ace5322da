//! Builds notification content and drives the sink.

use std::sync::Arc;

use crate::position::LocationReading;

use super::sink::{NotificationContent, NotificationSink};

/// Body shown before the first fix arrives.
const INITIAL_BODY: &str = "Your location is being monitored in the background.";

/// Owns the logical notification content for the tracking lifecycle.
///
/// The presenter formats content and forwards it to the configured sink;
/// it keeps no state of its own, so every call rebuilds the content from
/// scratch.
pub struct NotificationPresenter {
    sink: Arc<dyn NotificationSink>,
    title: String,
}

impl NotificationPresenter {
    /// Create a presenter writing to `sink` under the given title.
    pub fn new(sink: Arc<dyn NotificationSink>, title: impl Into<String>) -> Self {
        Self {
            sink,
            title: title.into(),
        }
    }

    /// Raise the notification with its pre-fix content.
    pub fn present_initial(&self) {
        self.sink
            .present(&NotificationContent::ongoing(&self.title, INITIAL_BODY));
    }

    /// Refresh the notification body with the latest fix.
    pub fn present_reading(&self, reading: &LocationReading) {
        let body = format!(
            "Last update: Lat {:.4}, Lon {:.4}",
            reading.latitude, reading.longitude
        );
        self.sink
            .present(&NotificationContent::ongoing(&self.title, body));
    }

    /// Remove the notification.
    pub fn clear(&self) {
        self.sink.clear();
    }
}
