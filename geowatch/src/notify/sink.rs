//! Notification sink seam and the built-in shared-slot sink.

use std::sync::Arc;

use parking_lot::RwLock;

use tracing::debug;

/// Logical content of the status notification.
///
/// Rebuilt on every update; the notification system owns whatever copy is
/// currently displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    /// Headline, stable across updates.
    pub title: String,
    /// Detail line, refreshed with each fix.
    pub body: String,
    /// Whether the notification is pinned (not user-dismissible).
    pub ongoing: bool,
}

impl NotificationContent {
    /// Create pinned, low-priority content.
    pub fn ongoing(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            ongoing: true,
        }
    }
}

/// Outbound seam to the host's notification system.
///
/// Implementations must use a single stable notification identity:
/// `present()` raises the notification when absent and replaces it in
/// place when present; `clear()` removes it and is a no-op when absent.
/// Both must be safe to call from any thread.
pub trait NotificationSink: Send + Sync {
    /// Raise or update the notification.
    fn present(&self, content: &NotificationContent);

    /// Remove the notification if present.
    fn clear(&self);
}

/// Built-in sink backed by a shared single-slot cell.
///
/// The slot itself is the stable identity — presenting twice replaces the
/// content, never stacks. Hosts that render a status line (CLI, TUI, web)
/// poll [`current`](StatusNotification::current); hosts with a real
/// notification daemon implement [`NotificationSink`] themselves instead.
#[derive(Debug, Clone, Default)]
pub struct StatusNotification {
    slot: Arc<RwLock<Option<NotificationContent>>>,
}

impl StatusNotification {
    /// Create an empty (not presented) notification.
    pub fn new() -> Self {
        Self {
            slot: Arc::new(RwLock::new(None)),
        }
    }

    /// The currently displayed content, if any.
    pub fn current(&self) -> Option<NotificationContent> {
        self.slot.read().clone()
    }

    /// Whether the notification is currently displayed.
    pub fn is_present(&self) -> bool {
        self.slot.read().is_some()
    }
}

impl NotificationSink for StatusNotification {
    fn present(&self, content: &NotificationContent) {
        debug!(title = %content.title, body = %content.body, "Notification presented");
        *self.slot.write() = Some(content.clone());
    }

    fn clear(&self) {
        let mut slot = self.slot.write();
        if slot.take().is_some() {
            debug!("Notification cleared");
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use parking_lot::Mutex;

    /// What a sink was asked to do, in order.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum SinkCall {
        Present(NotificationContent),
        Clear,
    }

    /// Mock sink that records every call for assertions.
    #[derive(Debug, Default)]
    pub struct RecordingSink {
        pub calls: Mutex<Vec<SinkCall>>,
    }

    impl RecordingSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<SinkCall> {
            self.calls.lock().clone()
        }

        /// Content of the most recent `present()` that was not followed
        /// by a `clear()`.
        pub fn displayed(&self) -> Option<NotificationContent> {
            match self.calls.lock().last() {
                Some(SinkCall::Present(content)) => Some(content.clone()),
                _ => None,
            }
        }
    }

    impl NotificationSink for RecordingSink {
        fn present(&self, content: &NotificationContent) {
            self.calls.lock().push(SinkCall::Present(content.clone()));
        }

        fn clear(&self) {
            self.calls.lock().push(SinkCall::Clear);
        }
    }

    #[test]
    fn test_status_notification_replaces_in_place() {
        let sink = StatusNotification::new();
        assert!(!sink.is_present());

        sink.present(&NotificationContent::ongoing("Tracking", "first"));
        sink.present(&NotificationContent::ongoing("Tracking", "second"));

        // One slot, latest content
        assert_eq!(sink.current().unwrap().body, "second");
    }

    #[test]
    fn test_status_notification_clear_is_idempotent() {
        let sink = StatusNotification::new();
        sink.clear();
        assert!(!sink.is_present());

        sink.present(&NotificationContent::ongoing("Tracking", "body"));
        sink.clear();
        sink.clear();
        assert!(!sink.is_present());
    }

    #[test]
    fn test_clones_share_the_slot() {
        let sink = StatusNotification::new();
        let viewer = sink.clone();

        sink.present(&NotificationContent::ongoing("Tracking", "body"));
        assert!(viewer.is_present());
    }
}
