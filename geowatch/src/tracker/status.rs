//! Tracking state machine and aggregate activation status.

use std::fmt;

/// Whether tracking is running.
///
/// Exactly one instance exists, owned by the controller and mutated only
/// by `activate()`/`deactivate()`. Provider subscriptions exist only while
/// the state is `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackingState {
    /// Not tracking; no subscriptions, no notification.
    #[default]
    Inactive,
    /// Tracking; the status notification is raised.
    Active,
}

/// Aggregate outcome of the most recent activation.
///
/// Surfaced to the host instead of errors: provider registration failures
/// are captured per provider and folded into one of these, never thrown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackingStatus {
    /// Not activated (or deactivated since).
    #[default]
    Inactive,
    /// Every configured provider registered.
    Nominal,
    /// Fewer providers than configured registered; tracking continues
    /// with whatever is available.
    Degraded,
    /// No provider registered and at least one was rejected for missing
    /// authorization. Tracking is active but idle; the host should obtain
    /// permission and call `activate()` again.
    PermissionDenied,
}

impl fmt::Display for TrackingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TrackingStatus::Inactive => "inactive",
            TrackingStatus::Nominal => "nominal",
            TrackingStatus::Degraded => "degraded",
            TrackingStatus::PermissionDenied => "permission-denied",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_inactive() {
        assert_eq!(TrackingState::default(), TrackingState::Inactive);
        assert_eq!(TrackingStatus::default(), TrackingStatus::Inactive);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(TrackingStatus::PermissionDenied.to_string(), "permission-denied");
        assert_eq!(TrackingStatus::Nominal.to_string(), "nominal");
    }
}
