//! Tracking configuration.
//!
//! `TrackingConfig` is the in-memory configuration handed to the service;
//! `ConfigFile` loads the on-disk INI the CLI reads, falling back to
//! defaults when the file is absent.

mod file;

use std::time::Duration;

use crate::provider::UpdatePolicy;

pub use file::{
    ConfigError, ConfigFile, NotificationSection, ProvidersSection, TrackingSection,
    DEFAULT_GNSS_PORT,
};

/// Default notification headline.
pub const DEFAULT_NOTIFICATION_TITLE: &str = "Location Tracking Active";

/// Configuration for the tracking service.
#[derive(Debug, Clone)]
pub struct TrackingConfig {
    /// Delivery policy applied to every provider registration.
    pub policy: UpdatePolicy,
    /// Title of the status notification.
    pub notification_title: String,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            policy: UpdatePolicy::default(),
            notification_title: DEFAULT_NOTIFICATION_TITLE.to_string(),
        }
    }
}

impl TrackingConfig {
    /// Set the update policy.
    pub fn with_policy(mut self, policy: UpdatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the notification title.
    pub fn with_notification_title(mut self, title: impl Into<String>) -> Self {
        self.notification_title = title.into();
        self
    }

    /// Build the service configuration from a loaded config file.
    pub fn from_config_file(file: &ConfigFile) -> Self {
        Self {
            policy: UpdatePolicy::default()
                .with_min_interval(Duration::from_millis(file.tracking.min_interval_ms))
                .with_min_distance_m(file.tracking.min_distance_m),
            notification_title: file.notification.title.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TrackingConfig::default();
        assert_eq!(config.policy.min_interval, Duration::from_millis(5000));
        assert_eq!(config.policy.min_distance_m, 10.0);
        assert_eq!(config.notification_title, "Location Tracking Active");
    }

    #[test]
    fn test_builders() {
        let config = TrackingConfig::default()
            .with_notification_title("Fleet Tracker")
            .with_policy(
                UpdatePolicy::default()
                    .with_min_interval(Duration::from_secs(1))
                    .with_min_distance_m(2.5),
            );

        assert_eq!(config.notification_title, "Fleet Tracker");
        assert_eq!(config.policy.min_interval, Duration::from_secs(1));
        assert_eq!(config.policy.min_distance_m, 2.5);
    }

    #[test]
    fn test_from_config_file_defaults() {
        let file = ConfigFile::default();
        let config = TrackingConfig::from_config_file(&file);
        assert_eq!(config.policy.min_interval, Duration::from_millis(5000));
        assert_eq!(config.notification_title, "Location Tracking Active");
    }
}
