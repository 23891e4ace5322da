//! INI config file loading.
//!
//! ```ini
//! [tracking]
//! min_interval_ms = 5000
//! min_distance_m = 10.0
//!
//! [providers]
//! gnss_port = 49005
//! lookup_url = https://geo.example.com/v1/locate
//! lookup_api_key = abc123
//!
//! [notification]
//! title = Location Tracking Active
//! ```
//!
//! Every key is optional; a missing file yields the defaults.

use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use super::DEFAULT_NOTIFICATION_TITLE;

/// Default UDP port the GNSS receiver feed broadcasts on.
pub const DEFAULT_GNSS_PORT: u16 = 49005;

/// Errors loading the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read or parsed as INI.
    #[error("failed to read config file: {0}")]
    Read(String),

    /// A key holds a value of the wrong type.
    #[error("invalid config value for {key}: {value}")]
    Invalid { key: String, value: String },
}

/// `[tracking]` section.
#[derive(Debug, Clone)]
pub struct TrackingSection {
    /// Minimum interval between delivered fixes, in milliseconds.
    pub min_interval_ms: u64,
    /// Minimum movement between delivered fixes, in meters.
    pub min_distance_m: f64,
}

impl Default for TrackingSection {
    fn default() -> Self {
        Self {
            min_interval_ms: 5000,
            min_distance_m: 10.0,
        }
    }
}

/// `[providers]` section.
#[derive(Debug, Clone)]
pub struct ProvidersSection {
    /// UDP port for the GNSS receiver feed.
    pub gnss_port: u16,
    /// Geolocation lookup endpoint; the secondary provider is skipped
    /// when unset.
    pub lookup_url: Option<String>,
    /// API key for the lookup endpoint, if it needs one.
    pub lookup_api_key: Option<String>,
}

impl Default for ProvidersSection {
    fn default() -> Self {
        Self {
            gnss_port: DEFAULT_GNSS_PORT,
            lookup_url: None,
            lookup_api_key: None,
        }
    }
}

/// `[notification]` section.
#[derive(Debug, Clone)]
pub struct NotificationSection {
    /// Status notification headline.
    pub title: String,
}

impl Default for NotificationSection {
    fn default() -> Self {
        Self {
            title: DEFAULT_NOTIFICATION_TITLE.to_string(),
        }
    }
}

/// Loaded configuration file.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub tracking: TrackingSection,
    pub providers: ProvidersSection,
    pub notification: NotificationSection,
}

impl ConfigFile {
    /// Default location: `<config dir>/geowatch/config.ini`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("geowatch").join("config.ini"))
    }

    /// Load from `path`, or return defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read(e.to_string()))?;
        let mut config = Self::default();

        if let Some(value) = ini.get_from(Some("tracking"), "min_interval_ms") {
            config.tracking.min_interval_ms = parse_key("tracking.min_interval_ms", value)?;
        }
        if let Some(value) = ini.get_from(Some("tracking"), "min_distance_m") {
            config.tracking.min_distance_m = parse_key("tracking.min_distance_m", value)?;
        }
        if let Some(value) = ini.get_from(Some("providers"), "gnss_port") {
            config.providers.gnss_port = parse_key("providers.gnss_port", value)?;
        }
        if let Some(value) = ini.get_from(Some("providers"), "lookup_url") {
            config.providers.lookup_url = Some(value.to_string());
        }
        if let Some(value) = ini.get_from(Some("providers"), "lookup_api_key") {
            config.providers.lookup_api_key = Some(value.to_string());
        }
        if let Some(value) = ini.get_from(Some("notification"), "title") {
            config.notification.title = value.to_string();
        }

        Ok(config)
    }
}

/// Parse one typed value, keeping the offending key in the error.
fn parse_key<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
    })
}
