//! Location reading value types.

use std::fmt;

use chrono::{DateTime, Utc};

/// Which class of positioning provider produced a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// High-accuracy satellite-class source (GNSS receiver feed).
    Primary,
    /// Coarse network-class fallback (geolocation lookup).
    Secondary,
}

impl ProviderKind {
    /// Short lowercase label for logging and config keys.
    pub fn label(&self) -> &'static str {
        match self {
            ProviderKind::Primary => "primary",
            ProviderKind::Secondary => "secondary",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single position fix delivered by a provider.
///
/// Immutable once constructed. The store and the notification presenter
/// consume readings by value; nothing is persisted beyond process lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationReading {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Provider that produced this fix.
    pub provider: ProviderKind,
    /// Wall-clock time the fix was received.
    pub timestamp: DateTime<Utc>,
}

impl LocationReading {
    /// Create a reading stamped with the current time.
    pub fn new(latitude: f64, longitude: f64, provider: ProviderKind) -> Self {
        Self {
            latitude,
            longitude,
            provider,
            timestamp: Utc::now(),
        }
    }

    /// Create a reading with an explicit timestamp (for testing).
    pub fn with_timestamp(
        latitude: f64,
        longitude: f64,
        provider: ProviderKind,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            latitude,
            longitude,
            provider,
            timestamp,
        }
    }
}

impl fmt::Display for LocationReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lat {:.4}, Lon {:.4} ({})",
            self.latitude, self.longitude, self.provider
        )
    }
}
