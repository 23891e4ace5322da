//! Update policy and the per-subscription throttle that enforces it.
//!
//! Providers deliver a fix only when both the elapsed-time and the
//! moved-distance thresholds are satisfied. The first fix after
//! registration always passes.

use std::time::{Duration, Instant};

/// Default minimum interval between delivered fixes.
const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(5000);

/// Default minimum movement between delivered fixes, in meters.
const DEFAULT_MIN_DISTANCE_M: f64 = 10.0;

/// Meters per degree of latitude (good enough at tracking scales).
const METERS_PER_DEGREE: f64 = 111_320.0;

/// Delivery policy for a provider subscription.
///
/// An update fires only if the fix is at least `min_interval` after the
/// previous delivered fix AND at least `min_distance_m` away from it.
#[derive(Debug, Clone)]
pub struct UpdatePolicy {
    /// Minimum time between delivered fixes.
    pub min_interval: Duration,
    /// Minimum movement between delivered fixes, in meters.
    pub min_distance_m: f64,
}

impl Default for UpdatePolicy {
    fn default() -> Self {
        Self {
            min_interval: DEFAULT_MIN_INTERVAL,
            min_distance_m: DEFAULT_MIN_DISTANCE_M,
        }
    }
}

impl UpdatePolicy {
    /// Set the minimum interval.
    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    /// Set the minimum distance in meters.
    pub fn with_min_distance_m(mut self, meters: f64) -> Self {
        self.min_distance_m = meters;
        self
    }
}

/// Gate that applies an [`UpdatePolicy`] to a stream of raw fixes.
///
/// One throttle per subscription. Not shared across threads; each
/// provider task owns its own.
#[derive(Debug)]
pub struct UpdateThrottle {
    policy: UpdatePolicy,
    last: Option<(f64, f64, Instant)>,
}

impl UpdateThrottle {
    /// Create a throttle for the given policy.
    pub fn new(policy: UpdatePolicy) -> Self {
        Self { policy, last: None }
    }

    /// Decide whether a fix at (`latitude`, `longitude`) should be
    /// delivered now. Accepted fixes become the new reference point.
    pub fn accept(&mut self, latitude: f64, longitude: f64) -> bool {
        self.accept_at(latitude, longitude, Instant::now())
    }

    /// Decide with an explicit clock (for testing).
    pub fn accept_at(&mut self, latitude: f64, longitude: f64, now: Instant) -> bool {
        match self.last {
            None => {
                self.last = Some((latitude, longitude, now));
                true
            }
            Some((last_lat, last_lon, last_at)) => {
                if now.duration_since(last_at) < self.policy.min_interval {
                    return false;
                }
                let moved = distance_meters(last_lat, last_lon, latitude, longitude);
                if moved < self.policy.min_distance_m {
                    return false;
                }
                self.last = Some((latitude, longitude, now));
                true
            }
        }
    }
}

/// Approximate ground distance between two points in meters.
///
/// Equirectangular approximation; accurate to well under a percent at the
/// 10 m scales the policy operates on.
fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let mean_lat = ((lat1 + lat2) / 2.0).to_radians();
    let dlat_m = (lat2 - lat1) * METERS_PER_DEGREE;
    let dlon_m = (lon2 - lon1) * METERS_PER_DEGREE * mean_lat.cos();
    (dlat_m * dlat_m + dlon_m * dlon_m).sqrt()
}
