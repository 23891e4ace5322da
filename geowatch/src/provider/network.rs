//! Network geolocation lookup provider (secondary, coarse fallback).
//!
//! Polls an HTTP geolocation endpoint that reports the device's
//! approximate position as JSON (`{"lat": .., "lon": ..}`), the way
//! carrier and WiFi positioning services expose it. The endpoint is probed
//! once synchronously at subscribe time so registration fails fast — a 401
//! or 403 surfaces as a permission error, transport failures as
//! provider-unavailable. The probe result doubles as the first fix.
//!
//! Some endpoints require an API key; configure one with
//! [`NetworkLookupProvider::with_api_key`]. Authorization failures after
//! registration are reported as status events and logged, not fatal.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::position::{LocationReading, ProviderKind};

use super::http::HttpClient;
use super::policy::{UpdatePolicy, UpdateThrottle};
use super::types::{
    PositionProvider, ProviderError, ProviderEvent, ProviderHealth, SubscriptionHandle,
};

/// How often the poller thread re-checks for cancellation while sleeping.
const CANCEL_POLL_STEP: Duration = Duration::from_millis(50);

/// Position report returned by the lookup endpoint.
#[derive(Debug, Deserialize)]
struct LookupResponse {
    lat: f64,
    lon: f64,
}

/// HTTP polling provider for a network geolocation endpoint.
pub struct NetworkLookupProvider<C: HttpClient> {
    http_client: Arc<C>,
    endpoint_url: String,
    api_key: Option<String>,
}

impl<C: HttpClient + 'static> NetworkLookupProvider<C> {
    /// Creates a provider polling the given endpoint.
    pub fn new(http_client: C, endpoint_url: impl Into<String>) -> Self {
        Self {
            http_client: Arc::new(http_client),
            endpoint_url: endpoint_url.into(),
            api_key: None,
        }
    }

    /// Attach an API key, sent as a `key` query parameter.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Builds the lookup URL with the API key when one is configured.
    fn build_url(&self) -> String {
        match &self.api_key {
            Some(key) => {
                let sep = if self.endpoint_url.contains('?') { '&' } else { '?' };
                format!("{}{}key={}", self.endpoint_url, sep, key)
            }
            None => self.endpoint_url.clone(),
        }
    }

    /// One lookup round trip.
    fn lookup(client: &C, url: &str) -> Result<(f64, f64), ProviderError> {
        let body = client.get(url)?;
        decode_lookup(&body)
    }
}

impl<C: HttpClient + 'static> PositionProvider for NetworkLookupProvider<C> {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Secondary
    }

    fn name(&self) -> &str {
        "network-lookup"
    }

    fn subscribe(
        &self,
        policy: &UpdatePolicy,
        events: mpsc::Sender<ProviderEvent>,
    ) -> Result<SubscriptionHandle, ProviderError> {
        let url = self.build_url();
        let kind = self.kind();

        // Probe the endpoint before committing: registration either
        // succeeds with a first fix or fails fast.
        let (lat, lon) = Self::lookup(&self.http_client, &url).map_err(|e| match e {
            ProviderError::PermissionDenied(_) => e,
            other => ProviderError::Unavailable(format!("lookup endpoint: {}", other)),
        })?;

        let mut throttle = UpdateThrottle::new(policy.clone());
        throttle.accept(lat, lon);

        let _ = events.try_send(ProviderEvent::Enabled(kind));
        let _ = events.try_send(ProviderEvent::Position(LocationReading::new(
            lat,
            lon,
            ProviderKind::Secondary,
        )));

        let token = CancellationToken::new();
        let task_token = token.clone();
        let client = Arc::clone(&self.http_client);
        let poll_interval = policy.min_interval;

        thread::spawn(move || {
            let mut healthy = true;
            loop {
                if sleep_with_cancel(&task_token, poll_interval) {
                    debug!("Network lookup subscription released");
                    break;
                }

                match Self::lookup(&client, &url) {
                    Ok((lat, lon)) => {
                        if !healthy {
                            healthy = true;
                            info!("Network lookup recovered");
                            if events
                                .blocking_send(ProviderEvent::Status(kind, ProviderHealth::Available))
                                .is_err()
                            {
                                break;
                            }
                        }
                        if !throttle.accept(lat, lon) {
                            continue;
                        }
                        let reading = LocationReading::new(lat, lon, ProviderKind::Secondary);
                        if events.blocking_send(ProviderEvent::Position(reading)).is_err() {
                            debug!("Event channel closed, stopping network poller");
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Network lookup failed");
                        if healthy {
                            healthy = false;
                            if events
                                .blocking_send(ProviderEvent::Status(
                                    kind,
                                    ProviderHealth::TemporarilyUnavailable,
                                ))
                                .is_err()
                            {
                                break;
                            }
                        }
                    }
                }
            }
        });

        debug!(endpoint = %self.endpoint_url, "Network lookup provider registered");
        Ok(SubscriptionHandle::new(kind, token))
    }
}

/// Sleep for `duration`, waking early on cancellation.
///
/// Returns true when the token was cancelled.
fn sleep_with_cancel(token: &CancellationToken, duration: Duration) -> bool {
    let mut remaining = duration;
    while !remaining.is_zero() {
        if token.is_cancelled() {
            return true;
        }
        let step = remaining.min(CANCEL_POLL_STEP);
        thread::sleep(step);
        remaining -= step;
    }
    token.is_cancelled()
}

/// Decode a lookup response body.
fn decode_lookup(body: &[u8]) -> Result<(f64, f64), ProviderError> {
    let response: LookupResponse = serde_json::from_slice(body)
        .map_err(|e| ProviderError::Parse(format!("bad lookup response: {}", e)))?;

    if !(-90.0..=90.0).contains(&response.lat) || !(-180.0..=180.0).contains(&response.lon) {
        return Err(ProviderError::Parse(format!(
            "coordinates out of range: {}, {}",
            response.lat, response.lon
        )));
    }

    Ok((response.lat, response.lon))
}
