//! GNSS receiver feed provider (primary, high-accuracy).
//!
//! Listens for `GEOFIX,<lat>,<lon>` datagrams from a GNSS receiver
//! broadcasting on UDP, the way split-receiver setups publish NMEA-derived
//! fixes on the local network. Binding happens synchronously at subscribe
//! time so registration fails fast; the reader task then runs on the
//! provided runtime handle until the subscription is released.

use std::io;
use std::net::UdpSocket as StdUdpSocket;

use tokio::net::UdpSocket;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::position::{LocationReading, ProviderKind};

use super::policy::{UpdatePolicy, UpdateThrottle};
use super::types::{PositionProvider, ProviderError, ProviderEvent, SubscriptionHandle};

/// Largest datagram the receiver feed produces.
const MAX_DATAGRAM_LEN: usize = 256;

/// UDP provider for a GNSS receiver fix feed.
///
/// # Example
///
/// ```ignore
/// use geowatch::provider::{GnssUdpProvider, PositionProvider, UpdatePolicy};
///
/// let provider = GnssUdpProvider::new(49005, runtime.handle().clone());
/// let handle = provider.subscribe(&UpdatePolicy::default(), events_tx)?;
/// ```
pub struct GnssUdpProvider {
    port: u16,
    runtime: Handle,
}

impl GnssUdpProvider {
    /// Create a provider listening on the given UDP port.
    pub fn new(port: u16, runtime: Handle) -> Self {
        Self { port, runtime }
    }
}

impl PositionProvider for GnssUdpProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Primary
    }

    fn name(&self) -> &str {
        "gnss-udp"
    }

    fn subscribe(
        &self,
        policy: &UpdatePolicy,
        events: mpsc::Sender<ProviderEvent>,
    ) -> Result<SubscriptionHandle, ProviderError> {
        let socket = StdUdpSocket::bind(("0.0.0.0", self.port)).map_err(map_bind_error)?;
        socket
            .set_nonblocking(true)
            .map_err(|e| ProviderError::Unavailable(format!("socket setup failed: {}", e)))?;

        let token = CancellationToken::new();
        let task_token = token.clone();
        let kind = self.kind();
        let port = self.port;
        let mut throttle = UpdateThrottle::new(policy.clone());

        self.runtime.spawn(async move {
            let socket = match UdpSocket::from_std(socket) {
                Ok(s) => s,
                Err(e) => {
                    warn!(port, error = %e, "GNSS socket registration failed");
                    let _ = events.send(ProviderEvent::Disabled(kind)).await;
                    return;
                }
            };

            if events.send(ProviderEvent::Enabled(kind)).await.is_err() {
                return;
            }

            let mut buf = [0u8; MAX_DATAGRAM_LEN];
            loop {
                tokio::select! {
                    biased;

                    _ = task_token.cancelled() => {
                        debug!(port, "GNSS subscription released");
                        break;
                    }

                    result = socket.recv_from(&mut buf) => {
                        match result {
                            Ok((len, _peer)) => {
                                let (lat, lon) = match parse_geofix(&buf[..len]) {
                                    Ok(fix) => fix,
                                    Err(e) => {
                                        trace!(port, error = %e, "Ignoring datagram");
                                        continue;
                                    }
                                };
                                if !throttle.accept(lat, lon) {
                                    continue;
                                }
                                let reading =
                                    LocationReading::new(lat, lon, ProviderKind::Primary);
                                if events.send(ProviderEvent::Position(reading)).await.is_err() {
                                    debug!(port, "Event channel closed, stopping GNSS reader");
                                    break;
                                }
                            }
                            Err(e) => {
                                warn!(port, error = %e, "GNSS socket read failed");
                                let _ = events.send(ProviderEvent::Disabled(kind)).await;
                                break;
                            }
                        }
                    }
                }
            }
        });

        debug!(port = self.port, "GNSS provider registered");
        Ok(SubscriptionHandle::new(kind, token))
    }
}

/// Map a bind failure onto the provider error taxonomy.
fn map_bind_error(e: io::Error) -> ProviderError {
    match e.kind() {
        io::ErrorKind::PermissionDenied => {
            ProviderError::PermissionDenied(format!("UDP bind rejected: {}", e))
        }
        _ => ProviderError::Unavailable(format!("UDP bind failed: {}", e)),
    }
}

/// Parse a `GEOFIX,<lat>,<lon>` datagram.
fn parse_geofix(datagram: &[u8]) -> Result<(f64, f64), ProviderError> {
    let text = std::str::from_utf8(datagram)
        .map_err(|_| ProviderError::Parse("not valid UTF-8".into()))?
        .trim();

    let mut fields = text.split(',');
    match fields.next() {
        Some("GEOFIX") => {}
        _ => return Err(ProviderError::Parse(format!("unknown sentence: {}", text))),
    }

    let lat: f64 = fields
        .next()
        .ok_or_else(|| ProviderError::Parse("missing latitude".into()))?
        .trim()
        .parse()
        .map_err(|_| ProviderError::Parse("bad latitude".into()))?;
    let lon: f64 = fields
        .next()
        .ok_or_else(|| ProviderError::Parse("missing longitude".into()))?
        .trim()
        .parse()
        .map_err(|_| ProviderError::Parse("bad longitude".into()))?;

    if !(-90.0..=90.0).contains(&lat) {
        return Err(ProviderError::Parse(format!("latitude out of range: {}", lat)));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(ProviderError::Parse(format!("longitude out of range: {}", lon)));
    }

    Ok((lat, lon))
}
