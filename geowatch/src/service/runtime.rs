//! Tracking service wiring and the provider event bridge.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::TrackingConfig;
use crate::notify::{NotificationPresenter, NotificationSink};
use crate::position::LocationStore;
use crate::provider::{PositionProvider, ProviderEvent};
use crate::tracker::{TrackingController, TrackingState, TrackingStatus};

/// Buffered provider events before backpressure.
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Runs the tracking controller for a host.
///
/// Created once per process, usually by the CLI or an embedding daemon.
/// Cloning is not supported; hand out [`store`](TrackingService::store)
/// clones to readers instead.
pub struct TrackingService {
    controller: Arc<Mutex<TrackingController>>,
    store: LocationStore,
    cancellation: CancellationToken,
}

impl TrackingService {
    /// Wire up the controller and start the event bridge on `runtime`.
    ///
    /// The service starts inactive; call
    /// [`activate`](TrackingService::activate) to begin tracking.
    pub fn start(
        config: TrackingConfig,
        providers: Vec<Arc<dyn PositionProvider>>,
        sink: Arc<dyn NotificationSink>,
        runtime: Handle,
    ) -> Self {
        let (events_tx, mut events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let store = LocationStore::new();
        let presenter = NotificationPresenter::new(sink, config.notification_title);
        let controller = Arc::new(Mutex::new(TrackingController::new(
            providers,
            config.policy,
            store.clone(),
            presenter,
            events_tx,
        )));

        let cancellation = CancellationToken::new();
        let bridge_cancel = cancellation.clone();
        let bridge_controller = Arc::clone(&controller);

        // Bridge task: the one place provider events enter the controller,
        // serialized with lifecycle calls by the controller lock.
        runtime.spawn(async move {
            loop {
                tokio::select! {
                    biased;

                    _ = bridge_cancel.cancelled() => {
                        debug!("Provider event bridge cancelled");
                        break;
                    }

                    event = events_rx.recv() => {
                        match event {
                            Some(event) => bridge_controller.lock().handle_event(event),
                            None => {
                                debug!("Provider event channel closed");
                                break;
                            }
                        }
                    }
                }
            }
        });

        info!("Tracking service started (inactive)");
        Self {
            controller,
            store,
            cancellation,
        }
    }

    /// Host entry point: begin tracking.
    pub fn activate(&self) -> TrackingStatus {
        self.controller.lock().activate()
    }

    /// Host entry point: stop tracking.
    pub fn deactivate(&self) {
        self.controller.lock().deactivate()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TrackingState {
        self.controller.lock().state()
    }

    /// Aggregate outcome of the most recent activation.
    pub fn status(&self) -> TrackingStatus {
        self.controller.lock().status()
    }

    /// Read access to the latest-location store.
    pub fn store(&self) -> LocationStore {
        self.store.clone()
    }

    /// Stop tracking and tear the bridge down.
    ///
    /// Deactivates first (releasing subscriptions and clearing the
    /// notification), then cancels the bridge task. Unconditional:
    /// safe whatever state the service is in.
    pub fn shutdown(self) {
        info!("Shutting down tracking service");
        self.controller.lock().deactivate();
        self.cancellation.cancel();
        info!("Tracking service shutdown complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::StatusNotification;
    use crate::provider::{MockHttpClient, NetworkLookupProvider, UpdatePolicy};
    use std::time::Duration;

    fn lookup_provider(lat: f64, lon: f64) -> Arc<dyn PositionProvider> {
        let body = format!(r#"{{"lat": {}, "lon": {}}}"#, lat, lon);
        Arc::new(NetworkLookupProvider::new(
            MockHttpClient {
                response: Ok(body.into_bytes()),
            },
            "https://geo.example.com/v1/locate",
        ))
    }

    fn test_config() -> TrackingConfig {
        TrackingConfig::default().with_policy(
            UpdatePolicy::default()
                .with_min_interval(Duration::from_millis(20))
                .with_min_distance_m(10.0),
        )
    }

    fn wait_for<F: Fn() -> bool>(condition: F) -> bool {
        for _ in 0..250 {
            if condition() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        false
    }

    #[test]
    fn test_end_to_end_fix_flow() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let sink = StatusNotification::new();
        let service = TrackingService::start(
            test_config(),
            vec![lookup_provider(37.7749, -122.4194)],
            Arc::new(sink.clone()),
            runtime.handle().clone(),
        );

        let status = service.activate();
        assert_eq!(status, TrackingStatus::Nominal);
        assert_eq!(service.state(), TrackingState::Active);
        assert!(sink.is_present());

        // The registration probe's fix travels provider → bridge → store.
        let store = service.store();
        assert!(wait_for(|| store.current().is_some()), "no fix arrived");

        let reading = store.current().unwrap();
        assert_eq!(reading.latitude, 37.7749);
        assert_eq!(reading.longitude, -122.4194);

        assert!(wait_for(|| {
            sink.current()
                .map(|c| c.body.contains("Lat 37.7749, Lon -122.4194"))
                .unwrap_or(false)
        }));

        service.shutdown();
        assert!(!sink.is_present());

        // Late readers still see the last fix after shutdown.
        assert!(store.current().is_some());
    }

    #[test]
    fn test_lifecycle_calls_are_idempotent_through_the_service() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let sink = StatusNotification::new();
        let service = TrackingService::start(
            test_config(),
            vec![lookup_provider(53.0, 10.0)],
            Arc::new(sink.clone()),
            runtime.handle().clone(),
        );

        assert_eq!(service.activate(), TrackingStatus::Nominal);
        assert_eq!(service.activate(), TrackingStatus::Nominal);

        service.deactivate();
        service.deactivate();
        assert_eq!(service.state(), TrackingState::Inactive);
        assert!(!sink.is_present());

        service.shutdown();
    }
}
