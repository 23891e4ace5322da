//! The tracking controller.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::notify::NotificationPresenter;
use crate::position::{LocationReading, LocationStore};
use crate::provider::{
    PositionProvider, ProviderError, ProviderEvent, SubscriptionHandle, UpdatePolicy,
};

use super::status::{TrackingState, TrackingStatus};

/// Owns the tracking lifecycle: provider registration, fix handling, and
/// the status notification.
///
/// All methods run on one logical owner context (the service serializes
/// calls), so the controller itself needs no internal locking. The store
/// it writes to is independently synchronized for external readers.
pub struct TrackingController {
    state: TrackingState,
    status: TrackingStatus,
    policy: UpdatePolicy,
    providers: Vec<Arc<dyn PositionProvider>>,
    subscriptions: Vec<SubscriptionHandle>,
    store: LocationStore,
    presenter: NotificationPresenter,
    events_tx: mpsc::Sender<ProviderEvent>,
}

impl TrackingController {
    /// Create an inactive controller.
    ///
    /// `events_tx` is the sender handed to every provider at registration;
    /// the matching receiver is drained by the service bridge, which calls
    /// back into [`handle_event`](TrackingController::handle_event).
    pub fn new(
        providers: Vec<Arc<dyn PositionProvider>>,
        policy: UpdatePolicy,
        store: LocationStore,
        presenter: NotificationPresenter,
        events_tx: mpsc::Sender<ProviderEvent>,
    ) -> Self {
        Self {
            state: TrackingState::Inactive,
            status: TrackingStatus::Inactive,
            policy,
            providers,
            subscriptions: Vec::new(),
            store,
            presenter,
            events_tx,
        }
    }

    /// Start tracking.
    ///
    /// Raises the status notification, transitions to `Active`, then
    /// attempts to register every configured provider. Partial failure is
    /// tolerated: whatever registered keeps delivering, and the aggregate
    /// outcome is returned (and retained for [`status`](Self::status)).
    /// Idempotent — calling while already active changes nothing and
    /// returns the retained status.
    pub fn activate(&mut self) -> TrackingStatus {
        if self.state == TrackingState::Active {
            debug!("activate() ignored: tracking already active");
            return self.status;
        }

        self.presenter.present_initial();
        self.state = TrackingState::Active;

        let mut registered = 0usize;
        let mut permission_denied = 0usize;
        for provider in &self.providers {
            match provider.subscribe(&self.policy, self.events_tx.clone()) {
                Ok(handle) => {
                    info!(provider = provider.name(), "Provider registered");
                    self.subscriptions.push(handle);
                    registered += 1;
                }
                Err(ProviderError::PermissionDenied(reason)) => {
                    warn!(provider = provider.name(), %reason, "Provider registration not authorized");
                    permission_denied += 1;
                }
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "Provider registration failed, continuing without it");
                }
            }
        }

        self.status = if registered == self.providers.len() && registered > 0 {
            TrackingStatus::Nominal
        } else if registered == 0 && permission_denied > 0 {
            TrackingStatus::PermissionDenied
        } else {
            TrackingStatus::Degraded
        };

        info!(
            registered,
            configured = self.providers.len(),
            status = %self.status,
            "Tracking activated"
        );
        self.status
    }

    /// Stop tracking.
    ///
    /// Releases every held subscription exactly once, clears the
    /// notification, and transitions to `Inactive`. Safe to call when
    /// activation obtained zero subscriptions; idempotent when already
    /// inactive. The store keeps its last reading.
    pub fn deactivate(&mut self) {
        if self.state == TrackingState::Inactive {
            debug!("deactivate() ignored: tracking already inactive");
            return;
        }

        for handle in self.subscriptions.drain(..) {
            debug!(provider = %handle.kind(), "Releasing subscription");
            handle.release();
        }
        self.presenter.clear();
        self.state = TrackingState::Inactive;
        self.status = TrackingStatus::Inactive;
        info!("Tracking deactivated");
    }

    /// Route one provider event to its handler.
    pub fn handle_event(&mut self, event: ProviderEvent) {
        match event {
            ProviderEvent::Position(reading) => self.on_position_update(reading),
            ProviderEvent::Enabled(kind) => {
                info!(provider = %kind, "Provider enabled");
            }
            ProviderEvent::Disabled(kind) => {
                info!(provider = %kind, "Provider disabled");
            }
            ProviderEvent::Status(kind, health) => {
                debug!(provider = %kind, health = ?health, "Provider status changed");
            }
        }
    }

    /// Apply one position fix.
    ///
    /// Writes the reading to the store (last write wins) and refreshes the
    /// notification body. A fix arriving after `deactivate()` — the
    /// release/in-flight race — is dropped: the store keeps its previous
    /// value and the cleared notification stays cleared.
    pub fn on_position_update(&mut self, reading: LocationReading) {
        if self.state != TrackingState::Active {
            debug!(
                lat = reading.latitude,
                lon = reading.longitude,
                "Dropping fix delivered after deactivation"
            );
            return;
        }

        info!(
            lat = reading.latitude,
            lon = reading.longitude,
            provider = %reading.provider,
            "New location"
        );
        self.store.update(reading.clone());
        self.presenter.present_reading(&reading);
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TrackingState {
        self.state
    }

    /// Aggregate outcome of the most recent activation.
    pub fn status(&self) -> TrackingStatus {
        self.status
    }

    /// Number of live provider subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// The store this controller publishes to.
    pub fn store(&self) -> LocationStore {
        self.store.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{RecordingSink, SinkCall};
    use crate::position::ProviderKind;
    use chrono::Utc;
    use parking_lot::Mutex;
    use proptest::prelude::*;
    use tokio_util::sync::CancellationToken;

    /// Scripted provider: succeeds or fails registration on demand and
    /// remembers the cancellation token behind every handle it issued.
    struct MockProvider {
        kind: ProviderKind,
        outcome: Option<ProviderError>,
        issued: Mutex<Vec<CancellationToken>>,
    }

    impl MockProvider {
        fn succeeding(kind: ProviderKind) -> Arc<Self> {
            Arc::new(Self {
                kind,
                outcome: None,
                issued: Mutex::new(Vec::new()),
            })
        }

        fn failing(kind: ProviderKind, error: ProviderError) -> Arc<Self> {
            Arc::new(Self {
                kind,
                outcome: Some(error),
                issued: Mutex::new(Vec::new()),
            })
        }

        fn subscribe_calls(&self) -> usize {
            self.issued.lock().len()
        }

        fn live_subscriptions(&self) -> usize {
            self.issued.lock().iter().filter(|t| !t.is_cancelled()).count()
        }
    }

    impl PositionProvider for MockProvider {
        fn kind(&self) -> ProviderKind {
            self.kind
        }

        fn name(&self) -> &str {
            "mock"
        }

        fn subscribe(
            &self,
            _policy: &UpdatePolicy,
            _events: mpsc::Sender<ProviderEvent>,
        ) -> Result<SubscriptionHandle, ProviderError> {
            if let Some(error) = &self.outcome {
                return Err(error.clone());
            }
            let token = CancellationToken::new();
            self.issued.lock().push(token.clone());
            Ok(SubscriptionHandle::new(self.kind, token))
        }
    }

    struct Fixture {
        controller: TrackingController,
        store: LocationStore,
        sink: Arc<RecordingSink>,
        primary: Arc<MockProvider>,
        secondary: Arc<MockProvider>,
        _events_rx: mpsc::Receiver<ProviderEvent>,
    }

    fn fixture(primary: Arc<MockProvider>, secondary: Arc<MockProvider>) -> Fixture {
        let (events_tx, events_rx) = mpsc::channel(32);
        let store = LocationStore::new();
        let sink = Arc::new(RecordingSink::new());
        let presenter = NotificationPresenter::new(sink.clone(), "Location Tracking Active");
        let providers: Vec<Arc<dyn PositionProvider>> =
            vec![primary.clone(), secondary.clone()];
        let controller = TrackingController::new(
            providers,
            UpdatePolicy::default(),
            store.clone(),
            presenter,
            events_tx,
        );
        Fixture {
            controller,
            store,
            sink,
            primary,
            secondary,
            _events_rx: events_rx,
        }
    }

    fn nominal_fixture() -> Fixture {
        fixture(
            MockProvider::succeeding(ProviderKind::Primary),
            MockProvider::succeeding(ProviderKind::Secondary),
        )
    }

    #[test]
    fn test_activate_registers_both_providers() {
        let mut fx = nominal_fixture();

        let status = fx.controller.activate();

        assert_eq!(status, TrackingStatus::Nominal);
        assert_eq!(fx.controller.state(), TrackingState::Active);
        assert_eq!(fx.controller.subscription_count(), 2);
        assert_eq!(fx.primary.live_subscriptions(), 1);
        assert_eq!(fx.secondary.live_subscriptions(), 1);
    }

    #[test]
    fn test_activate_is_idempotent() {
        let mut fx = nominal_fixture();

        fx.controller.activate();
        let status = fx.controller.activate();

        assert_eq!(status, TrackingStatus::Nominal);
        assert_eq!(fx.controller.subscription_count(), 2);
        // No duplicate registrations
        assert_eq!(fx.primary.subscribe_calls(), 1);
        assert_eq!(fx.secondary.subscribe_calls(), 1);
    }

    #[test]
    fn test_deactivate_releases_every_subscription_once() {
        let mut fx = nominal_fixture();

        fx.controller.activate();
        fx.controller.deactivate();

        assert_eq!(fx.controller.state(), TrackingState::Inactive);
        assert_eq!(fx.controller.subscription_count(), 0);
        assert_eq!(fx.primary.live_subscriptions(), 0);
        assert_eq!(fx.secondary.live_subscriptions(), 0);

        // Idempotent, and nothing left to double-release
        fx.controller.deactivate();
        assert_eq!(fx.controller.subscription_count(), 0);
    }

    #[test]
    fn test_deactivate_before_activate_is_a_noop() {
        let mut fx = nominal_fixture();
        fx.controller.deactivate();
        assert_eq!(fx.controller.state(), TrackingState::Inactive);
        assert!(fx.sink.calls().is_empty());
    }

    #[test]
    fn test_partial_registration_failure_degrades() {
        let mut fx = fixture(
            MockProvider::succeeding(ProviderKind::Primary),
            MockProvider::failing(
                ProviderKind::Secondary,
                ProviderError::Unavailable("disabled on device".into()),
            ),
        );

        let status = fx.controller.activate();

        assert_eq!(status, TrackingStatus::Degraded);
        assert_eq!(fx.controller.state(), TrackingState::Active);
        assert_eq!(fx.controller.subscription_count(), 1);
        assert_eq!(fx.primary.live_subscriptions(), 1);
    }

    #[test]
    fn test_dual_permission_failure_stays_active_with_zero_subscriptions() {
        let mut fx = fixture(
            MockProvider::failing(
                ProviderKind::Primary,
                ProviderError::PermissionDenied("fine location not granted".into()),
            ),
            MockProvider::failing(
                ProviderKind::Secondary,
                ProviderError::PermissionDenied("coarse location not granted".into()),
            ),
        );

        let status = fx.controller.activate();

        assert_eq!(status, TrackingStatus::PermissionDenied);
        assert_eq!(fx.controller.status(), TrackingStatus::PermissionDenied);
        assert_eq!(fx.controller.state(), TrackingState::Active);
        assert_eq!(fx.controller.subscription_count(), 0);
        // Notification is still shown; store stays empty
        assert!(fx.sink.displayed().is_some());
        assert!(fx.store.current().is_none());

        // Deactivation must be safe with zero subscriptions
        fx.controller.deactivate();
        assert_eq!(fx.controller.state(), TrackingState::Inactive);
    }

    #[test]
    fn test_position_update_is_stored_verbatim() {
        let mut fx = nominal_fixture();
        fx.controller.activate();

        let stamp = Utc::now();
        let reading =
            LocationReading::with_timestamp(37.7749, -122.4194, ProviderKind::Primary, stamp);
        fx.controller.on_position_update(reading.clone());

        assert_eq!(fx.store.current(), Some(reading));
    }

    #[test]
    fn test_last_write_wins() {
        let mut fx = nominal_fixture();
        fx.controller.activate();

        fx.controller
            .on_position_update(LocationReading::new(53.0, 10.0, ProviderKind::Primary));
        fx.controller
            .on_position_update(LocationReading::new(48.1, 11.6, ProviderKind::Secondary));

        let current = fx.store.current().unwrap();
        assert_eq!(current.latitude, 48.1);
        assert_eq!(current.provider, ProviderKind::Secondary);
    }

    #[test]
    fn test_fix_after_deactivate_is_dropped() {
        let mut fx = nominal_fixture();
        fx.controller.activate();
        fx.controller
            .on_position_update(LocationReading::new(53.0, 10.0, ProviderKind::Primary));
        fx.controller.deactivate();

        // Simulated in-flight fix racing the teardown
        fx.controller
            .on_position_update(LocationReading::new(0.0, 0.0, ProviderKind::Secondary));

        // Store keeps the pre-deactivation value
        let current = fx.store.current().unwrap();
        assert_eq!(current.latitude, 53.0);

        // Notification stays cleared: the last sink call is still Clear
        let calls = fx.sink.calls();
        assert_eq!(calls.last(), Some(&SinkCall::Clear));
    }

    #[test]
    fn test_auxiliary_events_do_not_change_state() {
        let mut fx = nominal_fixture();
        fx.controller.activate();
        let before = fx.sink.calls().len();

        fx.controller
            .handle_event(ProviderEvent::Enabled(ProviderKind::Primary));
        fx.controller
            .handle_event(ProviderEvent::Disabled(ProviderKind::Secondary));
        fx.controller.handle_event(ProviderEvent::Status(
            ProviderKind::Primary,
            crate::provider::ProviderHealth::TemporarilyUnavailable,
        ));

        assert_eq!(fx.controller.state(), TrackingState::Active);
        assert_eq!(fx.controller.subscription_count(), 2);
        assert_eq!(fx.sink.calls().len(), before);
    }

    #[test]
    fn test_full_tracking_scenario() {
        let mut fx = nominal_fixture();

        fx.controller.activate();
        fx.controller.handle_event(ProviderEvent::Position(LocationReading::new(
            37.7749,
            -122.4194,
            ProviderKind::Primary,
        )));

        let current = fx.store.current().unwrap();
        assert_eq!(current.latitude, 37.7749);
        assert_eq!(current.longitude, -122.4194);
        assert_eq!(current.provider, ProviderKind::Primary);

        let body = fx.sink.displayed().unwrap().body;
        assert!(body.contains("Lat 37.7749, Lon -122.4194"), "got: {}", body);

        fx.controller.deactivate();
        assert_eq!(fx.sink.calls().last(), Some(&SinkCall::Clear));

        // The store is not cleared by deactivation
        let after = fx.store.current().unwrap();
        assert_eq!(after.latitude, 37.7749);
    }

    proptest! {
        /// For any call sequence, the final state is Active iff the last
        /// call was activate(), and subscriptions exist iff active.
        #[test]
        fn test_state_follows_last_lifecycle_call(calls in proptest::collection::vec(any::<bool>(), 0..32)) {
            let mut fx = nominal_fixture();

            for &is_activate in &calls {
                if is_activate {
                    fx.controller.activate();
                } else {
                    fx.controller.deactivate();
                }
            }

            let expected = match calls.last() {
                Some(true) => TrackingState::Active,
                _ => TrackingState::Inactive,
            };
            prop_assert_eq!(fx.controller.state(), expected);

            let expected_subs = if expected == TrackingState::Active { 2 } else { 0 };
            prop_assert_eq!(fx.controller.subscription_count(), expected_subs);
        }
    }
}
