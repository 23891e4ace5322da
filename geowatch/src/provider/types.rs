//! Provider trait, events, errors, and the subscription handle.

use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::position::{LocationReading, ProviderKind};

use super::UpdatePolicy;

/// Errors a provider can raise at registration or while delivering fixes.
#[derive(Debug, Error, Clone)]
pub enum ProviderError {
    /// Registration rejected because the caller lacks authorization
    /// (privileged port, missing API credential, ...).
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The provider cannot be registered right now (disabled, port taken,
    /// endpoint unreachable). The other provider may still succeed.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A fix arrived but could not be decoded.
    #[error("malformed fix: {0}")]
    Parse(String),
}

/// Reported operational health of a provider, observed and logged only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderHealth {
    /// Delivering fixes normally.
    Available,
    /// Temporarily unable to produce fixes (e.g. no satellite lock,
    /// endpoint rejecting requests); expected to recover on its own.
    TemporarilyUnavailable,
    /// Not expected to recover without operator intervention.
    OutOfService,
}

/// Asynchronous message from a provider to the tracking controller.
///
/// `Position` is the payload that drives the store and the notification;
/// the other three are auxiliary status signals that are logged and
/// otherwise have no contract.
#[derive(Debug, Clone)]
pub enum ProviderEvent {
    /// A new position fix.
    Position(LocationReading),
    /// The provider came (back) online.
    Enabled(ProviderKind),
    /// The provider went offline.
    Disabled(ProviderKind),
    /// The provider's health changed.
    Status(ProviderKind, ProviderHealth),
}

/// Token representing an active registration with one provider.
///
/// Ownership is exclusive: releasing consumes the handle, so a
/// subscription cannot be released twice or referenced after release.
/// Release stops event delivery for this subscription by cancelling the
/// provider-side task.
#[derive(Debug)]
pub struct SubscriptionHandle {
    kind: ProviderKind,
    token: CancellationToken,
}

impl SubscriptionHandle {
    /// Create a handle tied to the given cancellation token.
    ///
    /// Providers create one per successful `subscribe()` call; the token
    /// is shared with the task delivering events.
    pub fn new(kind: ProviderKind, token: CancellationToken) -> Self {
        Self { kind, token }
    }

    /// Which provider this subscription belongs to.
    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    /// Stop receiving updates from this subscription.
    ///
    /// Consumes the handle; the provider-side task observes the
    /// cancellation and exits.
    pub fn release(self) {
        self.token.cancel();
    }
}

/// A source of position fixes the tracking controller can register with.
///
/// Implementations must be `Send + Sync`; the controller holds them behind
/// `Arc<dyn PositionProvider>` and may call `subscribe()` from the service
/// context. Registration must fail fast — no retries, no indefinite
/// blocking.
pub trait PositionProvider: Send + Sync {
    /// Which slot this provider fills (primary or secondary).
    fn kind(&self) -> ProviderKind;

    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Register for position updates under the given policy.
    ///
    /// On success the provider starts delivering [`ProviderEvent`]s on
    /// `events` until the returned handle is released. On failure nothing
    /// is delivered and no resources are held.
    fn subscribe(
        &self,
        policy: &UpdatePolicy,
        events: mpsc::Sender<ProviderEvent>,
    ) -> Result<SubscriptionHandle, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_cancels_the_token() {
        let token = CancellationToken::new();
        let task_side = token.clone();

        let handle = SubscriptionHandle::new(ProviderKind::Primary, token);
        assert_eq!(handle.kind(), ProviderKind::Primary);
        assert!(!task_side.is_cancelled());

        handle.release();
        assert!(task_side.is_cancelled());
    }

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::PermissionDenied("port 101 requires root".into());
        assert!(err.to_string().contains("permission denied"));

        let err = ProviderError::Unavailable("address in use".into());
        assert!(err.to_string().contains("provider unavailable"));
    }
}
