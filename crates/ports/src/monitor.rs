//! Visibility monitor boundary contract.

use std::sync::Arc;
use vismetrics_domain::VisibilityStatus;

/// Payload-free notification handler. Handlers re-read `status()` when invoked.
pub type VisibilityHandler = Arc<dyn Fn() + Send + Sync>;

/// Handle returned for a registered handler, used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Wrap a raw identifier chosen by the monitor.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Boundary contract for a component observing one element's visibility.
///
/// Implementations decide when to notify. Handlers must be invoked outside any
/// lock guarding `status()`, since handlers call back into the monitor.
pub trait VisibilityMonitorPort: Send + Sync {
    /// Current visibility snapshot.
    fn status(&self) -> VisibilityStatus;

    /// Register a handler fired whenever the visible percentage changes.
    fn on_visibility_percentage_change(&self, handler: VisibilityHandler) -> SubscriptionId;

    /// Register a handler fired whenever the discrete state changes.
    fn on_visibility_change(&self, handler: VisibilityHandler) -> SubscriptionId;

    /// Remove a handler. Unknown or already removed ids are ignored.
    fn unsubscribe(&self, subscription: SubscriptionId);
}
