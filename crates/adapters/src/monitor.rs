//! Push-fed visibility monitor.
//!
//! The host feeds percentage readings through [`VisibilityMonitor::update`];
//! the monitor classifies them and notifies subscribers. Handlers run after
//! every internal lock is released, so they may read `status()` or register
//! further handlers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use vismetrics_domain::{Percentage, VisibilityThresholds};
use vismetrics_ports::{
    SubscriptionId, VisibilityHandler, VisibilityMonitorPort, VisibilityStatus,
};

type Subscribers = Mutex<Vec<(SubscriptionId, VisibilityHandler)>>;

/// Monitor for one element, driven by explicit percentage updates.
pub struct VisibilityMonitor {
    thresholds: VisibilityThresholds,
    status: Mutex<VisibilityStatus>,
    next_subscription: AtomicU64,
    percentage_handlers: Subscribers,
    state_handlers: Subscribers,
}

impl VisibilityMonitor {
    /// Monitor with default thresholds, starting hidden.
    #[must_use]
    pub fn new() -> Self {
        Self::with_thresholds(VisibilityThresholds::default())
    }

    /// Monitor with custom thresholds, starting hidden.
    #[must_use]
    pub fn with_thresholds(thresholds: VisibilityThresholds) -> Self {
        Self {
            thresholds,
            status: Mutex::new(VisibilityStatus::hidden()),
            next_subscription: AtomicU64::new(0),
            percentage_handlers: Mutex::new(Vec::new()),
            state_handlers: Mutex::new(Vec::new()),
        }
    }

    /// Set the initial reading without notifying anyone.
    #[must_use]
    pub fn starting_at(self, percentage: f64) -> Self {
        let status = VisibilityStatus::classify(Percentage::new(percentage), &self.thresholds);
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = status;
        self
    }

    /// Classification thresholds.
    #[must_use]
    pub const fn thresholds(&self) -> &VisibilityThresholds {
        &self.thresholds
    }

    /// Record a new percentage reading and return the resulting status.
    ///
    /// State-change handlers fire first when the discrete state changed, then
    /// percentage-change handlers when the percentage changed.
    pub fn update(&self, percentage: f64) -> VisibilityStatus {
        let next = VisibilityStatus::classify(Percentage::new(percentage), &self.thresholds);
        let previous = {
            let mut status = self.status.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *status, next)
        };

        let state_changed = previous.state() != next.state();
        if state_changed {
            notify(&self.state_handlers);
        }
        // Exact comparison: any reading that moves the status must reach the
        // percentage handlers, however small the step.
        if state_changed || previous.percentage().to_bits() != next.percentage().to_bits() {
            notify(&self.percentage_handlers);
        }
        next
    }

    /// Shorthand for a reading of zero.
    pub fn hide(&self) -> VisibilityStatus {
        self.update(0.0)
    }

    /// Number of registered handlers of both kinds.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        lock_subscribers(&self.percentage_handlers).len()
            + lock_subscribers(&self.state_handlers).len()
    }

    fn subscribe(&self, subscribers: &Subscribers, handler: VisibilityHandler) -> SubscriptionId {
        let id = SubscriptionId::new(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        lock_subscribers(subscribers).push((id, handler));
        id
    }
}

impl Default for VisibilityMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for VisibilityMonitor {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("VisibilityMonitor")
            .field("thresholds", &self.thresholds)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

impl VisibilityMonitorPort for VisibilityMonitor {
    fn status(&self) -> VisibilityStatus {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn on_visibility_percentage_change(&self, handler: VisibilityHandler) -> SubscriptionId {
        self.subscribe(&self.percentage_handlers, handler)
    }

    fn on_visibility_change(&self, handler: VisibilityHandler) -> SubscriptionId {
        self.subscribe(&self.state_handlers, handler)
    }

    fn unsubscribe(&self, subscription: SubscriptionId) {
        for subscribers in [&self.percentage_handlers, &self.state_handlers] {
            lock_subscribers(subscribers).retain(|(id, _)| *id != subscription);
        }
    }
}

fn lock_subscribers(
    subscribers: &Subscribers,
) -> std::sync::MutexGuard<'_, Vec<(SubscriptionId, VisibilityHandler)>> {
    subscribers.lock().unwrap_or_else(PoisonError::into_inner)
}

fn notify(subscribers: &Subscribers) {
    let snapshot: Vec<VisibilityHandler> = lock_subscribers(subscribers)
        .iter()
        .map(|(_, handler)| Arc::clone(handler))
        .collect();
    for handler in snapshot {
        handler();
    }
}
