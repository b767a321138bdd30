//! Dual-interval scheduler boundary contract.

use std::sync::Arc;
use vismetrics_domain::UpdateIntervals;
use vismetrics_shared::Result;

/// Callback invoked on every scheduler tick.
pub type TickCallback = Arc<dyn Fn() + Send + Sync>;

/// Boundary contract for repeated invocation at a visibility-dependent cadence.
pub trait DualIntervalSchedulerPort: Send + Sync {
    /// Invoke `callback` repeatedly, waiting `intervals.visible()` between
    /// ticks while the element is visible and `intervals.hidden()` otherwise.
    fn every_with_dual_intervals(
        &self,
        intervals: UpdateIntervals,
        callback: TickCallback,
    ) -> Result<()>;

    /// Cancel every outstanding registration. Safe to call repeatedly.
    fn stop_all(&self);
}
