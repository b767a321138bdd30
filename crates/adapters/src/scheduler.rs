//! Tokio-backed dual-interval scheduler.
//!
//! Each registration runs as its own task on the ambient runtime. A cycle
//! waits the interval matching the monitor's current visibility; a discrete
//! state change re-arms the wait with the other interval instead of letting
//! the stale one run out.

use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use vismetrics_ports::{
    DualIntervalSchedulerPort, SubscriptionId, TickCallback, UpdateIntervals,
    VisibilityMonitorPort,
};
use vismetrics_shared::{ErrorCode, ErrorEnvelope, Result};

/// Scheduler that polls at a visibility-dependent cadence.
///
/// Dropping the scheduler cancels its tasks and removes its monitor handler.
pub struct TokioDualIntervalScheduler {
    monitor: Arc<dyn VisibilityMonitorPort>,
    state_changes: Arc<watch::Sender<u64>>,
    subscription: SubscriptionId,
    cancel: Mutex<CancellationToken>,
}

impl TokioDualIntervalScheduler {
    /// Create a scheduler bound to `monitor` and subscribe to its state changes.
    pub fn new(monitor: Arc<dyn VisibilityMonitorPort>) -> Self {
        let (sender, _) = watch::channel(0_u64);
        let state_changes = Arc::new(sender);

        let notifier = Arc::clone(&state_changes);
        let subscription = monitor.on_visibility_change(Arc::new(move || {
            notifier.send_modify(|generation| *generation = generation.wrapping_add(1));
        }));

        Self {
            monitor,
            state_changes,
            subscription,
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    fn current_token(&self) -> CancellationToken {
        self.cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl std::fmt::Debug for TokioDualIntervalScheduler {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("TokioDualIntervalScheduler")
            .finish_non_exhaustive()
    }
}

impl DualIntervalSchedulerPort for TokioDualIntervalScheduler {
    fn every_with_dual_intervals(
        &self,
        intervals: UpdateIntervals,
        callback: TickCallback,
    ) -> Result<()> {
        let handle = tokio::runtime::Handle::try_current().map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("scheduler", "no_runtime"),
                format!("dual-interval scheduling requires a tokio runtime: {error}"),
            )
        })?;

        let task = DualIntervalTask {
            monitor: Arc::clone(&self.monitor),
            state_changes: self.state_changes.subscribe(),
            cancel: self.current_token(),
            intervals,
            callback,
        };
        handle.spawn(task.run());
        Ok(())
    }

    fn stop_all(&self) {
        let mut token = self.cancel.lock().unwrap_or_else(PoisonError::into_inner);
        token.cancel();
        *token = CancellationToken::new();
    }
}

impl Drop for TokioDualIntervalScheduler {
    fn drop(&mut self) {
        self.cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
        self.monitor.unsubscribe(self.subscription);
    }
}

struct DualIntervalTask {
    monitor: Arc<dyn VisibilityMonitorPort>,
    state_changes: watch::Receiver<u64>,
    cancel: CancellationToken,
    intervals: UpdateIntervals,
    callback: TickCallback,
}

impl DualIntervalTask {
    async fn run(mut self) {
        self.state_changes.borrow_and_update();
        loop {
            let wait = self
                .intervals
                .for_visibility(self.monitor.status().is_visible());
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => break,
                Ok(()) = self.state_changes.changed() => {},
                () = tokio::time::sleep(wait) => {
                    if self.cancel.is_cancelled() {
                        break;
                    }
                    (self.callback)();
                },
            }
        }
        tracing::debug!(target: "vismetrics::scheduler", "dual-interval task finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::VisibilityMonitor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn counter() -> (Arc<AtomicUsize>, TickCallback) {
        let ticks = Arc::new(AtomicUsize::new(0));
        let handle = Arc::clone(&ticks);
        (
            ticks,
            Arc::new(move || {
                handle.fetch_add(1, Ordering::SeqCst);
            }),
        )
    }

    fn intervals(visible: u64, hidden: u64) -> UpdateIntervals {
        UpdateIntervals::new(ms(visible), ms(hidden)).unwrap_or_default()
    }

    async fn settle() {
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    #[test]
    fn registration_without_runtime_fails() {
        let monitor: Arc<dyn VisibilityMonitorPort> = Arc::new(VisibilityMonitor::new());
        let scheduler = TokioDualIntervalScheduler::new(monitor);
        let (_, callback) = counter();

        let error = scheduler
            .every_with_dual_intervals(UpdateIntervals::default(), callback)
            .err();
        assert_eq!(
            error.map(|error| error.code),
            Some(ErrorCode::new("scheduler", "no_runtime"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn hidden_interval_applies_while_hidden() -> Result<()> {
        let monitor: Arc<dyn VisibilityMonitorPort> = Arc::new(VisibilityMonitor::new());
        let scheduler = TokioDualIntervalScheduler::new(monitor);
        let (ticks, callback) = counter();

        scheduler.every_with_dual_intervals(intervals(100, 1_000), callback)?;
        settle().await;

        tokio::time::sleep(ms(950)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
        tokio::time::sleep(ms(100)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);

        scheduler.stop_all();
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn state_change_switches_cadence_immediately() -> Result<()> {
        let monitor = Arc::new(VisibilityMonitor::new());
        let port: Arc<dyn VisibilityMonitorPort> = monitor.clone();
        let scheduler = TokioDualIntervalScheduler::new(port);
        let (ticks, callback) = counter();

        scheduler.every_with_dual_intervals(intervals(100, 1_000), callback)?;
        settle().await;

        tokio::time::sleep(ms(10)).await;
        monitor.update(0.5);
        settle().await;

        tokio::time::sleep(ms(105)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
        tokio::time::sleep(ms(100)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);

        scheduler.stop_all();
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn stop_all_cancels_and_allows_new_registrations() -> Result<()> {
        let monitor: Arc<dyn VisibilityMonitorPort> =
            Arc::new(VisibilityMonitor::new().starting_at(1.0));
        let scheduler = TokioDualIntervalScheduler::new(monitor);
        let (first_ticks, first) = counter();

        scheduler.every_with_dual_intervals(intervals(100, 100), first)?;
        settle().await;
        tokio::time::sleep(ms(250)).await;
        assert_eq!(first_ticks.load(Ordering::SeqCst), 2);

        scheduler.stop_all();
        scheduler.stop_all();
        tokio::time::sleep(ms(500)).await;
        assert_eq!(first_ticks.load(Ordering::SeqCst), 2);

        let (second_ticks, second) = counter();
        scheduler.every_with_dual_intervals(intervals(100, 100), second)?;
        settle().await;
        tokio::time::sleep(ms(150)).await;
        assert_eq!(second_ticks.load(Ordering::SeqCst), 1);
        assert_eq!(first_ticks.load(Ordering::SeqCst), 2);

        scheduler.stop_all();
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_scheduler_cancels_ticks_and_unsubscribes() -> Result<()> {
        let monitor = Arc::new(VisibilityMonitor::new().starting_at(1.0));
        let port: Arc<dyn VisibilityMonitorPort> = monitor.clone();
        let scheduler = TokioDualIntervalScheduler::new(port);
        assert_eq!(monitor.subscriber_count(), 1);

        let (ticks, callback) = counter();
        scheduler.every_with_dual_intervals(intervals(100, 100), callback)?;
        settle().await;
        tokio::time::sleep(ms(150)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);

        drop(scheduler);
        settle().await;
        tokio::time::sleep(ms(500)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
        assert_eq!(monitor.subscriber_count(), 0);
        Ok(())
    }
}
