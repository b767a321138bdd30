//! Restartable stopwatch driven by externally supplied timestamps.
//!
//! Timestamps are offsets on a monotonic timeline (see the clock port). The
//! caller reads the clock once and hands the same `now` to every watch it
//! updates, so a single reconciliation pass sees one instant.

use std::time::Duration;

/// Restartable elapsed-time measurement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stopwatch {
    started_at: Option<Duration>,
}

impl Stopwatch {
    /// Create a stopped stopwatch.
    #[must_use]
    pub const fn new() -> Self {
        Self { started_at: None }
    }

    /// True while timing.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Start timing at `now`. No effect when already running.
    pub const fn start(&mut self, now: Duration) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    /// Elapsed time of the current run, zero when stopped.
    #[must_use]
    pub fn elapsed(&self, now: Duration) -> Duration {
        self.started_at
            .map_or(Duration::ZERO, |started_at| now.saturating_sub(started_at))
    }

    /// Stop, returning the elapsed time of the run (zero if it was not
    /// running), then restart at `now` when `predicate` holds.
    pub fn stop_and_then_restart_if(&mut self, now: Duration, predicate: bool) -> Duration {
        let elapsed = self.elapsed(now);
        self.started_at = predicate.then_some(now);
        elapsed
    }

    /// Stop and immediately restart, returning the elapsed time.
    pub fn restart(&mut self, now: Duration) -> Duration {
        self.stop_and_then_restart_if(now, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn new_stopwatch_is_stopped_and_reports_zero() {
        let mut watch = Stopwatch::new();
        assert!(!watch.is_running());
        assert_eq!(watch.elapsed(ms(500)), Duration::ZERO);
        assert_eq!(watch.stop_and_then_restart_if(ms(500), false), Duration::ZERO);
        assert!(!watch.is_running());
    }

    #[test]
    fn start_is_not_reentrant() {
        let mut watch = Stopwatch::new();
        watch.start(ms(100));
        watch.start(ms(300));
        assert_eq!(watch.elapsed(ms(400)), ms(300));
    }

    #[test]
    fn stop_without_restart_drops_the_gap() {
        let mut watch = Stopwatch::new();
        watch.start(ms(0));

        assert_eq!(watch.stop_and_then_restart_if(ms(250), false), ms(250));
        assert!(!watch.is_running());

        // Time passing while stopped is not attributed.
        assert_eq!(watch.stop_and_then_restart_if(ms(900), true), Duration::ZERO);
        assert!(watch.is_running());
        assert_eq!(watch.restart(ms(1000)), ms(100));
    }

    #[test]
    fn clock_going_backwards_saturates_to_zero() {
        let mut watch = Stopwatch::new();
        watch.start(ms(500));
        assert_eq!(watch.restart(ms(400)), Duration::ZERO);
        assert_eq!(watch.restart(ms(450)), ms(50));
    }

    proptest! {
        #[test]
        fn continuous_restarts_partition_time(steps in proptest::collection::vec(0u64..10_000, 1..64)) {
            let mut watch = Stopwatch::new();
            watch.start(Duration::ZERO);

            let mut now = Duration::ZERO;
            let mut total = Duration::ZERO;
            for step in steps {
                now += ms(step);
                total += watch.restart(now);
            }

            prop_assert_eq!(total, now);
        }

        #[test]
        fn predicate_attribution_matches_true_segments(
            segments in proptest::collection::vec((1u64..5_000, any::<bool>()), 1..64)
        ) {
            let mut watch = Stopwatch::new();
            let mut now = Duration::ZERO;
            let mut expected = Duration::ZERO;
            let mut attributed = Duration::ZERO;
            let mut predicate = false;

            // The predicate read at a trigger governs the segment that follows it.
            for (length, next_predicate) in segments {
                attributed += watch.stop_and_then_restart_if(now, predicate);
                if predicate {
                    expected += ms(length);
                }
                now += ms(length);
                predicate = next_predicate;
            }
            attributed += watch.stop_and_then_restart_if(now, false);

            prop_assert_eq!(attributed, expected);
        }
    }
}
