//! Monotonic clock adapter.

use std::time::Duration;
use tokio::time::Instant;
use vismetrics_ports::ClockPort;

/// Clock measuring offsets from its construction instant.
///
/// Backed by `tokio::time::Instant`, so a paused tokio runtime (tests) moves
/// it only when time is advanced. Outside a runtime it reads the system
/// monotonic clock.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Clock whose origin is now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockPort for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}
