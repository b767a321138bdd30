//! Monotonic time source boundary contract.

use std::time::Duration;

/// Monotonic clock. Readings are offsets from an arbitrary fixed origin and
/// never decrease for a well-behaved implementation.
pub trait ClockPort: Send + Sync {
    /// Current offset from the clock's origin.
    fn now(&self) -> Duration;
}
