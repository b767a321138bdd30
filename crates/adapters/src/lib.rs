//! # vismetrics-adapters
//!
//! Adapter implementations for ports (report, monitor, scheduler, clock,
//! logger). This crate depends on `ports`, `domain`, and `shared`.

pub mod clock;
pub mod logger;
pub mod monitor;
pub mod report;
pub mod scheduler;

pub use clock::MonotonicClock;
pub use logger::TracingLogger;
pub use monitor::VisibilityMonitor;
pub use report::{InMemoryReport, InMemoryReportFactory};
pub use scheduler::TokioDualIntervalScheduler;

/// Returns the adapters crate version.
#[must_use]
pub const fn adapters_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
