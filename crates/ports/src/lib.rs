//! # vismetrics-ports
//!
//! Port traits for the vismetrics hexagonal architecture.
//!
//! This crate defines the interfaces between the time-accounting core and its
//! collaborators (monitor, scheduler, report, clock, logger). It depends only
//! on `domain` and `shared`.

/// Returns the ports crate version.
#[must_use]
pub const fn ports_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub mod clock;
pub mod logger;
pub mod monitor;
pub mod report;
pub mod scheduler;

pub use clock::*;
pub use logger::*;
pub use monitor::*;
pub use report::*;
pub use scheduler::*;

// Re-export selected domain types used in port signatures, so adapter crates
// can implement ports without directly depending on `vismetrics-domain`.
pub use vismetrics_domain::{
    MetricKind, MetricSnapshot, ReportSummary, TimerSummary, UpdateIntervals, VisibilityStatus,
};
