//! # vismetrics-testkit
//!
//! Test doubles for port contracts: manual clock and scheduler, recording
//! logger, and fault-injecting reports.
//! This crate depends on `ports`, `domain`, and `shared`.

pub mod errors;
pub mod in_memory;

pub use in_memory::{
    FaultyReportFactory, ManualClock, ManualScheduler, NoopLogger, RecordingLogger, ReportFault,
};

/// Returns the testkit crate version.
#[must_use]
pub const fn testkit_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
