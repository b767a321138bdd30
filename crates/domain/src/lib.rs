//! # vismetrics-domain
//!
//! Domain value objects for visibility time accounting.
//!
//! This crate contains the core domain model with no infrastructure dependencies:
//!
//! - **Visibility** - `Percentage`, `VisibilityState`, `VisibilityThresholds`, `VisibilityStatus`
//! - **Stopwatch** - restartable elapsed-time measurement on an injected timeline
//! - **Metrics** - `MetricName`, `MetricKind`, `MetricSnapshot`, `ReportSummary`
//! - **Intervals** - `UpdateIntervals` for the dual-interval scheduler
//! - **State** - `SynchronizerState`
//!
//! ## Dependency Rules
//!
//! - Depends only on `shared` crate
//! - No infrastructure or adapter dependencies
//! - Pure domain logic with no I/O

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

// Re-export shared types for convenience
pub use vismetrics_shared::shared_crate_version;

// =============================================================================
// DOMAIN MODULES
// =============================================================================

pub mod intervals;
pub mod metrics;
pub mod states;
pub mod stopwatch;
pub mod visibility;

pub use intervals::{DEFAULT_UPDATE_INTERVAL, UpdateIntervals};
pub use metrics::{MetricKind, MetricName, MetricSnapshot, ReportSummary, TimerSummary};
pub use states::SynchronizerState;
pub use stopwatch::Stopwatch;
pub use visibility::{
    DEFAULT_FULLY_VISIBLE_THRESHOLD, DEFAULT_HIDDEN_THRESHOLD, Percentage, VisibilityError,
    VisibilityState, VisibilityStatus, VisibilityThresholds,
};

/// Returns the domain crate version.
#[must_use]
pub const fn domain_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_crate_compiles() {
        let version = domain_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn domain_depends_on_shared() {
        let shared_version = shared_crate_version();
        assert!(!shared_version.is_empty());
    }
}
