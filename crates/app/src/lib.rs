//! # vismetrics-app
//!
//! Application use cases: the visibility time-accounting synchronizer.
//! This crate depends on `ports`, `domain`, and `shared`.

pub mod synchronizer;

pub use synchronizer::{
    SetupError, Synchronizer, SynchronizerDeps, VisibilitySource, create_metrics,
};

/// Returns the app crate version.
#[must_use]
pub const fn app_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
