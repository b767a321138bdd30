//! # vismetrics-config
//!
//! Configuration schema, env overrides, and loading for synchronizer
//! update intervals. This crate depends on `domain` and `shared` only.

/// Environment variable parsing and merging.
pub mod env;
/// Config loading helpers (file + env).
pub mod load;
/// Configuration schema types and helpers.
pub mod schema;

pub use env::{
    ENV_HIDDEN_UPDATE_INTERVAL_MS, ENV_VISIBLE_UPDATE_INTERVAL_MS, EnvParseError, MetricsEnv,
    apply_env_overrides,
};
pub use load::{
    load_metrics_config_from_path, load_metrics_config_from_sources, load_metrics_config_std_env,
    to_pretty_json,
};
pub use schema::{MetricsConfig, parse_metrics_config_json, parse_metrics_config_toml};

/// Returns the config crate version.
#[must_use]
pub const fn config_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
