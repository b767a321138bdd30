//! Metrics configuration schema.
//!
//! Interval values are accepted as any JSON/TOML number so that fractional,
//! zero, or negative input parses and then falls back to the default cadence
//! where needed instead of failing.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use vismetrics_domain::{DEFAULT_UPDATE_INTERVAL, UpdateIntervals};
use vismetrics_shared::{ErrorCode, ErrorEnvelope};

/// Polling cadence configuration for a synchronizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct MetricsConfig {
    /// Milliseconds between ticks while the element is visible.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible_update_interval: Option<f64>,
    /// Milliseconds between ticks while the element is hidden.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidden_update_interval: Option<f64>,
}

impl MetricsConfig {
    /// Config with both intervals set.
    #[must_use]
    pub const fn with_intervals(visible_ms: f64, hidden_ms: f64) -> Self {
        Self {
            visible_update_interval: Some(visible_ms),
            hidden_update_interval: Some(hidden_ms),
        }
    }

    /// Resolve into effective intervals.
    ///
    /// Absent, non-finite, or non-positive values keep the default of
    /// [`DEFAULT_UPDATE_INTERVAL`]; this never fails.
    #[must_use]
    pub fn intervals(&self) -> UpdateIntervals {
        let visible = resolve_interval("visibleUpdateInterval", self.visible_update_interval);
        let hidden = resolve_interval("hiddenUpdateInterval", self.hidden_update_interval);
        UpdateIntervals::new(visible, hidden).unwrap_or_default()
    }
}

fn resolve_interval(field: &'static str, value: Option<f64>) -> Duration {
    let Some(raw) = value else {
        return DEFAULT_UPDATE_INTERVAL;
    };

    let resolved = (raw.is_finite() && raw > 0.0)
        .then(|| Duration::try_from_secs_f64(raw / 1_000.0).ok())
        .flatten()
        .filter(|interval| !interval.is_zero());
    resolved.unwrap_or_else(|| {
        tracing::debug!(
            field,
            value = raw,
            default = ?DEFAULT_UPDATE_INTERVAL,
            "unusable update interval ignored; using default"
        );
        DEFAULT_UPDATE_INTERVAL
    })
}

/// Parse a metrics config from a JSON string.
pub fn parse_metrics_config_json(input: &str) -> Result<MetricsConfig, ErrorEnvelope> {
    serde_json::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_json"),
            format!("invalid config JSON: {error}"),
        )
    })
}

/// Parse a metrics config from a TOML string.
pub fn parse_metrics_config_toml(input: &str) -> Result<MetricsConfig, ErrorEnvelope> {
    toml::from_str(input).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "invalid_toml"),
            format!("invalid config TOML: {error}"),
        )
    })
}
