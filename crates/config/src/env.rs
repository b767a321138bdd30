//! Environment variable parsing and env-to-config merging.
//!
//! Env parsing is strict: a variable that is present must hold a number.
//! Whether the number is a usable interval is decided later, when the config
//! resolves into intervals.

use crate::schema::MetricsConfig;
use std::collections::BTreeMap;
use std::fmt;
use vismetrics_shared::{ErrorCode, ErrorEnvelope};

/// Env var: visible update interval in milliseconds.
pub const ENV_VISIBLE_UPDATE_INTERVAL_MS: &str = "VISMETRICS_VISIBLE_UPDATE_INTERVAL_MS";
/// Env var: hidden update interval in milliseconds.
pub const ENV_HIDDEN_UPDATE_INTERVAL_MS: &str = "VISMETRICS_HIDDEN_UPDATE_INTERVAL_MS";

const ENV_VARS: [&str; 2] = [ENV_VISIBLE_UPDATE_INTERVAL_MS, ENV_HIDDEN_UPDATE_INTERVAL_MS];

/// Parsed env overrides. `None` means the variable was not set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsEnv {
    /// Override for `visibleUpdateInterval`.
    pub visible_update_interval_ms: Option<f64>,
    /// Override for `hiddenUpdateInterval`.
    pub hidden_update_interval_ms: Option<f64>,
}

impl MetricsEnv {
    /// Parse env overrides from a key/value map.
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, EnvParseError> {
        Ok(Self {
            visible_update_interval_ms: parse_optional_number(map, ENV_VISIBLE_UPDATE_INTERVAL_MS)?,
            hidden_update_interval_ms: parse_optional_number(map, ENV_HIDDEN_UPDATE_INTERVAL_MS)?,
        })
    }

    /// Parse env overrides from the current process environment.
    pub fn from_std_env() -> Result<Self, EnvParseError> {
        let map = ENV_VARS
            .into_iter()
            .filter_map(|name| {
                std::env::var(name)
                    .ok()
                    .map(|value| (name.to_string(), value))
            })
            .collect::<BTreeMap<_, _>>();
        Self::from_map(&map)
    }

    /// True when no override is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.visible_update_interval_ms.is_none() && self.hidden_update_interval_ms.is_none()
    }
}

/// Apply env overrides to a base config (env wins over file/default values).
#[must_use]
pub fn apply_env_overrides(base: MetricsConfig, env: &MetricsEnv) -> MetricsConfig {
    let mut config = base;
    if let Some(value) = env.visible_update_interval_ms {
        config.visible_update_interval = Some(value);
    }
    if let Some(value) = env.hidden_update_interval_ms {
        config.hidden_update_interval = Some(value);
    }
    config
}

/// Env parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvParseError {
    /// An env var was present but empty after trimming.
    EmptyValue {
        /// Env var name.
        var: &'static str,
    },
    /// Numeric env var had an invalid value.
    InvalidNumber {
        /// Env var name.
        var: &'static str,
        /// Raw input value.
        value: String,
    },
}

impl EnvParseError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::EmptyValue { .. } => ErrorCode::new("config", "empty_env"),
            Self::InvalidNumber { .. } => ErrorCode::new("config", "invalid_env_number"),
        }
    }
}

impl fmt::Display for EnvParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyValue { var } => write!(formatter, "{var} must be non-empty"),
            Self::InvalidNumber { var, .. } => write!(formatter, "{var} must be a number"),
        }
    }
}

impl std::error::Error for EnvParseError {}

impl From<EnvParseError> for ErrorEnvelope {
    fn from(error: EnvParseError) -> Self {
        let envelope = Self::expected(error.error_code(), error.to_string());
        match error {
            EnvParseError::EmptyValue { var } => envelope.with_metadata("env_var", var),
            EnvParseError::InvalidNumber { var, value } => envelope
                .with_metadata("env_var", var)
                .with_metadata("value", value),
        }
    }
}

fn parse_optional_number(
    map: &BTreeMap<String, String>,
    var: &'static str,
) -> Result<Option<f64>, EnvParseError> {
    let Some(raw) = map.get(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnvParseError::EmptyValue { var });
    }

    trimmed
        .parse::<f64>()
        .map(Some)
        .map_err(|_| EnvParseError::InvalidNumber {
            var,
            value: raw.clone(),
        })
}
