//! Config loading helpers (file + env).
//!
//! Precedence (highest wins): env overrides, config file, defaults.

use crate::{
    MetricsConfig, MetricsEnv, apply_env_overrides, parse_metrics_config_json,
    parse_metrics_config_toml,
};
use std::path::Path;
use vismetrics_shared::{ErrorClass, ErrorCode, ErrorEnvelope};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Json,
    Toml,
}

/// Load the metrics config from optional JSON text and parsed env overrides.
pub fn load_metrics_config_from_sources(
    config_json: Option<&str>,
    env: &MetricsEnv,
) -> Result<MetricsConfig, ErrorEnvelope> {
    let config = match config_json {
        None => MetricsConfig::default(),
        Some(input) => parse_metrics_config_json(input)?,
    };
    Ok(apply_env_overrides(config, env))
}

/// Load the metrics config from an optional `.json` or `.toml` file.
pub fn load_metrics_config_from_path(
    config_path: Option<&Path>,
    env: &MetricsEnv,
) -> Result<MetricsConfig, ErrorEnvelope> {
    let config = match config_path {
        None => MetricsConfig::default(),
        Some(path) => {
            let format = detect_config_format(path)?;
            let text = read_config_file(path)?;
            match format {
                ConfigFormat::Json => parse_metrics_config_json(&text)?,
                ConfigFormat::Toml => parse_metrics_config_toml(&text)?,
            }
        },
    };
    Ok(apply_env_overrides(config, env))
}

/// Load the metrics config from std env and an optional file path.
pub fn load_metrics_config_std_env(
    config_path: Option<&Path>,
) -> Result<MetricsConfig, ErrorEnvelope> {
    let env = MetricsEnv::from_std_env().map_err(ErrorEnvelope::from)?;
    load_metrics_config_from_path(config_path, &env)
}

/// Serialize the config as pretty JSON (with trailing newline).
pub fn to_pretty_json(config: &MetricsConfig) -> Result<String, ErrorEnvelope> {
    let mut output = serde_json::to_string_pretty(config).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("config", "serialize_json"),
            format!("failed to serialize config: {error}"),
            ErrorClass::NonRetriable,
        )
    })?;
    output.push('\n');
    Ok(output)
}

fn detect_config_format(path: &Path) -> Result<ConfigFormat, ErrorEnvelope> {
    let extension = path
        .extension()
        .and_then(|value| value.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("json") => Ok(ConfigFormat::Json),
        Some("toml") => Ok(ConfigFormat::Toml),
        _ => Err(ErrorEnvelope::expected(
            ErrorCode::new("config", "unsupported_format"),
            "config file must end in .json or .toml",
        )
        .with_metadata("path", path.display().to_string())),
    }
}

fn read_config_file(path: &Path) -> Result<String, ErrorEnvelope> {
    std::fs::read_to_string(path).map_err(|error| {
        ErrorEnvelope::expected(
            ErrorCode::new("config", "read_failed"),
            format!("failed to read config file: {error}"),
        )
        .with_metadata("path", path.display().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn unknown_extension_is_rejected_before_reading() {
        let error = detect_config_format(&PathBuf::from("metrics.yaml")).err();
        assert_eq!(
            error.map(|error| error.code),
            Some(ErrorCode::new("config", "unsupported_format"))
        );
    }

    #[test]
    fn missing_file_maps_to_read_failed() {
        let path = PathBuf::from("/nonexistent/vismetrics/metrics.json");
        let error = load_metrics_config_from_path(Some(&path), &MetricsEnv::default()).err();
        assert_eq!(
            error.map(|error| error.code),
            Some(ErrorCode::new("config", "read_failed"))
        );
    }
}
