//! Integration tests for config parsing, env merging, and interval resolution.

use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use vismetrics_config::{
    MetricsConfig, MetricsEnv, load_metrics_config_from_path, load_metrics_config_from_sources,
    parse_metrics_config_json, to_pretty_json,
};
use vismetrics_shared::ErrorCode;

fn fixtures_dir() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .unwrap_or_else(|| manifest_dir.to_path_buf())
        .join("crates")
        .join("testkit")
        .join("fixtures")
}

fn read_fixture(relative: &str) -> Result<String, Box<dyn Error>> {
    Ok(fs::read_to_string(fixtures_dir().join(relative))?)
}

fn read_env_map(relative: &str) -> Result<BTreeMap<String, String>, Box<dyn Error>> {
    Ok(serde_json::from_str(&read_fixture(relative)?)?)
}

#[test]
fn json_and_toml_fixtures_agree() -> Result<(), Box<dyn Error>> {
    let env = MetricsEnv::default();
    let json = load_metrics_config_from_path(
        Some(&fixtures_dir().join("config/metrics.valid.json")),
        &env,
    )?;
    let toml = load_metrics_config_from_path(
        Some(&fixtures_dir().join("config/metrics.valid.toml")),
        &env,
    )?;

    assert_eq!(json, toml);
    assert_eq!(json.intervals().visible(), Duration::from_millis(100));
    assert_eq!(json.intervals().hidden(), Duration::from_millis(1_000));
    Ok(())
}

#[test]
fn non_positive_fixture_falls_back_to_defaults() -> Result<(), Box<dyn Error>> {
    let config = parse_metrics_config_json(&read_fixture("config/metrics.non-positive.json")?)?;
    let intervals = config.intervals();

    assert_eq!(intervals.visible(), Duration::from_millis(250));
    assert_eq!(intervals.hidden(), Duration::from_millis(250));
    Ok(())
}

#[test]
fn unknown_field_fixture_is_rejected() -> Result<(), Box<dyn Error>> {
    let error = parse_metrics_config_json(&read_fixture("config/metrics.unknown-field.json")?)
        .err()
        .map(|error| error.code);
    assert_eq!(error, Some(ErrorCode::new("config", "invalid_json")));
    Ok(())
}

#[test]
fn env_fixture_overrides_file_values() -> Result<(), Box<dyn Error>> {
    let env = MetricsEnv::from_map(&read_env_map("env/metrics-env.valid.json")?)?;
    let config = load_metrics_config_from_sources(
        Some(&read_fixture("config/metrics.valid.json")?),
        &env,
    )?;

    assert_eq!(config.visible_update_interval, Some(100.0));
    assert_eq!(config.hidden_update_interval, Some(2_000.0));
    Ok(())
}

#[test]
fn invalid_env_fixture_is_rejected() -> Result<(), Box<dyn Error>> {
    let map = read_env_map("env/metrics-env.invalid.json")?;
    let envelope = MetricsEnv::from_map(&map)
        .err()
        .map(vismetrics_shared::ErrorEnvelope::from);

    assert_eq!(
        envelope.map(|envelope| envelope.code),
        Some(ErrorCode::new("config", "invalid_env_number"))
    );
    Ok(())
}

#[test]
fn pretty_json_omits_unset_fields() -> Result<(), Box<dyn Error>> {
    let config = MetricsConfig {
        visible_update_interval: Some(500.0),
        hidden_update_interval: None,
    };
    let output = to_pretty_json(&config)?;

    assert_eq!(output, "{\n  \"visibleUpdateInterval\": 500.0\n}\n");
    Ok(())
}
