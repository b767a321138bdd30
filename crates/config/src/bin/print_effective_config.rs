//! Print the effective metrics config (defaults + env overrides) as JSON.

use std::io;
use std::io::Write;
use vismetrics_config::load_metrics_config_std_env;

fn main() -> std::process::ExitCode {
    match run() {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            std::process::ExitCode::from(1)
        },
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args_os().nth(1).map(std::path::PathBuf::from);
    let config = load_metrics_config_std_env(path.as_deref())?;
    let intervals = config.intervals();

    let output = serde_json::json!({
        "config": config,
        "effective": {
            "visibleUpdateIntervalMs": intervals.visible().as_secs_f64() * 1_000.0,
            "hiddenUpdateIntervalMs": intervals.hidden().as_secs_f64() * 1_000.0,
        },
    });
    let mut text = serde_json::to_string_pretty(&output)?;
    text.push('\n');

    let mut stdout = io::stdout();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;

    Ok(())
}
