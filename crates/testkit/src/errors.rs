//! Test fixtures for error codes raised across the workspace.

use vismetrics_shared::{ErrorCode, ErrorEnvelope};

/// Setup error codes raised when a synchronizer collaborator is missing.
pub fn setup_error_codes() -> Vec<ErrorCode> {
    vec![
        ErrorCode::new("metrics", "missing_report_factory"),
        ErrorCode::new("metrics", "missing_monitor"),
        ErrorCode::new("metrics", "missing_scheduler"),
    ]
}

/// Error codes raised by report implementations.
pub fn report_error_codes() -> Vec<ErrorCode> {
    vec![
        ErrorCode::new("metrics", "duplicate_metric"),
        ErrorCode::new("metrics", "unknown_metric"),
        ErrorCode::new("metrics", "kind_mismatch"),
        ErrorCode::new("metrics", "invalid_amount"),
    ]
}

/// A report write failure fixture.
pub fn report_write_error(name: &str) -> ErrorEnvelope {
    ErrorEnvelope::expected(
        ErrorCode::new("metrics", "write_rejected"),
        format!("report rejected write to {name}"),
    )
    .with_metadata("metric", name)
}

/// A scheduler registration failure fixture.
pub fn scheduler_unavailable_error() -> ErrorEnvelope {
    ErrorEnvelope::expected(
        ErrorCode::new("scheduler", "unavailable"),
        "scheduler rejected the registration",
    )
}
