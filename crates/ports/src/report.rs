//! Metric report boundary contract.

use std::fmt;
use vismetrics_domain::{MetricKind, MetricSnapshot, ReportSummary};
use vismetrics_shared::{ErrorCode, ErrorEnvelope, Result};

/// A named registry of counters and timers.
pub trait ReportPort: Send {
    /// Register a metric. Names are unique within a report.
    fn add_metric(&mut self, name: &str, kind: MetricKind) -> Result<()>;

    /// Add `amount` (finite, non-negative) to a counter.
    fn increment(&mut self, name: &str, amount: f64) -> Result<()>;

    /// Record a sample on a timer.
    fn update(&mut self, name: &str, value: f64) -> Result<()>;

    /// Snapshot of a single metric.
    fn get_metric(&self, name: &str) -> Option<MetricSnapshot>;

    /// Snapshot of every registered metric.
    fn summary(&self) -> ReportSummary;
}

/// Produces empty reports.
pub trait ReportFactoryPort: Send + Sync {
    /// Create a fresh, empty report.
    fn create_report(&self) -> Box<dyn ReportPort>;
}

/// Failures raised by report implementations.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportError {
    /// The name is already registered.
    DuplicateMetric {
        /// Metric name.
        name: String,
    },
    /// The name is not registered.
    UnknownMetric {
        /// Metric name.
        name: String,
    },
    /// The operation does not apply to the registered metric kind.
    KindMismatch {
        /// Metric name.
        name: String,
        /// Kind the operation requires.
        expected: MetricKind,
        /// Kind actually registered.
        found: MetricKind,
    },
    /// Counter increments must be finite and non-negative.
    InvalidAmount {
        /// Metric name.
        name: String,
        /// Rejected amount.
        amount: f64,
    },
}

impl ReportError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::DuplicateMetric { .. } => ErrorCode::new("metrics", "duplicate_metric"),
            Self::UnknownMetric { .. } => ErrorCode::new("metrics", "unknown_metric"),
            Self::KindMismatch { .. } => ErrorCode::new("metrics", "kind_mismatch"),
            Self::InvalidAmount { .. } => ErrorCode::new("metrics", "invalid_amount"),
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::DuplicateMetric { name }
            | Self::UnknownMetric { name }
            | Self::KindMismatch { name, .. }
            | Self::InvalidAmount { name, .. } => name,
        }
    }
}

impl fmt::Display for ReportError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateMetric { name } => write!(formatter, "metric already registered: {name}"),
            Self::UnknownMetric { name } => write!(formatter, "metric not registered: {name}"),
            Self::KindMismatch {
                name,
                expected,
                found,
            } => write!(formatter, "metric {name} is a {found}, expected a {expected}"),
            Self::InvalidAmount { name, amount } => write!(
                formatter,
                "counter {name} increment must be finite and non-negative (got {amount})"
            ),
        }
    }
}

impl std::error::Error for ReportError {}

impl From<ReportError> for ErrorEnvelope {
    fn from(error: ReportError) -> Self {
        Self::expected(error.error_code(), error.to_string()).with_metadata("metric", error.name())
    }
}
