//! Metric names, kinds, and read-side snapshots.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of metric stored in a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Additive running sum.
    Counter,
    /// Append-only sample recorder with statistical summary.
    Timer,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Counter => formatter.write_str("counter"),
            Self::Timer => formatter.write_str("timer"),
        }
    }
}

/// The fixed set of metrics maintained per observed element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricName {
    /// Milliseconds spent visible.
    TimeVisible,
    /// Milliseconds spent fully visible.
    TimeFullyVisible,
    /// Milliseconds spent hidden.
    TimeHidden,
    /// Visible milliseconds weighted by percentage.
    TimeRelativeVisible,
    /// Total observed milliseconds.
    TimeDuration,
    /// State codes sampled on every discrete state change.
    VisibilityChanges,
    /// Percentage samples taken on every trigger.
    Percentage,
}

impl MetricName {
    /// All metric names in registration order.
    pub const ALL: [Self; 7] = [
        Self::TimeVisible,
        Self::TimeFullyVisible,
        Self::TimeHidden,
        Self::TimeRelativeVisible,
        Self::TimeDuration,
        Self::VisibilityChanges,
        Self::Percentage,
    ];

    /// Registered metric name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TimeVisible => "time.visible",
            Self::TimeFullyVisible => "time.fullyvisible",
            Self::TimeHidden => "time.hidden",
            Self::TimeRelativeVisible => "time.relativeVisible",
            Self::TimeDuration => "time.duration",
            Self::VisibilityChanges => "visibility.changes",
            Self::Percentage => "percentage",
        }
    }

    /// Metric kind registered under this name.
    #[must_use]
    pub const fn kind(self) -> MetricKind {
        match self {
            Self::VisibilityChanges | Self::Percentage => MetricKind::Timer,
            Self::TimeVisible
            | Self::TimeFullyVisible
            | Self::TimeHidden
            | Self::TimeRelativeVisible
            | Self::TimeDuration => MetricKind::Counter,
        }
    }

    /// Look a name up by its registered string.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|metric| metric.as_str() == name)
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Distribution summary of timer samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSummary {
    /// Number of samples.
    pub count: u64,
    /// Smallest sample (0 when empty).
    pub min: f64,
    /// Largest sample (0 when empty).
    pub max: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample standard deviation.
    pub std_dev: f64,
    /// 50th percentile.
    pub median: f64,
    /// 75th percentile.
    pub p75: f64,
    /// 95th percentile.
    pub p95: f64,
    /// 99th percentile.
    pub p99: f64,
}

/// Read-side view of a single metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MetricSnapshot {
    /// Counter value.
    Counter {
        /// Running sum.
        count: f64,
    },
    /// Timer distribution.
    Timer(TimerSummary),
}

impl MetricSnapshot {
    /// Kind of the underlying metric.
    #[must_use]
    pub const fn kind(&self) -> MetricKind {
        match self {
            Self::Counter { .. } => MetricKind::Counter,
            Self::Timer(_) => MetricKind::Timer,
        }
    }

    /// Counter value, if this is a counter.
    #[must_use]
    pub const fn counter_value(&self) -> Option<f64> {
        match self {
            Self::Counter { count } => Some(*count),
            Self::Timer(_) => None,
        }
    }

    /// Timer summary, if this is a timer.
    #[must_use]
    pub const fn timer_summary(&self) -> Option<&TimerSummary> {
        match self {
            Self::Counter { .. } => None,
            Self::Timer(summary) => Some(summary),
        }
    }
}

/// Aggregate snapshot of every metric in a report, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportSummary {
    metrics: BTreeMap<String, MetricSnapshot>,
}

impl ReportSummary {
    /// Build a summary from name/snapshot pairs.
    #[must_use]
    pub fn new(metrics: BTreeMap<String, MetricSnapshot>) -> Self {
        Self { metrics }
    }

    /// Snapshot for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MetricSnapshot> {
        self.metrics.get(name)
    }

    /// Counter value for `name`.
    #[must_use]
    pub fn counter(&self, name: MetricName) -> Option<f64> {
        self.get(name.as_str())
            .and_then(MetricSnapshot::counter_value)
    }

    /// Number of metrics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// True when no metrics are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Iterate name/snapshot pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricSnapshot)> {
        self.metrics
            .iter()
            .map(|(name, snapshot)| (name.as_str(), snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn names_round_trip_through_parse() {
        for name in MetricName::ALL {
            assert_eq!(MetricName::parse(name.as_str()), Some(name));
        }
        assert_eq!(MetricName::parse("time.unknown"), None);
    }

    #[test]
    fn five_counters_and_two_timers() {
        let counters = MetricName::ALL
            .iter()
            .filter(|name| name.kind() == MetricKind::Counter)
            .count();
        assert_eq!(counters, 5);
        assert_eq!(MetricName::Percentage.kind(), MetricKind::Timer);
        assert_eq!(MetricName::VisibilityChanges.kind(), MetricKind::Timer);
    }

    #[test]
    fn summary_serialization_shape() -> Result<(), Box<dyn Error>> {
        let mut metrics = BTreeMap::new();
        metrics.insert(
            "time.visible".to_string(),
            MetricSnapshot::Counter { count: 12.5 },
        );
        let summary = ReportSummary::new(metrics);

        let value = serde_json::to_value(&summary)?;
        let expected = serde_json::json!({
            "time.visible": { "type": "counter", "count": 12.5 }
        });
        assert_eq!(value, expected);
        assert_eq!(summary.counter(MetricName::TimeVisible), Some(12.5));
        assert_eq!(summary.counter(MetricName::TimeHidden), None);
        Ok(())
    }
}
