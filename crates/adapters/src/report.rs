//! In-memory metric report.
//!
//! Timers keep every sample. Percentiles interpolate between the two closest
//! ranks at position `p * (n + 1)`, clamping to the first and last sample.

use std::collections::BTreeMap;
use vismetrics_ports::{
    MetricKind, MetricSnapshot, ReportError, ReportFactoryPort, ReportPort, ReportSummary,
    TimerSummary,
};
use vismetrics_shared::Result;

#[derive(Debug, Clone, PartialEq)]
enum Metric {
    Counter(f64),
    Timer(Vec<f64>),
}

impl Metric {
    const fn kind(&self) -> MetricKind {
        match self {
            Self::Counter(_) => MetricKind::Counter,
            Self::Timer(_) => MetricKind::Timer,
        }
    }

    fn snapshot(&self) -> MetricSnapshot {
        match self {
            Self::Counter(count) => MetricSnapshot::Counter { count: *count },
            Self::Timer(samples) => MetricSnapshot::Timer(summarize(samples)),
        }
    }
}

/// Report holding counters and timers in process memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemoryReport {
    metrics: BTreeMap<String, Metric>,
}

impl InMemoryReport {
    /// Create an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn metric_mut(&mut self, name: &str, expected: MetricKind) -> Result<&mut Metric, ReportError> {
        let metric = self
            .metrics
            .get_mut(name)
            .ok_or_else(|| ReportError::UnknownMetric {
                name: name.to_string(),
            })?;
        if metric.kind() != expected {
            return Err(ReportError::KindMismatch {
                name: name.to_string(),
                expected,
                found: metric.kind(),
            });
        }
        Ok(metric)
    }
}

impl ReportPort for InMemoryReport {
    fn add_metric(&mut self, name: &str, kind: MetricKind) -> Result<()> {
        if self.metrics.contains_key(name) {
            return Err(ReportError::DuplicateMetric {
                name: name.to_string(),
            }
            .into());
        }
        let metric = match kind {
            MetricKind::Counter => Metric::Counter(0.0),
            MetricKind::Timer => Metric::Timer(Vec::new()),
        };
        self.metrics.insert(name.to_string(), metric);
        Ok(())
    }

    fn increment(&mut self, name: &str, amount: f64) -> Result<()> {
        let metric = self.metric_mut(name, MetricKind::Counter)?;
        if !amount.is_finite() || amount < 0.0 {
            return Err(ReportError::InvalidAmount {
                name: name.to_string(),
                amount,
            }
            .into());
        }
        if let Metric::Counter(count) = metric {
            *count += amount;
        }
        Ok(())
    }

    fn update(&mut self, name: &str, value: f64) -> Result<()> {
        if let Metric::Timer(samples) = self.metric_mut(name, MetricKind::Timer)? {
            samples.push(value);
        }
        Ok(())
    }

    fn get_metric(&self, name: &str) -> Option<MetricSnapshot> {
        self.metrics.get(name).map(Metric::snapshot)
    }

    fn summary(&self) -> ReportSummary {
        ReportSummary::new(
            self.metrics
                .iter()
                .map(|(name, metric)| (name.clone(), metric.snapshot()))
                .collect(),
        )
    }
}

/// Factory producing empty [`InMemoryReport`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct InMemoryReportFactory;

impl ReportFactoryPort for InMemoryReportFactory {
    fn create_report(&self) -> Box<dyn ReportPort> {
        Box::new(InMemoryReport::new())
    }
}

#[allow(clippy::cast_precision_loss)]
fn summarize(samples: &[f64]) -> TimerSummary {
    if samples.is_empty() {
        return TimerSummary::default();
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);

    let count = sorted.len() as f64;
    let mean = sorted.iter().sum::<f64>() / count;
    let std_dev = if sorted.len() > 1 {
        let variance = sorted
            .iter()
            .map(|sample| (sample - mean).powi(2))
            .sum::<f64>()
            / (count - 1.0);
        variance.sqrt()
    } else {
        0.0
    };

    TimerSummary {
        count: sorted.len() as u64,
        min: sorted.first().copied().unwrap_or_default(),
        max: sorted.last().copied().unwrap_or_default(),
        mean,
        std_dev,
        median: percentile(&sorted, 0.5),
        p75: percentile(&sorted, 0.75),
        p95: percentile(&sorted, 0.95),
        p99: percentile(&sorted, 0.99),
    }
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn percentile(sorted: &[f64], quantile: f64) -> f64 {
    let first = sorted.first().copied().unwrap_or_default();
    let last = sorted.last().copied().unwrap_or_default();
    let position = quantile * (sorted.len() as f64 + 1.0);

    if position < 1.0 {
        return first;
    }
    if position >= sorted.len() as f64 {
        return last;
    }

    let lower_rank = position.floor();
    let lower = sorted
        .get(lower_rank as usize - 1)
        .copied()
        .unwrap_or(first);
    let upper = sorted.get(lower_rank as usize).copied().unwrap_or(last);
    (position - lower_rank).mul_add(upper - lower, lower)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vismetrics_shared::ErrorCode;

    fn close(left: f64, right: f64) -> bool {
        (left - right).abs() < 1e-9
    }

    #[test]
    fn counters_accumulate() -> Result<()> {
        let mut report = InMemoryReport::new();
        report.add_metric("time.visible", MetricKind::Counter)?;
        report.increment("time.visible", 250.0)?;
        report.increment("time.visible", 0.5)?;

        assert_eq!(
            report.get_metric("time.visible"),
            Some(MetricSnapshot::Counter { count: 250.5 })
        );
        Ok(())
    }

    #[test]
    fn registration_and_kind_errors() -> Result<()> {
        let mut report = InMemoryReport::new();
        report.add_metric("percentage", MetricKind::Timer)?;

        let duplicate = report.add_metric("percentage", MetricKind::Timer).err();
        assert_eq!(
            duplicate.map(|error| error.code),
            Some(ErrorCode::new("metrics", "duplicate_metric"))
        );

        let unknown = report.increment("time.hidden", 1.0).err();
        assert_eq!(
            unknown.map(|error| error.code),
            Some(ErrorCode::new("metrics", "unknown_metric"))
        );

        let mismatch = report.increment("percentage", 1.0).err();
        assert_eq!(
            mismatch.map(|error| error.code),
            Some(ErrorCode::new("metrics", "kind_mismatch"))
        );
        Ok(())
    }

    #[test]
    fn counters_reject_negative_and_non_finite_amounts() -> Result<()> {
        let mut report = InMemoryReport::new();
        report.add_metric("time.duration", MetricKind::Counter)?;

        for amount in [-1.0, f64::NAN, f64::INFINITY] {
            let error = report.increment("time.duration", amount).err();
            assert_eq!(
                error.map(|error| error.code),
                Some(ErrorCode::new("metrics", "invalid_amount"))
            );
        }
        assert_eq!(
            report
                .get_metric("time.duration")
                .and_then(|snapshot| snapshot.counter_value()),
            Some(0.0)
        );
        Ok(())
    }

    #[test]
    fn empty_timer_summarizes_to_zero() -> Result<()> {
        let mut report = InMemoryReport::new();
        report.add_metric("visibility.changes", MetricKind::Timer)?;

        assert_eq!(
            report.get_metric("visibility.changes"),
            Some(MetricSnapshot::Timer(TimerSummary::default()))
        );
        Ok(())
    }

    #[test]
    fn timer_summary_statistics() {
        let summary = summarize(&[4.0, 1.0, 3.0, 2.0]);

        assert_eq!(summary.count, 4);
        assert!(close(summary.min, 1.0));
        assert!(close(summary.max, 4.0));
        assert!(close(summary.mean, 2.5));
        assert!(close(summary.std_dev, (5.0_f64 / 3.0).sqrt()));
        assert!(close(summary.median, 2.5));
        assert!(close(summary.p75, 3.75));
        assert!(close(summary.p99, 4.0));
    }

    #[test]
    fn single_sample_timer() {
        let summary = summarize(&[0.6]);
        assert_eq!(summary.count, 1);
        assert!(close(summary.median, 0.6));
        assert!(close(summary.p95, 0.6));
        assert!(close(summary.std_dev, 0.0));
    }

    #[test]
    fn summary_lists_every_metric() -> Result<()> {
        let mut report = InMemoryReportFactory.create_report();
        report.add_metric("time.visible", MetricKind::Counter)?;
        report.add_metric("percentage", MetricKind::Timer)?;
        report.update("percentage", 1.0)?;

        let summary = report.summary();
        assert_eq!(summary.len(), 2);
        let names: Vec<&str> = summary.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["percentage", "time.visible"]);
        Ok(())
    }
}
