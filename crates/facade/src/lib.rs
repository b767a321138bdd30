//! # vismetrics-facade
//!
//! Facade API for consumers: wires the default adapters into the
//! synchronizer and resolves configuration.
//! This crate depends on `app`, `adapters`, and `config`.

use std::sync::Arc;
use vismetrics_adapters::{
    InMemoryReportFactory, MonotonicClock, TokioDualIntervalScheduler, TracingLogger,
};
use vismetrics_app::SynchronizerDeps;
use vismetrics_ports::{ClockPort, LoggerPort, ReportFactoryPort, VisibilityMonitorPort};
use vismetrics_shared::Result;

pub use vismetrics_adapters::VisibilityMonitor;
pub use vismetrics_app::{SetupError, Synchronizer, VisibilitySource};
pub use vismetrics_config::{MetricsConfig, MetricsEnv, load_metrics_config_std_env};
pub use vismetrics_domain::{
    MetricKind, MetricName, MetricSnapshot, ReportSummary, TimerSummary, UpdateIntervals,
    VisibilityState, VisibilityThresholds,
};
pub use vismetrics_shared::ErrorEnvelope;

/// Returns the facade crate version.
#[must_use]
pub const fn facade_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Builds synchronizers with a fixed set of collaborators.
///
/// Defaults: in-memory reports, a tokio-aware monotonic clock, and a logger
/// forwarding to `tracing`. Each can be replaced.
#[derive(Clone)]
pub struct MetricsFactory {
    report_factory: Option<Arc<dyn ReportFactoryPort>>,
    clock: Arc<dyn ClockPort>,
    logger: Option<Arc<dyn LoggerPort>>,
}

impl MetricsFactory {
    /// Factory wired with the default adapters.
    #[must_use]
    pub fn new() -> Self {
        Self {
            report_factory: Some(Arc::new(InMemoryReportFactory)),
            clock: Arc::new(MonotonicClock::new()),
            logger: Some(Arc::new(TracingLogger::new())),
        }
    }

    /// Replace the report factory.
    #[must_use]
    pub fn with_report_factory(mut self, report_factory: Arc<dyn ReportFactoryPort>) -> Self {
        self.report_factory = Some(report_factory);
        self
    }

    /// Replace the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn ClockPort>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the logger.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn LoggerPort>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Disable logging.
    #[must_use]
    pub fn without_logger(mut self) -> Self {
        self.logger = None;
        self
    }

    /// Pair `monitor` with a tokio dual-interval scheduler that follows its
    /// state changes.
    #[must_use]
    pub fn vis_timer(monitor: Arc<dyn VisibilityMonitorPort>) -> VisibilitySource {
        let scheduler = Arc::new(TokioDualIntervalScheduler::new(Arc::clone(&monitor)));
        VisibilitySource::new(monitor, scheduler)
    }

    /// Start accounting for `source`.
    ///
    /// Missing or non-positive intervals in `config` fall back to 250ms.
    pub fn create_metrics(
        &self,
        source: VisibilitySource,
        config: Option<&MetricsConfig>,
    ) -> Result<Synchronizer> {
        let intervals = config.map(MetricsConfig::intervals).unwrap_or_default();
        vismetrics_app::create_metrics(source, &self.deps(), intervals)
    }

    /// Shorthand for [`MetricsFactory::vis_timer`] followed by
    /// [`MetricsFactory::create_metrics`].
    pub fn observe(
        &self,
        monitor: Arc<dyn VisibilityMonitorPort>,
        config: Option<&MetricsConfig>,
    ) -> Result<Synchronizer> {
        self.create_metrics(Self::vis_timer(monitor), config)
    }

    fn deps(&self) -> SynchronizerDeps {
        SynchronizerDeps {
            report_factory: self.report_factory.clone(),
            clock: Arc::clone(&self.clock),
            logger: self.logger.clone(),
        }
    }
}

impl Default for MetricsFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MetricsFactory {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("MetricsFactory")
            .field("logging", &self.logger.is_some())
            .finish_non_exhaustive()
    }
}
