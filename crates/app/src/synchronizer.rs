//! Visibility time accounting for one observed element.
//!
//! A [`Synchronizer`] owns four stopwatches (visible, fully visible, hidden,
//! duration) and a report. Every trigger, whether a scheduler tick or a
//! monitor push event, runs the same reconciliation pass: read the monitor
//! status and the clock once, stop each stopwatch, flush its positive elapsed
//! time into the matching counter, and restart it if its predicate still
//! holds. Triggers arriving through both paths at the same instant therefore
//! count time once; the second pass sees zero elapsed and records nothing.

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use vismetrics_domain::{MetricName, Stopwatch, SynchronizerState};
use vismetrics_ports::{
    ClockPort, DualIntervalSchedulerPort, LogFields, LoggerPort, MetricSnapshot,
    ReportFactoryPort, ReportPort, ReportSummary, SubscriptionId, UpdateIntervals,
    VisibilityMonitorPort, VisibilityStatus,
};
use vismetrics_shared::{ErrorCode, ErrorEnvelope, Result};

/// The visibility source a synchronizer observes: a monitor plus the
/// scheduler that polls it.
#[derive(Clone, Default)]
pub struct VisibilitySource {
    /// Visibility monitor for the observed element.
    pub monitor: Option<Arc<dyn VisibilityMonitorPort>>,
    /// Dual-interval scheduler driving periodic reconciliation.
    pub scheduler: Option<Arc<dyn DualIntervalSchedulerPort>>,
}

impl VisibilitySource {
    /// Source with both collaborators present.
    #[must_use]
    pub fn new(
        monitor: Arc<dyn VisibilityMonitorPort>,
        scheduler: Arc<dyn DualIntervalSchedulerPort>,
    ) -> Self {
        Self {
            monitor: Some(monitor),
            scheduler: Some(scheduler),
        }
    }
}

/// Dependencies required to build a synchronizer.
#[derive(Clone)]
pub struct SynchronizerDeps {
    /// Produces the report holding the seven metrics.
    pub report_factory: Option<Arc<dyn ReportFactoryPort>>,
    /// Monotonic time source.
    pub clock: Arc<dyn ClockPort>,
    /// Optional logger.
    pub logger: Option<Arc<dyn LoggerPort>>,
}

/// A required collaborator was not supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    /// No report factory.
    #[error("a report factory is required to create metrics")]
    MissingReportFactory,
    /// The visibility source has no monitor.
    #[error("the visibility source has no monitor")]
    MissingMonitor,
    /// The visibility source has no scheduler.
    #[error("the visibility source has no dual-interval scheduler")]
    MissingScheduler,
}

impl SetupError {
    fn error_code(self) -> ErrorCode {
        match self {
            Self::MissingReportFactory => ErrorCode::new("metrics", "missing_report_factory"),
            Self::MissingMonitor => ErrorCode::new("metrics", "missing_monitor"),
            Self::MissingScheduler => ErrorCode::new("metrics", "missing_scheduler"),
        }
    }
}

impl From<SetupError> for ErrorEnvelope {
    fn from(error: SetupError) -> Self {
        Self::expected(error.error_code(), error.to_string())
    }
}

/// Build a synchronizer observing `source`.
///
/// Collaborators are checked before anything is registered, so a failure
/// never leaves subscriptions behind. The seven metrics are registered, the
/// current percentage and state are recorded, and the stopwatches start
/// before the handlers and the scheduler are wired up.
pub fn create_metrics(
    source: VisibilitySource,
    deps: &SynchronizerDeps,
    intervals: UpdateIntervals,
) -> Result<Synchronizer> {
    let report_factory = deps
        .report_factory
        .clone()
        .ok_or(SetupError::MissingReportFactory)?;
    let monitor = source.monitor.ok_or(SetupError::MissingMonitor)?;
    let scheduler = source.scheduler.ok_or(SetupError::MissingScheduler)?;

    let mut report = report_factory.create_report();
    for name in MetricName::ALL {
        report.add_metric(name.as_str(), name.kind())?;
    }

    let logger: Option<Arc<dyn LoggerPort>> = deps
        .logger
        .as_ref()
        .map(|logger| Arc::from(logger.child(log_fields_component())));
    let core = Arc::new(SynchronizerCore {
        monitor: Arc::clone(&monitor),
        clock: Arc::clone(&deps.clock),
        logger,
        accounting: Mutex::new(Accounting::new(report)),
    });
    core.initial_pass();

    let on_percentage = Arc::downgrade(&core);
    let percentage_subscription = monitor.on_visibility_percentage_change(Arc::new(move || {
        if let Some(core) = on_percentage.upgrade() {
            core.percentage_pass();
        }
    }));

    let on_state = Arc::downgrade(&core);
    let state_subscription = monitor.on_visibility_change(Arc::new(move || {
        if let Some(core) = on_state.upgrade() {
            core.state_change();
        }
    }));
    let subscriptions = [percentage_subscription, state_subscription];

    let on_tick = Arc::downgrade(&core);
    let registered = scheduler.every_with_dual_intervals(
        intervals,
        Arc::new(move || {
            if let Some(core) = on_tick.upgrade() {
                core.percentage_pass();
            }
        }),
    );
    if let Err(error) = registered {
        for subscription in subscriptions {
            monitor.unsubscribe(subscription);
        }
        return Err(error);
    }

    if let Some(logger) = core.logger.as_ref() {
        logger.info(
            "vismetrics.synchronizer.created",
            "Visibility metrics synchronizer created",
            Some(log_fields_intervals(intervals)),
        );
    }

    Ok(Synchronizer {
        core,
        scheduler,
        subscriptions,
        intervals,
    })
}

/// Accumulates visibility time metrics for one element until stopped.
pub struct Synchronizer {
    core: Arc<SynchronizerCore>,
    scheduler: Arc<dyn DualIntervalSchedulerPort>,
    subscriptions: [SubscriptionId; 2],
    intervals: UpdateIntervals,
}

impl Synchronizer {
    /// Snapshot of the metric registered under `name`.
    #[must_use]
    pub fn get_metric(&self, name: &str) -> Option<MetricSnapshot> {
        self.core.lock().report.get_metric(name)
    }

    /// Snapshot of one of the seven registered metrics.
    #[must_use]
    pub fn metric(&self, name: MetricName) -> Option<MetricSnapshot> {
        self.get_metric(name.as_str())
    }

    /// Snapshot of every registered metric.
    #[must_use]
    pub fn summary(&self) -> ReportSummary {
        self.core.lock().report.summary()
    }

    /// True once [`Synchronizer::stop`] has run.
    #[must_use]
    pub fn stopped(&self) -> bool {
        self.core.lock().state.is_stopped()
    }

    /// Intervals registered with the scheduler.
    #[must_use]
    pub const fn intervals(&self) -> UpdateIntervals {
        self.intervals
    }

    /// Flush trailing time, cancel scheduled ticks, detach from the monitor,
    /// and stop accounting.
    ///
    /// Only the first call records anything. Later calls still ask the
    /// scheduler to stop, which is harmless.
    pub fn stop(&self) {
        let transitioned = self.core.final_pass();
        self.scheduler.stop_all();
        self.unsubscribe();

        if !transitioned {
            return;
        }
        if let Some(logger) = self.core.logger.as_ref() {
            logger.info(
                "vismetrics.synchronizer.stopped",
                "Visibility metrics synchronizer stopped",
                Some(log_fields_summary(&self.summary())),
            );
        }
    }
}

impl Synchronizer {
    fn unsubscribe(&self) {
        for subscription in self.subscriptions {
            self.core.monitor.unsubscribe(subscription);
        }
    }
}

impl Drop for Synchronizer {
    fn drop(&mut self) {
        if !self.stopped() {
            self.scheduler.stop_all();
        }
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Synchronizer {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Synchronizer")
            .field("intervals", &self.intervals)
            .field("stopped", &self.stopped())
            .finish_non_exhaustive()
    }
}

struct SynchronizerCore {
    monitor: Arc<dyn VisibilityMonitorPort>,
    clock: Arc<dyn ClockPort>,
    logger: Option<Arc<dyn LoggerPort>>,
    accounting: Mutex<Accounting>,
}

impl SynchronizerCore {
    fn lock(&self) -> MutexGuard<'_, Accounting> {
        self.accounting
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn initial_pass(&self) {
        let failures = {
            let mut accounting = self.lock();
            let status = self.monitor.status();
            let now = self.clock.now();
            accounting.record_percentage(&status);
            accounting.record_state(&status);
            accounting.reconcile(&status, now);
            accounting.take_failures()
        };
        self.report_failures(failures);
    }

    fn percentage_pass(&self) {
        let failures = {
            let mut accounting = self.lock();
            if accounting.state.is_stopped() {
                return;
            }
            let status = self.monitor.status();
            let now = self.clock.now();
            accounting.record_percentage(&status);
            accounting.reconcile(&status, now);
            accounting.take_failures()
        };
        self.report_failures(failures);
    }

    fn state_change(&self) {
        let failures = {
            let mut accounting = self.lock();
            if accounting.state.is_stopped() {
                return;
            }
            accounting.record_state(&self.monitor.status());
            accounting.take_failures()
        };
        self.report_failures(failures);
    }

    /// Returns true when this call moved the synchronizer to stopped.
    fn final_pass(&self) -> bool {
        let failures = {
            let mut accounting = self.lock();
            if accounting.state.is_stopped() {
                return false;
            }
            let status = self.monitor.status();
            let now = self.clock.now();
            accounting.record_percentage(&status);
            accounting.reconcile(&status, now);
            accounting.state = SynchronizerState::Stopped;
            accounting.take_failures()
        };
        self.report_failures(failures);
        true
    }

    fn report_failures(&self, failures: Vec<(MetricName, ErrorEnvelope)>) {
        for (metric, error) in failures {
            match self.logger.as_ref() {
                Some(logger) => logger.warn(
                    "vismetrics.synchronizer.report_failed",
                    "Metric update rejected by report",
                    Some(log_fields_failure(metric, &error)),
                ),
                None => tracing::warn!(
                    metric = metric.as_str(),
                    code = %error.code,
                    "metric update rejected by report: {error}"
                ),
            }
        }
    }
}

struct Accounting {
    report: Box<dyn ReportPort>,
    visible: Stopwatch,
    fully_visible: Stopwatch,
    hidden: Stopwatch,
    duration: Stopwatch,
    state: SynchronizerState,
    failures: Vec<(MetricName, ErrorEnvelope)>,
}

impl Accounting {
    fn new(report: Box<dyn ReportPort>) -> Self {
        Self {
            report,
            visible: Stopwatch::new(),
            fully_visible: Stopwatch::new(),
            hidden: Stopwatch::new(),
            duration: Stopwatch::new(),
            state: SynchronizerState::Active,
            failures: Vec::new(),
        }
    }

    fn record_percentage(&mut self, status: &VisibilityStatus) {
        let result = self
            .report
            .update(MetricName::Percentage.as_str(), status.percentage());
        self.note(MetricName::Percentage, result);
    }

    fn record_state(&mut self, status: &VisibilityStatus) {
        let result = self.report.update(
            MetricName::VisibilityChanges.as_str(),
            f64::from(status.state().code()),
        );
        self.note(MetricName::VisibilityChanges, result);
    }

    /// One reconciliation pass against a single status snapshot and instant.
    fn reconcile(&mut self, status: &VisibilityStatus, now: Duration) {
        let visible = self
            .visible
            .stop_and_then_restart_if(now, status.is_visible());
        if let Some(millis) = positive_millis(visible) {
            self.add(MetricName::TimeVisible, millis);
            self.add(MetricName::TimeRelativeVisible, millis * status.percentage());
        }

        let fully_visible = self
            .fully_visible
            .stop_and_then_restart_if(now, status.is_fully_visible());
        if let Some(millis) = positive_millis(fully_visible) {
            self.add(MetricName::TimeFullyVisible, millis);
        }

        let hidden = self
            .hidden
            .stop_and_then_restart_if(now, status.is_hidden());
        if let Some(millis) = positive_millis(hidden) {
            self.add(MetricName::TimeHidden, millis);
        }

        if let Some(millis) = positive_millis(self.duration.restart(now)) {
            self.add(MetricName::TimeDuration, millis);
        }
    }

    fn add(&mut self, metric: MetricName, millis: f64) {
        let result = self.report.increment(metric.as_str(), millis);
        self.note(metric, result);
    }

    fn note(&mut self, metric: MetricName, result: Result<()>) {
        if let Err(error) = result {
            self.failures.push((metric, error));
        }
    }

    fn take_failures(&mut self) -> Vec<(MetricName, ErrorEnvelope)> {
        std::mem::take(&mut self.failures)
    }
}

fn positive_millis(elapsed: Duration) -> Option<f64> {
    (!elapsed.is_zero()).then(|| elapsed.as_secs_f64() * 1_000.0)
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn log_fields_component() -> LogFields {
    let mut fields = BTreeMap::new();
    fields.insert(
        "component".to_owned().into_boxed_str(),
        Value::String("synchronizer".to_owned()),
    );
    fields
}

fn log_fields_intervals(intervals: UpdateIntervals) -> LogFields {
    let mut fields = BTreeMap::new();
    fields.insert(
        "visibleUpdateIntervalMs".to_owned().into_boxed_str(),
        Value::from(duration_ms(intervals.visible())),
    );
    fields.insert(
        "hiddenUpdateIntervalMs".to_owned().into_boxed_str(),
        Value::from(duration_ms(intervals.hidden())),
    );
    fields
}

fn log_fields_summary(summary: &ReportSummary) -> LogFields {
    let mut fields = BTreeMap::new();
    for name in [
        MetricName::TimeVisible,
        MetricName::TimeHidden,
        MetricName::TimeDuration,
    ] {
        if let Some(count) = summary.counter(name) {
            fields.insert(name.as_str().to_owned().into_boxed_str(), Value::from(count));
        }
    }
    fields
}

fn log_fields_failure(metric: MetricName, error: &ErrorEnvelope) -> LogFields {
    let mut fields = BTreeMap::new();
    fields.insert(
        "metric".to_owned().into_boxed_str(),
        Value::String(metric.as_str().to_owned()),
    );
    fields.insert(
        "code".to_owned().into_boxed_str(),
        Value::String(error.code.to_string()),
    );
    fields.insert(
        "error".to_owned().into_boxed_str(),
        Value::String(error.message.clone()),
    );
    fields
}
