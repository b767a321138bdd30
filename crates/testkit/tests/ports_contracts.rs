//! Contract-style tests for port traits using the test doubles.

use std::sync::Arc;
use std::time::Duration;
use vismetrics_ports::{
    ClockPort, DualIntervalSchedulerPort, LogLevel, LoggerPort, MetricKind, ReportFactoryPort,
    UpdateIntervals,
};
use vismetrics_shared::{ErrorCode, Result};
use vismetrics_testkit::{
    FaultyReportFactory, ManualClock, ManualScheduler, NoopLogger, RecordingLogger, ReportFault,
};

#[test]
fn ports_are_object_safe() {
    let clock: Arc<dyn ClockPort> = Arc::new(ManualClock::new());
    let scheduler: Arc<dyn DualIntervalSchedulerPort> = Arc::new(ManualScheduler::new());
    let logger: Arc<dyn LoggerPort> = Arc::new(NoopLogger);
    let factory: Arc<dyn ReportFactoryPort> = Arc::new(FaultyReportFactory::new(ReportFault::Writes));

    assert_eq!(clock.now(), Duration::ZERO);
    scheduler.stop_all();
    logger.info("vismetrics.contract", "noop", None);
    assert!(factory.create_report().summary().is_empty());
}

#[test]
fn rejecting_scheduler_returns_error() {
    let scheduler = ManualScheduler::rejecting();
    let error = scheduler
        .every_with_dual_intervals(UpdateIntervals::default(), Arc::new(|| {}))
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::new("scheduler", "unavailable"));
    assert_eq!(scheduler.active_registrations(), 0);
}

#[test]
fn faulty_report_rejects_configured_operations() -> Result<()> {
    let writes = FaultyReportFactory::new(ReportFault::Writes);
    let mut report = writes.create_report();
    report.add_metric("time.visible", MetricKind::Counter)?;
    assert!(report.increment("time.visible", 1.0).is_err());
    assert!(report.update("percentage", 1.0).is_err());
    assert_eq!(writes.rejected_writes(), 2);

    let registration = FaultyReportFactory::new(ReportFault::Registration("percentage"));
    let mut report = registration.create_report();
    report.add_metric("time.visible", MetricKind::Counter)?;
    assert!(report.add_metric("percentage", MetricKind::Timer).is_err());
    Ok(())
}

#[test]
fn recording_logger_captures_levels() {
    let logger = RecordingLogger::new();
    logger.debug("vismetrics.contract", "debug", None);
    logger.error("vismetrics.contract", "error", None);

    assert_eq!(logger.events().len(), 2);
    assert_eq!(logger.count_at(LogLevel::Error), 1);
}
