//! In-memory test doubles for port contracts.
//!
//! These implementations are intended for:
//! - Deterministic synchronizer tests (manual time, manual ticks)
//! - Asserting on emitted log events
//! - Injecting report and scheduler failures

use crate::errors::{report_write_error, scheduler_unavailable_error};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use vismetrics_ports::{
    ClockPort, DualIntervalSchedulerPort, LogEvent, LogFields, LogLevel, LoggerPort, MetricKind,
    MetricSnapshot, ReportFactoryPort, ReportPort, ReportSummary, TickCallback, UpdateIntervals,
};
use vismetrics_shared::Result;

/// A no-op logger implementation.
#[derive(Debug, Default)]
pub struct NoopLogger;

impl LoggerPort for NoopLogger {
    fn log(&self, _event: LogEvent) {}

    fn child(&self, _fields: LogFields) -> Box<dyn LoggerPort> {
        Box::new(Self)
    }
}

/// Logger capturing every event; children share the capture buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingLogger {
    events: Arc<Mutex<Vec<LogEvent>>>,
    base_fields: LogFields,
}

impl RecordingLogger {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured events, oldest first.
    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Captured events with the given name.
    pub fn events_named(&self, name: &str) -> Vec<LogEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.event.as_ref() == name)
            .collect()
    }

    /// Number of captured events at `level`.
    pub fn count_at(&self, level: LogLevel) -> usize {
        self.events()
            .iter()
            .filter(|event| event.level == level)
            .count()
    }
}

impl LoggerPort for RecordingLogger {
    fn log(&self, mut event: LogEvent) {
        if !self.base_fields.is_empty() {
            let mut fields = self.base_fields.clone();
            fields.extend(event.fields.take().unwrap_or_default());
            event.fields = Some(fields);
        }
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    fn child(&self, fields: LogFields) -> Box<dyn LoggerPort> {
        let mut base_fields = self.base_fields.clone();
        base_fields.extend(fields);
        Box::new(Self {
            events: Arc::clone(&self.events),
            base_fields,
        })
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<Duration>,
}

impl ManualClock {
    /// Clock reading zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move forward by `step`.
    pub fn advance(&self, step: Duration) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) += step;
    }

    /// Move forward by `millis` milliseconds.
    pub fn advance_ms(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }

    /// Jump to an absolute reading, including backwards.
    pub fn set(&self, now: Duration) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }
}

impl ClockPort for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Default)]
struct SchedulerState {
    registrations: Vec<(UpdateIntervals, TickCallback)>,
    stop_all_calls: usize,
    reject_registrations: bool,
}

/// Scheduler whose ticks are fired explicitly with [`ManualScheduler::tick`].
#[derive(Default)]
pub struct ManualScheduler {
    state: Mutex<SchedulerState>,
}

impl ManualScheduler {
    /// Scheduler accepting registrations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scheduler that fails every registration.
    pub fn rejecting() -> Self {
        let scheduler = Self::default();
        scheduler
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .reject_registrations = true;
        scheduler
    }

    /// Fire every active registration once. Returns how many fired.
    pub fn tick(&self) -> usize {
        let callbacks: Vec<TickCallback> = self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .registrations
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in &callbacks {
            callback();
        }
        callbacks.len()
    }

    /// Number of active registrations.
    pub fn active_registrations(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .registrations
            .len()
    }

    /// Intervals of the most recent active registration.
    pub fn last_intervals(&self) -> Option<UpdateIntervals> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .registrations
            .last()
            .map(|(intervals, _)| *intervals)
    }

    /// How many times `stop_all` was called.
    pub fn stop_all_calls(&self) -> usize {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).stop_all_calls
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ManualScheduler")
            .field("active_registrations", &self.active_registrations())
            .field("stop_all_calls", &self.stop_all_calls())
            .finish()
    }
}

impl DualIntervalSchedulerPort for ManualScheduler {
    fn every_with_dual_intervals(
        &self,
        intervals: UpdateIntervals,
        callback: TickCallback,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.reject_registrations {
            return Err(scheduler_unavailable_error());
        }
        state.registrations.push((intervals, callback));
        Ok(())
    }

    fn stop_all(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.registrations.clear();
        state.stop_all_calls += 1;
    }
}

/// Which report operations fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFault {
    /// `add_metric` fails for the named metric.
    Registration(&'static str),
    /// `increment` and `update` fail for every metric.
    Writes,
}

/// Report that records nothing and fails according to its [`ReportFault`].
#[derive(Debug, Clone)]
pub struct FaultyReport {
    fault: ReportFault,
    registered: Vec<(String, MetricKind)>,
    rejected_writes: Arc<Mutex<usize>>,
}

impl ReportPort for FaultyReport {
    fn add_metric(&mut self, name: &str, kind: MetricKind) -> Result<()> {
        if matches!(self.fault, ReportFault::Registration(fault) if fault == name) {
            return Err(report_write_error(name));
        }
        self.registered.push((name.to_string(), kind));
        Ok(())
    }

    fn increment(&mut self, name: &str, _amount: f64) -> Result<()> {
        self.reject_write(name)
    }

    fn update(&mut self, name: &str, _value: f64) -> Result<()> {
        self.reject_write(name)
    }

    fn get_metric(&self, _name: &str) -> Option<MetricSnapshot> {
        None
    }

    fn summary(&self) -> ReportSummary {
        ReportSummary::default()
    }
}

impl FaultyReport {
    fn reject_write(&self, name: &str) -> Result<()> {
        if self.fault == ReportFault::Writes {
            *self
                .rejected_writes
                .lock()
                .unwrap_or_else(PoisonError::into_inner) += 1;
            return Err(report_write_error(name));
        }
        Ok(())
    }
}

/// Factory producing [`FaultyReport`]s.
#[derive(Debug, Clone)]
pub struct FaultyReportFactory {
    fault: ReportFault,
    rejected_writes: Arc<Mutex<usize>>,
}

impl FaultyReportFactory {
    /// Factory whose reports fail as described by `fault`.
    pub fn new(fault: ReportFault) -> Self {
        Self {
            fault,
            rejected_writes: Arc::new(Mutex::new(0)),
        }
    }

    /// Writes rejected across every report this factory produced.
    pub fn rejected_writes(&self) -> usize {
        *self.rejected_writes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ReportFactoryPort for FaultyReportFactory {
    fn create_report(&self) -> Box<dyn ReportPort> {
        Box::new(FaultyReport {
            fault: self.fault,
            registered: Vec::new(),
            rejected_writes: Arc::clone(&self.rejected_writes),
        })
    }
}
