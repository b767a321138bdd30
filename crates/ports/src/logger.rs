//! Structured logging boundary contract.

use std::collections::BTreeMap;

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Debug.
    Debug,
    /// Info.
    Info,
    /// Warn.
    Warn,
    /// Error.
    Error,
}

impl LogLevel {
    /// Lowercase level name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Additional event fields.
pub type LogFields = BTreeMap<Box<str>, serde_json::Value>;

/// Structured log event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    /// Stable event name (e.g. `vismetrics.synchronizer.stopped`).
    pub event: Box<str>,
    /// Severity.
    pub level: LogLevel,
    /// Human-readable message.
    pub message: Box<str>,
    /// Optional structured fields.
    pub fields: Option<LogFields>,
}

impl LogEvent {
    /// Build an event without fields.
    #[must_use]
    pub fn new(event: &str, level: LogLevel, message: &str) -> Self {
        Self {
            event: event.into(),
            level,
            message: message.into(),
            fields: None,
        }
    }

    /// Attach structured fields.
    #[must_use]
    pub fn with_fields(mut self, fields: Option<LogFields>) -> Self {
        self.fields = fields;
        self
    }
}

/// Boundary contract for structured logging.
pub trait LoggerPort: Send + Sync {
    /// Emit a structured event.
    fn log(&self, event: LogEvent);

    /// Create a child logger with base fields applied to every event.
    fn child(&self, fields: LogFields) -> Box<dyn LoggerPort>;

    /// Convenience: debug event.
    fn debug(&self, event: &str, message: &str, fields: Option<LogFields>) {
        self.log(LogEvent::new(event, LogLevel::Debug, message).with_fields(fields));
    }

    /// Convenience: info event.
    fn info(&self, event: &str, message: &str, fields: Option<LogFields>) {
        self.log(LogEvent::new(event, LogLevel::Info, message).with_fields(fields));
    }

    /// Convenience: warn event.
    fn warn(&self, event: &str, message: &str, fields: Option<LogFields>) {
        self.log(LogEvent::new(event, LogLevel::Warn, message).with_fields(fields));
    }

    /// Convenience: error event.
    fn error(&self, event: &str, message: &str, fields: Option<LogFields>) {
        self.log(LogEvent::new(event, LogLevel::Error, message).with_fields(fields));
    }
}
