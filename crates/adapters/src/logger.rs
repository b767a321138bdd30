//! Logger adapter forwarding structured events to `tracing`.

use serde_json::Value;
use vismetrics_ports::{LogEvent, LogFields, LogLevel, LoggerPort};

/// Logger emitting one `tracing` event per [`LogEvent`].
///
/// Fields (base fields merged with per-event fields) are rendered as a JSON
/// object under the `fields` key, so any subscriber sees them verbatim.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    base_fields: LogFields,
    min_level: LogLevel,
}

impl TracingLogger {
    /// Logger with no base fields and `info` as the minimum level.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            base_fields: LogFields::new(),
            min_level: LogLevel::Info,
        }
    }

    /// Set base fields applied to every event.
    #[must_use]
    pub fn with_base_fields(mut self, fields: LogFields) -> Self {
        self.base_fields = fields;
        self
    }

    /// Set the minimum log level.
    #[must_use]
    pub const fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    fn merged_fields(&self, extra: Option<LogFields>) -> LogFields {
        let mut fields = self.base_fields.clone();
        fields.extend(extra.unwrap_or_default());
        fields
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggerPort for TracingLogger {
    fn log(&self, event: LogEvent) {
        if event.level < self.min_level {
            return;
        }

        let fields = fields_to_json(&self.merged_fields(event.fields));
        let name = event.event.as_ref();
        let message = event.message.as_ref();
        match event.level {
            LogLevel::Debug => {
                tracing::debug!(target: "vismetrics", event = name, fields = %fields, "{message}");
            },
            LogLevel::Info => {
                tracing::info!(target: "vismetrics", event = name, fields = %fields, "{message}");
            },
            LogLevel::Warn => {
                tracing::warn!(target: "vismetrics", event = name, fields = %fields, "{message}");
            },
            LogLevel::Error => {
                tracing::error!(target: "vismetrics", event = name, fields = %fields, "{message}");
            },
        }
    }

    fn child(&self, fields: LogFields) -> Box<dyn LoggerPort> {
        Box::new(Self {
            base_fields: self.merged_fields(Some(fields)),
            min_level: self.min_level,
        })
    }
}

fn fields_to_json(fields: &LogFields) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect(),
    )
}
