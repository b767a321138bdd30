//! Error envelope types and helpers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Metadata attached to errors for diagnostics.
pub type ErrorMetadata = BTreeMap<String, String>;

/// High-level classification of error origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Expected failures (validation, missing collaborators, bad input).
    Expected,
    /// Unexpected failures (runtime unavailable, external dependencies).
    Unexpected,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expected => formatter.write_str("expected"),
            Self::Unexpected => formatter.write_str("unexpected"),
        }
    }
}

/// Retry classification for failure handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClass {
    /// The operation can be retried safely.
    Retriable,
    /// The operation should not be retried.
    NonRetriable,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Retriable => formatter.write_str("retriable"),
            Self::NonRetriable => formatter.write_str("non-retriable"),
        }
    }
}

/// Stable error code with namespace and identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode {
    namespace: String,
    code: String,
}

impl ErrorCode {
    /// Create a new error code with a namespace and code.
    pub fn new(namespace: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            code: code.into(),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:{}", self.namespace, self.code)
    }
}

/// Structured error envelope shared across crates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Error kind describing the origin category.
    pub kind: ErrorKind,
    /// Retry classification.
    pub class: ErrorClass,
    /// Stable error code.
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
    /// Additional diagnostic metadata.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: ErrorMetadata,
}

impl ErrorEnvelope {
    /// Create an expected error with non-retriable classification.
    pub fn expected(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Expected,
            class: ErrorClass::NonRetriable,
            code,
            message: message.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Create an unexpected error with the provided retry classification.
    pub fn unexpected(code: ErrorCode, message: impl Into<String>, class: ErrorClass) -> Self {
        Self {
            kind: ErrorKind::Unexpected,
            class,
            code,
            message: message.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a single metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for ErrorEnvelope {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "{} {} {}: {}",
            self.kind, self.class, self.code, self.message
        )
    }
}

impl std::error::Error for ErrorEnvelope {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_envelope_constructors() {
        let code = ErrorCode::new("metrics", "missing_monitor");
        let expected = ErrorEnvelope::expected(code.clone(), "no monitor");
        assert_eq!(expected.kind, ErrorKind::Expected);
        assert_eq!(expected.class, ErrorClass::NonRetriable);
        assert_eq!(expected.code, code);

        let unexpected = ErrorEnvelope::unexpected(
            ErrorCode::new("scheduler", "no_runtime"),
            "no runtime",
            ErrorClass::Retriable,
        );
        assert_eq!(unexpected.kind, ErrorKind::Unexpected);
        assert_eq!(unexpected.class, ErrorClass::Retriable);
    }

    #[test]
    fn display_includes_namespaced_code() {
        let error = ErrorEnvelope::expected(
            ErrorCode::new("metrics", "unknown_metric"),
            "metric not registered",
        );
        assert_eq!(
            error.to_string(),
            "expected non-retriable metrics:unknown_metric: metric not registered"
        );
    }

    #[test]
    fn metadata_is_attached() {
        let error = ErrorEnvelope::expected(ErrorCode::new("metrics", "unknown_metric"), "missing")
            .with_metadata("name", "time.visible");

        assert_eq!(
            error.metadata.get("name").map(String::as_str),
            Some("time.visible")
        );
    }

    #[test]
    fn envelope_serialization_shape() -> Result<(), serde_json::Error> {
        let error = ErrorEnvelope::expected(ErrorCode::new("config", "invalid_json"), "bad input");
        let value = serde_json::to_value(&error)?;
        let expected = serde_json::json!({
            "kind": "Expected",
            "class": "NonRetriable",
            "code": { "namespace": "config", "code": "invalid_json" },
            "message": "bad input"
        });
        assert_eq!(value, expected);
        Ok(())
    }
}
