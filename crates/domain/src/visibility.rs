//! Visibility percentage, thresholds, and classified status snapshots.

use serde::{Deserialize, Serialize};
use std::fmt;
use vismetrics_shared::{ErrorCode, ErrorEnvelope};

/// Default threshold at or above which an element counts as fully visible.
pub const DEFAULT_FULLY_VISIBLE_THRESHOLD: f64 = 1.0;
/// Default threshold at or below which an element counts as hidden.
pub const DEFAULT_HIDDEN_THRESHOLD: f64 = 0.0;

/// Fraction of an element's area inside the viewport, clamped to `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(f64);

impl Percentage {
    /// Nothing of the element is in the viewport.
    pub const ZERO: Self = Self(0.0);
    /// The whole element is in the viewport.
    pub const FULL: Self = Self(1.0);

    /// Build a percentage, clamping out-of-range input. `NaN` maps to zero.
    #[must_use]
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// Return the raw fraction.
    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{:.2}%", self.0 * 100.0)
    }
}

/// Discrete visibility state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityState {
    /// At or below the hidden threshold.
    Hidden,
    /// Partially inside the viewport.
    Visible,
    /// At or above the fully-visible threshold.
    FullyVisible,
}

impl VisibilityState {
    /// Numeric code recorded as a timer sample on state changes.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Hidden => 0,
            Self::Visible => 1,
            Self::FullyVisible => 2,
        }
    }

    /// Stable lowercase identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::Visible => "visible",
            Self::FullyVisible => "fullyvisible",
        }
    }
}

impl fmt::Display for VisibilityState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Invalid threshold configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VisibilityError {
    /// A threshold is outside `[0, 1]` or not a number.
    ThresholdOutOfRange {
        /// Threshold name (`hidden` or `fullyVisible`).
        field: &'static str,
        /// Raw value provided.
        value: f64,
    },
    /// The hidden threshold must be strictly below the fully-visible threshold.
    ThresholdsOverlap {
        /// Hidden threshold.
        hidden: f64,
        /// Fully-visible threshold.
        fully_visible: f64,
    },
}

impl fmt::Display for VisibilityError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ThresholdOutOfRange { field, value } => {
                write!(formatter, "{field} threshold must be within [0, 1] (got {value})")
            },
            Self::ThresholdsOverlap {
                hidden,
                fully_visible,
            } => write!(
                formatter,
                "hidden threshold {hidden} must be below fully visible threshold {fully_visible}"
            ),
        }
    }
}

impl std::error::Error for VisibilityError {}

impl From<VisibilityError> for ErrorEnvelope {
    fn from(error: VisibilityError) -> Self {
        let envelope = Self::expected(
            ErrorCode::new("domain", "invalid_visibility_threshold"),
            error.to_string(),
        );
        match error {
            VisibilityError::ThresholdOutOfRange { field, value } => envelope
                .with_metadata("field", field)
                .with_metadata("value", value.to_string()),
            VisibilityError::ThresholdsOverlap {
                hidden,
                fully_visible,
            } => envelope
                .with_metadata("hidden", hidden.to_string())
                .with_metadata("fully_visible", fully_visible.to_string()),
        }
    }
}

/// Cut-offs used to classify a percentage into a [`VisibilityState`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityThresholds {
    fully_visible: f64,
    hidden: f64,
}

impl VisibilityThresholds {
    /// Validate thresholds: both in `[0, 1]` and `hidden < fully_visible`.
    pub fn new(fully_visible: f64, hidden: f64) -> Result<Self, VisibilityError> {
        check_unit_range("fullyVisible", fully_visible)?;
        check_unit_range("hidden", hidden)?;
        if hidden >= fully_visible {
            return Err(VisibilityError::ThresholdsOverlap {
                hidden,
                fully_visible,
            });
        }
        Ok(Self {
            fully_visible,
            hidden,
        })
    }

    /// Fully-visible threshold.
    #[must_use]
    pub const fn fully_visible(&self) -> f64 {
        self.fully_visible
    }

    /// Hidden threshold.
    #[must_use]
    pub const fn hidden(&self) -> f64 {
        self.hidden
    }

    /// Classify a percentage. Hidden wins ties with the hidden threshold.
    #[must_use]
    pub fn classify(&self, percentage: Percentage) -> VisibilityState {
        let value = percentage.get();
        if value <= self.hidden {
            VisibilityState::Hidden
        } else if value >= self.fully_visible {
            VisibilityState::FullyVisible
        } else {
            VisibilityState::Visible
        }
    }
}

impl Default for VisibilityThresholds {
    fn default() -> Self {
        Self {
            fully_visible: DEFAULT_FULLY_VISIBLE_THRESHOLD,
            hidden: DEFAULT_HIDDEN_THRESHOLD,
        }
    }
}

fn check_unit_range(field: &'static str, value: f64) -> Result<(), VisibilityError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(VisibilityError::ThresholdOutOfRange { field, value })
    }
}

/// Point-in-time visibility reading exposed by a monitor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisibilityStatus {
    percentage: Percentage,
    state: VisibilityState,
}

impl VisibilityStatus {
    /// Build a status from an externally classified reading.
    #[must_use]
    pub const fn new(percentage: Percentage, state: VisibilityState) -> Self {
        Self { percentage, state }
    }

    /// Build a status by classifying `percentage` with `thresholds`.
    #[must_use]
    pub fn classify(percentage: Percentage, thresholds: &VisibilityThresholds) -> Self {
        Self::new(percentage, thresholds.classify(percentage))
    }

    /// Status of an element completely outside the viewport.
    #[must_use]
    pub const fn hidden() -> Self {
        Self::new(Percentage::ZERO, VisibilityState::Hidden)
    }

    /// Visible fraction in `[0, 1]`.
    #[must_use]
    pub const fn percentage(&self) -> f64 {
        self.percentage.get()
    }

    /// Discrete state.
    #[must_use]
    pub const fn state(&self) -> VisibilityState {
        self.state
    }

    /// True when partially or fully visible.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        !self.is_hidden()
    }

    /// True when fully visible.
    #[must_use]
    pub const fn is_fully_visible(&self) -> bool {
        matches!(self.state, VisibilityState::FullyVisible)
    }

    /// True when hidden.
    #[must_use]
    pub const fn is_hidden(&self) -> bool {
        matches!(self.state, VisibilityState::Hidden)
    }
}

impl Default for VisibilityStatus {
    fn default() -> Self {
        Self::hidden()
    }
}
