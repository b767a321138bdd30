//! Polling cadence for the dual-interval scheduler.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default cadence for both visible and hidden polling.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_millis(250);

/// Validated, strictly positive polling intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIntervals {
    visible: Duration,
    hidden: Duration,
}

impl UpdateIntervals {
    /// Build intervals; `None` when either is zero.
    #[must_use]
    pub const fn new(visible: Duration, hidden: Duration) -> Option<Self> {
        if visible.is_zero() || hidden.is_zero() {
            return None;
        }
        Some(Self { visible, hidden })
    }

    /// Interval used while the element is visible.
    #[must_use]
    pub const fn visible(&self) -> Duration {
        self.visible
    }

    /// Interval used while the element is hidden.
    #[must_use]
    pub const fn hidden(&self) -> Duration {
        self.hidden
    }

    /// Pick the interval matching the current visibility.
    #[must_use]
    pub const fn for_visibility(&self, is_visible: bool) -> Duration {
        if is_visible { self.visible } else { self.hidden }
    }
}

impl Default for UpdateIntervals {
    fn default() -> Self {
        Self {
            visible: DEFAULT_UPDATE_INTERVAL,
            hidden: DEFAULT_UPDATE_INTERVAL,
        }
    }
}
