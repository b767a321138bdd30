//! Synchronizer lifecycle state.

use serde::{Deserialize, Serialize};

/// Lifecycle of a metrics synchronizer. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynchronizerState {
    /// Triggers cause reconciliation passes.
    #[default]
    Active,
    /// Triggers are ignored.
    Stopped,
}

impl SynchronizerState {
    /// True once stopped.
    #[must_use]
    pub const fn is_stopped(self) -> bool {
        matches!(self, Self::Stopped)
    }
}
