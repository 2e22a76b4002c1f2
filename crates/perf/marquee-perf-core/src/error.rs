//! Error types for the performance controller.

use serde::{Deserialize, Serialize};

/// Errors surfaced by the controller and by host adapters (scheduler, style surface).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum PerfError {
    /// A monitoring loop is already live for this controller.
    #[error("monitoring loop is already running")]
    AlreadyRunning,

    /// Configuration rejected by `MonitorConfig::validate`.
    #[error("Invalid config: {reason}")]
    InvalidConfig { reason: String },

    /// Execution mode string that is not development/production/test.
    #[error("Unknown execution mode: {value}")]
    UnknownMode { value: String },

    /// The host could not register a frame callback.
    #[error("Scheduler error: {reason}")]
    Scheduler { reason: String },

    /// The host style surface rejected a write.
    #[error("Style write failed for {property}: {reason}")]
    Style { property: String, reason: String },
}

impl PerfError {
    pub fn scheduler(reason: impl Into<String>) -> Self {
        Self::Scheduler {
            reason: reason.into(),
        }
    }

    pub fn style(property: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Style {
            property: property.into(),
            reason: reason.into(),
        }
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::AlreadyRunning | Self::Scheduler { .. } => "loop",
            Self::InvalidConfig { .. } | Self::UnknownMode { .. } => "config",
            Self::Style { .. } => "style",
        }
    }
}
