//! Controller configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PerfError;

/// Frame rate the marquee is tuned for when no target is given.
pub const DEFAULT_TARGET_FPS: u32 = 60;

/// Fraction of the target below which development builds warn.
pub const LOW_FPS_RATIO: f64 = 0.9;

/// Build/runtime execution mode of the host page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ExecutionMode {
    Development,
    #[default]
    Production,
    /// Hosts skip the sampling loop and pin deterministic settings.
    Test,
}

impl ExecutionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ExecutionMode::Development => "development",
            ExecutionMode::Production => "production",
            ExecutionMode::Test => "test",
        }
    }

    #[inline]
    pub fn emits_diagnostics(self) -> bool {
        matches!(self, ExecutionMode::Development)
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionMode {
    type Err = PerfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(ExecutionMode::Development),
            "production" | "prod" => Ok(ExecutionMode::Production),
            "test" => Ok(ExecutionMode::Test),
            _ => Err(PerfError::UnknownMode {
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for ExecutionMode {
    type Error = PerfError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Configuration for a `PerformanceController`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonitorConfig {
    /// Frame rate the animation is expected to hold.
    #[serde(alias = "targetFPS")]
    pub target_fps: u32,
    pub mode: ExecutionMode,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            target_fps: DEFAULT_TARGET_FPS,
            mode: ExecutionMode::default(),
        }
    }
}

impl MonitorConfig {
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn validate(&self) -> Result<(), PerfError> {
        if self.target_fps == 0 {
            return Err(PerfError::InvalidConfig {
                reason: "target_fps must be greater than zero".into(),
            });
        }
        Ok(())
    }

    /// FPS under which a development build reports a diagnostic.
    #[inline]
    pub fn low_fps_threshold(&self) -> f64 {
        self.target_fps as f64 * LOW_FPS_RATIO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = MonitorConfig::default();
        assert_eq!(cfg.target_fps, 60);
        assert_eq!(cfg.mode, ExecutionMode::Production);
        assert!(cfg.validate().is_ok());
        assert!((cfg.low_fps_threshold() - 54.0).abs() < 1e-9);
    }

    #[test]
    fn zero_target_is_rejected() {
        let cfg = MonitorConfig {
            target_fps: 0,
            ..MonitorConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(PerfError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn mode_parsing() {
        assert_eq!(
            "Development".parse::<ExecutionMode>().unwrap(),
            ExecutionMode::Development
        );
        assert_eq!(" test ".parse::<ExecutionMode>().unwrap(), ExecutionMode::Test);
        assert_eq!(
            "prod".parse::<ExecutionMode>().unwrap(),
            ExecutionMode::Production
        );
        assert!(matches!(
            "staging".parse::<ExecutionMode>(),
            Err(PerfError::UnknownMode { .. })
        ));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let cfg: MonitorConfig = serde_json::from_str(r#"{ "mode": "development" }"#).unwrap();
        assert_eq!(cfg.target_fps, 60);
        assert!(cfg.mode.emits_diagnostics());

        let cfg: MonitorConfig = serde_json::from_str(r#"{ "targetFPS": 120 }"#).unwrap();
        assert_eq!(cfg.target_fps, 120);
        assert_eq!(cfg.mode, ExecutionMode::Production);
    }

    #[test]
    fn json_mode_accepts_same_spellings_as_from_str() {
        for (raw, mode) in [
            ("Development", ExecutionMode::Development),
            ("dev", ExecutionMode::Development),
            ("PROD", ExecutionMode::Production),
            (" test ", ExecutionMode::Test),
        ] {
            let json = serde_json::json!({ "mode": raw });
            let cfg: MonitorConfig = serde_json::from_value(json).unwrap();
            assert_eq!(cfg.mode, mode, "mode {raw:?}");
        }
        assert!(serde_json::from_str::<MonitorConfig>(r#"{ "mode": "staging" }"#).is_err());
        // serialization stays lowercase
        assert_eq!(
            serde_json::to_value(ExecutionMode::Development).unwrap(),
            serde_json::json!("development")
        );
    }
}
