//! One finalized measurement window.

use serde::{Deserialize, Serialize};

use crate::visibility::{clamp_ratio, Visibility};

/// Measurement produced once per settling window (~1s).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSample {
    #[serde(alias = "fps")]
    pub frames_per_second: u32,
    #[serde(default)]
    pub frame_time_ms: f64,
    pub is_visible: bool,
    pub intersection_ratio: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_used_bytes: Option<u64>,
}

impl PerformanceSample {
    /// Visible, fully on-screen sample at the given fps.
    pub fn new(frames_per_second: u32) -> Self {
        let frame_time_ms = if frames_per_second == 0 {
            0.0
        } else {
            1000.0 / frames_per_second as f64
        };
        Self {
            frames_per_second,
            frame_time_ms,
            is_visible: true,
            intersection_ratio: 1.0,
            memory_used_bytes: None,
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.is_visible = visibility.is_visible;
        self.intersection_ratio = clamp_ratio(visibility.intersection_ratio);
        self
    }

    pub fn with_memory(mut self, bytes: Option<u64>) -> Self {
        self.memory_used_bytes = bytes;
        self
    }

    pub fn visibility(&self) -> Visibility {
        Visibility {
            is_visible: self.is_visible,
            intersection_ratio: self.intersection_ratio,
        }
    }
}
