//! Frame-rate sampler: counts frames and closes a window every ~1000ms.

use serde::{Deserialize, Serialize};

/// Length of one settling window.
pub const WINDOW_MS: f64 = 1000.0;

/// Result of a closed measurement window.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameWindow {
    pub fps: u32,
    pub frame_time_ms: f64,
    pub frames: u32,
    pub elapsed_ms: f64,
}

#[derive(Clone, Debug, Default)]
pub struct FrameSampler {
    frame_count: u32,
    window_start_ms: f64,
}

impl FrameSampler {
    pub fn new(now_ms: f64) -> Self {
        Self {
            frame_count: 0,
            window_start_ms: now_ms,
        }
    }

    /// Start a fresh window at `now_ms`.
    pub fn reset(&mut self, now_ms: f64) {
        self.frame_count = 0;
        self.window_start_ms = now_ms;
    }

    #[inline]
    pub fn frames_in_window(&self) -> u32 {
        self.frame_count
    }

    /// Count one frame; returns the window once `now_ms` is at least
    /// `WINDOW_MS` past the boundary.
    pub fn on_frame(&mut self, now_ms: f64) -> Option<FrameWindow> {
        self.frame_count = self.frame_count.saturating_add(1);
        let elapsed_ms = now_ms - self.window_start_ms;
        if elapsed_ms < WINDOW_MS {
            return None;
        }

        let frames = self.frame_count;
        let window = FrameWindow {
            fps: (frames as f64 * 1000.0 / elapsed_ms).round() as u32,
            frame_time_ms: elapsed_ms / frames as f64,
            frames,
            elapsed_ms,
        };
        self.reset(now_ms);
        Some(window)
    }
}
