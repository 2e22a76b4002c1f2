//! Bounded rolling FPS history and the auxiliary stability queries.

use std::collections::VecDeque;

/// Number of windows retained.
pub const HISTORY_CAPACITY: usize = 10;

/// Samples considered by `is_stable`.
pub const STABILITY_WINDOW: usize = 3;

/// Variance (fps²) under which the recent samples count as stable.
pub const STABILITY_VARIANCE: f64 = 25.0;

/// Average reported before any window closed.
pub const DEFAULT_AVERAGE_FPS: f64 = 60.0;

/// Last `HISTORY_CAPACITY` fps values in arrival order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PerformanceHistory {
    samples: VecDeque<u32>,
}

impl PerformanceHistory {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Append, evicting the oldest value beyond capacity.
    pub fn push(&mut self, fps: u32) {
        if self.samples.len() == HISTORY_CAPACITY {
            self.samples.pop_front();
        }
        self.samples.push_back(fps);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.samples.iter().copied()
    }

    pub fn latest(&self) -> Option<u32> {
        self.samples.back().copied()
    }

    pub fn to_vec(&self) -> Vec<u32> {
        self.iter().collect()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn average_fps(&self) -> f64 {
        if self.samples.is_empty() {
            return DEFAULT_AVERAGE_FPS;
        }
        self.iter().map(f64::from).sum::<f64>() / self.samples.len() as f64
    }

    /// Fewer than three samples is treated as stable.
    pub fn is_stable(&self) -> bool {
        if self.samples.len() < STABILITY_WINDOW {
            return true;
        }
        let recent: Vec<f64> = self
            .samples
            .iter()
            .skip(self.samples.len() - STABILITY_WINDOW)
            .map(|&v| f64::from(v))
            .collect();
        variance(&recent) < STABILITY_VARIANCE
    }
}

fn variance(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}

impl Extend<u32> for PerformanceHistory {
    fn extend<T: IntoIterator<Item = u32>>(&mut self, iter: T) {
        for fps in iter {
            self.push(fps);
        }
    }
}
