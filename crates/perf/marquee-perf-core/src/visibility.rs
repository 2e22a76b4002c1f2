//! Viewport visibility: observer options and the two visibility signals.
//!
//! The observer path reports `(is_intersecting, ratio)` pairs from threshold
//! callbacks. The geometric path derives the same pair from a bounding rect at
//! sample time. The controller keeps both and never merges them.

use serde::{Deserialize, Serialize};

/// Intersection-ratio thresholds at which the observer fires.
pub const OBSERVER_THRESHOLDS: [f64; 6] = [0.0, 0.1, 0.25, 0.5, 0.75, 1.0];

/// Block-axis margin so transitions are seen before the strip is on screen.
pub const OBSERVER_ROOT_MARGIN: &str = "150px 0px";

/// Options handed to the host's intersection observer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObserverOptions {
    pub thresholds: Vec<f64>,
    pub root_margin: String,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            thresholds: OBSERVER_THRESHOLDS.to_vec(),
            root_margin: OBSERVER_ROOT_MARGIN.to_string(),
        }
    }
}

/// Bounding rectangle in viewport coordinates (CSS pixels).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub bottom: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, height: f64) -> Self {
        Self {
            top,
            bottom: top + height,
            height,
        }
    }
}

/// Visible state of the tracked element.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visibility {
    pub is_visible: bool,
    pub intersection_ratio: f64,
}

impl Default for Visibility {
    /// Hosts without an observer treat the element as fully on screen.
    fn default() -> Self {
        Self::fully_visible()
    }
}

impl Visibility {
    pub const fn fully_visible() -> Self {
        Self {
            is_visible: true,
            intersection_ratio: 1.0,
        }
    }

    /// Value reported by an intersection observer entry.
    pub fn observed(is_intersecting: bool, ratio: f64) -> Self {
        Self {
            is_visible: is_intersecting,
            intersection_ratio: clamp_ratio(ratio),
        }
    }

    /// Vertical-only approximation from a bounding rect.
    pub fn from_rect(rect: &Rect, viewport_height: f64) -> Self {
        let is_visible = rect.top < viewport_height && rect.bottom > 0.0;
        if !is_visible || rect.height <= 0.0 {
            return Self {
                is_visible,
                intersection_ratio: 0.0,
            };
        }
        let visible = rect.bottom.min(viewport_height) - rect.top.max(0.0);
        Self {
            is_visible,
            intersection_ratio: clamp_ratio(visible / rect.height),
        }
    }
}

/// Clamp into [0, 1]; NaN maps to 0.
#[inline]
pub fn clamp_ratio(ratio: f64) -> f64 {
    if ratio.is_nan() {
        0.0
    } else {
        ratio.clamp(0.0, 1.0)
    }
}

/// Host capability that inspects the tracked element at window close.
pub trait ViewportProbe {
    fn visibility(&self) -> Visibility;

    /// Heap usage snapshot when the host exposes one.
    fn memory_used_bytes(&self) -> Option<u64> {
        None
    }
}

impl ViewportProbe for Visibility {
    fn visibility(&self) -> Visibility {
        *self
    }
}
