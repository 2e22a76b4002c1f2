//! Settings resolver: pure mapping from one sample to adaptive settings.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sample::PerformanceSample;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationQuality {
    Minimal,
    Low,
    Medium,
    High,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HardwareAcceleration {
    Disabled,
    Minimal,
    Moderate,
    Enabled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityLevel {
    None,
    Partial,
    Full,
}

impl AnimationQuality {
    pub fn as_str(self) -> &'static str {
        match self {
            AnimationQuality::Minimal => "minimal",
            AnimationQuality::Low => "low",
            AnimationQuality::Medium => "medium",
            AnimationQuality::High => "high",
        }
    }
}

impl HardwareAcceleration {
    pub fn as_str(self) -> &'static str {
        match self {
            HardwareAcceleration::Disabled => "disabled",
            HardwareAcceleration::Minimal => "minimal",
            HardwareAcceleration::Moderate => "moderate",
            HardwareAcceleration::Enabled => "enabled",
        }
    }
}

impl VisibilityLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            VisibilityLevel::None => "none",
            VisibilityLevel::Partial => "partial",
            VisibilityLevel::Full => "full",
        }
    }

    /// `> 0.5` is full, `> 0.1` partial, anything else none.
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > 0.5 {
            VisibilityLevel::Full
        } else if ratio > 0.1 {
            VisibilityLevel::Partial
        } else {
            VisibilityLevel::None
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(AnimationQuality, HardwareAcceleration, VisibilityLevel);

/// Settings recomputed every window; never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptiveSettings {
    pub animation_quality: AnimationQuality,
    pub hardware_acceleration: HardwareAcceleration,
    pub visibility_level: VisibilityLevel,
}

impl AdaptiveSettings {
    /// Decision ladder, first match wins:
    /// hidden → low/minimal, <30 → minimal/disabled, <45 → low/minimal,
    /// <55 → medium/moderate, else high/enabled.
    pub fn resolve(sample: &PerformanceSample) -> Self {
        let fps = sample.frames_per_second;
        let (animation_quality, hardware_acceleration) = if !sample.is_visible {
            (AnimationQuality::Low, HardwareAcceleration::Minimal)
        } else if fps < 30 {
            (AnimationQuality::Minimal, HardwareAcceleration::Disabled)
        } else if fps < 45 {
            (AnimationQuality::Low, HardwareAcceleration::Minimal)
        } else if fps < 55 {
            (AnimationQuality::Medium, HardwareAcceleration::Moderate)
        } else {
            (AnimationQuality::High, HardwareAcceleration::Enabled)
        };

        Self {
            animation_quality,
            hardware_acceleration,
            visibility_level: VisibilityLevel::from_ratio(sample.intersection_ratio),
        }
    }

    /// Pinned settings for hosts running in test mode.
    pub const fn deterministic() -> Self {
        Self {
            animation_quality: AnimationQuality::High,
            hardware_acceleration: HardwareAcceleration::Enabled,
            visibility_level: VisibilityLevel::Full,
        }
    }
}

impl Default for AdaptiveSettings {
    fn default() -> Self {
        Self::deterministic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visibility::Visibility;

    fn visible(fps: u32) -> PerformanceSample {
        PerformanceSample::new(fps)
    }

    fn qa(fps: u32) -> (AnimationQuality, HardwareAcceleration) {
        let s = AdaptiveSettings::resolve(&visible(fps));
        (s.animation_quality, s.hardware_acceleration)
    }

    #[test]
    fn fps_ladder_boundaries() {
        use AnimationQuality as Q;
        use HardwareAcceleration as H;
        assert_eq!(qa(0), (Q::Minimal, H::Disabled));
        assert_eq!(qa(29), (Q::Minimal, H::Disabled));
        assert_eq!(qa(30), (Q::Low, H::Minimal));
        assert_eq!(qa(44), (Q::Low, H::Minimal));
        assert_eq!(qa(45), (Q::Medium, H::Moderate));
        assert_eq!(qa(54), (Q::Medium, H::Moderate));
        assert_eq!(qa(55), (Q::High, H::Enabled));
        assert_eq!(qa(144), (Q::High, H::Enabled));
    }

    #[test]
    fn hidden_overrides_fps() {
        for fps in [0, 29, 44, 54, 60, 240] {
            let s = AdaptiveSettings::resolve(
                &visible(fps).with_visibility(Visibility::observed(false, 0.0)),
            );
            assert_eq!(s.animation_quality, AnimationQuality::Low);
            assert_eq!(s.hardware_acceleration, HardwareAcceleration::Minimal);
        }
    }

    #[test]
    fn ratio_levels() {
        assert_eq!(VisibilityLevel::from_ratio(1.0), VisibilityLevel::Full);
        assert_eq!(VisibilityLevel::from_ratio(0.51), VisibilityLevel::Full);
        assert_eq!(VisibilityLevel::from_ratio(0.5), VisibilityLevel::Partial);
        assert_eq!(VisibilityLevel::from_ratio(0.11), VisibilityLevel::Partial);
        assert_eq!(VisibilityLevel::from_ratio(0.1), VisibilityLevel::None);
        assert_eq!(VisibilityLevel::from_ratio(0.0), VisibilityLevel::None);
    }

    #[test]
    fn visibility_level_ignores_quality_branch() {
        // hidden per the flag, but the ratio still drives the level
        let s = AdaptiveSettings::resolve(
            &visible(60).with_visibility(Visibility {
                is_visible: false,
                intersection_ratio: 0.8,
            }),
        );
        assert_eq!(s.animation_quality, AnimationQuality::Low);
        assert_eq!(s.visibility_level, VisibilityLevel::Full);
    }

    #[test]
    fn serializes_lowercase_tokens() {
        let v = serde_json::to_value(AdaptiveSettings::deterministic()).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "animationQuality": "high",
                "hardwareAcceleration": "enabled",
                "visibilityLevel": "full"
            })
        );
        assert_eq!(HardwareAcceleration::Moderate.to_string(), "moderate");
    }
}
