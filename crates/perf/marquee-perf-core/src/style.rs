//! Settings applier: translate `AdaptiveSettings` into inline style writes.
//!
//! `StylePlan` is the pure description; `apply_settings` runs it against a
//! `StyleHost`. Every level writes the full property set it owns, so applying
//! the same settings twice leaves the host unchanged and switching levels
//! never leaves stale hints behind.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::Serialize;

use crate::error::PerfError;
use crate::settings::{AdaptiveSettings, AnimationQuality, HardwareAcceleration};

pub const PROP_ANIMATION_QUALITY: &str = "--animation-quality";
pub const PROP_HARDWARE_ACCELERATION: &str = "--hardware-acceleration";
pub const PROP_VISIBILITY_LEVEL: &str = "--visibility-level";

/// Descendants that receive the quality writes.
pub const MARQUEE_SELECTOR: &str = "[class*=\"marquee\"]";

/// Class-name fragment matched by `MARQUEE_SELECTOR`.
pub const MARQUEE_CLASS_FRAGMENT: &str = "marquee";

/// Set `property` to `value`, or remove it when `value` is `None`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StyleWrite {
    pub property: &'static str,
    pub value: Option<&'static str>,
}

impl StyleWrite {
    const fn set(property: &'static str, value: &'static str) -> Self {
        Self {
            property,
            value: Some(value),
        }
    }

    const fn remove(property: &'static str) -> Self {
        Self {
            property,
            value: None,
        }
    }

    pub fn apply_to<S: StyleSurface + ?Sized>(&self, surface: &mut S) -> Result<(), PerfError> {
        match self.value {
            Some(value) => surface.set_property(self.property, value),
            None => surface.remove_property(self.property),
        }
    }
}

/// Ordered writes for the root element and for each marquee descendant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StylePlan {
    pub root: Vec<StyleWrite>,
    pub marquee: Vec<StyleWrite>,
}

impl StylePlan {
    pub fn for_settings(settings: &AdaptiveSettings) -> Self {
        let mut root = vec![
            StyleWrite::set(
                PROP_ANIMATION_QUALITY,
                settings.animation_quality.as_str(),
            ),
            StyleWrite::set(
                PROP_HARDWARE_ACCELERATION,
                settings.hardware_acceleration.as_str(),
            ),
            StyleWrite::set(PROP_VISIBILITY_LEVEL, settings.visibility_level.as_str()),
        ];
        root.extend(acceleration_writes(settings.hardware_acceleration));

        Self {
            root,
            marquee: quality_writes(settings.animation_quality).to_vec(),
        }
    }
}

fn acceleration_writes(level: HardwareAcceleration) -> [StyleWrite; 4] {
    match level {
        HardwareAcceleration::Enabled => [
            StyleWrite::set("transform", "translate3d(0, 0, 0)"),
            StyleWrite::set("backface-visibility", "hidden"),
            StyleWrite::set("perspective", "1000px"),
            StyleWrite::set("will-change", "transform, opacity"),
        ],
        HardwareAcceleration::Moderate => [
            StyleWrite::set("transform", "translate3d(0, 0, 0)"),
            StyleWrite::set("backface-visibility", "hidden"),
            StyleWrite::remove("perspective"),
            StyleWrite::set("will-change", "transform"),
        ],
        HardwareAcceleration::Minimal => [
            StyleWrite::set("transform", "translate(0, 0)"),
            StyleWrite::remove("backface-visibility"),
            StyleWrite::remove("perspective"),
            StyleWrite::set("will-change", "auto"),
        ],
        HardwareAcceleration::Disabled => [
            StyleWrite::remove("transform"),
            StyleWrite::remove("backface-visibility"),
            StyleWrite::remove("perspective"),
            StyleWrite::set("will-change", "auto"),
        ],
    }
}

fn quality_writes(quality: AnimationQuality) -> [StyleWrite; 3] {
    match quality {
        AnimationQuality::High => [
            StyleWrite::set("animation-timing-function", "linear"),
            StyleWrite::set("transform-style", "preserve-3d"),
            StyleWrite::remove("transform"),
        ],
        AnimationQuality::Medium => [
            StyleWrite::set("animation-timing-function", "linear"),
            StyleWrite::set("transform-style", "flat"),
            StyleWrite::remove("transform"),
        ],
        AnimationQuality::Low => [
            StyleWrite::set("animation-timing-function", "linear"),
            StyleWrite::set("transform-style", "flat"),
            StyleWrite::set("transform", "translate3d(0, 0, 0) scale(0.99)"),
        ],
        AnimationQuality::Minimal => [
            StyleWrite::set("animation-timing-function", "ease-in-out"),
            StyleWrite::set("transform-style", "flat"),
            StyleWrite::set("transform", "translate(0, 0) scale(0.98)"),
        ],
    }
}

/// Inline style declaration of one element.
pub trait StyleSurface {
    fn set_property(&mut self, name: &str, value: &str) -> Result<(), PerfError>;
    fn remove_property(&mut self, name: &str) -> Result<(), PerfError>;
}

/// The element the controller tunes, plus its marquee descendants.
pub trait StyleHost {
    type Surface: StyleSurface;

    fn root_style(&self) -> Self::Surface;

    /// Styles of every descendant matching `MARQUEE_SELECTOR`.
    fn marquee_styles(&self) -> Vec<Self::Surface>;
}

/// Apply the plan for `settings`. Missing descendants mean zero marquee writes.
pub fn apply_settings<H: StyleHost + ?Sized>(
    host: &H,
    settings: &AdaptiveSettings,
) -> Result<(), PerfError> {
    let plan = StylePlan::for_settings(settings);

    let mut root = host.root_style();
    for write in &plan.root {
        write.apply_to(&mut root)?;
    }

    for mut style in host.marquee_styles() {
        for write in &plan.marquee {
            write.apply_to(&mut style)?;
        }
    }

    log::debug!(
        "applied marquee settings quality={} acceleration={} visibility={}",
        settings.animation_quality,
        settings.hardware_acceleration,
        settings.visibility_level
    );
    Ok(())
}

/// In-memory inline style; clones share the same declaration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryStyle(Rc<RefCell<BTreeMap<String, String>>>);

impl MemoryStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.0.borrow().get(name).cloned()
    }

    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.0.borrow().clone()
    }
}

impl StyleSurface for MemoryStyle {
    fn set_property(&mut self, name: &str, value: &str) -> Result<(), PerfError> {
        self.0.borrow_mut().insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn remove_property(&mut self, name: &str) -> Result<(), PerfError> {
        self.0.borrow_mut().remove(name);
        Ok(())
    }
}

/// Minimal element tree for headless hosts and tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryElement {
    pub class_name: String,
    pub style: MemoryStyle,
    pub children: Vec<MemoryElement>,
}

impl MemoryElement {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            ..Self::default()
        }
    }

    pub fn with_child(mut self, child: MemoryElement) -> Self {
        self.children.push(child);
        self
    }

    fn collect_marquees(&self, out: &mut Vec<MemoryStyle>) {
        for child in &self.children {
            if child.class_name.contains(MARQUEE_CLASS_FRAGMENT) {
                out.push(child.style.clone());
            }
            child.collect_marquees(out);
        }
    }
}

impl StyleHost for MemoryElement {
    type Surface = MemoryStyle;

    fn root_style(&self) -> MemoryStyle {
        self.style.clone()
    }

    fn marquee_styles(&self) -> Vec<MemoryStyle> {
        let mut out = Vec::new();
        self.collect_marquees(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::VisibilityLevel;

    fn settings(
        q: AnimationQuality,
        h: HardwareAcceleration,
        v: VisibilityLevel,
    ) -> AdaptiveSettings {
        AdaptiveSettings {
            animation_quality: q,
            hardware_acceleration: h,
            visibility_level: v,
        }
    }

    #[test]
    fn custom_properties_mirror_enums() {
        let plan = StylePlan::for_settings(&settings(
            AnimationQuality::Medium,
            HardwareAcceleration::Moderate,
            VisibilityLevel::Partial,
        ));
        assert_eq!(plan.root[0], StyleWrite::set(PROP_ANIMATION_QUALITY, "medium"));
        assert_eq!(
            plan.root[1],
            StyleWrite::set(PROP_HARDWARE_ACCELERATION, "moderate")
        );
        assert_eq!(plan.root[2], StyleWrite::set(PROP_VISIBILITY_LEVEL, "partial"));
    }

    #[test]
    fn disabled_removes_transform_hints() {
        let root = MemoryElement::new("diagonal-marquee-container");
        apply_settings(&root, &AdaptiveSettings::deterministic()).unwrap();
        assert_eq!(root.style.get("perspective").as_deref(), Some("1000px"));

        apply_settings(
            &root,
            &settings(
                AnimationQuality::Minimal,
                HardwareAcceleration::Disabled,
                VisibilityLevel::None,
            ),
        )
        .unwrap();
        assert_eq!(root.style.get("transform"), None);
        assert_eq!(root.style.get("backface-visibility"), None);
        assert_eq!(root.style.get("perspective"), None);
        assert_eq!(root.style.get("will-change").as_deref(), Some("auto"));
    }

    #[test]
    fn only_marquee_descendants_are_touched() {
        let root = MemoryElement::new("section")
            .with_child(MemoryElement::new("marquee-row"))
            .with_child(MemoryElement::new("caption"))
            .with_child(
                MemoryElement::new("wrapper").with_child(MemoryElement::new("row diagonal-marquee")),
            );
        assert_eq!(root.marquee_styles().len(), 2);

        apply_settings(
            &root,
            &settings(
                AnimationQuality::Low,
                HardwareAcceleration::Minimal,
                VisibilityLevel::Full,
            ),
        )
        .unwrap();
        let row = &root.children[0].style;
        assert_eq!(
            row.get("transform").as_deref(),
            Some("translate3d(0, 0, 0) scale(0.99)")
        );
        assert_eq!(row.get("animation-timing-function").as_deref(), Some("linear"));
        assert!(root.children[1].style.snapshot().is_empty());
    }

    #[test]
    fn no_descendants_is_fine() {
        let root = MemoryElement::new("empty");
        apply_settings(&root, &AdaptiveSettings::deterministic()).unwrap();
        assert_eq!(root.style.get("--animation-quality").as_deref(), Some("high"));
    }
}
