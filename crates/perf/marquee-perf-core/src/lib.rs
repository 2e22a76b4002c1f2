//! Marquee Performance Core (engine-agnostic)
//!
//! Closed-loop controller that samples frame rate once per settling window,
//! maps each sample to adaptive animation settings, and writes those settings
//! as inline styles on a marquee container. Browser facilities (frame
//! callbacks, element styles, viewport geometry) are reached through the
//! `FrameScheduler`, `StyleHost` and `ViewportProbe` traits.

pub mod config;
pub mod controller;
pub mod error;
pub mod history;
pub mod icon;
pub mod ids;
pub mod preload;
pub mod sample;
pub mod sampler;
pub mod scheduler;
pub mod settings;
pub mod style;
pub mod visibility;

// Re-exports for consumers (adapters)
pub use config::{ExecutionMode, MonitorConfig};
pub use controller::{FrameReport, PerformanceController};
pub use error::PerfError;
pub use history::PerformanceHistory;
pub use icon::{Icon, IconRenderer, ImageRef, ResolvedIcon};
pub use ids::{FrameRequestId, LoopToken};
pub use preload::{ImagePreloadCache, PreloadState};
pub use sample::PerformanceSample;
pub use sampler::{FrameSampler, FrameWindow};
pub use scheduler::{FrameScheduler, QueuedScheduler};
pub use settings::{AdaptiveSettings, AnimationQuality, HardwareAcceleration, VisibilityLevel};
pub use style::{
    apply_settings, MemoryElement, MemoryStyle, StyleHost, StylePlan, StyleSurface, StyleWrite,
};
pub use visibility::{ObserverOptions, Rect, ViewportProbe, Visibility};
