//! PerformanceController: owns the sampling loop, history, and visibility signals.
//!
//! Methods:
//! - start / stop (single live loop, idempotent stop)
//! - on_frame (token-checked frame callback; yields a report per closed window)
//! - optimal_settings, average_fps, is_stable (read surface)

use serde::{Deserialize, Serialize};

use crate::config::MonitorConfig;
use crate::error::PerfError;
use crate::history::PerformanceHistory;
use crate::ids::{FrameRequestId, LoopToken, TokenAllocator};
use crate::sample::PerformanceSample;
use crate::sampler::FrameSampler;
use crate::scheduler::FrameScheduler;
use crate::settings::AdaptiveSettings;
use crate::visibility::{ViewportProbe, Visibility};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LoopState {
    Idle,
    Running {
        token: LoopToken,
        pending: Option<FrameRequestId>,
    },
}

/// Emitted when a window closes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameReport {
    pub sample: PerformanceSample,
    pub settings: AdaptiveSettings,
    /// Settings differ from the previous window's (always true for the first).
    pub changed: bool,
}

#[derive(Debug)]
pub struct PerformanceController {
    cfg: MonitorConfig,
    tokens: TokenAllocator,
    state: LoopState,
    sampler: FrameSampler,
    history: PerformanceHistory,

    last_sample: Option<PerformanceSample>,
    last_settings: Option<AdaptiveSettings>,
    observed: Option<Visibility>,
}

impl PerformanceController {
    pub fn new(cfg: MonitorConfig) -> Result<Self, PerfError> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            tokens: TokenAllocator::new(),
            state: LoopState::Idle,
            sampler: FrameSampler::default(),
            history: PerformanceHistory::new(),
            last_sample: None,
            last_settings: None,
            observed: None,
        })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.cfg
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, LoopState::Running { .. })
    }

    /// Token of the live loop, if any.
    pub fn current_token(&self) -> Option<LoopToken> {
        match self.state {
            LoopState::Running { token, .. } => Some(token),
            LoopState::Idle => None,
        }
    }

    /// Begin sampling. A second start while running is rejected.
    pub fn start<S: FrameScheduler + ?Sized>(
        &mut self,
        now_ms: f64,
        scheduler: &mut S,
    ) -> Result<LoopToken, PerfError> {
        if self.is_running() {
            return Err(PerfError::AlreadyRunning);
        }
        let token = self.tokens.alloc();
        let pending = scheduler.request_frame(token)?;
        self.sampler.reset(now_ms);
        self.state = LoopState::Running {
            token,
            pending: Some(pending),
        };
        log::debug!(
            "marquee monitoring started (token {}, target {}fps)",
            token.0,
            self.cfg.target_fps
        );
        Ok(token)
    }

    /// Cancel the pending frame request. Safe to call at any time.
    pub fn stop<S: FrameScheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if let LoopState::Running { token, pending } = self.state {
            if let Some(id) = pending {
                scheduler.cancel_frame(id);
            }
            log::debug!("marquee monitoring stopped (token {})", token.0);
        }
        self.state = LoopState::Idle;
    }

    /// Frame callback. Stale tokens are dropped without rescheduling.
    pub fn on_frame<S, P>(
        &mut self,
        token: LoopToken,
        now_ms: f64,
        probe: &P,
        scheduler: &mut S,
    ) -> Result<Option<FrameReport>, PerfError>
    where
        S: FrameScheduler + ?Sized,
        P: ViewportProbe + ?Sized,
    {
        match self.state {
            LoopState::Running { token: live, .. } if live == token => {}
            _ => {
                log::trace!("dropping stale frame callback (token {})", token.0);
                return Ok(None);
            }
        }

        let window = self.sampler.on_frame(now_ms);

        match scheduler.request_frame(token) {
            Ok(id) => {
                self.state = LoopState::Running {
                    token,
                    pending: Some(id),
                };
            }
            Err(err) => {
                self.state = LoopState::Idle;
                return Err(err);
            }
        }

        let Some(window) = window else {
            return Ok(None);
        };

        self.history.push(window.fps);
        let sample = PerformanceSample {
            frames_per_second: window.fps,
            frame_time_ms: window.frame_time_ms,
            is_visible: true,
            intersection_ratio: 1.0,
            memory_used_bytes: None,
        }
        .with_visibility(probe.visibility())
        .with_memory(probe.memory_used_bytes());

        if self.cfg.mode.emits_diagnostics()
            && f64::from(sample.frames_per_second) < self.cfg.low_fps_threshold()
        {
            log::warn!(
                "marquee running at {}fps, below target {}fps ({:.1}ms/frame)",
                sample.frames_per_second,
                self.cfg.target_fps,
                sample.frame_time_ms
            );
        }

        let settings = AdaptiveSettings::resolve(&sample);
        let changed = self.last_settings != Some(settings);
        if changed {
            log::debug!(
                "marquee settings -> quality={} acceleration={} visibility={}",
                settings.animation_quality,
                settings.hardware_acceleration,
                settings.visibility_level
            );
        }
        self.last_settings = Some(settings);
        self.last_sample = Some(sample.clone());

        Ok(Some(FrameReport {
            sample,
            settings,
            changed,
        }))
    }

    /// Pure resolution; ignores history and previous settings.
    pub fn optimal_settings(&self, sample: &PerformanceSample) -> AdaptiveSettings {
        AdaptiveSettings::resolve(sample)
    }

    /// Record a visibility-tracker callback.
    pub fn record_observed_visibility(&mut self, visibility: Visibility) {
        self.observed = Some(visibility);
    }

    /// Latest value from the intersection observer.
    pub fn observed_visibility(&self) -> Option<Visibility> {
        self.observed
    }

    /// Geometric visibility carried by the last closed window.
    pub fn sampled_visibility(&self) -> Option<Visibility> {
        self.last_sample.as_ref().map(PerformanceSample::visibility)
    }

    pub fn last_sample(&self) -> Option<&PerformanceSample> {
        self.last_sample.as_ref()
    }

    pub fn last_settings(&self) -> Option<AdaptiveSettings> {
        self.last_settings
    }

    /// Remember settings applied outside the loop (e.g. pinned test-mode settings).
    pub fn note_applied(&mut self, settings: AdaptiveSettings) {
        self.last_settings = Some(settings);
    }

    pub fn history(&self) -> &PerformanceHistory {
        &self.history
    }

    pub fn average_fps(&self) -> f64 {
        self.history.average_fps()
    }

    pub fn is_stable(&self) -> bool {
        self.history.is_stable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::QueuedScheduler;

    struct FailingScheduler;

    impl FrameScheduler for FailingScheduler {
        fn request_frame(&mut self, _token: LoopToken) -> Result<FrameRequestId, PerfError> {
            Err(PerfError::scheduler("no window"))
        }

        fn cancel_frame(&mut self, _id: FrameRequestId) {}
    }

    fn controller() -> PerformanceController {
        PerformanceController::new(MonitorConfig::default()).unwrap()
    }

    #[test]
    fn rejects_invalid_config() {
        let cfg = MonitorConfig {
            target_fps: 0,
            ..MonitorConfig::default()
        };
        assert!(PerformanceController::new(cfg).is_err());
    }

    #[test]
    fn stop_before_start_and_twice() {
        let mut c = controller();
        let mut s = QueuedScheduler::new();
        c.stop(&mut s);
        c.stop(&mut s);
        assert!(!c.is_running());
    }

    #[test]
    fn double_start_is_rejected() {
        let mut c = controller();
        let mut s = QueuedScheduler::new();
        let token = c.start(0.0, &mut s).unwrap();
        assert_eq!(c.start(5.0, &mut s), Err(PerfError::AlreadyRunning));
        assert_eq!(c.current_token(), Some(token));
        assert_eq!(s.pending(), 1);
    }

    #[test]
    fn stop_cancels_pending_request() {
        let mut c = controller();
        let mut s = QueuedScheduler::new();
        c.start(0.0, &mut s).unwrap();
        c.stop(&mut s);
        assert_eq!(s.pending(), 0);
        assert_eq!(c.current_token(), None);
    }

    #[test]
    fn scheduler_failure_leaves_loop_idle() {
        let mut c = controller();
        assert!(matches!(
            c.start(0.0, &mut FailingScheduler),
            Err(PerfError::Scheduler { .. })
        ));
        assert!(!c.is_running());
    }

    #[test]
    fn observed_and_sampled_visibility_are_separate() {
        let mut c = controller();
        let mut s = QueuedScheduler::new();
        c.record_observed_visibility(Visibility::observed(true, 0.3));

        let token = c.start(0.0, &mut s).unwrap();
        let probe = Visibility::observed(true, 0.9);
        let mut report = None;
        for i in 1..=61 {
            s.take_due();
            if let Some(r) = c.on_frame(token, i as f64 * 1000.0 / 60.0, &probe, &mut s).unwrap() {
                report = Some(r);
            }
        }
        assert!(report.is_some());
        assert_eq!(c.observed_visibility(), Some(Visibility::observed(true, 0.3)));
        assert_eq!(c.sampled_visibility(), Some(Visibility::observed(true, 0.9)));
    }
}
