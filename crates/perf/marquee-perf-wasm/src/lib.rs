//! marquee-perf-wasm: browser adapter for the marquee performance controller.
//!
//! JS usage:
//!   const perf = new MarqueePerformance(el, { targetFPS: 60, mode: "development",
//!                                              onPerformanceChange: s => ... });
//!   const obs = perf.createIntersectionObserver((visible, ratio) => ...);
//!   perf.startMonitoring(sample => ...);
//!   ...
//!   perf.stopMonitoring(); obs.disconnect();

mod host;
mod logging;
mod observer;
mod preload;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use js_sys::{Function, Reflect};
use serde::{Deserialize, Serialize};
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

use marquee_perf_core::{
    apply_settings, AdaptiveSettings, ExecutionMode, LoopToken, MonitorConfig, ObserverOptions,
    PerfError, PerformanceController, PerformanceSample, Visibility,
};

use crate::host::{DomHost, DomProbe, RafScheduler};
pub use crate::observer::VisibilityObserver;
pub use crate::preload::ImagePreloader;

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn perf_error(context: &str, err: PerfError) -> JsError {
    JsError::new(&format!("{context}: {err}"))
}

/// Mode baked in at build time (`MARQUEE_PERF_MODE`), production otherwise.
fn build_mode() -> ExecutionMode {
    option_env!("MARQUEE_PERF_MODE")
        .and_then(|m| m.parse().ok())
        .unwrap_or_default()
}

/// Whole, finite, positive frame rates only; no silent truncation.
fn target_fps_from_f64(v: f64) -> Result<u32, String> {
    if !v.is_finite() || v.fract() != 0.0 || v < 1.0 || v > f64::from(u32::MAX) {
        return Err(format!("targetFPS must be a positive integer, got {v}"));
    }
    Ok(v as u32)
}

/// Config object accepted by the constructor; every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsConfig {
    #[serde(default)]
    target_fps: Option<u32>,
    #[serde(default)]
    mode: Option<ExecutionMode>,
}

impl JsConfig {
    fn into_monitor_config(self) -> MonitorConfig {
        let defaults = MonitorConfig::default().with_mode(build_mode());
        MonitorConfig {
            target_fps: self.target_fps.unwrap_or(defaults.target_fps),
            mode: self.mode.unwrap_or(defaults.mode),
        }
    }
}

struct Shared {
    controller: PerformanceController,
    scheduler: RafScheduler,
    host: DomHost,
    probe: DomProbe,
    on_sample: Option<Function>,
    on_change: Option<Function>,
}

fn call_with<T: Serialize>(f: &Function, value: &T) {
    match swb::to_value(value) {
        Ok(arg) => {
            if let Err(e) = f.call1(&JsValue::UNDEFINED, &arg) {
                log::warn!("marquee callback threw: {}", host::js_reason(&e));
            }
        }
        Err(e) => log::warn!("marquee callback argument error: {e}"),
    }
}

/// rAF entry point. JS callbacks run after the borrow is released so they may
/// call back into `stopMonitoring`.
fn frame_tick(shared: &Weak<RefCell<Shared>>, token: LoopToken, now: f64) {
    let Some(shared) = shared.upgrade() else {
        return;
    };
    let outcome = {
        let Ok(mut guard) = shared.try_borrow_mut() else {
            return;
        };
        let Shared {
            controller,
            scheduler,
            host,
            probe,
            on_sample,
            on_change,
        } = &mut *guard;
        match controller.on_frame(token, now, &*probe, scheduler) {
            Ok(Some(report)) => {
                // every window: repairs restyled hosts and rows mounted later
                if let Err(e) = apply_settings(&*host, &report.settings) {
                    log::warn!("failed to apply marquee settings: {e}");
                }
                Some((report, on_sample.clone(), on_change.clone()))
            }
            Ok(None) => None,
            Err(e) => {
                log::warn!("marquee monitoring halted: {e}");
                None
            }
        }
    };

    if let Some((report, on_sample, on_change)) = outcome {
        if let Some(f) = on_sample {
            call_with(&f, &report.sample);
        }
        if let Some(f) = on_change {
            call_with(&f, &report.settings);
        }
    }
}

#[wasm_bindgen]
pub struct MarqueePerformance {
    shared: Rc<RefCell<Shared>>,
    element: HtmlElement,
}

#[wasm_bindgen]
impl MarqueePerformance {
    /// Bind to a marquee container. `config` may be undefined/null for defaults:
    ///   new MarqueePerformance(el, { targetFPS: 60, mode: "development", onPerformanceChange })
    #[wasm_bindgen(constructor)]
    pub fn new(element: HtmlElement, config: JsValue) -> Result<MarqueePerformance, JsError> {
        console_error_panic_hook::set_once();

        let (js_cfg, on_change) = if jsvalue_is_undefined_or_null(&config) {
            (JsConfig::default(), None)
        } else {
            let on_change = Reflect::get(&config, &JsValue::from_str("onPerformanceChange"))
                .ok()
                .and_then(|f| f.dyn_into::<Function>().ok());
            let mut cfg: JsConfig = swb::from_value(config.clone())
                .map_err(|e| JsError::new(&format!("config error: {e}")))?;
            if cfg.target_fps.is_none() {
                let raw = Reflect::get(&config, &JsValue::from_str("targetFPS"))
                    .unwrap_or(JsValue::UNDEFINED);
                if !jsvalue_is_undefined_or_null(&raw) {
                    let fps = raw
                        .as_f64()
                        .ok_or_else(|| "targetFPS must be a number".to_string())
                        .and_then(target_fps_from_f64)
                        .map_err(|e| JsError::new(&format!("config error: {e}")))?;
                    cfg.target_fps = Some(fps);
                }
            }
            (cfg, on_change)
        };
        let cfg = js_cfg.into_monitor_config();
        logging::init(cfg.mode);

        let window = web_sys::window().ok_or_else(|| JsError::new("no global window"))?;
        let controller =
            PerformanceController::new(cfg).map_err(|e| perf_error("config error", e))?;

        let shared = Rc::new_cyclic(|weak: &Weak<RefCell<Shared>>| {
            let weak = weak.clone();
            RefCell::new(Shared {
                controller,
                scheduler: RafScheduler::new(window.clone(), move |token, now| {
                    frame_tick(&weak, token, now)
                }),
                host: DomHost {
                    element: element.clone(),
                },
                probe: DomProbe {
                    window,
                    element: element.clone(),
                },
                on_sample: None,
                on_change,
            })
        });

        let this = MarqueePerformance { shared, element };
        if this.mode() == ExecutionMode::Test {
            this.apply(AdaptiveSettings::deterministic())
                .map_err(|e| perf_error("apply error", e))?;
        }
        Ok(this)
    }

    /// Start the per-frame sampler. `callback(sample)` runs once per window.
    /// Throws if a loop is already running; a no-op in test mode.
    #[wasm_bindgen(js_name = startMonitoring)]
    pub fn start_monitoring(&self, callback: Option<Function>) -> Result<(), JsError> {
        if self.mode() == ExecutionMode::Test {
            return Ok(());
        }
        let mut guard = self.shared.borrow_mut();
        let now = guard.probe.now();
        let Shared {
            controller,
            scheduler,
            on_sample,
            ..
        } = &mut *guard;
        controller
            .start(now, scheduler)
            .map_err(|e| perf_error("startMonitoring", e))?;
        *on_sample = callback;
        Ok(())
    }

    /// Cancel the sampler. Safe before start and when called repeatedly.
    #[wasm_bindgen(js_name = stopMonitoring)]
    pub fn stop_monitoring(&self) {
        let mut guard = self.shared.borrow_mut();
        let Shared {
            controller,
            scheduler,
            on_sample,
            ..
        } = &mut *guard;
        controller.stop(scheduler);
        *on_sample = None;
    }

    #[wasm_bindgen(js_name = isMonitoring)]
    pub fn is_monitoring(&self) -> bool {
        self.shared.borrow().controller.is_running()
    }

    /// Resolve settings for a sample object `{ fps | framesPerSecond, isVisible, intersectionRatio }`.
    #[wasm_bindgen(js_name = getOptimalSettings)]
    pub fn get_optimal_settings(&self, sample: JsValue) -> Result<JsValue, JsError> {
        let sample: PerformanceSample =
            swb::from_value(sample).map_err(|e| JsError::new(&format!("sample error: {e}")))?;
        let settings = self.shared.borrow().controller.optimal_settings(&sample);
        swb::to_value(&settings).map_err(|e| JsError::new(&format!("settings error: {e}")))
    }

    /// Write the settings onto the element and its marquee rows.
    #[wasm_bindgen(js_name = applyPerformanceSettings)]
    pub fn apply_performance_settings(&self, settings: JsValue) -> Result<(), JsError> {
        let settings: AdaptiveSettings = swb::from_value(settings)
            .map_err(|e| JsError::new(&format!("settings error: {e}")))?;
        self.apply(settings)
            .map_err(|e| perf_error("applyPerformanceSettings", e))
    }

    /// Observe viewport intersection of the element. `callback(isVisible, ratio)`
    /// fires at thresholds 0/0.1/0.25/0.5/0.75/1 with a 150px block margin.
    #[wasm_bindgen(js_name = createIntersectionObserver)]
    pub fn create_intersection_observer(
        &self,
        callback: Function,
    ) -> Result<VisibilityObserver, JsError> {
        let shared = Rc::downgrade(&self.shared);
        VisibilityObserver::observe(
            &self.element,
            &ObserverOptions::default(),
            move |is_visible, ratio| {
                if let Some(shared) = shared.upgrade() {
                    if let Ok(mut guard) = shared.try_borrow_mut() {
                        guard
                            .controller
                            .record_observed_visibility(Visibility::observed(is_visible, ratio));
                    }
                }
                if let Err(e) = callback.call2(
                    &JsValue::UNDEFINED,
                    &JsValue::from_bool(is_visible),
                    &JsValue::from_f64(ratio),
                ) {
                    log::warn!("visibility callback threw: {}", host::js_reason(&e));
                }
            },
        )
        .map_err(|e| JsError::new(&format!("IntersectionObserver error: {}", host::js_reason(&e))))
    }

    #[wasm_bindgen(js_name = averageFps)]
    pub fn average_fps(&self) -> f64 {
        self.shared.borrow().controller.average_fps()
    }

    #[wasm_bindgen(js_name = isStable)]
    pub fn is_stable(&self) -> bool {
        self.shared.borrow().controller.is_stable()
    }

    /// Last fps values, oldest first.
    #[wasm_bindgen(js_name = fpsHistory)]
    pub fn fps_history(&self) -> Vec<u32> {
        self.shared.borrow().controller.history().to_vec()
    }

    /// Latest intersection-observer value, or undefined.
    #[wasm_bindgen(js_name = observedVisibility)]
    pub fn observed_visibility(&self) -> Result<JsValue, JsError> {
        let v = self.shared.borrow().controller.observed_visibility();
        swb::to_value(&v).map_err(|e| JsError::new(&format!("visibility error: {e}")))
    }

    /// Geometric visibility of the last closed window, or undefined.
    #[wasm_bindgen(js_name = sampledVisibility)]
    pub fn sampled_visibility(&self) -> Result<JsValue, JsError> {
        let v = self.shared.borrow().controller.sampled_visibility();
        swb::to_value(&v).map_err(|e| JsError::new(&format!("visibility error: {e}")))
    }
}

impl MarqueePerformance {
    fn mode(&self) -> ExecutionMode {
        self.shared.borrow().controller.config().mode
    }

    fn apply(&self, settings: AdaptiveSettings) -> Result<(), PerfError> {
        let mut guard = self.shared.borrow_mut();
        apply_settings(&guard.host, &settings)?;
        guard.controller.note_applied(settings);
        Ok(())
    }
}

impl Drop for MarqueePerformance {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.shared.try_borrow_mut() {
            let Shared {
                controller,
                scheduler,
                ..
            } = &mut *guard;
            controller.stop(scheduler);
        }
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
