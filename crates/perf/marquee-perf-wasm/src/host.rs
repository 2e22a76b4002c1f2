//! DOM implementations of the core host traits.

use std::rc::Rc;

use js_sys::Reflect;
use marquee_perf_core::style::MARQUEE_SELECTOR;
use marquee_perf_core::{
    FrameRequestId, FrameScheduler, LoopToken, PerfError, Rect, StyleHost, StyleSurface,
    ViewportProbe, Visibility,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CssStyleDeclaration, HtmlElement, Window};

pub(crate) fn js_reason(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

pub(crate) struct DomStyle(CssStyleDeclaration);

impl StyleSurface for DomStyle {
    fn set_property(&mut self, name: &str, value: &str) -> Result<(), PerfError> {
        self.0
            .set_property(name, value)
            .map_err(|e| PerfError::style(name, js_reason(&e)))
    }

    fn remove_property(&mut self, name: &str) -> Result<(), PerfError> {
        self.0
            .remove_property(name)
            .map(|_| ())
            .map_err(|e| PerfError::style(name, js_reason(&e)))
    }
}

/// The marquee container element.
pub(crate) struct DomHost {
    pub(crate) element: HtmlElement,
}

impl StyleHost for DomHost {
    type Surface = DomStyle;

    fn root_style(&self) -> DomStyle {
        DomStyle(self.element.style())
    }

    fn marquee_styles(&self) -> Vec<DomStyle> {
        let list = match self.element.query_selector_all(MARQUEE_SELECTOR) {
            Ok(list) => list,
            Err(e) => {
                log::warn!("marquee query failed: {}", js_reason(&e));
                return Vec::new();
            }
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
            .map(|el| DomStyle(el.style()))
            .collect()
    }
}

/// Geometric visibility and heap usage read at window close.
pub(crate) struct DomProbe {
    pub(crate) window: Window,
    pub(crate) element: HtmlElement,
}

impl DomProbe {
    pub(crate) fn now(&self) -> f64 {
        self.window.performance().map(|p| p.now()).unwrap_or(0.0)
    }
}

impl ViewportProbe for DomProbe {
    fn visibility(&self) -> Visibility {
        let viewport_height = self
            .window
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .unwrap_or(0.0);
        let rect = self.element.get_bounding_client_rect();
        Visibility::from_rect(
            &Rect {
                top: rect.top(),
                bottom: rect.bottom(),
                height: rect.height(),
            },
            viewport_height,
        )
    }

    /// `performance.memory` is non-standard; absent outside Chromium.
    fn memory_used_bytes(&self) -> Option<u64> {
        let perf = self.window.performance()?;
        let memory = Reflect::get(&perf, &JsValue::from_str("memory")).ok()?;
        if !memory.is_object() {
            return None;
        }
        Reflect::get(&memory, &JsValue::from_str("usedJSHeapSize"))
            .ok()?
            .as_f64()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v as u64)
    }
}

/// `requestAnimationFrame`-backed scheduler. Each request gets its own
/// one-shot closure that carries the loop token.
pub(crate) struct RafScheduler {
    window: Window,
    tick: Rc<dyn Fn(LoopToken, f64)>,
    /// Closure backing the outstanding rAF request; dropped on cancel.
    pending: Option<(FrameRequestId, FrameCallback)>,
    /// Previous request's closure, which may still be on the stack.
    spent: Option<FrameCallback>,
}

type FrameCallback = Closure<dyn FnMut(f64)>;

impl RafScheduler {
    pub(crate) fn new(window: Window, tick: impl Fn(LoopToken, f64) + 'static) -> Self {
        Self {
            window,
            tick: Rc::new(tick),
            pending: None,
            spent: None,
        }
    }
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self, token: LoopToken) -> Result<FrameRequestId, PerfError> {
        let tick = Rc::clone(&self.tick);
        let callback: FrameCallback = Closure::once(move |now: f64| tick(token, now));
        let id = self
            .window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .map(FrameRequestId)
            .map_err(|e| PerfError::scheduler(js_reason(&e)))?;
        // requests are issued from inside the previous frame's callback
        self.spent = self.pending.replace((id, callback)).map(|(_, cb)| cb);
        Ok(id)
    }

    fn cancel_frame(&mut self, id: FrameRequestId) {
        if let Err(e) = self.window.cancel_animation_frame(id.0) {
            log::debug!("cancelAnimationFrame failed: {}", js_reason(&e));
        }
        if matches!(&self.pending, Some((pending, _)) if *pending == id) {
            self.pending = None;
        }
    }
}
