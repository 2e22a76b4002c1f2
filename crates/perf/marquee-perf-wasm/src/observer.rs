//! Intersection observer wrapper handed back to JS.

use js_sys::Array;
use marquee_perf_core::ObserverOptions;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

type EntriesCallback = Closure<dyn FnMut(Array, IntersectionObserver)>;

/// Live observer; `disconnect()` releases it and may be called repeatedly.
#[wasm_bindgen]
pub struct VisibilityObserver {
    observer: Option<IntersectionObserver>,
    callback: Option<EntriesCallback>,
}

impl VisibilityObserver {
    /// Observe `target`, calling `on_change(is_intersecting, ratio)` for every entry.
    pub(crate) fn observe(
        target: &Element,
        options: &ObserverOptions,
        mut on_change: impl FnMut(bool, f64) + 'static,
    ) -> Result<Self, JsValue> {
        let callback: EntriesCallback = Closure::new(move |entries: Array, _: IntersectionObserver| {
            for entry in entries.iter() {
                let entry: IntersectionObserverEntry = entry.unchecked_into();
                on_change(entry.is_intersecting(), entry.intersection_ratio());
            }
        });

        let thresholds: Array = options
            .thresholds
            .iter()
            .map(|t| JsValue::from_f64(*t))
            .collect();
        let init = IntersectionObserverInit::new();
        init.set_root_margin(&options.root_margin);
        init.set_threshold(&thresholds);

        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
        observer.observe(target);

        Ok(Self {
            observer: Some(observer),
            callback: Some(callback),
        })
    }
}

#[wasm_bindgen]
impl VisibilityObserver {
    pub fn disconnect(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.disconnect();
        }
        self.callback = None;
    }

    #[wasm_bindgen(js_name = isConnected)]
    pub fn is_connected(&self) -> bool {
        self.observer.is_some()
    }
}

impl Drop for VisibilityObserver {
    fn drop(&mut self) {
        // the JS side would otherwise keep invoking a freed closure
        self.disconnect();
    }
}
