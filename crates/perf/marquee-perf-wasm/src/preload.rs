//! Browser image preloading over an owned `ImagePreloadCache`.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Array;
use marquee_perf_core::ImagePreloadCache;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlImageElement;

use crate::host::js_reason;

/// One preloader per page section; no state is shared between instances.
#[wasm_bindgen]
#[derive(Default)]
pub struct ImagePreloader {
    cache: Rc<RefCell<ImagePreloadCache>>,
}

#[wasm_bindgen]
impl ImagePreloader {
    #[wasm_bindgen(constructor)]
    pub fn new() -> ImagePreloader {
        Self::default()
    }

    /// Start loading `src`. Returns false when it was already requested.
    pub fn preload(&self, src: String) -> Result<bool, JsError> {
        if !self.cache.borrow_mut().request(&src) {
            return Ok(false);
        }
        let img = HtmlImageElement::new()
            .map_err(|e| JsError::new(&format!("preload error: {}", js_reason(&e))))?;

        let on_load = {
            let cache = Rc::downgrade(&self.cache);
            let src = src.clone();
            Closure::once_into_js(move || {
                if let Some(cache) = cache.upgrade() {
                    cache.borrow_mut().mark_loaded(&src);
                }
            })
        };
        let on_error = {
            let cache = Rc::downgrade(&self.cache);
            let src = src.clone();
            Closure::once_into_js(move || {
                if let Some(cache) = cache.upgrade() {
                    cache.borrow_mut().mark_failed(&src);
                }
            })
        };
        img.set_onload(Some(on_load.unchecked_ref()));
        img.set_onerror(Some(on_error.unchecked_ref()));
        img.set_src(&src);
        Ok(true)
    }

    /// "pending" | "loaded" | "failed", or undefined for unknown sources.
    pub fn state(&self, src: &str) -> Option<String> {
        self.cache
            .borrow()
            .state(src)
            .map(|s| s.as_str().to_string())
    }

    #[wasm_bindgen(js_name = isLoaded)]
    pub fn is_loaded(&self, src: &str) -> bool {
        self.cache.borrow().is_loaded(src)
    }

    pub fn pending(&self) -> Array {
        self.cache
            .borrow()
            .pending()
            .into_iter()
            .map(JsValue::from_str)
            .collect()
    }

    pub fn clear(&self) {
        self.cache.borrow_mut().clear();
    }
}
