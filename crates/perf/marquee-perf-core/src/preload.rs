//! Image preload cache, owned by whoever drives the preloading.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreloadState {
    Pending,
    Loaded,
    Failed,
}

impl PreloadState {
    pub fn as_str(self) -> &'static str {
        match self {
            PreloadState::Pending => "pending",
            PreloadState::Loaded => "loaded",
            PreloadState::Failed => "failed",
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct ImagePreloadCache {
    entries: HashMap<String, PreloadState>,
}

impl ImagePreloadCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `src`; returns false when it is already known (any state).
    pub fn request(&mut self, src: &str) -> bool {
        if self.entries.contains_key(src) {
            return false;
        }
        self.entries.insert(src.to_string(), PreloadState::Pending);
        true
    }

    pub fn mark_loaded(&mut self, src: &str) {
        self.entries.insert(src.to_string(), PreloadState::Loaded);
    }

    pub fn mark_failed(&mut self, src: &str) {
        log::warn!("image preload failed: {src}");
        self.entries.insert(src.to_string(), PreloadState::Failed);
    }

    pub fn state(&self, src: &str) -> Option<PreloadState> {
        self.entries.get(src).copied()
    }

    pub fn is_loaded(&self, src: &str) -> bool {
        self.state(src) == Some(PreloadState::Loaded)
    }

    /// Sources still waiting for a load/error event, sorted.
    pub fn pending(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self
            .entries
            .iter()
            .filter(|(_, state)| **state == PreloadState::Pending)
            .map(|(src, _)| src.as_str())
            .collect();
        out.sort_unstable();
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_once() {
        let mut cache = ImagePreloadCache::new();
        assert!(cache.request("/img/a.webp"));
        assert!(!cache.request("/img/a.webp"));
        assert_eq!(cache.state("/img/a.webp"), Some(PreloadState::Pending));
        assert_eq!(cache.state("/img/b.webp"), None);
    }

    #[test]
    fn lifecycle() {
        let mut cache = ImagePreloadCache::new();
        cache.request("b");
        cache.request("a");
        cache.request("c");
        cache.mark_loaded("a");
        cache.mark_failed("c");
        assert_eq!(cache.pending(), vec!["b"]);
        assert!(cache.is_loaded("a"));
        assert!(!cache.request("c"));
        assert_eq!(cache.len(), 3);

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.request("a"));
    }

    #[test]
    fn separate_caches_do_not_share_state() {
        let mut first = ImagePreloadCache::new();
        let second = ImagePreloadCache::new();
        first.request("x");
        assert_eq!(second.state("x"), None);
    }
}
