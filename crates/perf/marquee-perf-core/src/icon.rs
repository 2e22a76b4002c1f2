//! Icon representations for content cards, resolved by exhaustive match.

use std::fmt;
use std::rc::Rc;

use crate::preload::{ImagePreloadCache, PreloadState};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageRef {
    pub src: String,
    pub alt: String,
    /// Glyph shown when the image cannot be loaded.
    pub fallback: Option<String>,
}

/// Render callback producing markup for a custom icon.
#[derive(Clone)]
pub struct IconRenderer(Rc<dyn Fn() -> String>);

impl IconRenderer {
    pub fn new(render: impl Fn() -> String + 'static) -> Self {
        Self(Rc::new(render))
    }

    pub fn render(&self) -> String {
        (self.0)()
    }
}

impl fmt::Debug for IconRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IconRenderer(..)")
    }
}

#[derive(Clone, Debug)]
pub enum Icon {
    TextGlyph(String),
    ImageRef(ImageRef),
    CustomRenderer(IconRenderer),
}

/// What the host actually draws.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolvedIcon {
    Text(String),
    Image { src: String, alt: String },
    Markup(String),
}

impl Icon {
    pub fn glyph(text: impl Into<String>) -> Self {
        Icon::TextGlyph(text.into())
    }

    pub fn image(src: impl Into<String>, alt: impl Into<String>, fallback: Option<&str>) -> Self {
        Icon::ImageRef(ImageRef {
            src: src.into(),
            alt: alt.into(),
            fallback: fallback.map(str::to_string),
        })
    }

    /// Image sources this icon needs preloaded.
    pub fn image_src(&self) -> Option<&str> {
        match self {
            Icon::ImageRef(image) => Some(&image.src),
            Icon::TextGlyph(_) | Icon::CustomRenderer(_) => None,
        }
    }

    /// A failed preload falls back to the glyph, then to the alt text.
    pub fn resolve(&self, cache: &ImagePreloadCache) -> ResolvedIcon {
        match self {
            Icon::TextGlyph(text) => ResolvedIcon::Text(text.clone()),
            Icon::ImageRef(image) => match cache.state(&image.src) {
                Some(PreloadState::Failed) => ResolvedIcon::Text(
                    image.fallback.clone().unwrap_or_else(|| image.alt.clone()),
                ),
                _ => ResolvedIcon::Image {
                    src: image.src.clone(),
                    alt: image.alt.clone(),
                },
            },
            Icon::CustomRenderer(renderer) => ResolvedIcon::Markup(renderer.render()),
        }
    }
}
