use std::collections::HashMap;

use crate::core::Vec3;
use crate::domain::TileConfig;

/// Unscaled bounding box of a rendered label.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextBounds {
    pub width: f32,
    pub height: f32,
}

impl TextBounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height >= 0.0
    }
}

/// Label layout inside its tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextFit {
    /// Uniform label scale, never above 1
    pub scale: f32,
    /// Label origin relative to the tile center (centers the scaled label)
    pub text_offset: Vec3,
    /// Backing box size: scaled label plus padding
    pub box_size: Vec3,
}

/// Where label measurements come from.
///
/// Glyph geometry is built asynchronously by the renderer, so `measure` may
/// return `None` for a while; callers retry on the next tick.
pub trait TextMeasurer {
    fn measure(&mut self, label: &str) -> Option<TextBounds>;

    /// Hosts that measure asynchronously push results through here.
    fn report(&mut self, _label: &str, _bounds: TextBounds) {}

    /// No live tile shows `label` any more.
    fn forget(&mut self, _label: &str) {}
}

/// Bounds reported by the rendering host once glyphs exist.
#[derive(Default)]
pub struct HostTextMeasurer {
    bounds: HashMap<String, TextBounds>,
}

impl HostTextMeasurer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }
}

impl TextMeasurer for HostTextMeasurer {
    fn measure(&mut self, label: &str) -> Option<TextBounds> {
        self.bounds.get(label).copied()
    }

    fn report(&mut self, label: &str, bounds: TextBounds) {
        self.bounds.insert(label.to_string(), bounds);
    }

    fn forget(&mut self, label: &str) {
        self.bounds.remove(label);
    }
}

/// Fixed-advance estimate for hosts without a glyph pipeline.
pub struct MonospaceMeasurer {
    pub advance: f32,
    pub line_height: f32,
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        Self { advance: 0.6, line_height: 1.0 }
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn measure(&mut self, label: &str) -> Option<TextBounds> {
        let chars = label.chars().count();
        if chars == 0 {
            return None;
        }
        Some(TextBounds::new(chars as f32 * self.advance, self.line_height))
    }
}

/// Scale the label to the viewport width and size the backing box around it.
///
/// Pure: the same bounds and viewport width always give the same layout.
/// Returns `None` when either input is not usable yet.
pub fn fit_text(bounds: TextBounds, viewport_width: f32, config: &TileConfig) -> Option<TextFit> {
    if !bounds.is_usable() || !(viewport_width.is_finite() && viewport_width > 0.0) {
        return None;
    }
    let scale = (viewport_width / bounds.width).min(1.0);
    let width = bounds.width * scale;
    let height = bounds.height * scale;
    Some(TextFit {
        scale,
        text_offset: Vec3::new(-width * 0.5, -height * 0.5, config.text_depth_offset),
        box_size: Vec3::new(width + config.padding_x, height + config.padding_y, config.depth),
    })
}
