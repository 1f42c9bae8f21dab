/// Visible area of the scene in world units.
///
/// Owned by the rendering host and replaced wholesale on resize. The core only
/// reads it, once at the start of each tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewportMetrics {
    pub width: f32,
    pub height: f32,
}

impl ViewportMetrics {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// False until the host has reported a real size.
    pub fn is_measured(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.is_measured() {
            self.width / self.height
        } else {
            1.0
        }
    }

    pub fn half_width(&self) -> f32 {
        self.width * 0.5
    }

    pub fn half_height(&self) -> f32 {
        self.height * 0.5
    }

    /// Top edge (y) of the visible area.
    pub fn top(&self) -> f32 {
        self.half_height()
    }

    /// Bottom edge (y), where the floor plane sits.
    pub fn bottom(&self) -> f32 {
        -self.half_height()
    }
}
