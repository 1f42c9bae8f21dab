use log::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::core::{SimRng, Vec3, ViewportMetrics};
use crate::domain::{FieldConfig, FieldStyle};

use super::color::hsl_to_rgb;
use super::sampling::{effective_center_radius, sample_xz, scale_factor};

/// Velocities are authored per 60Hz frame.
pub const FRAMES_PER_SECOND: f32 = 60.0;

/// Below this many particles the rayon split costs more than it saves.
#[cfg(feature = "parallel")]
const PARALLEL_MIN_PARTICLES: usize = 4096;

/// Logical extent of the field (world units), centered on the origin.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FieldBounds {
    pub width: f32,
    pub height: f32,
}

impl FieldBounds {
    pub fn from_viewport(viewport: ViewportMetrics, config: &FieldConfig) -> Self {
        Self {
            width: viewport.width * config.width_scale,
            height: viewport.height * config.height_scale,
        }
    }

    pub fn half_height(&self) -> f32 {
        self.height * 0.5
    }
}

/// Read-only view of one particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub color: [f32; 3],
    pub size: f32,
}

pub struct ParticleField {
    config: FieldConfig,
    bounds: FieldBounds,
    scale: f32,
    center_radius: f32,
    count: usize,
    positions: Vec<f32>,
    velocities: Vec<f32>,
    colors: Vec<f32>,
    sizes: Vec<f32>,
    /// Created before the viewport was measured; laid out on first real size
    needs_layout: bool,
    alive: bool,
}

impl ParticleField {
    /// Allocate and lay out `config.count` particles for the given viewport.
    pub fn create(config: FieldConfig, viewport: ViewportMetrics, rng: &mut SimRng) -> Self {
        let mut field = Self {
            count: config.count,
            config,
            bounds: FieldBounds::default(),
            scale: 1.0,
            center_radius: 0.0,
            positions: Vec::new(),
            velocities: Vec::new(),
            colors: Vec::new(),
            sizes: Vec::new(),
            needs_layout: true,
            alive: true,
        };
        field.allocate();
        field.resize(viewport, rng);
        field
    }

    /// Rebuild the whole buffer for a new configuration (count, style, ...).
    pub fn regenerate(&mut self, config: FieldConfig, viewport: ViewportMetrics, rng: &mut SimRng) {
        self.count = config.count;
        self.config = config;
        self.alive = true;
        self.needs_layout = true;
        self.allocate();
        self.resize(viewport, rng);
    }

    /// Start over from a clean state, same configuration and bounds.
    pub fn reset(&mut self, rng: &mut SimRng) {
        if !self.alive || self.needs_layout {
            return;
        }
        self.layout(rng);
    }

    /// Adopt new viewport bounds.
    ///
    /// Existing particles keep their velocity and size; only particles drawn
    /// from now on (recycled or regenerated) use the new scale factor.
    pub fn resize(&mut self, viewport: ViewportMetrics, rng: &mut SimRng) {
        if !self.alive || !viewport.is_measured() {
            return;
        }
        self.bounds = FieldBounds::from_viewport(viewport, &self.config);
        self.scale = scale_factor(&self.config, viewport);
        self.center_radius = match self.config.style {
            FieldStyle::Sand => effective_center_radius(self.config.center_radius, self.bounds.width),
            FieldStyle::Rain => 0.0,
        };
        if self.needs_layout {
            self.layout(rng);
            self.needs_layout = false;
        }
    }

    /// Release the buffers. Later ticks are no-ops until `regenerate`.
    pub fn teardown(&mut self) {
        self.alive = false;
        self.positions = Vec::new();
        self.velocities = Vec::new();
        self.colors = Vec::new();
        self.sizes = Vec::new();
    }

    /// Integrate one frame of `dt` seconds; returns how many particles were recycled.
    pub fn tick(&mut self, dt: f32, rng: &mut SimRng) -> u32 {
        if !self.alive || self.needs_layout || self.count == 0 {
            return 0;
        }
        let frames = dt * FRAMES_PER_SECOND;

        integrate(&mut self.positions, &self.velocities, frames);

        if self.config.style == FieldStyle::Sand && self.config.jitter > 0.0 && frames > 0.0 {
            let span = self.config.jitter * self.scale * frames;
            for p in self.positions.chunks_exact_mut(3) {
                p[0] += rng.spread(span);
                p[2] += rng.spread(span);
            }
        }

        let half_h = self.bounds.half_height();
        let mut recycled = 0u32;
        for i in 0..self.count {
            let y = self.positions[i * 3 + 1];
            // Also catches NaN and particles left above a shrunken field.
            if !(y >= -half_h && y <= half_h) {
                self.recycle(i, rng);
                recycled += 1;
            }
        }
        recycled
    }

    pub fn len(&self) -> usize {
        if self.alive {
            self.count
        } else {
            0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn is_laid_out(&self) -> bool {
        self.alive && !self.needs_layout
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn bounds(&self) -> FieldBounds {
        self.bounds
    }

    pub fn scale_factor(&self) -> f32 {
        self.scale
    }

    pub fn center_radius(&self) -> f32 {
        self.center_radius
    }

    pub fn particle(&self, i: usize) -> Option<Particle> {
        if i >= self.len() {
            return None;
        }
        let v3 = |buf: &[f32]| Vec3::new(buf[i * 3], buf[i * 3 + 1], buf[i * 3 + 2]);
        Some(Particle {
            position: v3(&self.positions),
            velocity: v3(&self.velocities),
            color: [self.colors[i * 3], self.colors[i * 3 + 1], self.colors[i * 3 + 2]],
            size: self.sizes[i],
        })
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    /// Get pointer to positions array (for JS rendering)
    pub fn positions_ptr(&self) -> *const f32 {
        self.positions.as_ptr()
    }

    pub fn colors_ptr(&self) -> *const f32 {
        self.colors.as_ptr()
    }

    pub fn sizes_ptr(&self) -> *const f32 {
        self.sizes.as_ptr()
    }

    fn allocate(&mut self) {
        self.positions = vec![0.0; self.count * 3];
        self.velocities = vec![0.0; self.count * 3];
        self.colors = vec![1.0; self.count * 3];
        self.sizes = vec![0.0; self.count];
    }

    /// Fresh positions, velocities, colors and sizes for every particle.
    fn layout(&mut self, rng: &mut SimRng) {
        let half_h = self.bounds.half_height();
        for i in 0..self.count {
            let (x, z) = self.draw_xz(rng);
            let y = rng.between(-half_h, half_h);
            self.set_position(i, x, y, z);
            self.draw_velocity(i, rng);

            let color = self.draw_color(rng);
            self.colors[i * 3..i * 3 + 3].copy_from_slice(&color);
            self.sizes[i] = rng.between(self.config.size_min, self.config.size_max) * self.scale;
        }
        debug!(
            "particle field laid out: {} particles, {:.2}x{:.2}, scale {:.3}",
            self.count, self.bounds.width, self.bounds.height, self.scale
        );
    }

    /// In-place reinitialization at the top edge. Color and size are kept.
    fn recycle(&mut self, i: usize, rng: &mut SimRng) {
        let (x, z) = self.draw_xz(rng);
        self.set_position(i, x, self.bounds.half_height(), z);
        self.draw_velocity(i, rng);
    }

    fn draw_xz(&self, rng: &mut SimRng) -> (f32, f32) {
        match self.config.style {
            FieldStyle::Sand => sample_xz(rng, self.bounds.width, self.center_radius),
            FieldStyle::Rain => (rng.spread(self.bounds.width), 0.0),
        }
    }

    fn draw_velocity(&mut self, i: usize, rng: &mut SimRng) {
        let fall = self.config.fall_speed * (1.0 + rng.spread(self.config.fall_speed_variance));
        let vx = rng.spread(self.config.drift);
        let vz = match self.config.style {
            FieldStyle::Sand => rng.spread(self.config.drift),
            FieldStyle::Rain => 0.0,
        };
        let v = &mut self.velocities[i * 3..i * 3 + 3];
        v[0] = vx * self.scale;
        v[1] = -fall * self.scale;
        v[2] = vz * self.scale;
    }

    fn draw_color(&self, rng: &mut SimRng) -> [f32; 3] {
        let hue = rng.unit();
        let saturation = rng.unit() * self.config.saturation_max;
        let lightness = rng.between(self.config.lightness_min, 1.0);
        hsl_to_rgb(hue, saturation, lightness)
    }

    #[inline]
    fn set_position(&mut self, i: usize, x: f32, y: f32, z: f32) {
        let p = &mut self.positions[i * 3..i * 3 + 3];
        p[0] = x;
        p[1] = y;
        p[2] = z;
    }
}

/// `position += velocity * frames`
fn integrate(positions: &mut [f32], velocities: &[f32], frames: f32) {
    #[cfg(feature = "parallel")]
    {
        if positions.len() / 3 >= PARALLEL_MIN_PARTICLES {
            positions
                .par_chunks_mut(3)
                .zip(velocities.par_chunks(3))
                .for_each(|(p, v)| {
                    p[0] += v[0] * frames;
                    p[1] += v[1] * frames;
                    p[2] += v[2] * frames;
                });
            return;
        }
    }
    for (p, v) in positions.chunks_exact_mut(3).zip(velocities.chunks_exact(3)) {
        p[0] += v[0] * frames;
        p[1] += v[1] * frames;
        p[2] += v[2] * frames;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn landscape() -> ViewportMetrics {
        ViewportMetrics::new(16.0, 9.0)
    }

    fn sand(count: usize) -> FieldConfig {
        FieldConfig { count, ..FieldConfig::default() }
    }

    fn assert_within_height(field: &ParticleField) {
        let half_h = field.bounds().half_height();
        for i in 0..field.len() {
            let y = field.particle(i).unwrap().position.y;
            assert!(y >= -half_h && y <= half_h, "particle {} at y={} outside ±{}", i, y, half_h);
        }
    }

    #[test]
    fn create_lays_out_requested_count() {
        let mut rng = SimRng::seeded(1);
        let field = ParticleField::create(sand(500), landscape(), &mut rng);
        assert_eq!(field.len(), 500);
        assert_eq!(field.positions().len(), 1500);
        assert_eq!(field.colors().len(), 1500);
        assert_eq!(field.sizes().len(), 500);
        assert_within_height(&field);
    }

    #[test]
    fn particles_stay_in_bounds_across_ticks() {
        let mut rng = SimRng::seeded(2);
        let mut field = ParticleField::create(sand(300), landscape(), &mut rng);
        let mut recycled = 0;
        for frame in 0..600 {
            // Mix of frame times, including a long stall.
            let dt = if frame % 97 == 0 { 0.5 } else { 1.0 / 60.0 };
            recycled += field.tick(dt, &mut rng);
            assert_within_height(&field);
            assert_eq!(field.len(), 300);
        }
        assert!(recycled > 0);
    }

    #[test]
    fn generated_and_recycled_particles_avoid_center() {
        let mut rng = SimRng::seeded(3);
        let mut config = sand(400);
        config.center_radius = 2.0;
        config.jitter = 0.0;
        config.drift = 0.0;
        let mut field = ParticleField::create(config, landscape(), &mut rng);
        let r = field.center_radius();
        assert_eq!(r, 2.0);

        let check = |field: &ParticleField| {
            for i in 0..field.len() {
                let p = field.particle(i).unwrap().position;
                assert!((p.x * p.x + p.z * p.z).sqrt() >= r - 1e-4);
            }
        };
        check(&field);
        for _ in 0..400 {
            field.tick(1.0 / 30.0, &mut rng);
        }
        check(&field);
    }

    #[test]
    fn radius_beyond_half_width_does_not_hang() {
        let mut rng = SimRng::seeded(4);
        let mut config = sand(100);
        config.center_radius = 50.0;
        let field = ParticleField::create(config, landscape(), &mut rng);
        assert_eq!(field.center_radius(), 8.0 * 0.5);
        assert_eq!(field.len(), 100);
    }

    #[test]
    fn integration_is_frame_rate_independent() {
        let mut config = sand(1);
        config.jitter = 0.0;
        config.fall_speed = 0.01;
        let vp = ViewportMetrics::new(16.0, 1000.0);

        let mut rng = SimRng::seeded(5);
        let mut a = ParticleField::create(config.clone(), vp, &mut rng);
        let mut rng = SimRng::seeded(5);
        let mut b = ParticleField::create(config, vp, &mut rng);

        let start = a.particle(0).unwrap().position.y;
        for _ in 0..60 {
            a.tick(1.0 / 60.0, &mut rng);
        }
        for _ in 0..30 {
            b.tick(1.0 / 30.0, &mut rng);
        }
        let ya = a.particle(0).unwrap().position.y;
        let yb = b.particle(0).unwrap().position.y;
        assert!(ya < start);
        assert!((ya - yb).abs() < 1e-3);
    }

    #[test]
    fn reset_keeps_population() {
        let mut rng = SimRng::seeded(6);
        let mut field = ParticleField::create(sand(250), landscape(), &mut rng);
        let before = field.positions().to_vec();
        field.reset(&mut rng);
        assert_eq!(field.len(), 250);
        assert_ne!(field.positions(), &before[..]);
        assert_within_height(&field);
    }

    #[test]
    fn zero_count_is_a_no_op() {
        let mut rng = SimRng::seeded(7);
        let mut field = ParticleField::create(sand(0), landscape(), &mut rng);
        assert!(field.is_empty());
        assert_eq!(field.tick(1.0 / 60.0, &mut rng), 0);
        field.reset(&mut rng);
        assert!(field.particle(0).is_none());
    }

    #[test]
    fn tick_after_teardown_is_a_no_op() {
        let mut rng = SimRng::seeded(8);
        let mut field = ParticleField::create(sand(50), landscape(), &mut rng);
        field.teardown();
        assert_eq!(field.tick(1.0 / 60.0, &mut rng), 0);
        field.reset(&mut rng);
        assert_eq!(field.len(), 0);
        assert!(field.positions().is_empty());
    }

    #[test]
    fn unmeasured_viewport_defers_layout() {
        let mut rng = SimRng::seeded(9);
        let mut field = ParticleField::create(sand(20), ViewportMetrics::default(), &mut rng);
        assert_eq!(field.len(), 20);
        assert!(!field.is_laid_out());
        assert_eq!(field.tick(1.0 / 60.0, &mut rng), 0);

        field.resize(landscape(), &mut rng);
        assert!(field.is_laid_out());
        assert_within_height(&field);
    }

    #[test]
    fn portrait_resize_lowers_scale_without_touching_existing_particles() {
        let mut rng = SimRng::seeded(10);
        let mut field = ParticleField::create(sand(100), landscape(), &mut rng);
        let landscape_scale = field.scale_factor();
        let sizes_before = field.sizes().to_vec();
        let v_before = field.particle(0).unwrap().velocity;

        field.resize(ViewportMetrics::new(9.0, 16.0), &mut rng);
        assert!(field.scale_factor() < landscape_scale);
        assert_eq!(field.sizes(), &sizes_before[..]);
        assert_eq!(field.particle(0).unwrap().velocity, v_before);
    }

    #[test]
    fn rain_style_is_flat_and_white() {
        let mut rng = SimRng::seeded(11);
        let mut field = ParticleField::create(FieldConfig::rain(64), landscape(), &mut rng);
        for _ in 0..200 {
            field.tick(1.0 / 60.0, &mut rng);
        }
        for i in 0..field.len() {
            let p = field.particle(i).unwrap();
            assert_eq!(p.position.z, 0.0);
            assert_eq!(p.color, [1.0, 1.0, 1.0]);
        }
        assert_within_height(&field);
    }
}
