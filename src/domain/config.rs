//! Scene configuration
//!
//! Loaded from a JSON document shaped like:
//! `{ "seed": 7, "field": {...}, "spawner": {...}, "tiles": {...}, "physics": {...} }`
//! Every key is optional. Out-of-range values are clamped (with a warning),
//! only malformed JSON or unknown enum strings are rejected.

use log::warn;
use serde::{Deserialize, Deserializer, Serialize};

/// Hard cap on the particle buffer.
pub const MAX_PARTICLES: usize = 1_000_000;
/// Fastest spawn cadence accepted (one frame at 60Hz).
pub const MIN_SPAWN_INTERVAL_MS: f64 = 16.0;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SceneConfig {
    pub seed: u64,
    pub field: FieldConfig,
    pub spawner: SpawnerConfig,
    pub tiles: TileConfig,
    pub physics: PhysicsConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldStyle {
    /// Tinted grains with lateral jitter, kept out of a central column
    Sand,
    /// Plain white streaks on the z = 0 plane
    Rain,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldConfig {
    #[serde(deserialize_with = "deserialize_count")]
    pub count: usize,
    pub style: FieldStyle,
    pub center_radius: f32,
    /// Field extent relative to the viewport
    pub width_scale: f32,
    pub height_scale: f32,
    /// Viewport height at which the scale factor is exactly `scale_constant`
    pub base_reference_height: f32,
    pub scale_constant: f32,
    /// `p` in the `aspect^p` dampening applied to portrait viewports
    pub portrait_exponent: f32,
    /// Downward speed in world units per 60Hz frame
    pub fall_speed: f32,
    /// Relative spread around `fall_speed` (0.2 = ±10%)
    pub fall_speed_variance: f32,
    /// Max lateral speed span per 60Hz frame
    pub drift: f32,
    /// Per-frame lateral random walk span (sand only)
    pub jitter: f32,
    pub size_min: f32,
    pub size_max: f32,
    pub saturation_max: f32,
    pub lightness_min: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            count: 5000,
            style: FieldStyle::Sand,
            center_radius: 1.0,
            width_scale: 1.0,
            height_scale: 1.0,
            base_reference_height: 10.0,
            scale_constant: 1.0,
            portrait_exponent: 0.5,
            fall_speed: 0.05,
            fall_speed_variance: 0.2,
            drift: 0.004,
            jitter: 0.015,
            size_min: 0.07,
            size_max: 0.12,
            saturation_max: 0.05,
            lightness_min: 0.9,
        }
    }
}

impl FieldConfig {
    /// Digital rain preset: white, flat, uniform size, no exclusion column.
    pub fn rain(count: usize) -> Self {
        Self {
            count,
            style: FieldStyle::Rain,
            center_radius: 0.0,
            fall_speed_variance: 0.0,
            drift: 0.0,
            jitter: 0.0,
            size_min: 0.3,
            size_max: 0.3,
            saturation_max: 0.0,
            lightness_min: 1.0,
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpawnerConfig {
    pub interval_ms: f64,
    /// `None` keeps every tile until it times out
    pub max_tiles: Option<u32>,
    /// Distance above the top edge where tiles appear
    pub spawn_padding: f32,
    pub spawn_jitter_x: f32,
    /// Tiles placed on start, stacked downwards from the spawn line
    pub initial_tiles: u32,
    /// Treat window blur/focus like visibility loss/restore
    pub pause_on_blur: bool,
    pub reset_field_on_restore: bool,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000.0,
            max_tiles: None,
            spawn_padding: 1.0,
            spawn_jitter_x: 0.0,
            initial_tiles: 0,
            pause_on_blur: false,
            reset_field_on_restore: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FadeStart {
    /// Fade is purely time based and starts on the first tick
    Immediate,
    /// Fade starts once the tile has come to rest on the floor
    AfterSettle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RotationEase {
    /// `angle = initial * (1 - elapsed / rotationDuration)`
    Linear,
    /// Smooth cosine ease driven by fall progress, neutral at rest
    Cosine,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TileConfig {
    pub settle_on_floor: bool,
    pub fade_start: FadeStart,
    /// Seconds a settled tile rests before fading (`AfterSettle` only)
    pub settle_hold: f32,
    /// Seconds before a tile is removed
    pub max_lifetime: f32,
    pub rotation_duration: f32,
    /// Initial tilt is drawn from [-max, max] radians
    pub initial_tilt_max: f32,
    pub rotation_ease: RotationEase,
    /// Magnitude of the downward impulse applied at spawn
    pub fall_impulse: f32,
    pub floor_epsilon: f32,
    /// Tile height used until the label has been measured
    pub default_height: f32,
    pub padding_x: f32,
    pub padding_y: f32,
    pub depth: f32,
    /// Label sits this far in front of the backing box
    pub text_depth_offset: f32,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            settle_on_floor: true,
            fade_start: FadeStart::AfterSettle,
            settle_hold: 1.0,
            max_lifetime: 20.0,
            rotation_duration: 1.5,
            initial_tilt_max: 0.35,
            rotation_ease: RotationEase::Linear,
            fall_impulse: 5.0,
            floor_epsilon: 0.01,
            default_height: 1.0,
            padding_x: 0.2,
            padding_y: 0.5,
            depth: 0.1,
            text_depth_offset: 0.01,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PhysicsConfig {
    /// Vertical acceleration (world units / s²)
    pub gravity: f32,
    pub mass: f32,
    /// Fraction of velocity lost per second
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub friction: f32,
    pub restitution: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: -9.81,
            mass: 0.1,
            linear_damping: 0.95,
            angular_damping: 0.5,
            friction: 0.5,
            restitution: 0.0,
        }
    }
}

impl SceneConfig {
    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: SceneConfig = serde_json::from_str(json).map_err(|e| e.to_string())?;
        Ok(config.clamped())
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Bring every value into a range the simulation can run with.
    pub fn clamped(mut self) -> Self {
        self.field = self.field.clamped();
        self.spawner = self.spawner.clamped();
        self.tiles = self.tiles.clamped();
        self.physics = self.physics.clamped();
        self
    }
}

impl FieldConfig {
    pub fn clamped(mut self) -> Self {
        if self.count > MAX_PARTICLES {
            warn!("field.count {} exceeds {}, clamping", self.count, MAX_PARTICLES);
            self.count = MAX_PARTICLES;
        }
        self.center_radius = non_negative(self.center_radius, "field.centerRadius");
        self.width_scale = positive_or(self.width_scale, 1.0, "field.widthScale");
        self.height_scale = positive_or(self.height_scale, 1.0, "field.heightScale");
        self.base_reference_height =
            positive_or(self.base_reference_height, 10.0, "field.baseReferenceHeight");
        self.scale_constant = positive_or(self.scale_constant, 1.0, "field.scaleConstant");
        if !(self.portrait_exponent.is_finite() && (0.0..1.0).contains(&self.portrait_exponent)) {
            warn!("field.portraitExponent {} outside [0, 1), using 0.5", self.portrait_exponent);
            self.portrait_exponent = 0.5;
        }
        self.fall_speed = non_negative(self.fall_speed, "field.fallSpeed");
        self.fall_speed_variance = non_negative(self.fall_speed_variance, "field.fallSpeedVariance").min(1.0);
        self.drift = non_negative(self.drift, "field.drift");
        self.jitter = non_negative(self.jitter, "field.jitter");
        self.size_min = non_negative(self.size_min, "field.sizeMin");
        self.size_max = non_negative(self.size_max, "field.sizeMax");
        if self.size_min > self.size_max {
            std::mem::swap(&mut self.size_min, &mut self.size_max);
        }
        self.saturation_max = unit_interval(self.saturation_max, "field.saturationMax");
        self.lightness_min = unit_interval(self.lightness_min, "field.lightnessMin");
        self
    }
}

impl SpawnerConfig {
    pub fn clamped(mut self) -> Self {
        if !self.interval_ms.is_finite() {
            warn!("spawner.intervalMs is not finite, using 1000");
            self.interval_ms = 1000.0;
        } else if self.interval_ms < MIN_SPAWN_INTERVAL_MS {
            warn!("spawner.intervalMs {} too small, clamping to {}", self.interval_ms, MIN_SPAWN_INTERVAL_MS);
            self.interval_ms = MIN_SPAWN_INTERVAL_MS;
        }
        if self.max_tiles == Some(0) {
            warn!("spawner.maxTiles 0 would hide every tile, using 1");
            self.max_tiles = Some(1);
        }
        if !self.spawn_padding.is_finite() {
            self.spawn_padding = 1.0;
        }
        self.spawn_jitter_x = non_negative(self.spawn_jitter_x, "spawner.spawnJitterX");
        self
    }
}

impl TileConfig {
    pub fn clamped(mut self) -> Self {
        self.max_lifetime = positive_or(self.max_lifetime, 20.0, "tiles.maxLifetime");
        self.settle_hold = non_negative(self.settle_hold, "tiles.settleHold");
        self.rotation_duration = non_negative(self.rotation_duration, "tiles.rotationDuration");
        self.initial_tilt_max = non_negative(self.initial_tilt_max, "tiles.initialTiltMax");
        self.fall_impulse = non_negative(self.fall_impulse, "tiles.fallImpulse");
        self.floor_epsilon = non_negative(self.floor_epsilon, "tiles.floorEpsilon");
        self.default_height = positive_or(self.default_height, 1.0, "tiles.defaultHeight");
        self.padding_x = non_negative(self.padding_x, "tiles.paddingX");
        self.padding_y = non_negative(self.padding_y, "tiles.paddingY");
        self.depth = positive_or(self.depth, 0.1, "tiles.depth");
        if !self.text_depth_offset.is_finite() {
            self.text_depth_offset = 0.01;
        }
        self
    }
}

impl PhysicsConfig {
    pub fn clamped(mut self) -> Self {
        if !self.gravity.is_finite() {
            warn!("physics.gravity is not finite, using -9.81");
            self.gravity = -9.81;
        }
        self.mass = positive_or(self.mass, 0.1, "physics.mass");
        self.linear_damping = unit_interval(self.linear_damping, "physics.linearDamping");
        self.angular_damping = unit_interval(self.angular_damping, "physics.angularDamping");
        self.friction = non_negative(self.friction, "physics.friction");
        self.restitution = unit_interval(self.restitution, "physics.restitution");
        self
    }
}

fn positive_or(value: f32, fallback: f32, name: &str) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        warn!("{} must be positive (got {}), using {}", name, value, fallback);
        fallback
    }
}

fn non_negative(value: f32, name: &str) -> f32 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        warn!("{} must be non-negative (got {}), using 0", name, value);
        0.0
    }
}

fn unit_interval(value: f32, name: &str) -> f32 {
    if !value.is_finite() {
        warn!("{} is not finite, using 0", name);
        return 0.0;
    }
    if !(0.0..=1.0).contains(&value) {
        warn!("{} {} outside [0, 1], clamping", name, value);
    }
    value.clamp(0.0, 1.0)
}

/// Negative counts are a configuration slip, not an error: they mean "no particles".
fn deserialize_count<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    if raw < 0 {
        warn!("field.count {} is negative, using 0", raw);
        return Ok(0);
    }
    Ok(usize::try_from(raw).unwrap_or(MAX_PARTICLES))
}
