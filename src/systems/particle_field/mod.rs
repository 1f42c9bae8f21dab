//! Particle field - fixed-population background sand/rain
//!
//! Particles live in flat SoA buffers the renderer can upload directly:
//! positions (xyz), velocities (xyz), colors (rgb) and sizes. The population
//! never changes between regenerations; particles that leave the vertical
//! range are recycled in place at the top edge.

mod color;
mod field;
mod sampling;

pub use color::hsl_to_rgb;
pub use field::{FieldBounds, Particle, ParticleField, FRAMES_PER_SECOND};
pub use sampling::{effective_center_radius, scale_factor, CENTER_RADIUS_CLAMP_FRACTION};
