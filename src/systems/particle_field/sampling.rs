use log::warn;

use crate::core::{SimRng, ViewportMetrics};
use crate::domain::FieldConfig;

/// A center radius at or beyond the field half-width is replaced by this
/// fraction of the half-width.
pub const CENTER_RADIUS_CLAMP_FRACTION: f32 = 0.5;

/// Rejection attempts before the sample is pushed out to the radius instead.
const MAX_REJECTION_ATTEMPTS: u32 = 64;

/// Size/speed multiplier normalizing the effect across viewports.
///
/// `sqrt(baseReferenceHeight / height) * scaleConstant`, further damped by
/// `aspect^portraitExponent` when the viewport is taller than wide.
pub fn scale_factor(config: &FieldConfig, viewport: ViewportMetrics) -> f32 {
    if !viewport.is_measured() {
        return config.scale_constant;
    }
    let mut scale = (config.base_reference_height / viewport.height).sqrt() * config.scale_constant;
    let aspect = viewport.aspect_ratio();
    if aspect < 1.0 {
        scale *= aspect.powf(config.portrait_exponent);
    }
    scale
}

/// Exclusion radius actually used for a field of the given width.
pub fn effective_center_radius(configured: f32, field_width: f32) -> f32 {
    let half_width = field_width * 0.5;
    if configured <= 0.0 || half_width <= 0.0 {
        return 0.0;
    }
    if configured >= half_width {
        let clamped = half_width * CENTER_RADIUS_CLAMP_FRACTION;
        warn!(
            "field.centerRadius {} does not fit half-width {}, using {}",
            configured, half_width, clamped
        );
        return clamped;
    }
    configured
}

/// Draw (x, z) across the field width, outside `center_radius`.
///
/// With `center_radius < width / 2` the accepted region covers at least
/// 1 - pi/4 of the square, so the attempt cap is practically never reached.
/// If it is, the last sample is pushed radially out onto the circle.
pub(crate) fn sample_xz(rng: &mut SimRng, width: f32, center_radius: f32) -> (f32, f32) {
    let mut x = rng.spread(width);
    let mut z = rng.spread(width);
    if center_radius <= 0.0 {
        return (x, z);
    }
    let r2 = center_radius * center_radius;
    for _ in 0..MAX_REJECTION_ATTEMPTS {
        if x * x + z * z >= r2 {
            return (x, z);
        }
        x = rng.spread(width);
        z = rng.spread(width);
    }
    let len = (x * x + z * z).sqrt();
    if len > f32::EPSILON {
        let k = center_radius / len;
        (x * k, z * k)
    } else {
        (center_radius, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_factor_is_one_at_reference_height() {
        let config = FieldConfig::default();
        let vp = ViewportMetrics::new(20.0, config.base_reference_height);
        assert!((scale_factor(&config, vp) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn portrait_viewport_is_dampened() {
        let config = FieldConfig::default();
        let landscape = ViewportMetrics::new(16.0, 9.0);
        let portrait = ViewportMetrics::new(9.0, 16.0);
        let undamped = (config.base_reference_height / 16.0).sqrt();
        let s = scale_factor(&config, portrait);
        assert!(s < undamped);
        assert!(s < scale_factor(&config, landscape));
    }

    #[test]
    fn oversized_radius_is_clamped_to_fraction_of_half_width() {
        assert_eq!(effective_center_radius(1.0, 10.0), 1.0);
        assert_eq!(effective_center_radius(6.0, 10.0), 2.5);
        assert_eq!(effective_center_radius(5.0, 10.0), 2.5);
        assert_eq!(effective_center_radius(1.0, 0.0), 0.0);
    }

    #[test]
    fn samples_stay_outside_radius() {
        let mut rng = SimRng::seeded(3);
        for _ in 0..2000 {
            let (x, z) = sample_xz(&mut rng, 4.0, 1.9);
            assert!((x * x + z * z).sqrt() >= 1.9 - 1e-4);
        }
    }
}
