use std::f32::consts::PI;

use crate::core::{Transform, Vec3, ViewportMetrics};
use crate::domain::{FadeStart, RotationEase, TileConfig};

use super::text_fit::{fit_text, TextMeasurer};
use super::tile::{Tile, TileState};

/// Everything a tile tick reads besides the tile itself.
#[derive(Clone, Copy)]
pub struct TileTickContext<'a> {
    pub config: &'a TileConfig,
    pub viewport: ViewportMetrics,
    pub gravity: Vec3,
    /// Simulation clock (seconds) after this tick's advance
    pub clock: f64,
    pub dt: f32,
}

impl TileTickContext<'_> {
    /// Center height of a tile of half-height `half` resting on the floor.
    fn rest_y(&self, half: f32) -> f32 {
        self.viewport.bottom() + half
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TileTickResult {
    /// The tile reached Removed during this tick
    pub removed: bool,
    /// Label bounds were not available; layout retried next tick
    pub fit_deferred: bool,
}

/// Opacity at `elapsed` for a tile that started fading at `fade_from`.
///
/// Linear from 1 at `fade_from` down to 0 at `max_lifetime`. With
/// `fade_from == 0` this is `1 - elapsed / max_lifetime`.
pub fn fade_opacity(elapsed: f32, fade_from: f32, max_lifetime: f32) -> f32 {
    let span = max_lifetime - fade_from;
    if span <= 0.0 {
        return 0.0;
    }
    (1.0 - (elapsed - fade_from) / span).clamp(0.0, 1.0)
}

/// Advance one tile by one tick.
///
/// Order: lifetime check, physics, label layout, floor contact, rotation,
/// fade. A Removed tile is never touched again.
pub fn tick_tile(
    tile: &mut Tile,
    ctx: &TileTickContext<'_>,
    measurer: &mut dyn TextMeasurer,
) -> TileTickResult {
    let mut result = TileTickResult::default();
    if tile.is_removed() {
        return result;
    }

    let config = ctx.config;
    let elapsed = tile.elapsed(ctx.clock);
    if elapsed >= config.max_lifetime {
        remove(tile);
        result.removed = true;
        return result;
    }

    if !tile.resting {
        tile.body.step(ctx.dt, ctx.gravity);
    }

    result.fit_deferred = !refit(tile, ctx, measurer);

    if config.settle_on_floor {
        floor_contact(tile, ctx, elapsed);
    }

    apply_rotation(tile, ctx, elapsed);

    let fade_immediately = config.fade_start == FadeStart::Immediate || !config.settle_on_floor;
    if tile.state < TileState::Fading {
        let begin = if fade_immediately {
            Some(0.0)
        } else {
            match tile.settled_at {
                Some(at) if elapsed - at >= config.settle_hold => Some(elapsed),
                _ => None,
            }
        };
        if let Some(from) = begin {
            tile.fade_started_at = Some(from);
            tile.advance_to(TileState::Fading);
        }
    }

    tile.opacity = match tile.fade_started_at {
        Some(from) => fade_opacity(elapsed, from, config.max_lifetime),
        None => 1.0,
    };

    if tile.state == TileState::Fading && tile.opacity <= 0.0 {
        remove(tile);
        result.removed = true;
    }
    result
}

fn remove(tile: &mut Tile) {
    tile.opacity = 0.0;
    tile.advance_to(TileState::Removed);
}

/// Re-measure and re-layout the label. False when measurement is not ready.
fn refit(tile: &mut Tile, ctx: &TileTickContext<'_>, measurer: &mut dyn TextMeasurer) -> bool {
    let fit = measurer
        .measure(&tile.label)
        .and_then(|bounds| fit_text(bounds, ctx.viewport.width, ctx.config));
    match fit {
        Some(fit) => {
            tile.fit = Some(fit);
            true
        }
        None => false,
    }
}

/// Rebound speed below which an impact comes to rest instead of bouncing.
const BOUNCE_MIN_SPEED: f32 = 0.5;

/// Floor contact: bounce by the body's restitution until the rebound dies
/// out, then rest. Resting tiles slide with the lateral speed they landed
/// with, slowed by `friction * |gravity|`, and stay snapped to the floor as
/// the viewport or box height changes.
fn floor_contact(tile: &mut Tile, ctx: &TileTickContext<'_>, elapsed: f32) {
    let half = tile.half_height(ctx.config.default_height);
    let rest_y = ctx.rest_y(half);
    let transform = tile.body.transform();
    let mut position = transform.position;
    let touching = position.y <= rest_y + ctx.config.floor_epsilon;

    if tile.resting {
        position = position + slide(tile, ctx);
    } else {
        let velocity = tile.body.velocity();
        if !touching || velocity.y > 0.0 {
            return;
        }
        let rebound = -velocity.y * tile.body.restitution();
        if rebound > BOUNCE_MIN_SPEED {
            tile.body.set_velocity(Vec3::new(velocity.x, rebound, velocity.z));
        } else {
            tile.resting = true;
            tile.body.set_velocity(Vec3::new(velocity.x, 0.0, velocity.z));
            tile.body.set_angular_velocity(0.0);
            if tile.state == TileState::Falling {
                tile.settled_at = Some(elapsed);
                tile.advance_to(TileState::Settling);
            }
        }
    }

    position.y = rest_y;
    tile.body.set_transform(Transform::new(position, transform.angle));
}

/// Kinetic friction on a resting tile. Returns this tick's displacement.
fn slide(tile: &mut Tile, ctx: &TileTickContext<'_>) -> Vec3 {
    let velocity = tile.body.velocity();
    let lateral = Vec3::new(velocity.x, 0.0, velocity.z);
    let speed = lateral.length();
    if speed <= 0.0 {
        return Vec3::zero();
    }
    let slowdown = tile.body.friction() * ctx.gravity.length() * ctx.dt;
    let lateral = lateral * ((speed - slowdown).max(0.0) / speed);
    tile.body.set_velocity(lateral);
    lateral * ctx.dt
}

/// Ease the tilt back to neutral. Rotation is kinematic: the eased angle
/// overrides whatever the body integrated.
///
/// Both eases are monotone. Linear runs on time over `rotation_duration`.
/// Cosine runs on fall progress, `initial * 0.5 * (1 + cos(p * pi))`, so the
/// tilt unwinds fastest mid-fall and reaches 0 on landing. A bounce lowers
/// `p` again and briefly re-tilts the tile.
fn apply_rotation(tile: &mut Tile, ctx: &TileTickContext<'_>, elapsed: f32) {
    let initial = tile.initial_angle;
    let (angle, rate) = match ctx.config.rotation_ease {
        RotationEase::Linear => {
            let duration = ctx.config.rotation_duration;
            if duration <= 0.0 || elapsed >= duration {
                (0.0, 0.0)
            } else {
                let t = elapsed / duration;
                (initial * (1.0 - t), -initial / duration)
            }
        }
        RotationEase::Cosine => {
            let rest_y = ctx.rest_y(tile.half_height(ctx.config.default_height));
            let drop = tile.spawn_y - rest_y;
            let y = tile.body.transform().position.y;
            let p = if tile.resting || drop <= 0.0 {
                1.0
            } else {
                ((tile.spawn_y - y) / drop).clamp(0.0, 1.0)
            };
            let angle = initial * 0.5 * (1.0 + (p * PI).cos());
            let rate = if p >= 1.0 || drop <= 0.0 {
                0.0
            } else {
                let dp_dt = -tile.body.velocity().y / drop;
                -initial * 0.5 * PI * (p * PI).sin() * dp_dt
            };
            (angle, rate)
        }
    };
    let rate = if tile.resting { 0.0 } else { rate };
    let transform = tile.body.transform();
    tile.body.set_transform(Transform::new(transform.position, angle));
    tile.body.set_angular_velocity(rate);
}
