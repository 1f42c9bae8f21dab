use crate::core::PerfTimer;
use crate::systems::tiles::TileTickContext;

use super::{SceneCore, MAX_TICK_DT};

/// Negative or non-finite steps count as zero; long frames are clamped.
pub(super) fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 {
        dt.min(MAX_TICK_DT)
    } else {
        0.0
    }
}

pub(super) fn tick(scene: &mut SceneCore, dt: f32, now_ms: f64) {
    if scene.disposed {
        return;
    }
    let mut timer = PerfTimer::start(scene.perf_enabled);
    if timer.is_enabled() {
        scene.perf_stats.reset();
    }

    // Timer firings that happened since the last frame become tiles first,
    // so they are integrated on this very tick.
    scene.spawner.pump(now_ms);
    let spawned = super::spawn::spawn_pending(scene);

    // Viewport not measured yet: nothing to lay out against.
    if !scene.viewport.is_measured() {
        scene.perf_stats.step_ms = timer.elapsed_ms();
        return;
    }

    let dt = sanitize_dt(dt);
    scene.clock += dt as f64;
    scene.frame += 1;
    timer.lap_ms();

    // === PARTICLE FIELD ===
    let recycled = scene.field.tick(dt, &mut scene.rng);
    let field_ms = timer.lap_ms();

    // === TILES ===
    let ctx = TileTickContext {
        config: &scene.config.tiles,
        viewport: scene.viewport,
        gravity: scene.physics.gravity(),
        clock: scene.clock,
        dt,
    };
    let summary = scene.tiles.tick_all(&ctx, scene.measurer.as_mut());
    super::render_extract::collect_tiles(scene);
    let tiles_ms = timer.lap_ms();

    if timer.is_enabled() {
        let stats = &mut scene.perf_stats;
        stats.field_ms = field_ms;
        stats.tiles_ms = tiles_ms;
        stats.particle_count = scene.field.len() as u32;
        stats.particles_recycled = recycled;
        stats.active_tiles = scene.tiles.len() as u32;
        stats.tiles_spawned = spawned as u32;
        stats.tiles_removed = summary.removed;
        stats.text_fits_deferred = summary.fits_deferred;
        stats.step_ms = timer.elapsed_ms();
    }
}
