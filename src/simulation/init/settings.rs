use log::debug;

use crate::core::Vec3;
use crate::domain::MAX_PARTICLES;
use crate::systems::tiles::TileLimit;

use super::perf_stats::PerfStats;
use super::SceneCore;

pub(super) fn enable_perf_metrics(scene: &mut SceneCore, enabled: bool) {
    scene.perf_enabled = enabled;
    if !enabled {
        scene.perf_stats.reset();
    }
}

pub(super) fn get_perf_stats(scene: &SceneCore) -> PerfStats {
    scene.perf_stats.clone()
}

pub(super) fn set_gravity(scene: &mut SceneCore, gravity_y: f32) {
    if !gravity_y.is_finite() {
        return;
    }
    scene.config.physics.gravity = gravity_y;
    scene.physics.set_gravity(Vec3::new(0.0, gravity_y, 0.0));
}

pub(super) fn set_settle_on_floor(scene: &mut SceneCore, enabled: bool) {
    scene.config.tiles.settle_on_floor = enabled;
}

pub(super) fn set_max_tiles(scene: &mut SceneCore, max_tiles: Option<u32>) {
    let max_tiles = max_tiles.map(|m| m.max(1));
    scene.config.spawner.max_tiles = max_tiles;
    scene
        .tiles
        .set_limit(TileLimit::from(max_tiles), scene.measurer.as_mut());
    super::render_extract::collect_tiles(scene);
}

pub(super) fn set_spawn_interval(scene: &mut SceneCore, interval_ms: f64) {
    scene.spawner.set_interval(interval_ms);
    scene.config.spawner.interval_ms = scene.spawner.interval_ms();
}

pub(super) fn set_particle_count(scene: &mut SceneCore, count: usize) {
    if scene.disposed {
        return;
    }
    let count = count.min(MAX_PARTICLES);
    debug!("particle count {} -> {}", scene.field.len(), count);
    scene.config.field.count = count;
    scene
        .field
        .regenerate(scene.config.field.clone(), scene.viewport, &mut scene.rng);
}
