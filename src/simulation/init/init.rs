use log::info;

use crate::core::{SimRng, Vec3, ViewportMetrics};
use crate::domain::SceneConfig;
use crate::systems::particle_field::ParticleField;
use crate::systems::rigid_body::PhysicsBackend;
use crate::systems::rigid_body_system::RigidBodySystem;
use crate::systems::spawner::TileSpawner;
use crate::systems::tiles::{HostTextMeasurer, TextMeasurer, TileCollection, TileLimit};

use super::perf_stats::PerfStats;
use super::SceneCore;

pub(super) fn create_scene_core(config: SceneConfig, viewport: ViewportMetrics) -> SceneCore {
    let physics = Box::new(RigidBodySystem::new(config.physics.gravity));
    create_scene_core_with_parts(config, viewport, physics, Box::new(HostTextMeasurer::new()))
}

pub(super) fn create_scene_core_with_parts(
    config: SceneConfig,
    viewport: ViewportMetrics,
    physics: Box<dyn PhysicsBackend>,
    measurer: Box<dyn TextMeasurer>,
) -> SceneCore {
    let config = config.clamped();
    let mut rng = SimRng::seeded(config.seed);
    let field = ParticleField::create(config.field.clone(), viewport, &mut rng);
    info!(
        "scene created: {} particles, viewport {}x{}{}",
        field.len(),
        viewport.width,
        viewport.height,
        if viewport.is_measured() { "" } else { " (unmeasured)" }
    );

    let mut physics = physics;
    physics.set_gravity(Vec3::new(0.0, config.physics.gravity, 0.0));

    SceneCore {
        tiles: TileCollection::new(TileLimit::from(config.spawner.max_tiles)),
        spawner: TileSpawner::new(config.spawner.interval_ms),
        field,
        physics,
        measurer,
        rng,
        viewport,
        config,
        clock: 0.0,
        frame: 0,
        visible: true,
        focused: true,
        running: false,
        initial_tiles_pending: 0,
        initial_tiles_done: false,
        disposed: false,
        tile_render: Vec::new(),
        tile_ids: Vec::new(),
        perf_enabled: false,
        perf_stats: PerfStats::default(),
    }
}
