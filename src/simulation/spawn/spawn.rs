use log::debug;

use crate::core::{wall_clock_ms, Transform, Vec3};
use crate::domain::label_for_timestamp_ms;
use crate::systems::rigid_body::BodyDesc;
use crate::systems::tiles::Tile;

use super::SceneCore;

/// Vertical gap between stacked initial tiles (world units).
const INITIAL_TILE_SPACING: f32 = 2.0;

/// Turn queued spawn intents (and any pending initial tiles) into tiles.
///
/// Intents wait in the queue while the viewport is unmeasured. The render
/// buffers are rebuilt when anything was created. Returns how many tiles were
/// created.
pub(super) fn spawn_pending(scene: &mut SceneCore) -> usize {
    if scene.disposed || (scene.spawner.pending() == 0 && scene.initial_tiles_pending == 0) {
        return 0;
    }
    if !scene.viewport.is_measured() {
        debug!(
            "viewport unmeasured, holding {} spawn intents",
            scene.spawner.pending()
        );
        return 0;
    }

    let mut spawned = 0;
    let mut stamp = None;
    for intent in scene.spawner.drain() {
        spawn_tile(scene, intent.wall_ms, 0.0);
        stamp = Some(intent.wall_ms);
        spawned += 1;
    }

    // Initial tiles stack below the immediate one.
    let initial = std::mem::take(&mut scene.initial_tiles_pending);
    if initial > 0 {
        let wall_ms = stamp.unwrap_or_else(wall_clock_ms);
        for i in 0..initial {
            spawn_tile(scene, wall_ms, INITIAL_TILE_SPACING * (i + 1) as f32);
            spawned += 1;
        }
    }
    if spawned > 0 {
        super::render_extract::collect_tiles(scene);
    }
    spawned
}

/// Create one tile stamped `wall_ms`, `drop` units below the spawn line.
pub(super) fn spawn_tile(scene: &mut SceneCore, wall_ms: f64, drop: f32) {
    let id = scene.tiles.next_id(wall_ms);
    let label = label_for_timestamp_ms(wall_ms).unwrap_or_else(|| id.to_string());

    let spawner = &scene.config.spawner;
    let tiles = &scene.config.tiles;
    let physics = &scene.config.physics;

    let half_w = scene.viewport.half_width();
    let x = if spawner.spawn_jitter_x > 0.0 {
        scene
            .rng
            .spread(spawner.spawn_jitter_x * 2.0)
            .clamp(-half_w, half_w)
    } else {
        0.0
    };
    let y = scene.viewport.top() + spawner.spawn_padding - drop;
    let tilt = if tiles.initial_tilt_max > 0.0 {
        scene.rng.between(-tiles.initial_tilt_max, tiles.initial_tilt_max)
    } else {
        0.0
    };

    let desc = BodyDesc {
        mass: physics.mass,
        transform: Transform::new(Vec3::new(x, y, 0.0), tilt),
        linear_damping: physics.linear_damping,
        angular_damping: physics.angular_damping,
        friction: physics.friction,
        restitution: physics.restitution,
    };
    let body = scene.physics.create_body(&desc);
    let tile = Tile::new(id, label, scene.clock, body, tiles.fall_impulse);
    debug!("spawned tile {} at ({:.2}, {:.2})", id, x, y);
    scene.tiles.insert(tile, scene.measurer.as_mut());
}
