use log::{debug, info};

use crate::core::ViewportMetrics;

use super::spawn::spawn_pending;
use super::SceneCore;

pub(super) fn start(scene: &mut SceneCore, now_ms: f64) {
    if scene.disposed || scene.running {
        return;
    }
    scene.running = true;
    if !is_active(scene) {
        // Deferred to restore, which spawns a single fresh tile.
        return;
    }
    if !scene.initial_tiles_done {
        scene.initial_tiles_done = true;
        scene.initial_tiles_pending = scene.config.spawner.initial_tiles;
    }
    scene.spawner.start(now_ms);
    spawn_pending(scene);
}

pub(super) fn stop(scene: &mut SceneCore) {
    scene.running = false;
    scene.spawner.stop();
}

pub(super) fn fire_timer(scene: &mut SceneCore, now_ms: f64) {
    if scene.disposed {
        return;
    }
    if scene.spawner.fire(now_ms) {
        spawn_pending(scene);
    }
}

pub(super) fn pump_timer(scene: &mut SceneCore, now_ms: f64) {
    if scene.disposed {
        return;
    }
    if scene.spawner.pump(now_ms) {
        spawn_pending(scene);
    }
}

/// Visible and (when blur pauses) focused.
fn is_active(scene: &SceneCore) -> bool {
    scene.visible && (scene.focused || !scene.config.spawner.pause_on_blur)
}

pub(super) fn set_visible(scene: &mut SceneCore, visible: bool, now_ms: f64) {
    let was_active = is_active(scene);
    scene.visible = visible;
    apply_activity(scene, was_active, now_ms);
}

pub(super) fn set_focused(scene: &mut SceneCore, focused: bool, now_ms: f64) {
    let was_active = is_active(scene);
    scene.focused = focused;
    apply_activity(scene, was_active, now_ms);
}

fn apply_activity(scene: &mut SceneCore, was_active: bool, now_ms: f64) {
    let active = is_active(scene);
    if scene.disposed || active == was_active {
        return;
    }
    if active {
        restore(scene, now_ms);
    } else {
        info!("scene hidden, spawner stopped");
        scene.spawner.stop();
    }
}

/// Drop every stale tile and start over from `t = 0` with one fresh tile.
fn restore(scene: &mut SceneCore, now_ms: f64) {
    let cleared = scene.tiles.clear(scene.measurer.as_mut());
    scene.initial_tiles_pending = 0;
    if scene.config.spawner.reset_field_on_restore {
        scene.field.reset(&mut scene.rng);
    }
    info!("scene visible again, cleared {} tiles", cleared);
    if scene.running {
        scene.spawner.reset_and_restart(now_ms);
        spawn_pending(scene);
    }
    super::render_extract::collect_tiles(scene);
}

pub(super) fn resize(scene: &mut SceneCore, width: f32, height: f32) {
    if scene.disposed {
        return;
    }
    let viewport = ViewportMetrics::new(width, height);
    if !viewport.is_measured() {
        debug!("ignoring unmeasured resize {}x{}", width, height);
        return;
    }
    scene.viewport = viewport;
    scene.field.resize(viewport, &mut scene.rng);
    // Intents held back while the viewport was unknown.
    spawn_pending(scene);
}

pub(super) fn reset_field(scene: &mut SceneCore) {
    if scene.disposed {
        return;
    }
    scene.field.reset(&mut scene.rng);
}

pub(super) fn dispose(scene: &mut SceneCore) {
    if scene.disposed {
        return;
    }
    scene.running = false;
    scene.spawner.stop();
    let cleared = scene.tiles.clear(scene.measurer.as_mut());
    scene.field.teardown();
    scene.tile_render.clear();
    scene.tile_ids.clear();
    scene.disposed = true;
    info!("scene disposed ({} tiles released)", cleared);
}
