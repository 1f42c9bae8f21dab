use std::collections::{HashMap, HashSet};

use super::*;
use crate::domain::{FadeStart, SceneConfig};
use crate::systems::rigid_body_system::RigidBodySystem;
use crate::systems::tiles::{HostTextMeasurer, MonospaceMeasurer, TileState};

const DT: f32 = 1.0 / 60.0;
/// 2025-01-06 15:04:05 UTC
const T0: f64 = 1_736_175_845_000.0;

fn config() -> SceneConfig {
    let mut config = SceneConfig::default();
    config.seed = 7;
    config.field.count = 500;
    config
}

fn scene_with(config: SceneConfig, width: f32, height: f32) -> SceneCore {
    SceneCore::with_parts(
        config,
        ViewportMetrics::new(width, height),
        Box::new(RigidBodySystem::default()),
        Box::new(MonospaceMeasurer::default()),
    )
}

fn scene() -> SceneCore {
    scene_with(config(), 16.0, 9.0)
}

/// Tick `seconds` of 60Hz frames with a wall clock that advances in step.
fn run(scene: &mut SceneCore, start_ms: f64, seconds: f32) -> f64 {
    let frames = (seconds * 60.0).round() as u32;
    let mut now = start_ms;
    for _ in 0..frames {
        now += DT as f64 * 1000.0;
        scene.tick_at(DT, now);
    }
    now
}

#[test]
fn start_spawns_one_tile_immediately() {
    let mut scene = scene();
    scene.start_at(T0);
    assert_eq!(scene.tile_count(), 1);
    let tile = scene.tiles().next().unwrap();
    assert_eq!(tile.id, T0 as i64);
    assert_eq!(tile.state(), TileState::Falling);
    assert!(tile.position().y > scene.viewport().top());
    assert_eq!(tile.label, tile.label.to_uppercase());
}

#[test]
fn steady_state_holds_about_twenty_tiles() {
    let mut scene = scene();
    scene.start_at(T0);
    run(&mut scene, T0, 60.0);
    let count = scene.tile_count();
    assert!((19..=21).contains(&count), "tile count {}", count);
    assert!(scene.take_removed_ids().len() >= 35);
}

#[test]
fn tiles_are_newest_first_with_increasing_ids() {
    let mut scene = scene();
    scene.start_at(T0);
    run(&mut scene, T0, 5.0);
    let ids: Vec<_> = scene.tiles().map(|t| t.id).collect();
    assert!(ids.len() >= 5);
    assert!(ids.windows(2).all(|w| w[0] > w[1]));
}

#[test]
fn every_tile_walks_the_lifecycle_forward_and_is_removed_once() {
    let mut scene = scene();
    scene.start_at(T0);
    let mut history: HashMap<i64, Vec<TileState>> = HashMap::new();
    let mut removed = Vec::new();
    let mut now = T0;
    for _ in 0..(60 * 45) {
        now += DT as f64 * 1000.0;
        scene.tick_at(DT, now);
        for tile in scene.tiles() {
            let states = history.entry(tile.id).or_default();
            if states.last() != Some(&tile.state()) {
                states.push(tile.state());
            }
        }
        removed.extend(scene.take_removed_ids());
    }

    let unique: HashSet<_> = removed.iter().copied().collect();
    assert_eq!(unique.len(), removed.len(), "an id was reported twice");
    for (id, states) in &history {
        assert!(states.windows(2).all(|w| w[0] < w[1]), "tile {} went backwards", id);
    }
    // Tiles old enough to have expired were all reported.
    for id in history.keys().filter(|&&id| (id as f64) < now - 21_000.0) {
        assert!(unique.contains(id), "tile {} never reported removed", id);
    }
}

#[test]
fn visibility_loss_then_restore_restarts_from_one_tile() {
    let mut scene = scene();
    scene.start_at(T0);
    let now = run(&mut scene, T0, 5.0);
    assert!(scene.tile_count() > 1);
    scene.take_removed_ids();

    scene.set_visible_at(false, now);
    assert!(!scene.is_running());
    // Hidden for a minute: no backlog accrues.
    scene.pump_timer_at(now + 60_000.0);
    assert_eq!(scene.pending_spawns(), 0);

    let before = scene.tile_count();
    let restored_at = now + 60_000.0;
    scene.set_visible_at(true, restored_at);
    assert_eq!(scene.take_removed_ids().len(), before);
    assert_eq!(scene.tile_count(), 1);
    assert_eq!(scene.tiles().next().unwrap().id, restored_at as i64);
    assert!(scene.is_running());

    // Schedule restarted at t = 0: the next tile is one interval later.
    scene.tick_at(DT, restored_at + 999.0);
    assert_eq!(scene.tile_count(), 1);
    scene.tick_at(DT, restored_at + 1000.0);
    assert_eq!(scene.tile_count(), 2);
}

#[test]
fn repeated_visibility_signals_are_idempotent() {
    let mut scene = scene();
    scene.start_at(T0);
    scene.set_visible_at(true, T0 + 10.0);
    assert_eq!(scene.tile_count(), 1);
    assert!(scene.take_removed_ids().is_empty());
}

#[test]
fn blur_only_pauses_when_configured() {
    let mut scene = scene();
    scene.start_at(T0);
    scene.set_focused_at(false, T0 + 100.0);
    assert!(scene.is_running());

    let mut config = config();
    config.spawner.pause_on_blur = true;
    let mut scene = scene_with(config, 16.0, 9.0);
    scene.start_at(T0);
    scene.set_focused_at(false, T0 + 100.0);
    assert!(!scene.is_running());
    scene.set_focused_at(true, T0 + 5_000.0);
    assert!(scene.is_running());
    assert_eq!(scene.tile_count(), 1);
}

#[test]
fn cap_evicts_oldest() {
    let mut config = config();
    config.spawner.max_tiles = Some(3);
    let mut scene = scene_with(config, 16.0, 9.0);
    scene.start_at(T0);
    run(&mut scene, T0, 6.0);
    assert_eq!(scene.tile_count(), 3);
    let removed = scene.take_removed_ids();
    assert_eq!(removed.first().copied(), Some(T0 as i64));

    scene.set_max_tiles(None);
    run(&mut scene, T0 + 6_000.0, 3.0);
    assert!(scene.tile_count() > 3);
}

#[test]
fn initial_tiles_only_on_first_start() {
    let mut config = config();
    config.spawner.initial_tiles = 4;
    let mut scene = scene_with(config, 16.0, 9.0);
    scene.start_at(T0);
    assert_eq!(scene.tile_count(), 5);
    let ys: Vec<f32> = scene.tiles().map(|t| t.position().y).collect();
    let top = scene.viewport().top() + scene.config().spawner.spawn_padding;
    assert!(ys.iter().any(|&y| (y - top).abs() < 1e-5));
    assert!(ys.iter().any(|&y| (y - (top - 8.0)).abs() < 1e-5));

    scene.stop();
    scene.start_at(T0 + 10_000.0);
    assert_eq!(scene.tile_count(), 6);
}

#[test]
fn unmeasured_viewport_holds_spawns_until_resize() {
    let mut scene = scene_with(config(), 0.0, 0.0);
    scene.start_at(T0);
    assert_eq!(scene.tile_count(), 0);
    assert_eq!(scene.pending_spawns(), 1);
    scene.tick_at(DT, T0 + 16.0);
    assert_eq!(scene.frame(), 0);
    assert!(!scene.field().is_laid_out());

    scene.resize(16.0, 9.0);
    assert!(scene.field().is_laid_out());
    assert_eq!(scene.particle_count(), 500);
    assert_eq!(scene.tile_count(), 1);
}

#[test]
fn portrait_resize_shrinks_scale_for_new_particles_only() {
    let mut scene = scene();
    let landscape_scale = scene.field().scale_factor();
    let before: Vec<f32> = scene.field().sizes().to_vec();

    scene.resize(9.0, 16.0);
    assert!(scene.field().scale_factor() < landscape_scale);
    assert_eq!(scene.field().sizes(), &before[..]);
}

#[test]
fn particles_stay_in_bounds_while_ticking() {
    let mut scene = scene();
    run(&mut scene, T0, 10.0);
    let half_h = scene.field().bounds().half_height();
    for p in scene.field().positions().chunks_exact(3) {
        assert!(p[1] >= -half_h && p[1] <= half_h);
    }
    assert_eq!(scene.particle_count(), 500);
}

#[test]
fn text_fit_waits_for_reported_bounds() {
    let mut scene = SceneCore::with_parts(
        config(),
        ViewportMetrics::new(16.0, 9.0),
        Box::new(RigidBodySystem::default()),
        Box::new(HostTextMeasurer::new()),
    );
    scene.enable_perf_metrics(true);
    scene.start_at(T0);
    scene.tick_at(DT, T0 + 16.0);
    assert_eq!(scene.get_perf_stats().text_fits_deferred(), 1);
    assert!(scene.tiles().next().unwrap().fit().is_none());
    assert_eq!(scene.tile_render()[TILE_RECORD_STRIDE - 1], 0.0);

    let label = scene.tile_label(0).unwrap();
    scene.report_text_bounds(&label, 32.0, 1.0);
    scene.tick_at(DT, T0 + 32.0);
    assert_eq!(scene.get_perf_stats().text_fits_deferred(), 0);
    let fit = scene.tiles().next().unwrap().fit().copied().unwrap();
    assert_eq!(fit.scale, 0.5);
    let record = &scene.tile_render()[..TILE_RECORD_STRIDE];
    assert_eq!(record[5], 0.5);
    assert_eq!(record[11], 1.0);
}

#[test]
fn immediate_fade_starts_at_spawn() {
    let mut config = config();
    config.tiles.fade_start = FadeStart::Immediate;
    let mut scene = scene_with(config, 16.0, 9.0);
    scene.start_at(T0);
    scene.stop();
    run(&mut scene, T0, 5.0);
    let tile = scene.tiles().next().unwrap();
    assert_eq!(tile.state(), TileState::Fading);
    let expected = 1.0 - tile.elapsed(scene.elapsed()) / 20.0;
    assert!((tile.opacity() - expected).abs() < 1e-4);
}

#[test]
fn render_buffers_match_tiles() {
    let mut scene = scene();
    scene.start_at(T0);
    run(&mut scene, T0, 3.0);
    let count = scene.collect_tiles();
    assert_eq!(count, scene.tile_count());
    assert_eq!(scene.tile_render().len(), count * TILE_RECORD_STRIDE);

    let layout = scene.abi_layout_data();
    assert_eq!(layout.positions_len_elements, 500 * 3);
    assert_eq!(layout.sizes_len_elements, 500);
    assert_eq!(layout.tile_ids_len_elements, count);

    let snapshot: serde_json::Value = serde_json::from_str(&scene.tiles_json()).unwrap();
    let arr = snapshot.as_array().unwrap();
    assert_eq!(arr.len(), count);
    assert!(arr[0].get("opacity").is_some());
    assert!(arr[0].get("textScale").is_some());
}

#[test]
fn dispose_reports_tiles_and_later_calls_are_no_ops() {
    let mut scene = scene();
    scene.start_at(T0);
    run(&mut scene, T0, 2.0);
    let live = scene.tile_count();
    scene.take_removed_ids();

    scene.dispose();
    assert_eq!(scene.take_removed_ids().len(), live);
    assert!(scene.is_disposed());
    assert_eq!(scene.particle_count(), 0);

    let frame = scene.frame();
    scene.tick_at(DT, T0 + 10_000.0);
    scene.start_at(T0 + 10_000.0);
    scene.resize(9.0, 16.0);
    assert_eq!(scene.frame(), frame);
    assert_eq!(scene.tile_count(), 0);
}

#[test]
fn huge_and_invalid_dt_are_sanitized() {
    let mut scene = scene();
    scene.tick_at(5.0, T0);
    assert!((scene.elapsed() - MAX_TICK_DT as f64).abs() < 1e-6);
    scene.tick_at(-1.0, T0);
    scene.tick_at(f32::NAN, T0);
    assert!((scene.elapsed() - MAX_TICK_DT as f64).abs() < 1e-6);
}

#[test]
fn runtime_settings_update_config() {
    let mut scene = scene();
    scene.set_gravity(-3.0);
    scene.set_settle_on_floor(false);
    scene.set_spawn_interval(450.0);
    scene.set_particle_count(42);
    let config: SceneConfig = SceneConfig::from_json(&scene.config_json()).unwrap();
    assert_eq!(config.physics.gravity, -3.0);
    assert!(!config.tiles.settle_on_floor);
    assert_eq!(config.spawner.interval_ms, 450.0);
    assert_eq!(config.field.count, 42);
    assert_eq!(scene.particle_count(), 42);
}

#[test]
fn start_while_hidden_restores_to_a_single_tile() {
    let mut config = config();
    config.spawner.initial_tiles = 4;
    let mut scene = scene_with(config, 16.0, 9.0);
    scene.set_visible_at(false, T0);
    scene.start_at(T0);
    assert_eq!(scene.tile_count(), 0);
    assert!(!scene.is_running());

    scene.set_visible_at(true, T0 + 5_000.0);
    assert_eq!(scene.tile_count(), 1);
    assert!(scene.is_running());
}

#[test]
fn render_buffers_follow_spawns_and_evictions_between_ticks() {
    let mut scene = scene();
    scene.start_at(T0);
    assert_eq!(scene.tile_render().len(), TILE_RECORD_STRIDE);
    assert_eq!(scene.abi_layout_data().tile_ids_len_elements, 1);

    scene.fire_timer_at(T0 + 300.0);
    // fire re-anchors the deadline to 300 + interval
    scene.pump_timer_at(T0 + 1_300.0);
    assert_eq!(scene.tile_count(), 3);
    assert_eq!(scene.tile_render().len(), 3 * TILE_RECORD_STRIDE);

    scene.set_max_tiles(Some(1));
    let evicted = scene.take_removed_ids();
    assert_eq!(evicted.len(), 2);
    let layout = scene.abi_layout_data();
    assert_eq!(layout.tile_ids_len_elements, 1);
    let live_id = unsafe { *layout.tile_ids_ptr };
    assert_eq!(live_id, scene.tiles().next().unwrap().id as f64);
    assert!(evicted.iter().all(|&id| id as f64 != live_id));
}

#[test]
fn physics_material_changes_the_landing() {
    let trace = |friction: f32, restitution: f32| {
        let mut config = config();
        config.spawner.spawn_jitter_x = 0.0;
        config.physics.friction = friction;
        config.physics.restitution = restitution;
        let mut scene = scene_with(config, 16.0, 9.0);
        scene.start_at(T0);
        let mut now = T0;
        let mut rise = 0.0f32;
        for _ in 0..120 {
            now += DT as f64 * 1000.0;
            scene.tick_at(DT, now);
            let tile = scene.tiles().last().unwrap();
            rise = rise.max(tile.velocity().y);
        }
        rise
    };
    assert_eq!(trace(0.0, 0.0), 0.0);
    assert!(trace(10.0, 1.0) > 0.0);
}
