//! Scene - orchestrates the particle field, the tile spawner and the tiles
//!
//! Everything mutates inside the host's per-frame `tick(dt)` or inside one of
//! the host signal handlers (timer, visibility, focus, resize). None of them
//! overlap, so the core holds plain owned state without locking.
//!
//! Split by concern, WorldCore style:
//! - init/:     construction and runtime settings
//! - step/:     the per-frame tick
//! - spawn/:    spawn intents -> tiles
//! - commands/: host signals (start/stop, visibility, resize, dispose)
//! - render/:   flat buffers and snapshots for the renderer
//! - perf/:     per-tick timing snapshot

use crate::core::{wall_clock_ms, SimRng, ViewportMetrics};
use crate::domain::SceneConfig;
use crate::systems::particle_field::ParticleField;
use crate::systems::rigid_body::PhysicsBackend;
use crate::systems::spawner::TileSpawner;
use crate::systems::tiles::{TextBounds, TextMeasurer, Tile, TileCollection, TileId};

#[path = "perf/perf_stats.rs"]
mod perf_stats;
#[path = "init/init.rs"]
mod init;
#[path = "init/settings.rs"]
mod settings;
#[path = "step/step.rs"]
mod step;
#[path = "spawn/spawn.rs"]
mod spawn;
#[path = "commands/commands.rs"]
mod commands;
#[path = "render/render_extract.rs"]
mod render_extract;
mod facade;

pub use facade::{AbiLayout, Scene};
pub use perf_stats::PerfStats;
pub use render_extract::{TileSnapshot, TILE_RECORD_STRIDE};

/// Largest step accepted by `tick`; longer frames are clamped.
pub const MAX_TICK_DT: f32 = 0.1;

pub(crate) struct AbiLayoutData {
    pub(crate) positions_ptr: *const f32,
    pub(crate) positions_len_elements: usize,
    pub(crate) colors_ptr: *const f32,
    pub(crate) colors_len_elements: usize,
    pub(crate) sizes_ptr: *const f32,
    pub(crate) sizes_len_elements: usize,
    pub(crate) tiles_ptr: *const f32,
    pub(crate) tiles_len_elements: usize,
    pub(crate) tile_ids_ptr: *const f64,
    pub(crate) tile_ids_len_elements: usize,
}

/// The scene
pub struct SceneCore {
    config: SceneConfig,
    viewport: ViewportMetrics,
    field: ParticleField,
    tiles: TileCollection,
    spawner: TileSpawner,
    physics: Box<dyn PhysicsBackend>,
    measurer: Box<dyn TextMeasurer>,
    rng: SimRng,

    /// Simulation seconds since creation
    clock: f64,
    frame: u64,

    // Host signals
    visible: bool,
    focused: bool,
    /// Host asked for spawning (start without a later stop)
    running: bool,
    initial_tiles_pending: u32,
    initial_tiles_done: bool,
    disposed: bool,

    // Render buffers (rebuilt by `collect_tiles`)
    tile_render: Vec<f32>,
    tile_ids: Vec<f64>,

    // Perf metrics
    perf_enabled: bool,
    perf_stats: PerfStats,
}

impl SceneCore {
    /// Scene with the built-in rigid body backend and host-reported text bounds.
    pub fn new(config: SceneConfig, viewport: ViewportMetrics) -> Self {
        init::create_scene_core(config, viewport)
    }

    /// Scene with caller-supplied physics and text measurement.
    pub fn with_parts(
        config: SceneConfig,
        viewport: ViewportMetrics,
        physics: Box<dyn PhysicsBackend>,
        measurer: Box<dyn TextMeasurer>,
    ) -> Self {
        init::create_scene_core_with_parts(config, viewport, physics, measurer)
    }

    pub fn from_config_json(json: &str, viewport: ViewportMetrics) -> Result<Self, String> {
        let config = SceneConfig::from_json(json)?;
        Ok(Self::new(config, viewport))
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Effective (clamped) configuration as JSON.
    pub fn config_json(&self) -> String {
        self.config.to_json()
    }

    pub fn viewport(&self) -> ViewportMetrics {
        self.viewport
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id)
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn particle_count(&self) -> usize {
        self.field.len()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Simulation seconds since creation.
    pub fn elapsed(&self) -> f64 {
        self.clock
    }

    pub fn is_running(&self) -> bool {
        self.running && self.spawner.is_running()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn pending_spawns(&self) -> usize {
        self.spawner.pending()
    }

    // === SETTINGS ===

    /// Enable or disable per-tick perf metrics (adds timing overhead when enabled)
    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        settings::enable_perf_metrics(self, enabled);
    }

    /// Get last tick perf snapshot (zeros when perf disabled)
    pub fn get_perf_stats(&self) -> PerfStats {
        settings::get_perf_stats(self)
    }

    pub fn set_gravity(&mut self, gravity_y: f32) {
        settings::set_gravity(self, gravity_y);
    }

    pub fn set_settle_on_floor(&mut self, enabled: bool) {
        settings::set_settle_on_floor(self, enabled);
    }

    /// `None` = unbounded.
    pub fn set_max_tiles(&mut self, max_tiles: Option<u32>) {
        settings::set_max_tiles(self, max_tiles);
    }

    pub fn set_spawn_interval(&mut self, interval_ms: f64) {
        settings::set_spawn_interval(self, interval_ms);
    }

    /// Rebuild the particle buffer with a new population.
    pub fn set_particle_count(&mut self, count: usize) {
        settings::set_particle_count(self, count);
    }

    // === FRAME ===

    /// Advance the scene by `dt` seconds, using the host wall clock for the spawn schedule.
    pub fn tick(&mut self, dt: f32) {
        self.tick_at(dt, wall_clock_ms());
    }

    /// Advance the scene by `dt` seconds at wall-clock time `now_ms`.
    pub fn tick_at(&mut self, dt: f32, now_ms: f64) {
        step::tick(self, dt, now_ms);
    }

    // === HOST SIGNALS ===

    pub fn start(&mut self) {
        self.start_at(wall_clock_ms());
    }

    /// Begin spawning: one tile right away, then one per interval.
    pub fn start_at(&mut self, now_ms: f64) {
        commands::start(self, now_ms);
    }

    pub fn stop(&mut self) {
        commands::stop(self);
    }

    /// Host timer callback. Queues a spawn and materializes it.
    pub fn fire_timer(&mut self) {
        self.fire_timer_at(wall_clock_ms());
    }

    pub fn fire_timer_at(&mut self, now_ms: f64) {
        commands::fire_timer(self, now_ms);
    }

    /// Check the spawn deadline outside of a tick.
    pub fn pump_timer_at(&mut self, now_ms: f64) {
        commands::pump_timer(self, now_ms);
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.set_visible_at(visible, wall_clock_ms());
    }

    /// Page visibility. Lost stops spawning; restored clears the tiles and
    /// restarts from a single fresh tile.
    pub fn set_visible_at(&mut self, visible: bool, now_ms: f64) {
        commands::set_visible(self, visible, now_ms);
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.set_focused_at(focused, wall_clock_ms());
    }

    /// Window focus. Only acts when `spawner.pauseOnBlur` is set.
    pub fn set_focused_at(&mut self, focused: bool, now_ms: f64) {
        commands::set_focused(self, focused, now_ms);
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        commands::resize(self, width, height);
    }

    /// Regenerate every particle from scratch.
    pub fn reset_field(&mut self) {
        commands::reset_field(self);
    }

    /// Bounds of a label, once the host has built its glyphs.
    pub fn report_text_bounds(&mut self, label: &str, width: f32, height: f32) {
        self.measurer.report(label, TextBounds::new(width, height));
    }

    /// Tear everything down. Every live tile is reported removed; later calls are no-ops.
    pub fn dispose(&mut self) {
        commands::dispose(self);
    }

    /// Ids removed since the last call (lifetime, fade, eviction, clear).
    pub fn take_removed_ids(&mut self) -> Vec<TileId> {
        self.tiles.take_removed()
    }

    pub fn has_removed_ids(&self) -> bool {
        self.tiles.has_pending_removals()
    }

    // === RENDER ===

    /// Rebuild the flat tile buffers; returns the tile count.
    pub fn collect_tiles(&mut self) -> usize {
        render_extract::collect_tiles(self)
    }

    pub fn tile_render(&self) -> &[f32] {
        &self.tile_render
    }

    pub fn tile_render_ptr(&self) -> *const f32 {
        self.tile_render.as_ptr()
    }

    pub fn tile_ids_ptr(&self) -> *const f64 {
        self.tile_ids.as_ptr()
    }

    /// Label of the i-th tile in render order (newest first).
    pub fn tile_label(&self, index: usize) -> Option<String> {
        self.tiles.iter().nth(index).map(|t| t.label.clone())
    }

    pub fn tiles_snapshot(&self) -> Vec<TileSnapshot> {
        render_extract::tiles_snapshot(self)
    }

    pub fn tiles_json(&self) -> String {
        render_extract::tiles_json(self)
    }

    pub(crate) fn abi_layout_data(&self) -> AbiLayoutData {
        render_extract::abi_layout_data(self)
    }
}

#[cfg(test)]
#[path = "tests/tests.rs"]
mod tests;
