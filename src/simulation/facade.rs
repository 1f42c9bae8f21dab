use wasm_bindgen::prelude::*;

use crate::core::ViewportMetrics;
use crate::domain::SceneConfig;

use super::perf_stats::PerfStats;
use super::SceneCore;

#[wasm_bindgen]
pub struct AbiLayout {
    positions_ptr: u32,
    positions_len_elements: u32,
    positions_len_bytes: u32,
    colors_ptr: u32,
    colors_len_elements: u32,
    colors_len_bytes: u32,
    sizes_ptr: u32,
    sizes_len_elements: u32,
    sizes_len_bytes: u32,
    tiles_ptr: u32,
    tiles_len_elements: u32,
    tiles_len_bytes: u32,
    tile_ids_ptr: u32,
    tile_ids_len_elements: u32,
    tile_ids_len_bytes: u32,
}

#[wasm_bindgen]
impl AbiLayout {
    #[wasm_bindgen(getter)]
    pub fn positions_ptr(&self) -> u32 { self.positions_ptr }
    #[wasm_bindgen(getter)]
    pub fn positions_len_elements(&self) -> u32 { self.positions_len_elements }
    #[wasm_bindgen(getter)]
    pub fn positions_len_bytes(&self) -> u32 { self.positions_len_bytes }

    #[wasm_bindgen(getter)]
    pub fn colors_ptr(&self) -> u32 { self.colors_ptr }
    #[wasm_bindgen(getter)]
    pub fn colors_len_elements(&self) -> u32 { self.colors_len_elements }
    #[wasm_bindgen(getter)]
    pub fn colors_len_bytes(&self) -> u32 { self.colors_len_bytes }

    #[wasm_bindgen(getter)]
    pub fn sizes_ptr(&self) -> u32 { self.sizes_ptr }
    #[wasm_bindgen(getter)]
    pub fn sizes_len_elements(&self) -> u32 { self.sizes_len_elements }
    #[wasm_bindgen(getter)]
    pub fn sizes_len_bytes(&self) -> u32 { self.sizes_len_bytes }

    #[wasm_bindgen(getter)]
    pub fn tiles_ptr(&self) -> u32 { self.tiles_ptr }
    #[wasm_bindgen(getter)]
    pub fn tiles_len_elements(&self) -> u32 { self.tiles_len_elements }
    #[wasm_bindgen(getter)]
    pub fn tiles_len_bytes(&self) -> u32 { self.tiles_len_bytes }

    #[wasm_bindgen(getter)]
    pub fn tile_ids_ptr(&self) -> u32 { self.tile_ids_ptr }
    #[wasm_bindgen(getter)]
    pub fn tile_ids_len_elements(&self) -> u32 { self.tile_ids_len_elements }
    #[wasm_bindgen(getter)]
    pub fn tile_ids_len_bytes(&self) -> u32 { self.tile_ids_len_bytes }

    /// Floats per tile record in the tiles buffer
    #[wasm_bindgen(getter)]
    pub fn tile_stride(&self) -> u32 { super::TILE_RECORD_STRIDE as u32 }
}

#[wasm_bindgen]
pub struct Scene {
    core: SceneCore,
    on_remove: Option<js_sys::Function>,
}

impl Scene {
    /// Hand removed ids to the registered callback, if any.
    ///
    /// Without a callback the ids stay queued for `take_removed_ids`.
    fn flush_removed(&mut self) {
        let Some(callback) = self.on_remove.as_ref() else {
            return;
        };
        for id in self.core.take_removed_ids() {
            // A throwing host callback must not wedge the scene.
            let _ = callback.call1(&JsValue::NULL, &JsValue::from_f64(id as f64));
        }
    }
}

#[wasm_bindgen]
impl Scene {
    /// Scene with default configuration for a viewport of `width` x `height` world units.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            core: SceneCore::new(SceneConfig::default(), ViewportMetrics::new(width, height)),
            on_remove: None,
        }
    }

    #[wasm_bindgen(js_name = withConfigJson)]
    pub fn with_config_json(json: String, width: f32, height: f32) -> Result<Scene, JsValue> {
        let core = SceneCore::from_config_json(&json, ViewportMetrics::new(width, height))
            .map_err(|e| JsValue::from_str(&e))?;
        Ok(Self { core, on_remove: None })
    }

    /// Effective configuration after clamping
    pub fn config_json(&self) -> String {
        self.core.config_json()
    }

    #[wasm_bindgen(getter)]
    pub fn particle_count(&self) -> u32 { self.core.particle_count() as u32 }

    #[wasm_bindgen(getter)]
    pub fn tile_count(&self) -> u32 { self.core.tile_count() as u32 }

    #[wasm_bindgen(getter)]
    pub fn frame(&self) -> u64 { self.core.frame() }

    #[wasm_bindgen(getter)]
    pub fn elapsed(&self) -> f64 { self.core.elapsed() }

    #[wasm_bindgen(getter)]
    pub fn running(&self) -> bool { self.core.is_running() }

    /// Enable or disable per-tick perf metrics (adds timing overhead when enabled)
    pub fn enable_perf_metrics(&mut self, enabled: bool) {
        self.core.enable_perf_metrics(enabled);
    }

    /// Get last tick perf snapshot (zeros when perf disabled)
    pub fn get_perf_stats(&self) -> PerfStats {
        self.core.get_perf_stats()
    }

    pub fn set_gravity(&mut self, gravity_y: f32) {
        self.core.set_gravity(gravity_y);
    }

    pub fn set_settle_on_floor(&mut self, enabled: bool) {
        self.core.set_settle_on_floor(enabled);
    }

    /// `undefined` = unbounded
    pub fn set_max_tiles(&mut self, max_tiles: Option<u32>) {
        self.core.set_max_tiles(max_tiles);
        self.flush_removed();
    }

    pub fn set_spawn_interval(&mut self, interval_ms: f64) {
        self.core.set_spawn_interval(interval_ms);
    }

    pub fn set_particle_count(&mut self, count: u32) {
        self.core.set_particle_count(count as usize);
    }

    /// Register `fn(id: number)`, called once per removed tile.
    pub fn set_on_remove(&mut self, callback: Option<js_sys::Function>) {
        self.on_remove = callback;
        self.flush_removed();
    }

    /// Per-frame entry point; `dt` in seconds.
    pub fn tick(&mut self, dt: f32) {
        self.core.tick(dt);
        self.flush_removed();
    }

    pub fn start(&mut self) {
        self.core.start();
        self.flush_removed();
    }

    pub fn stop(&mut self) {
        self.core.stop();
    }

    /// For hosts driving the spawn cadence with their own `setInterval`.
    pub fn fire_timer(&mut self) {
        self.core.fire_timer();
        self.flush_removed();
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.core.set_visible(visible);
        self.flush_removed();
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.core.set_focused(focused);
        self.flush_removed();
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.core.resize(width, height);
        self.flush_removed();
    }

    pub fn reset_field(&mut self) {
        self.core.reset_field();
    }

    /// Bounds of a label's glyph geometry, once built.
    pub fn report_text_bounds(&mut self, label: String, width: f32, height: f32) {
        self.core.report_text_bounds(&label, width, height);
    }

    pub fn dispose(&mut self) {
        self.core.dispose();
        self.flush_removed();
    }

    pub fn take_removed_ids(&mut self) -> Vec<f64> {
        self.core
            .take_removed_ids()
            .into_iter()
            .map(|id| id as f64)
            .collect()
    }

    // === RENDER API ===

    /// Rebuild the tile buffers (also done at the end of every tick)
    pub fn collect_tiles(&mut self) -> usize {
        self.core.collect_tiles()
    }

    pub fn tile_label(&self, index: usize) -> Option<String> {
        self.core.tile_label(index)
    }

    pub fn tiles_json(&self) -> String {
        self.core.tiles_json()
    }

    pub fn positions_ptr(&self) -> *const f32 {
        self.core.field().positions_ptr()
    }

    pub fn colors_ptr(&self) -> *const f32 {
        self.core.field().colors_ptr()
    }

    pub fn sizes_ptr(&self) -> *const f32 {
        self.core.field().sizes_ptr()
    }

    pub fn tiles_ptr(&self) -> *const f32 {
        self.core.tile_render_ptr()
    }

    pub fn tile_ids_ptr(&self) -> *const f64 {
        self.core.tile_ids_ptr()
    }

    pub fn abi_layout(&self) -> AbiLayout {
        let data = self.core.abi_layout_data();
        let f32_bytes = std::mem::size_of::<f32>();
        let f64_bytes = std::mem::size_of::<f64>();
        AbiLayout {
            positions_ptr: data.positions_ptr as u32,
            positions_len_elements: data.positions_len_elements as u32,
            positions_len_bytes: (data.positions_len_elements * f32_bytes) as u32,
            colors_ptr: data.colors_ptr as u32,
            colors_len_elements: data.colors_len_elements as u32,
            colors_len_bytes: (data.colors_len_elements * f32_bytes) as u32,
            sizes_ptr: data.sizes_ptr as u32,
            sizes_len_elements: data.sizes_len_elements as u32,
            sizes_len_bytes: (data.sizes_len_elements * f32_bytes) as u32,
            tiles_ptr: data.tiles_ptr as u32,
            tiles_len_elements: data.tiles_len_elements as u32,
            tiles_len_bytes: (data.tiles_len_elements * f32_bytes) as u32,
            tile_ids_ptr: data.tile_ids_ptr as u32,
            tile_ids_len_elements: data.tile_ids_len_elements as u32,
            tile_ids_len_bytes: (data.tile_ids_len_elements * f64_bytes) as u32,
        }
    }
}
