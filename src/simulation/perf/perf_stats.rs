use wasm_bindgen::prelude::*;

#[wasm_bindgen]
#[derive(Clone, Debug, Default)]
pub struct PerfStats {
    pub(super) step_ms: f64,
    pub(super) field_ms: f64,
    pub(super) tiles_ms: f64,
    pub(super) particle_count: u32,
    pub(super) particles_recycled: u32,
    pub(super) active_tiles: u32,
    pub(super) tiles_spawned: u32,
    pub(super) tiles_removed: u32,
    pub(super) text_fits_deferred: u32,
}

impl PerfStats {
    pub(crate) fn reset(&mut self) {
        *self = PerfStats::default();
    }
}

#[wasm_bindgen]
impl PerfStats {
    #[wasm_bindgen(getter)]
    pub fn step_ms(&self) -> f64 { self.step_ms }
    #[wasm_bindgen(getter)]
    pub fn field_ms(&self) -> f64 { self.field_ms }
    #[wasm_bindgen(getter)]
    pub fn tiles_ms(&self) -> f64 { self.tiles_ms }
    #[wasm_bindgen(getter)]
    pub fn particle_count(&self) -> u32 { self.particle_count }
    #[wasm_bindgen(getter)]
    pub fn particles_recycled(&self) -> u32 { self.particles_recycled }
    #[wasm_bindgen(getter)]
    pub fn active_tiles(&self) -> u32 { self.active_tiles }
    #[wasm_bindgen(getter)]
    pub fn tiles_spawned(&self) -> u32 { self.tiles_spawned }
    #[wasm_bindgen(getter)]
    pub fn tiles_removed(&self) -> u32 { self.tiles_removed }
    #[wasm_bindgen(getter)]
    pub fn text_fits_deferred(&self) -> u32 { self.text_fits_deferred }
}
