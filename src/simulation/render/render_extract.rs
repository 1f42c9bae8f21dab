use serde::Serialize;

use crate::systems::tiles::{Tile, TileState};

use super::{AbiLayoutData, SceneCore};

/// Floats per tile in the render buffer:
/// `x, y, z, angle, opacity, textScale, textX, textY, boxW, boxH, boxD, fitted`.
pub const TILE_RECORD_STRIDE: usize = 12;

/// One tile as the host sees it.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileSnapshot {
    pub id: i64,
    pub label: String,
    pub state: TileState,
    pub position: [f32; 3],
    pub angle: f32,
    pub opacity: f32,
    /// `None` until the label has been measured
    pub text_scale: Option<f32>,
    pub box_size: Option<[f32; 3]>,
}

impl From<&Tile> for TileSnapshot {
    fn from(tile: &Tile) -> Self {
        let p = tile.position();
        Self {
            id: tile.id,
            label: tile.label.clone(),
            state: tile.state(),
            position: [p.x, p.y, p.z],
            angle: tile.rotation(),
            opacity: tile.opacity(),
            text_scale: tile.fit().map(|f| f.scale),
            box_size: tile.fit().map(|f| [f.box_size.x, f.box_size.y, f.box_size.z]),
        }
    }
}

fn write_record(out: &mut Vec<f32>, tile: &Tile, default_box: [f32; 3]) {
    let t = tile.transform();
    out.extend_from_slice(&[t.position.x, t.position.y, t.position.z, t.angle, tile.opacity()]);
    match tile.fit() {
        Some(fit) => out.extend_from_slice(&[
            fit.scale,
            fit.text_offset.x,
            fit.text_offset.y,
            fit.box_size.x,
            fit.box_size.y,
            fit.box_size.z,
            1.0,
        ]),
        // Unmeasured: the host keeps the label hidden and draws a default box.
        None => out.extend_from_slice(&[
            1.0,
            0.0,
            0.0,
            default_box[0],
            default_box[1],
            default_box[2],
            0.0,
        ]),
    }
}

pub(super) fn collect_tiles(scene: &mut SceneCore) -> usize {
    let tiles = &scene.config.tiles;
    let default_box = [scene.viewport.width, tiles.default_height, tiles.depth];

    scene.tile_render.clear();
    scene.tile_ids.clear();
    for tile in scene.tiles.iter() {
        write_record(&mut scene.tile_render, tile, default_box);
        scene.tile_ids.push(tile.id as f64);
    }
    scene.tile_ids.len()
}

pub(super) fn tiles_snapshot(scene: &SceneCore) -> Vec<TileSnapshot> {
    scene.tiles.iter().map(TileSnapshot::from).collect()
}

pub(super) fn tiles_json(scene: &SceneCore) -> String {
    serde_json::to_string(&tiles_snapshot(scene)).unwrap_or_else(|_| "[]".to_string())
}

pub(super) fn abi_layout_data(scene: &SceneCore) -> AbiLayoutData {
    let field = &scene.field;
    AbiLayoutData {
        positions_ptr: field.positions_ptr(),
        positions_len_elements: field.positions().len(),
        colors_ptr: field.colors_ptr(),
        colors_len_elements: field.colors().len(),
        sizes_ptr: field.sizes_ptr(),
        sizes_len_elements: field.sizes().len(),
        tiles_ptr: scene.tile_render.as_ptr(),
        tiles_len_elements: scene.tile_render.len(),
        tile_ids_ptr: scene.tile_ids.as_ptr(),
        tile_ids_len_elements: scene.tile_ids.len(),
    }
}
