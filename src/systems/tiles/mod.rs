//! Tiles - labeled timestamp slabs that fall, settle and fade
//!
//! - tile:        the per-tile record and its lifecycle state
//! - text_fit:    label measurement seam + fit-to-viewport layout
//! - kinematics:  the per-tick state machine (fall, settle, relax, fade, remove)
//! - collection:  the newest-first active set with its size policy

mod collection;
mod kinematics;
mod text_fit;
mod tile;

pub use collection::{TileCollection, TileLimit, TileTickSummary};
pub use kinematics::{fade_opacity, tick_tile, TileTickContext, TileTickResult};
pub use text_fit::{
    fit_text, HostTextMeasurer, MonospaceMeasurer, TextBounds, TextFit, TextMeasurer,
};
pub use tile::{Tile, TileId, TileState};
